use super::*;
use rill_ir::{AstBuilder, BinaryOp, SharedInterner};

#[test]
fn parents_and_ancestors() {
    let interner = SharedInterner::new();
    let mut b = AstBuilder::new(&interner);
    let one = b.number("1");
    let two = b.number("2");
    let sum = b.binary(BinaryOp::Add, one, two);
    let ast = b.program(&[sum]);
    let body = ast.body().unwrap();

    let tree = Tree::new(&ast);
    assert_eq!(tree.parent(one), Some(sum));
    assert_eq!(tree.parent(sum), Some(body));
    assert_eq!(tree.parent(ast.root()), None);
    assert_eq!(
        tree.ancestors(two).collect::<Vec<_>>(),
        vec![sum, body, ast.root()]
    );
    assert!(tree.is_within(one, body));
    assert!(!tree.is_within(body, one));
}

#[test]
fn unreachable_nodes_have_no_parent() {
    let interner = SharedInterner::new();
    let mut b = AstBuilder::new(&interner);
    let orphan = b.number("1");
    let used = b.number("2");
    let ast = b.program(&[used]);

    let tree = Tree::new(&ast);
    assert_eq!(tree.parent(orphan), None);
    assert_eq!(tree.parent(NodeId::INVALID), None);
}
