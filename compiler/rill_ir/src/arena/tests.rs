use crate::{AstBuilder, BinaryOp, NodeId, NodeKind, SharedInterner};
use pretty_assertions::assert_eq;

fn sample() -> (crate::Ast, [NodeId; 4]) {
    let interner = SharedInterner::new();
    let mut b = AstBuilder::new(&interner);
    let one = b.number("1");
    let two = b.number("2");
    let sum = b.binary(BinaryOp::Add, one, two);
    let three = b.number("3");
    let ast = b.program(&[sum, three]);
    (ast, [one, two, sum, three])
}

#[test]
fn descendants_are_pre_order() {
    let (ast, [one, two, sum, three]) = sample();
    let body = ast.body().unwrap();
    assert_eq!(
        ast.descendants(ast.root()),
        vec![ast.root(), body, sum, one, two, three]
    );
}

#[test]
fn post_order_visits_children_first() {
    let (ast, [one, two, sum, three]) = sample();
    let body = ast.body().unwrap();
    assert_eq!(
        ast.post_order(ast.root()),
        vec![one, two, sum, three, body, ast.root()]
    );
}

#[test]
fn invalid_ids_are_absent() {
    let (ast, _) = sample();
    assert!(ast.get(NodeId::INVALID).is_none());
    assert!(ast.kind(NodeId::new(10_000)).is_none());
    assert!(ast.children(NodeId::INVALID).is_empty());
    assert!(ast.descendants(NodeId::INVALID).is_empty());
}

#[test]
fn holes_are_skipped_by_children() {
    let interner = SharedInterner::new();
    let mut b = AstBuilder::new(&interner);
    let one = b.number("1");
    let partial = b.binary(BinaryOp::Add, one, NodeId::INVALID);
    let ast = b.program(&[partial]);
    assert_eq!(ast.children(partial).as_slice(), &[one]);
    assert!(matches!(ast.kind(partial), Some(NodeKind::Binary { .. })));
}
