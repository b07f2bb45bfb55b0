use super::*;
use pretty_assertions::assert_eq;

#[test]
fn children_are_allocated_before_parents() {
    let interner = SharedInterner::new();
    let mut b = AstBuilder::new(&interner);
    let one = b.number("1");
    let two = b.number("2");
    let sum = b.binary(BinaryOp::Add, one, two);
    let ast = b.program(&[sum]);

    for id in ast.ids() {
        for child in ast.children(id) {
            assert!(child < id, "{child:?} should precede {id:?}");
        }
    }
    assert_eq!(ast.root().index(), ast.len() - 1);
}

#[test]
fn parent_span_covers_children() {
    let interner = SharedInterner::new();
    let mut b = AstBuilder::new(&interner);
    let one = b.number("1");
    let two = b.number("2");
    let sum = b.binary(BinaryOp::Add, one, two);
    let ast = b.program(&[sum]);

    let span = ast.span(sum);
    assert!(span.start <= ast.span(one).start);
    assert!(span.end >= ast.span(two).end);
    assert_eq!(ast.span(NodeId::INVALID), Span::DUMMY);
}

#[test]
fn mapping_allocates_key_value_entries() {
    let interner = SharedInterner::new();
    let mut b = AstBuilder::new(&interner);
    let key = b.text("a");
    let value = b.number("1");
    let mapping = b.mapping(&[(key, value)]);
    let ast = b.program(&[mapping]);

    let entries = ast.children(mapping);
    assert_eq!(entries.len(), 1);
    assert_eq!(
        ast.kind(entries[0]),
        Some(&NodeKind::KeyValue { key, value })
    );
}

#[test]
fn declared_names() {
    let interner = SharedInterner::new();
    let mut b = AstBuilder::new(&interner);
    let one = b.number("1");
    let bind = b.bind("x", one);
    let body = b.reference("x");
    let anonymous = b.function("", &[], body);
    let named = b.structure("Point", &[]);
    let ast = b.program(&[bind, anonymous, named]);

    let x = interner.intern("x");
    let point = interner.intern("Point");
    assert_eq!(ast.kind(bind).and_then(NodeKind::declared_name), Some(x));
    assert_eq!(ast.kind(anonymous).and_then(NodeKind::declared_name), None);
    assert_eq!(ast.kind(named).and_then(NodeKind::declared_name), Some(point));
}
