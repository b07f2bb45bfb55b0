use super::*;

#[test]
fn merge_covers_both() {
    let a = Span::new(2, 5);
    let b = Span::new(8, 10);
    assert_eq!(a.merge(b), Span::new(2, 10));
    assert_eq!(b.merge(a), Span::new(2, 10));
}

#[test]
fn contains_is_end_exclusive() {
    let span = Span::new(3, 6);
    assert!(span.contains(3));
    assert!(span.contains(5));
    assert!(!span.contains(6));
    assert_eq!(span.len(), 3);
    assert!(Span::DUMMY.is_empty());
}
