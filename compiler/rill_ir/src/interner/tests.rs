use super::*;

#[test]
fn interning_is_idempotent() {
    let interner = StringInterner::new();
    let a = interner.intern("total");
    let b = interner.intern("total");
    let c = interner.intern("count");
    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_eq!(interner.lookup(a), "total");
    assert_eq!(interner.lookup(c), "count");
}

#[test]
fn empty_string_is_pre_interned() {
    let interner = StringInterner::new();
    assert_eq!(interner.intern(""), Name::EMPTY);
    assert_eq!(interner.lookup(Name::EMPTY), "");
    assert!(interner.is_empty());
}

#[test]
fn get_does_not_intern() {
    let interner = StringInterner::new();
    assert_eq!(interner.get("missing"), None);
    assert_eq!(interner.len(), 1);
    let name = interner.intern("present");
    assert_eq!(interner.get("present"), Some(name));
}

#[test]
fn shared_handles_see_the_same_table() {
    let shared = SharedInterner::new();
    let clone = shared.clone();
    let name = shared.intern("x");
    assert_eq!(clone.lookup(name), "x");
    assert!(shared.same(&clone));
    assert!(!shared.same(&SharedInterner::new()));
}
