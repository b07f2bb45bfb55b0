use super::*;
use crate::number::Number;
use pretty_assertions::assert_eq;
use rill_ir::Unit;
use std::collections::hash_map::DefaultHasher;

fn hash_of(value: &Value) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

#[test]
fn sets_and_mappings_ignore_order() {
    let forward = Value::set([Value::integer(1), Value::integer(2)]);
    let backward = Value::set([Value::integer(2), Value::integer(1)]);
    assert_eq!(forward, backward);
    assert_eq!(hash_of(&forward), hash_of(&backward));

    let forward = Value::mapping([
        (Value::text("a"), Value::integer(1)),
        (Value::text("b"), Value::integer(2)),
    ]);
    let backward = Value::mapping([
        (Value::text("b"), Value::integer(2)),
        (Value::text("a"), Value::integer(1)),
    ]);
    assert_eq!(forward, backward);
    assert_eq!(hash_of(&forward), hash_of(&backward));
}

#[test]
fn sequences_respect_order() {
    let forward = Value::sequence(vec![Value::integer(1), Value::integer(2)]);
    let backward = Value::sequence(vec![Value::integer(2), Value::integer(1)]);
    assert_ne!(forward, backward);
}

#[test]
fn sets_deduplicate_structurally() {
    let set = Value::set([
        Value::sequence(vec![Value::integer(1)]),
        Value::sequence(vec![Value::integer(1)]),
        Value::text("x"),
    ]);
    assert_eq!(set.len(), Some(2));
}

#[test]
fn numbers_with_different_units_differ() {
    let meters = Value::number(Number::integer(1, Unit::dimension("m")));
    let plain = Value::integer(1);
    assert_ne!(meters, plain);
    assert_eq!(meters, Value::number(Number::parse("1.0", Unit::dimension("m")).unwrap()));
}

#[test]
fn closures_compare_by_definition_and_scope() {
    let scope = SharedScope::root();
    let node = NodeId::new(3);
    let a = FunctionValue::closure(node, scope.clone());
    let b = FunctionValue::closure(node, scope);
    let elsewhere = FunctionValue::closure(node, SharedScope::root());
    assert_eq!(a, b);
    assert_ne!(a, elsewhere);
}

#[test]
fn structures_compare_by_fields() {
    let name = rill_ir::SharedInterner::new().intern("x");
    let node = NodeId::new(1);
    let a = Value::structure(node, vec![(name, Value::integer(1))], SharedScope::root());
    let b = Value::structure(node, vec![(name, Value::integer(1))], SharedScope::root());
    let c = Value::structure(node, vec![(name, Value::integer(2))], SharedScope::root());
    assert_eq!(a, b);
    assert_ne!(a, c);
    let Value::Structure(structure) = &a else {
        panic!("expected a structure");
    };
    assert_eq!(structure.field(name), Some(&Value::integer(1)));
}

#[test]
fn elements_in_iteration_order() {
    let mapping = Value::mapping([(Value::text("k"), Value::integer(9))]);
    assert!(matches!(
        mapping.element(0),
        Some(Element::Pair(Value::Text(_), Value::Number(_)))
    ));
    assert!(mapping.element(1).is_none());
    assert!(Value::text("abc").element(0).is_none());
    assert_eq!(Value::text("abc").len(), Some(3));
    assert_eq!(Value::Boolean(true).len(), None);
}

#[test]
fn display() {
    assert_eq!(Value::None.to_string(), "ø");
    assert_eq!(Value::Boolean(true).to_string(), "⊤");
    assert_eq!(Value::Boolean(false).to_string(), "⊥");
    assert_eq!(Value::text("hi").to_string(), "\"hi\"");
    assert_eq!(
        Value::number(Number::parse("2.5", Unit::dimension("m")).unwrap()).to_string(),
        "2.5m"
    );
    assert_eq!(
        Value::sequence(vec![Value::integer(1), Value::integer(2)]).to_string(),
        "[1 2]"
    );
    assert_eq!(Value::set([Value::integer(1)]).to_string(), "{1}");
    assert_eq!(Value::mapping([]).to_string(), "{:}");
    assert_eq!(
        Value::mapping([(Value::text("a"), Value::integer(1))]).to_string(),
        "{\"a\":1}"
    );
    assert_eq!(
        Value::exception(ExceptionKind::DivisionByZero, NodeId::new(4)).to_string(),
        "!division by zero at #4"
    );
}

#[test]
fn kinds() {
    assert_eq!(Value::None.kind(), ValueKind::None);
    assert_eq!(Value::integer(1).kind(), ValueKind::Number);
    assert_eq!(Value::sequence(Vec::new()).kind(), ValueKind::Sequence);
    assert!(Value::exception(ExceptionKind::Placeholder, NodeId::new(0)).is_exception());
    assert_eq!(Value::Boolean(true).as_bool(), Some(true));
    assert_eq!(Value::text("t").as_text(), Some("t"));
    assert_eq!(ValueKind::Mapping.to_string(), "mapping");
}
