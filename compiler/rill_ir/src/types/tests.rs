use super::*;

#[test]
fn any_is_compatible_both_ways() {
    assert!(Type::Any.accepts(&Type::Text));
    assert!(Type::Text.accepts(&Type::Any));
    assert!(!Type::Text.accepts(&Type::Boolean));
}

#[test]
fn numbers_require_identical_units() {
    let meters = Type::Number(Unit::dimension("m"));
    assert!(meters.accepts(&Type::Number(Unit::dimension("m"))));
    assert!(!meters.accepts(&Type::number()));
    assert!(!Type::number().accepts(&meters));
}

#[test]
fn collections_compare_element_types() {
    let numbers = Type::sequence_of(Type::number());
    assert!(numbers.accepts(&Type::sequence_of(Type::Any)));
    assert!(!numbers.accepts(&Type::sequence_of(Type::Text)));
    assert!(!numbers.accepts(&Type::Set(Box::new(Type::number()))));
}

#[test]
fn function_types_check_arity() {
    let unary = Type::function(vec![Type::number()], Type::Boolean);
    let binary = Type::function(vec![Type::number(), Type::number()], Type::Boolean);
    assert!(unary.accepts(&unary.clone()));
    assert!(!unary.accepts(&binary));
}

#[test]
fn common_type_falls_back_to_any() {
    let same = [Type::Text, Type::Any, Type::Text];
    assert_eq!(Type::common(same.iter()), Type::Text);
    let mixed = [Type::Text, Type::Boolean];
    assert_eq!(Type::common(mixed.iter()), Type::Any);
    assert_eq!(Type::common([].iter()), Type::Any);
}

#[test]
fn display_is_readable() {
    let ty = Type::function(vec![Type::number(), Type::Text], Type::sequence_of(Type::Boolean));
    assert_eq!(ty.to_string(), "ƒ(number text) [boolean]");
    assert_eq!(Type::Number(Unit::dimension("m")).to_string(), "number m");
}
