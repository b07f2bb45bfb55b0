use super::*;
use pretty_assertions::assert_eq;

fn n(text: &str) -> Number {
    Number::parse(text, Unit::unitless()).unwrap()
}

fn m(text: &str) -> Number {
    Number::parse(text, Unit::dimension("m")).unwrap()
}

#[test]
fn parse_decimal_forms() {
    assert_eq!(n("12").to_string(), "12");
    assert_eq!(n("-0.25").to_string(), "-0.25");
    assert_eq!(n("1.50").to_string(), "1.5");
    assert_eq!(n("2e3").to_string(), "2000");
    assert_eq!(n("25e-2").to_string(), "0.25");
    assert_eq!(n(".5").to_string(), "0.5");
}

#[test]
fn parse_rejects_garbage() {
    assert!(Number::parse("", Unit::unitless()).is_none());
    assert!(Number::parse("1.2.3", Unit::unitless()).is_none());
    assert!(Number::parse("abc", Unit::unitless()).is_none());
    assert!(Number::parse("1e", Unit::unitless()).is_none());
    assert!(Number::parse("-", Unit::unitless()).is_none());
}

#[test]
fn parse_rejects_extreme_scales() {
    assert!(Number::parse("1.5e-2147483648", Unit::unitless()).is_none());
    assert!(Number::parse("1e2147483647", Unit::unitless()).is_none());
    assert!(Number::parse("1e4097", Unit::unitless()).is_none());
    assert!(Number::parse("0.5e-4096", Unit::unitless()).is_none());
    assert!(n("1e4096").is_integer());
    assert!(!n("1e-4096").is_zero());
}

#[test]
fn arithmetic_is_exact() {
    let third = n("1").divide(&n("3")).unwrap();
    let whole = third.add(&third).unwrap().add(&third).unwrap();
    assert_eq!(whole, n("1"));
    assert_eq!(n("0.1").add(&n("0.2")).unwrap(), n("0.3"));
    assert_eq!(third.to_string(), "0.333333333333");
}

#[test]
fn equal_magnitudes_normalize() {
    assert_eq!(n("0.50"), n("0.5"));
    assert_eq!(n("2").divide(&n("4")).unwrap(), n("0.5"));
    assert_eq!(n("-0"), n("0"));
}

#[test]
fn units_must_match_for_addition() {
    assert_eq!(m("1").add(&n("1")), Err(ArithmeticError::IncompatibleUnits));
    assert_eq!(m("1").add(&m("2")).unwrap(), m("3"));
    assert_eq!(m("1").compare(&n("1")), Err(ArithmeticError::IncompatibleUnits));
}

#[test]
fn different_units_are_never_equal() {
    assert_ne!(m("1"), n("1"));
    let cm = Number::parse("100", Unit::dimension("cm")).unwrap();
    assert_ne!(m("1"), cm);
}

#[test]
fn multiplication_combines_units() {
    let area = m("2").multiply(&m("3"));
    assert_eq!(area.to_string(), "6m^2");
    let speed = m("10")
        .divide(&Number::parse("2", Unit::dimension("s")).unwrap())
        .unwrap();
    assert_eq!(speed.to_string(), "5m/s");
}

#[test]
fn division_and_remainder_by_zero() {
    assert_eq!(n("1").divide(&n("0")), Err(ArithmeticError::DivisionByZero));
    assert_eq!(n("1").remainder(&n("0")), Err(ArithmeticError::DivisionByZero));
    assert_eq!(n("7").remainder(&n("3")).unwrap(), n("1"));
    assert_eq!(n("-7").remainder(&n("3")).unwrap(), n("-1"));
    assert_eq!(n("7.5").remainder(&n("2")).unwrap(), n("1.5"));
}

#[test]
fn ordering_and_indices() {
    assert_eq!(n("1.5").compare(&n("2")).unwrap(), Ordering::Less);
    assert_eq!(n("3").as_index(), Some(3));
    assert_eq!(n("3.5").as_index(), None);
    assert_eq!(n("-1").as_index(), None);
}
