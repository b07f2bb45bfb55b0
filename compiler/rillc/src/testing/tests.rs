use super::*;
use pretty_assertions::assert_eq;
use rill_eval::{EvaluationInputs, Evaluator, Number, RunOutcome, Value};
use rill_ir::ast::NodeKind;
use std::sync::Arc;

fn evaluate(text: &str) -> Value {
    let interner = SharedInterner::new();
    let ast = LineParser::new().parse(text, &interner).unwrap();
    match Evaluator::new(Arc::new(ast))
        .evaluate(EvaluationInputs::default())
        .unwrap()
    {
        RunOutcome::Finished(value) => value,
        RunOutcome::Suspended => panic!("suspended"),
    }
}

fn numbers(values: &[i64]) -> Value {
    Value::sequence(values.iter().map(|&n| Value::integer(n)).collect())
}

#[test]
fn sums() {
    assert_eq!(evaluate("1 + 2"), Value::integer(3));
}

#[test]
fn operators_apply_left_to_right() {
    assert_eq!(evaluate("1 + 2 * 3"), Value::integer(9));
    assert_eq!(evaluate("1 + (2 * 3)"), Value::integer(7));
    assert_eq!(evaluate("-2 + 5"), Value::integer(3));
}

#[test]
fn numbers_carry_units() {
    assert_eq!(
        evaluate("5m + 3m"),
        Value::number(Number::integer(8, Unit::dimension("m")))
    );
}

#[test]
fn binds_and_functions() {
    let text = "double: ƒ(x) x * 2\nmap([1, 2, 3], double)";
    assert_eq!(evaluate(text), numbers(&[2, 4, 6]));
}

#[test]
fn filtering() {
    assert_eq!(evaluate("filter([1, 2, 3], ƒ(v) v > 1)"), numbers(&[2, 3]));
    assert_eq!(evaluate("filter([1, 2, 3], fun(v) false)"), numbers(&[]));
}

#[test]
fn text_and_keywords() {
    assert_eq!(evaluate("\"a\" + \"b\""), Value::text("ab"));
    assert_eq!(evaluate("~true | false"), Value::Boolean(false));
    assert_eq!(evaluate("none"), Value::None);
}

#[test]
fn comments_and_blank_lines_are_skipped() {
    let text = "// setup\n\nx: 4\n\n// result\nx + 1";
    assert_eq!(evaluate(text), Value::integer(5));
}

#[test]
fn strict_parsing_reports_position() {
    let interner = SharedInterner::new();
    let parser = LineParser::new();
    assert_eq!(
        parser.parse("1 +", &interner).unwrap_err(),
        ParseError::new(1, 3, "expected an expression")
    );
    assert_eq!(
        parser.parse("1\n\"abc", &interner).unwrap_err(),
        ParseError::new(2, 1, "unterminated text")
    );
    assert_eq!(
        parser.parse("1 # 2", &interner).unwrap_err(),
        ParseError::new(1, 3, "unexpected `#`")
    );
    assert_eq!(
        parser.parse("f(1", &interner).unwrap_err(),
        ParseError::new(1, 3, "expected `)`")
    );
}

#[test]
fn lenient_parsing_keeps_broken_lines() {
    let interner = SharedInterner::new();
    let ast = LineParser::lenient().parse("1 +\n2", &interner).unwrap();
    let Some(NodeKind::Block { statements }) = ast.body().and_then(|body| ast.kind(body)) else {
        panic!("expected a block");
    };
    let statements = ast.list(*statements);
    assert_eq!(statements.len(), 2);
    assert!(matches!(
        ast.kind(statements[0]),
        Some(NodeKind::Unparsable { .. })
    ));
}

#[test]
fn statements_take_binds_borrows_and_placeholders() {
    let interner = SharedInterner::new();
    let ast = LineParser::new()
        .parse("borrow data\ntotal: data.count\n?", &interner)
        .unwrap();
    let Some(NodeKind::Block { statements }) = ast.body().and_then(|body| ast.kind(body)) else {
        panic!("expected a block");
    };
    let kinds: Vec<&str> = ast
        .list(*statements)
        .iter()
        .filter_map(|&statement| ast.kind(statement).map(NodeKind::describe))
        .collect();
    assert_eq!(kinds, vec!["borrow", "bind", "placeholder"]);
}
