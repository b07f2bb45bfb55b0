use crate::evaluator::{EvaluationInputs, Evaluator, RunOutcome, StepOutcome};
use crate::exception::ExceptionKind;
use crate::value::{Value, ValueKind};
use pretty_assertions::assert_eq;
use rill_ir::{Ast, AstBuilder, BinaryOp, NodeId, SharedInterner};
use std::sync::Arc;

fn evaluate(ast: Ast) -> Value {
    match Evaluator::new(Arc::new(ast))
        .evaluate(EvaluationInputs::default())
        .unwrap()
    {
        RunOutcome::Finished(value) => value,
        RunOutcome::Suspended => panic!("evaluation suspended"),
    }
}

fn numbers(b: &mut AstBuilder, values: &[&str]) -> NodeId {
    let items: Vec<_> = values.iter().map(|value| b.number(value)).collect();
    b.sequence(&items)
}

/// `ƒ(x) x <op> operand`
fn unary_function(b: &mut AstBuilder, op: BinaryOp, operand: &str) -> NodeId {
    let x = b.input("x");
    let x_ref = b.reference("x");
    let operand = b.number(operand);
    let body = b.binary(op, x_ref, operand);
    b.function("", &[x], body)
}

fn ints(values: &[i64]) -> Value {
    Value::sequence(values.iter().map(|&value| Value::integer(value)).collect())
}

#[test]
fn map_applies_the_function_to_each_element() {
    let interner = SharedInterner::new();
    let mut b = AstBuilder::new(&interner);
    let list = numbers(&mut b, &["1", "2", "3"]);
    let double = unary_function(&mut b, BinaryOp::Multiply, "2");
    let map = b.call("map", &[list, double]);
    let ast = b.program(&[map]);

    assert_eq!(evaluate(ast), ints(&[2, 4, 6]));
}

#[test]
fn filter_keeps_matching_elements() {
    let interner = SharedInterner::new();
    let mut b = AstBuilder::new(&interner);
    let list = numbers(&mut b, &["1", "2", "3"]);
    let above_one = unary_function(&mut b, BinaryOp::Greater, "1");
    let filter = b.call("filter", &[list, above_one]);
    let ast = b.program(&[filter]);

    assert_eq!(evaluate(ast), ints(&[2, 3]));
}

#[test]
fn filter_with_an_always_false_predicate_is_empty() {
    let interner = SharedInterner::new();
    let mut b = AstBuilder::new(&interner);
    let list = numbers(&mut b, &["1", "2", "3"]);
    let x = b.input("x");
    let no = b.boolean(false);
    let never = b.function("", &[x], no);
    let filter = b.call("filter", &[list, never]);
    let ast = b.program(&[filter]);

    assert_eq!(evaluate(ast), ints(&[]));
}

/// Step to completion, failing if a callee frame ever starts.
fn run_without_callbacks(ast: Ast) -> Value {
    let mut evaluator = Evaluator::new(Arc::new(ast));
    evaluator.start();
    loop {
        assert!(evaluator.depth() <= 2, "callee frame was started");
        if let StepOutcome::Finished(value) = evaluator.step().unwrap() {
            return value;
        }
    }
}

#[derive(Clone, Copy, Debug)]
enum Shape {
    Sequence,
    Set,
    Mapping,
}

#[test]
fn empty_collections_never_call_the_function() {
    for native in ["map", "filter", "fold"] {
        for shape in [Shape::Sequence, Shape::Set, Shape::Mapping] {
            let interner = SharedInterner::new();
            let mut b = AstBuilder::new(&interner);
            let empty = match shape {
                Shape::Sequence => b.sequence(&[]),
                Shape::Set => b.set(&[]),
                Shape::Mapping => b.mapping(&[]),
            };
            // Calling this would fail with an unknown name.
            let x = b.input("x");
            let missing = b.reference("missing");
            let broken = b.function("", &[x], missing);
            let call = if native == "fold" {
                let initial = b.text("initial");
                b.call(native, &[empty, initial, broken])
            } else {
                b.call(native, &[empty, broken])
            };
            let ast = b.program(&[call]);

            let expected = match (native, shape) {
                ("fold", _) => Value::text("initial"),
                (_, Shape::Sequence) => ints(&[]),
                (_, Shape::Set) => Value::set([]),
                (_, Shape::Mapping) => Value::mapping([]),
            };
            assert_eq!(
                run_without_callbacks(ast),
                expected,
                "{native} over an empty {shape:?}"
            );
        }
    }
}

#[test]
fn kept_items_wait_on_the_loop_frame() {
    let interner = SharedInterner::new();
    let mut b = AstBuilder::new(&interner);
    let list = numbers(&mut b, &["1", "2", "3"]);
    let double = unary_function(&mut b, BinaryOp::Multiply, "2");
    let map = b.call("map", &[list, double]);
    let ast = b.program(&[map]);

    let mut evaluator = Evaluator::new(Arc::new(ast));
    evaluator.start();
    let mut entered = 0;
    let mut previous = evaluator.depth();
    let value = loop {
        if let StepOutcome::Finished(value) = evaluator.step().unwrap() {
            break value;
        }
        if evaluator.depth() == 3 && previous == 2 {
            assert_eq!(evaluator.frames()[1].stack_len(), entered);
            entered += 1;
        }
        previous = evaluator.depth();
    };
    assert_eq!(entered, 3);
    assert_eq!(value, ints(&[2, 4, 6]));
}

#[test]
fn filtering_sets_and_mappings_keeps_their_kind() {
    let interner = SharedInterner::new();
    let mut b = AstBuilder::new(&interner);
    let items: Vec<_> = ["1", "2", "3"].iter().map(|n| b.number(n)).collect();
    let set = b.set(&items);
    let above_one = unary_function(&mut b, BinaryOp::Greater, "1");
    let filter = b.call("filter", &[set, above_one]);
    let ast = b.program(&[filter]);
    assert_eq!(
        evaluate(ast),
        Value::set([Value::integer(2), Value::integer(3)])
    );

    let mut b = AstBuilder::new(&interner);
    let a = b.text("a");
    let one = b.number("1");
    let c = b.text("c");
    let three = b.number("3");
    let mapping = b.mapping(&[(a, one), (c, three)]);
    let key = b.input("key");
    let value = b.input("value");
    let value_ref = b.reference("value");
    let limit = b.number("1");
    let body = b.binary(BinaryOp::Greater, value_ref, limit);
    let large = b.function("", &[key, value], body);
    let filter = b.call("filter", &[mapping, large]);
    let ast = b.program(&[filter]);
    assert_eq!(
        evaluate(ast),
        Value::mapping([(Value::text("c"), Value::integer(3))])
    );
}

#[test]
fn mapping_a_set_merges_equal_results() {
    let interner = SharedInterner::new();
    let mut b = AstBuilder::new(&interner);
    let items: Vec<_> = ["1", "2", "3"].iter().map(|n| b.number(n)).collect();
    let set = b.set(&items);
    let zero = unary_function(&mut b, BinaryOp::Multiply, "0");
    let map = b.call("map", &[set, zero]);
    let ast = b.program(&[map]);

    assert_eq!(evaluate(ast), Value::set([Value::integer(0)]));
}

#[test]
fn fold_threads_the_accumulator() {
    let interner = SharedInterner::new();
    let mut b = AstBuilder::new(&interner);
    let list = numbers(&mut b, &["1", "2", "3", "4"]);
    let zero = b.number("0");
    let total = b.input("total");
    let x = b.input("x");
    let total_ref = b.reference("total");
    let x_ref = b.reference("x");
    let body = b.binary(BinaryOp::Add, total_ref, x_ref);
    let add = b.function("", &[total, x], body);
    let fold = b.call("fold", &[list, zero, add]);
    let ast = b.program(&[fold]);

    assert_eq!(evaluate(ast), Value::integer(10));
}

#[test]
fn mapping_over_a_mapping_keeps_keys() {
    let interner = SharedInterner::new();
    let mut b = AstBuilder::new(&interner);
    let a = b.text("a");
    let one = b.number("1");
    let c = b.text("c");
    let three = b.number("3");
    let mapping = b.mapping(&[(a, one), (c, three)]);
    let key = b.input("key");
    let value = b.input("value");
    let value_ref = b.reference("value");
    let ten = b.number("10");
    let body = b.binary(BinaryOp::Multiply, value_ref, ten);
    let scale = b.function("", &[key, value], body);
    let map = b.call("map", &[mapping, scale]);
    let ast = b.program(&[map]);

    assert_eq!(
        evaluate(ast),
        Value::mapping([
            (Value::text("a"), Value::integer(10)),
            (Value::text("c"), Value::integer(30)),
        ])
    );
}

#[test]
fn filter_requires_a_boolean_predicate() {
    let interner = SharedInterner::new();
    let mut b = AstBuilder::new(&interner);
    let list = numbers(&mut b, &["1"]);
    let double = unary_function(&mut b, BinaryOp::Multiply, "2");
    let filter = b.call("filter", &[list, double]);
    let ast = b.program(&[filter]);

    let value = evaluate(ast);
    let exception = value.as_exception().unwrap();
    assert_eq!(
        exception.kind,
        ExceptionKind::TypeMismatch {
            expected: ValueKind::Boolean,
            found: ValueKind::Number
        }
    );
    assert_eq!(exception.node, filter);
}

#[test]
fn map_rejects_non_collections() {
    let interner = SharedInterner::new();
    let mut b = AstBuilder::new(&interner);
    let five = b.number("5");
    let double = unary_function(&mut b, BinaryOp::Multiply, "2");
    let map = b.call("map", &[five, double]);
    let ast = b.program(&[map]);

    let value = evaluate(ast);
    assert_eq!(
        value.as_exception().unwrap().kind,
        ExceptionKind::TypeMismatch {
            expected: ValueKind::Sequence,
            found: ValueKind::Number
        }
    );
}

#[test]
fn each_callback_runs_in_its_own_frame() {
    let interner = SharedInterner::new();
    let mut b = AstBuilder::new(&interner);
    let list = numbers(&mut b, &["1", "2"]);
    let double = unary_function(&mut b, BinaryOp::Multiply, "2");
    let map = b.call("map", &[list, double]);
    let ast = b.program(&[map]);

    let mut evaluator = Evaluator::new(Arc::new(ast));
    evaluator.start();
    let mut entered = 0;
    let mut previous = evaluator.depth();
    loop {
        if let StepOutcome::Finished(_) = evaluator.step().unwrap() {
            break;
        }
        if evaluator.depth() == 3 && previous == 2 {
            entered += 1;
        }
        previous = evaluator.depth();
    }
    assert_eq!(entered, 2);
}
