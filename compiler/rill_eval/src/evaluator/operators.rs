//! Binary and unary operators on values.

use super::{mismatch, throw, Flow};
use crate::exception::ExceptionKind;
use crate::number::{ArithmeticError, Number};
use crate::value::{Value, ValueKind};
use rill_ir::{BinaryOp, NodeId, UnaryOp};
use std::cmp::Ordering;

fn arithmetic_failure(error: ArithmeticError, node: NodeId) -> Flow {
    let kind = match error {
        ArithmeticError::IncompatibleUnits => ExceptionKind::IncompatibleUnits,
        ArithmeticError::DivisionByZero => ExceptionKind::DivisionByZero,
    };
    throw(kind, node)
}

fn numeric(result: Result<Number, ArithmeticError>, node: NodeId) -> Flow {
    match result {
        Ok(number) => Flow::Push(Value::number(number)),
        Err(error) => arithmetic_failure(error, node),
    }
}

/// Apply a non-logical binary operator. `And` and `Or` never get here: their
/// result is decided by the branch steps.
pub(super) fn binary(op: BinaryOp, left: &Value, right: &Value, node: NodeId) -> Flow {
    match op {
        BinaryOp::Equal => return Flow::Push(Value::Boolean(left == right)),
        BinaryOp::NotEqual => return Flow::Push(Value::Boolean(left != right)),
        BinaryOp::And | BinaryOp::Or => {
            return match (left, right) {
                (Value::Boolean(a), Value::Boolean(b)) => Flow::Push(Value::Boolean(
                    if op == BinaryOp::And { *a && *b } else { *a || *b },
                )),
                (Value::Boolean(_), other) | (other, _) => {
                    mismatch(ValueKind::Boolean, other, node)
                }
            };
        }
        _ => {}
    }

    match (left, right) {
        (Value::Number(a), Value::Number(b)) => match op {
            BinaryOp::Add => numeric(a.add(b), node),
            BinaryOp::Subtract => numeric(a.subtract(b), node),
            BinaryOp::Multiply => Flow::Push(Value::number(a.multiply(b))),
            BinaryOp::Divide => numeric(a.divide(b), node),
            BinaryOp::Remainder => numeric(a.remainder(b), node),
            _ => match a.compare(b) {
                Ok(ordering) => Flow::Push(Value::Boolean(compare(op, ordering))),
                Err(error) => arithmetic_failure(error, node),
            },
        },
        (Value::Text(a), Value::Text(b)) if op == BinaryOp::Add => {
            Flow::Push(Value::text(format!("{}{}", &**a, &**b)))
        }
        (Value::Text(a), Value::Text(b)) if op.is_comparison() => {
            Flow::Push(Value::Boolean(compare(op, a.as_str().cmp(b.as_str()))))
        }
        (Value::Sequence(a), Value::Sequence(b)) if op == BinaryOp::Add => {
            Flow::Push(Value::sequence(a.iter().chain(b.iter()).cloned().collect()))
        }
        (Value::Number(_), other) => mismatch(ValueKind::Number, other, node),
        (Value::Text(_), other) => mismatch(ValueKind::Text, other, node),
        (Value::Sequence(_), other) => mismatch(ValueKind::Sequence, other, node),
        (other, _) => mismatch(ValueKind::Number, other, node),
    }
}

fn compare(op: BinaryOp, ordering: Ordering) -> bool {
    match op {
        BinaryOp::Less => ordering == Ordering::Less,
        BinaryOp::LessEqual => ordering != Ordering::Greater,
        BinaryOp::Greater => ordering == Ordering::Greater,
        BinaryOp::GreaterEqual => ordering != Ordering::Less,
        _ => false,
    }
}

pub(super) fn unary(op: UnaryOp, operand: &Value, node: NodeId) -> Flow {
    match (op, operand) {
        (UnaryOp::Negate, Value::Number(number)) => Flow::Push(Value::number(number.negate())),
        (UnaryOp::Not, Value::Boolean(value)) => Flow::Push(Value::Boolean(!value)),
        (UnaryOp::Negate, other) => mismatch(ValueKind::Number, other, node),
        (UnaryOp::Not, other) => mismatch(ValueKind::Boolean, other, node),
    }
}
