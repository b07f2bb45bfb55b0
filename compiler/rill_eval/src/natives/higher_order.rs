//! Higher-order natives as step loops.
//!
//! `map`, `filter` and `fold` call a user function once per element. Rather
//! than recursing into the evaluator, each runs a four-step sequence in its
//! own frame:
//!
//! ```text
//! 0 Init     validate inputs, bind index = 0 (and the initial result for fold)
//! 1 Next     exhausted? jump to Done : call the function on element[index]
//! 2 Collect  keep or fold the callee's value, index += 1, jump to Next
//! 3 Done     push the result
//! ```
//!
//! The callee's frame sits above the loop frame, so every invocation is
//! visible to a stepping host. The loop state lives in the frame's scope
//! under names no program can spell. Items kept by `map` and `filter` wait
//! on the frame's value stack, mapping entries as key then value, and are
//! gathered into one collection by `Done`.

use super::{NativeBody, NativeRegistry};
use crate::errors::EvalError;
use crate::evaluator::{mismatch, throw, Evaluator, Flow};
use crate::exception::ExceptionKind;
use crate::step::{HigherOrder, LoopPhase};
use crate::value::{Element, Value, ValueKind};
use rill_ir::Type;

pub(super) fn register(registry: &mut NativeRegistry) {
    // Callbacks take one input per element, or two for mapping entries, so
    // their static type is left open.
    registry.register(
        "map",
        &["collection", "function"],
        Type::function(vec![Type::Any; 2], Type::Any),
        NativeBody::Loop(HigherOrder::Map),
    );
    registry.register(
        "filter",
        &["collection", "function"],
        Type::function(vec![Type::Any; 2], Type::Any),
        NativeBody::Loop(HigherOrder::Filter),
    );
    registry.register(
        "fold",
        &["collection", "initial", "function"],
        Type::function(vec![Type::Any; 3], Type::Any),
        NativeBody::Loop(HigherOrder::Fold),
    );
}

fn is_collection(value: &Value) -> bool {
    matches!(value, Value::Sequence(_) | Value::Set(_) | Value::Mapping(_))
}

/// A collection of the same kind as `collection` holding the kept items.
fn collect_like(collection: &Value, items: Vec<Value>) -> Value {
    match collection {
        Value::Set(_) => Value::set(items),
        Value::Mapping(_) => {
            let mut items = items.into_iter();
            let mut pairs = Vec::new();
            while let (Some(key), Some(value)) = (items.next(), items.next()) {
                pairs.push((key, value));
            }
            Value::mapping(pairs)
        }
        _ => Value::sequence(items),
    }
}

impl Evaluator {
    pub(crate) fn loop_step(&mut self, op: HigherOrder, phase: LoopPhase) -> Result<Flow, EvalError> {
        let names = self.natives().loop_names();
        let frame = self.frame()?;
        let scope = frame.scope().clone();
        let origin = frame.origin();
        let local = |name| scope.local(name).unwrap_or(Value::None);
        let collection = local(names.collection);
        let index = local(names.index)
            .as_number()
            .and_then(crate::number::Number::as_index)
            .unwrap_or(0);

        match phase {
            LoopPhase::Init => {
                if !is_collection(&collection) {
                    return Ok(mismatch(ValueKind::Sequence, &collection, origin));
                }
                let function = local(names.function);
                if !matches!(function, Value::Function(_)) {
                    return Ok(mismatch(ValueKind::Function, &function, origin));
                }
                scope.rebind(names.index, Value::integer(0));
                if op == HigherOrder::Fold {
                    scope.rebind(names.result, local(names.initial));
                }
                Ok(Flow::Continue)
            }
            LoopPhase::Next => {
                let Some(element) = collection.element(index) else {
                    tracing::trace!(?op, iterations = index, "loop exhausted");
                    self.frame_mut()?.jump(1)?;
                    return Ok(Flow::Continue);
                };
                let Value::Function(function) = local(names.function) else {
                    return Ok(throw(ExceptionKind::ExpectedValue, origin));
                };
                let mut arguments = Vec::with_capacity(3);
                if op == HigherOrder::Fold {
                    arguments.push(local(names.result));
                }
                match element {
                    Element::Single(value) => arguments.push(value.clone()),
                    Element::Pair(key, value) => {
                        arguments.push(key.clone());
                        arguments.push(value.clone());
                    }
                }
                self.start_call(&function, arguments, origin)
            }
            LoopPhase::Collect => {
                let frame = self.frame_mut()?;
                let Some(produced) = frame.pop() else {
                    return Ok(throw(ExceptionKind::ExpectedValue, origin));
                };
                let Some(element) = collection.element(index) else {
                    return Ok(throw(ExceptionKind::ExpectedValue, origin));
                };
                match op {
                    HigherOrder::Map => match element {
                        Element::Single(_) => frame.push(produced),
                        Element::Pair(key, _) => {
                            frame.push(key.clone());
                            frame.push(produced);
                        }
                    },
                    HigherOrder::Filter => match produced {
                        Value::Boolean(true) => match element {
                            Element::Single(value) => frame.push(value.clone()),
                            Element::Pair(key, value) => {
                                frame.push(key.clone());
                                frame.push(value.clone());
                            }
                        },
                        Value::Boolean(false) => {}
                        other => return Ok(mismatch(ValueKind::Boolean, &other, origin)),
                    },
                    HigherOrder::Fold => scope.rebind(names.result, produced),
                }
                scope.rebind(
                    names.index,
                    Value::number(crate::number::Number::count(index + 1)),
                );
                frame.jump(-2)?;
                Ok(Flow::Continue)
            }
            LoopPhase::Done => match op {
                HigherOrder::Fold => Ok(Flow::Push(local(names.result))),
                HigherOrder::Map | HigherOrder::Filter => {
                    let frame = self.frame_mut()?;
                    let count = frame.stack_len();
                    let kept = frame.pop_many(count).unwrap_or_default();
                    Ok(Flow::Push(collect_like(&collection, kept)))
                }
            },
        }
    }
}

#[cfg(test)]
mod tests;
