//! `Finish` steps: completing a node from the values its children left on
//! the frame's stack.

use super::operators;
use super::{mismatch, throw, Evaluator, Flow};
use crate::errors::EvalError;
use crate::exception::ExceptionKind;
use crate::number::Number;
use crate::value::{FunctionValue, Value, ValueKind};
use rill_ir::ast::NodeKind;
use rill_ir::{Name, NodeId};
use std::sync::Arc;

impl Evaluator {
    pub(super) fn finish(&mut self, node: NodeId) -> Result<Flow, EvalError> {
        let ast = Arc::clone(&self.ast);
        let Some(kind) = ast.kind(node) else {
            return Ok(throw(ExceptionKind::ExpectedValue, node));
        };

        match kind {
            // The child's value is already on the stack and is ours.
            NodeKind::Program { .. } | NodeKind::Conditional { .. } | NodeKind::Evaluate { .. } => {
                if self.frame()?.peek().is_none() {
                    return Ok(throw(ExceptionKind::ExpectedValue, node));
                }
                Ok(Flow::Continue)
            }
            NodeKind::Block { statements } => {
                let statements = ast.list(*statements);
                let declares = statements
                    .iter()
                    .filter_map(|&statement| ast.kind(statement))
                    .any(|kind| kind.declared_name().is_some());
                let frame = self.frame_mut()?;
                let values = frame.pop_many(statements.len());
                if declares {
                    frame.exit_scope();
                }
                match values.and_then(|mut values| values.pop()) {
                    Some(last) => Ok(Flow::Push(last)),
                    None => Ok(throw(ExceptionKind::ExpectedValue, node)),
                }
            }
            NodeKind::Number { text, unit } => match Number::parse(ast.text(*text), unit.clone()) {
                Some(number) => Ok(Flow::Push(Value::number(number))),
                None => Ok(throw(ExceptionKind::NotANumber, node)),
            },
            NodeKind::Boolean(value) => Ok(Flow::Push(Value::Boolean(*value))),
            NodeKind::Text(text) => Ok(Flow::Push(Value::text(ast.text(*text)))),
            NodeKind::None => Ok(Flow::Push(Value::None)),
            NodeKind::Sequence { items } => Ok(self
                .collect(node, items.len())?
                .map_or_else(|| throw(ExceptionKind::ExpectedValue, node), |items| {
                    Flow::Push(Value::sequence(items))
                })),
            NodeKind::Set { items } => Ok(self
                .collect(node, items.len())?
                .map_or_else(|| throw(ExceptionKind::ExpectedValue, node), |items| {
                    Flow::Push(Value::set(items))
                })),
            NodeKind::Mapping { entries } => {
                let Some(flat) = self.collect(node, entries.len() * 2)? else {
                    return Ok(throw(ExceptionKind::ExpectedValue, node));
                };
                let mut flat = flat.into_iter();
                let mut pairs = Vec::with_capacity(entries.len());
                while let (Some(key), Some(value)) = (flat.next(), flat.next()) {
                    pairs.push((key, value));
                }
                Ok(Flow::Push(Value::mapping(pairs)))
            }
            NodeKind::Reference { name } => match self.frame()?.scope().lookup(*name) {
                Some(value) => Ok(Flow::Push(value)),
                None => Ok(throw(ExceptionKind::UnknownName(*name), node)),
            },
            NodeKind::Property { name, .. } => {
                let Some(value) = self.frame_mut()?.pop() else {
                    return Ok(throw(ExceptionKind::ExpectedValue, node));
                };
                match &value {
                    Value::Structure(structure) => match structure.field(*name) {
                        Some(field) => Ok(Flow::Push(field.clone())),
                        None => Ok(throw(ExceptionKind::UnknownProperty(*name), node)),
                    },
                    other => Ok(mismatch(ValueKind::Structure, other, node)),
                }
            }
            NodeKind::Binary { op, .. } if op.is_logical() => {
                // Only reached when the left operand did not short-circuit,
                // so the right operand decides.
                match self.frame_mut()?.pop() {
                    Some(value @ Value::Boolean(_)) => Ok(Flow::Push(value)),
                    Some(other) => Ok(mismatch(ValueKind::Boolean, &other, node)),
                    None => Ok(throw(ExceptionKind::ExpectedValue, node)),
                }
            }
            NodeKind::Binary { op, .. } => match self.frame_mut()?.pop_many(2).as_deref() {
                Some([left, right]) => Ok(operators::binary(*op, left, right, node)),
                _ => Ok(throw(ExceptionKind::ExpectedValue, node)),
            },
            NodeKind::Unary { op, .. } => match self.frame_mut()?.pop() {
                Some(operand) => Ok(operators::unary(*op, &operand, node)),
                None => Ok(throw(ExceptionKind::ExpectedValue, node)),
            },
            NodeKind::Function { name, .. } | NodeKind::Structure { name, .. } => {
                Ok(self.define(node, *name))
            }
            NodeKind::Changed { stream } => {
                let changed = match ast.kind(*stream) {
                    Some(NodeKind::Reference { name }) => self.trigger == Some(*name),
                    _ => false,
                };
                Ok(Flow::Push(Value::Boolean(changed)))
            }
            NodeKind::Borrow { source } => {
                let Some(value) = self.borrowed.get(source).cloned() else {
                    return Ok(throw(ExceptionKind::UnknownSource(*source), node));
                };
                if self.frame()?.scope().bind(*source, value.clone()).is_err() {
                    return Ok(throw(ExceptionKind::AlreadyBound(*source), node));
                }
                Ok(Flow::Push(value))
            }
            NodeKind::Placeholder => Ok(throw(ExceptionKind::Placeholder, node)),
            NodeKind::Unparsable { .. } => Ok(throw(ExceptionKind::Unparsable, node)),
            NodeKind::Bind { .. } | NodeKind::KeyValue { .. } => Err(EvalError::Uncompilable(node)),
        }
    }

    /// Pop the values of `count` children, in source order.
    fn collect(&mut self, node: NodeId, count: usize) -> Result<Option<Vec<Value>>, EvalError> {
        let values = self.frame_mut()?.pop_many(count);
        if values.is_none() {
            tracing::trace!(%node, count, "missing child values");
        }
        Ok(values)
    }

    /// Create a closure over a capture of the current scope and bind it
    /// when named. The body sees its own name through the call scope.
    fn define(&mut self, node: NodeId, name: Name) -> Flow {
        let Ok(frame) = self.frame() else {
            return throw(ExceptionKind::ExpectedValue, node);
        };
        let scope = frame.scope().clone();
        let closure = FunctionValue::closure(node, scope.capture()).named(name);
        let closure = Value::function(closure);
        if !name.is_empty() && scope.bind(name, closure.clone()).is_err() {
            return throw(ExceptionKind::AlreadyBound(name), node);
        }
        Flow::Push(closure)
    }
}
