//! Static types of nodes.
//!
//! Types are computed on demand and memoized per node. A node whose type is
//! requested while it is still being computed (a recursive function asking
//! for its own output) is typed `Any`, which accepts and is accepted by
//! everything, so cycles never produce spurious conflicts.

use crate::context::{Context, Definition, Slot, SourceType};
use rill_ir::ast::NodeKind;
use rill_ir::{ensure_sufficient_stack, BinaryOp, NodeId, Type, UnaryOp};

impl Context<'_> {
    pub fn type_of(&self, node: NodeId) -> Type {
        {
            let mut types = self.types.borrow_mut();
            let Some(slot) = types.get_mut(node.index()) else {
                return Type::Any;
            };
            match slot {
                Slot::Known(ty) => return ty.clone(),
                Slot::InProgress => {
                    tracing::trace!(%node, "type cycle");
                    return Type::Any;
                }
                Slot::Unknown => {}
            }
            *slot = Slot::InProgress;
        }

        let ty = ensure_sufficient_stack(|| self.compute(node));
        if let Some(slot) = self.types.borrow_mut().get_mut(node.index()) {
            *slot = Slot::Known(ty.clone());
        }
        ty
    }

    /// The type a resolved name has.
    pub fn definition_type(&self, definition: Definition) -> Type {
        match definition {
            Definition::Bind(node)
            | Definition::Function(node)
            | Definition::Structure(node)
            | Definition::Borrow(node) => self.type_of(node),
            Definition::Input { input, .. } => self.input_type(input),
            Definition::Stream(index) => self
                .stream(index)
                .map_or(Type::Any, |stream| stream.value_type.clone()),
            Definition::Native(id) => self
                .natives
                .get(id)
                .map_or(Type::Any, |native| native.signature.clone()),
        }
    }

    /// Declared type of a function or structure input: its annotation, else
    /// the type of its default. Variadic inputs hold a sequence.
    pub fn input_type(&self, input: NodeId) -> Type {
        let Some(NodeKind::Bind {
            value,
            annotation,
            variadic,
            ..
        }) = self.ast.kind(input)
        else {
            return Type::Any;
        };
        let item = match annotation {
            Some(annotation) => annotation.clone(),
            None if value.is_valid() => self.type_of(*value),
            None => Type::Any,
        };
        if *variadic {
            Type::sequence_of(item)
        } else {
            item
        }
    }

    fn common_of(&self, nodes: &[NodeId]) -> Type {
        let types: Vec<Type> = nodes.iter().map(|&node| self.type_of(node)).collect();
        Type::common(types.iter())
    }

    fn compute(&self, node: NodeId) -> Type {
        let ast = self.ast;
        let Some(kind) = ast.kind(node) else {
            return Type::Any;
        };
        match kind {
            NodeKind::Program { body } => self.type_of(*body),
            NodeKind::Block { statements } => ast
                .list(*statements)
                .last()
                .map_or(Type::Any, |&last| self.type_of(last)),
            NodeKind::Bind {
                value, annotation, ..
            } => match annotation {
                Some(annotation) => annotation.clone(),
                None => self.type_of(*value),
            },
            NodeKind::Number { unit, .. } => Type::Number(unit.clone()),
            NodeKind::Boolean(_) | NodeKind::Changed { .. } => Type::Boolean,
            NodeKind::Text(_) => Type::Text,
            NodeKind::None => Type::None,
            NodeKind::Sequence { items } => Type::sequence_of(self.common_of(ast.list(*items))),
            NodeKind::Set { items } => Type::Set(Box::new(self.common_of(ast.list(*items)))),
            NodeKind::Mapping { entries } => {
                let (keys, values): (Vec<_>, Vec<_>) = ast
                    .list(*entries)
                    .iter()
                    .filter_map(|&entry| match ast.kind(entry) {
                        Some(NodeKind::KeyValue { key, value }) => Some((*key, *value)),
                        _ => None,
                    })
                    .unzip();
                Type::Mapping(
                    Box::new(self.common_of(&keys)),
                    Box::new(self.common_of(&values)),
                )
            }
            NodeKind::KeyValue { value, .. } => self.type_of(*value),
            NodeKind::Reference { name } => self
                .resolve(node, *name)
                .map_or(Type::Any, |definition| self.definition_type(definition)),
            NodeKind::Property { structure, name } => match self.type_of(*structure) {
                Type::Structure(definition) => match ast.kind(definition) {
                    Some(NodeKind::Structure { inputs, .. }) => ast
                        .list(*inputs)
                        .iter()
                        .find(|&&input| {
                            ast.kind(input).and_then(NodeKind::declared_name) == Some(*name)
                        })
                        .map_or(Type::Any, |&input| self.input_type(input)),
                    _ => Type::Any,
                },
                _ => Type::Any,
            },
            NodeKind::Binary { op, left, right } => {
                binary_type(*op, &self.type_of(*left), &self.type_of(*right))
            }
            NodeKind::Unary { op, operand } => match (op, self.type_of(*operand)) {
                (UnaryOp::Negate, number @ Type::Number(_)) => number,
                (UnaryOp::Not, _) => Type::Boolean,
                _ => Type::Any,
            },
            NodeKind::Conditional { yes, no, .. } => {
                Type::common([self.type_of(*yes), self.type_of(*no)].iter())
            }
            NodeKind::Function {
                inputs,
                body,
                output,
                ..
            } => {
                let inputs = ast
                    .list(*inputs)
                    .iter()
                    .map(|&input| self.input_type(input))
                    .collect();
                let output = match output {
                    Some(output) => output.clone(),
                    None if body.is_valid() => self.type_of(*body),
                    None => Type::Any,
                };
                Type::function(inputs, output)
            }
            NodeKind::Structure { inputs, .. } => {
                let inputs = ast
                    .list(*inputs)
                    .iter()
                    .map(|&input| self.input_type(input))
                    .collect();
                Type::function(inputs, Type::Structure(node))
            }
            NodeKind::Evaluate { callee, .. } => match self.type_of(*callee) {
                Type::Function { output, .. } => *output,
                _ => Type::Any,
            },
            NodeKind::Borrow { source } => match self.lookup.map(|lookup| lookup.source_type(*source)) {
                Some(SourceType::Resolved(ty)) => ty,
                _ => Type::Any,
            },
            NodeKind::Placeholder | NodeKind::Unparsable { .. } => Type::Any,
        }
    }
}

/// Result type of a binary operation, `Any` when the operands do not fit.
pub(crate) fn binary_type(op: BinaryOp, left: &Type, right: &Type) -> Type {
    match op {
        BinaryOp::Less
        | BinaryOp::LessEqual
        | BinaryOp::Greater
        | BinaryOp::GreaterEqual
        | BinaryOp::Equal
        | BinaryOp::NotEqual
        | BinaryOp::And
        | BinaryOp::Or => Type::Boolean,
        BinaryOp::Add => match (left, right) {
            (Type::Number(a), Type::Number(b)) if a == b => left.clone(),
            (Type::Text, Type::Text) => Type::Text,
            (Type::Sequence(a), Type::Sequence(b)) => {
                Type::sequence_of(Type::common([a.as_ref(), b.as_ref()].into_iter()))
            }
            _ => Type::Any,
        },
        BinaryOp::Subtract | BinaryOp::Remainder => match (left, right) {
            (Type::Number(a), Type::Number(b)) if a == b => left.clone(),
            _ => Type::Any,
        },
        BinaryOp::Multiply => match (left, right) {
            (Type::Number(a), Type::Number(b)) => Type::Number(a.product(b)),
            _ => Type::Any,
        },
        BinaryOp::Divide => match (left, right) {
            (Type::Number(a), Type::Number(b)) => Type::Number(a.quotient(b)),
            _ => Type::Any,
        },
    }
}
