//! Syntax tree node kinds.
//!
//! The tree is a closed set of variants. Every pass (compilation, typing,
//! conflicts, dependencies) matches on [`NodeKind`] exhaustively, so adding a
//! variant is a compile error everywhere it needs handling.

use crate::{Name, NodeId, NodeRange, Span, Type, Unit};
use std::fmt;

/// A node: what it is and where it came from.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Node {
    pub kind: NodeKind,
    pub span: Span,
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub enum NodeKind {
    /// Root of a source. Its value is the value of `body`.
    Program { body: NodeId },
    /// Statements evaluated in order; the last one is the block's value.
    Block { statements: NodeRange },
    /// Names a value. As a function or structure input, `value` is the
    /// default (or `INVALID` when the input is required).
    Bind {
        name: Name,
        value: NodeId,
        annotation: Option<Type>,
        variadic: bool,
    },
    /// Numeric literal, kept as written so precision is never lost.
    Number { text: Name, unit: Unit },
    Boolean(bool),
    Text(Name),
    None,
    Sequence { items: NodeRange },
    Set { items: NodeRange },
    /// Entries are `KeyValue` nodes.
    Mapping { entries: NodeRange },
    KeyValue { key: NodeId, value: NodeId },
    Reference { name: Name },
    /// Field access on a structure instance.
    Property { structure: NodeId, name: Name },
    Binary {
        op: BinaryOp,
        left: NodeId,
        right: NodeId,
    },
    Unary { op: UnaryOp, operand: NodeId },
    Conditional {
        condition: NodeId,
        yes: NodeId,
        no: NodeId,
    },
    /// Function definition. An `INVALID` body marks an abstract function.
    Function {
        name: Name,
        inputs: NodeRange,
        body: NodeId,
        output: Option<Type>,
    },
    /// Structure definition; calling it builds an instance from its inputs.
    Structure { name: Name, inputs: NodeRange },
    /// Call of `callee` with positional arguments.
    Evaluate { callee: NodeId, arguments: NodeRange },
    /// True when the referenced stream triggered this evaluation.
    Changed { stream: NodeId },
    /// Imports the value of another source in the project by its name.
    Borrow { source: Name },
    /// A hole the author has not filled in yet.
    Placeholder,
    /// Text the parser could not make sense of.
    Unparsable { text: Name },
}

impl NodeKind {
    /// The name this node introduces into its enclosing scope, if any.
    pub fn declared_name(&self) -> Option<Name> {
        match self {
            NodeKind::Bind { name, .. } | NodeKind::Borrow { source: name } => Some(*name),
            NodeKind::Function { name, .. } | NodeKind::Structure { name, .. }
                if !name.is_empty() =>
            {
                Some(*name)
            }
            _ => None,
        }
    }

    /// Whether the node yields a value. `KeyValue` entries only exist inside
    /// mappings and are evaluated as two separate values.
    pub fn is_expression(&self) -> bool {
        !matches!(self, NodeKind::KeyValue { .. })
    }

    /// Short description used in logs and diagnostics.
    pub fn describe(&self) -> &'static str {
        match self {
            NodeKind::Program { .. } => "program",
            NodeKind::Block { .. } => "block",
            NodeKind::Bind { .. } => "bind",
            NodeKind::Number { .. } => "number",
            NodeKind::Boolean(_) => "boolean",
            NodeKind::Text(_) => "text",
            NodeKind::None => "none",
            NodeKind::Sequence { .. } => "sequence",
            NodeKind::Set { .. } => "set",
            NodeKind::Mapping { .. } => "mapping",
            NodeKind::KeyValue { .. } => "key/value",
            NodeKind::Reference { .. } => "reference",
            NodeKind::Property { .. } => "property",
            NodeKind::Binary { .. } => "binary operation",
            NodeKind::Unary { .. } => "unary operation",
            NodeKind::Conditional { .. } => "conditional",
            NodeKind::Function { .. } => "function",
            NodeKind::Structure { .. } => "structure",
            NodeKind::Evaluate { .. } => "evaluate",
            NodeKind::Changed { .. } => "changed",
            NodeKind::Borrow { .. } => "borrow",
            NodeKind::Placeholder => "placeholder",
            NodeKind::Unparsable { .. } => "unparsable",
        }
    }
}

/// Binary operators. Evaluation is strictly left operand, then right.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Remainder,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    Equal,
    NotEqual,
    /// Short-circuits: the right operand is skipped when the left is false.
    And,
    /// Short-circuits: the right operand is skipped when the left is true.
    Or,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Multiply => "·",
            BinaryOp::Divide => "÷",
            BinaryOp::Remainder => "%",
            BinaryOp::Less => "<",
            BinaryOp::LessEqual => "≤",
            BinaryOp::Greater => ">",
            BinaryOp::GreaterEqual => "≥",
            BinaryOp::Equal => "=",
            BinaryOp::NotEqual => "≠",
            BinaryOp::And => "&",
            BinaryOp::Or => "|",
        }
    }

    pub fn is_logical(self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or)
    }

    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Less | BinaryOp::LessEqual | BinaryOp::Greater | BinaryOp::GreaterEqual
        )
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum UnaryOp {
    Negate,
    Not,
}

impl UnaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Negate => "-",
            UnaryOp::Not => "~",
        }
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}
