//! Runtime exceptions.
//!
//! An exception is an ordinary [`Value`](crate::Value). A step that fails
//! produces one instead of its result, and the evaluator unwinds every frame
//! up to the program boundary, where it becomes the program's final value.

use crate::value::ValueKind;
use rill_ir::{Name, NodeId};
use std::fmt;

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Exception {
    pub kind: ExceptionKind,
    /// The node being evaluated when the failure happened.
    pub node: NodeId,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum ExceptionKind {
    /// A name that no enclosing scope binds.
    UnknownName(Name),
    /// A step needed a value and found none.
    ExpectedValue,
    TypeMismatch {
        expected: ValueKind,
        found: ValueKind,
    },
    IncompatibleUnits,
    DivisionByZero,
    /// Number literal text that does not parse.
    NotANumber,
    /// A required input received no argument.
    MissingInput(Name),
    /// More arguments than inputs.
    UnexpectedInput,
    UnknownProperty(Name),
    /// A second binding of a name in one scope.
    AlreadyBound(Name),
    Placeholder,
    Unparsable,
    /// The step budget ran out before the program finished.
    StepLimit,
    /// Too many nested frames.
    RecursionLimit,
    /// A borrow of a source the host did not supply.
    UnknownSource(Name),
}

impl ExceptionKind {
    pub fn describe(&self) -> &'static str {
        match self {
            ExceptionKind::UnknownName(_) => "unknown name",
            ExceptionKind::ExpectedValue => "expected a value",
            ExceptionKind::TypeMismatch { .. } => "type mismatch",
            ExceptionKind::IncompatibleUnits => "incompatible units",
            ExceptionKind::DivisionByZero => "division by zero",
            ExceptionKind::NotANumber => "not a number",
            ExceptionKind::MissingInput(_) => "missing input",
            ExceptionKind::UnexpectedInput => "unexpected input",
            ExceptionKind::UnknownProperty(_) => "unknown property",
            ExceptionKind::AlreadyBound(_) => "name already bound",
            ExceptionKind::Placeholder => "placeholder",
            ExceptionKind::Unparsable => "unparsable",
            ExceptionKind::StepLimit => "step limit exceeded",
            ExceptionKind::RecursionLimit => "recursion limit exceeded",
            ExceptionKind::UnknownSource(_) => "unknown source",
        }
    }
}

impl fmt::Display for Exception {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ExceptionKind::TypeMismatch { expected, found } => write!(
                f,
                "!{} at {}: expected {expected}, found {found}",
                self.kind.describe(),
                self.node
            ),
            kind => write!(f, "!{} at {}", kind.describe(), self.node),
        }
    }
}
