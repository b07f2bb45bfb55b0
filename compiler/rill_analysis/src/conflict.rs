//! Static conflicts.
//!
//! A conflict is an immutable record of a static problem: the node at fault,
//! optionally a related node, and what is wrong. Conflicts never stop
//! evaluation; a host decides whether to run a program that has them.

use rill_ir::{BinaryOp, Name, NodeId, Type};
use std::fmt;

/// How much a conflict matters.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
pub enum Severity {
    /// Worth pointing out; the program still means what it says.
    Advisory,
    /// The program cannot evaluate as written.
    Blocking,
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub enum ConflictKind {
    UnknownName(Name),
    /// A second declaration of a name in one block.
    DuplicateName(Name),
    /// Two inputs of one definition share a name.
    DuplicateInput(Name),
    /// A required input follows one with a default.
    RequiredAfterOptional,
    VariadicNotLast,
    IncompatibleType { expected: Type, found: Type },
    IncompatibleUnits,
    /// An operand of a kind the operator does not accept.
    IncompatibleOperand(BinaryOp),
    NotANumber,
    Placeholder,
    Unparsable,
    /// A required child is missing from a partial tree.
    MissingValue,
    /// A bind whose name nothing refers to.
    UnusedBind(Name),
    /// `changed` of something that is not a stream.
    ExpectedStream,
    MissingInput(Name),
    UnexpectedInput,
    NotAFunction,
    UnknownProperty(Name),
    /// A block that ends without an expression to produce its value.
    ExpectedEndingExpression,
    UnknownSource(Name),
    /// A borrow of a source that is still being analyzed, directly or
    /// through other borrows.
    BorrowCycle(Name),
}

impl ConflictKind {
    pub fn severity(&self) -> Severity {
        match self {
            ConflictKind::UnusedBind(_) => Severity::Advisory,
            _ => Severity::Blocking,
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            ConflictKind::UnknownName(_) => "unknown name",
            ConflictKind::DuplicateName(_) => "duplicate name",
            ConflictKind::DuplicateInput(_) => "duplicate input",
            ConflictKind::RequiredAfterOptional => "required input after optional input",
            ConflictKind::VariadicNotLast => "variadic input must be last",
            ConflictKind::IncompatibleType { .. } => "incompatible type",
            ConflictKind::IncompatibleUnits => "incompatible units",
            ConflictKind::IncompatibleOperand(_) => "incompatible operand",
            ConflictKind::NotANumber => "not a number",
            ConflictKind::Placeholder => "placeholder",
            ConflictKind::Unparsable => "unparsable",
            ConflictKind::MissingValue => "missing value",
            ConflictKind::UnusedBind(_) => "unused bind",
            ConflictKind::ExpectedStream => "expected a stream",
            ConflictKind::MissingInput(_) => "missing input",
            ConflictKind::UnexpectedInput => "unexpected input",
            ConflictKind::NotAFunction => "not a function",
            ConflictKind::UnknownProperty(_) => "unknown property",
            ConflictKind::ExpectedEndingExpression => "expected an ending expression",
            ConflictKind::UnknownSource(_) => "unknown source",
            ConflictKind::BorrowCycle(_) => "borrow cycle",
        }
    }
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Conflict {
    pub kind: ConflictKind,
    pub primary: NodeId,
    pub secondary: Option<NodeId>,
}

impl Conflict {
    pub fn new(kind: ConflictKind, primary: NodeId) -> Self {
        Conflict {
            kind,
            primary,
            secondary: None,
        }
    }

    #[must_use]
    pub fn with_secondary(mut self, secondary: NodeId) -> Self {
        self.secondary = Some(secondary);
        self
    }

    pub fn severity(&self) -> Severity {
        self.kind.severity()
    }

    pub fn is_blocking(&self) -> bool {
        self.severity() == Severity::Blocking
    }

    /// Whether `node` is this conflict's primary or secondary node.
    pub fn touches(&self, node: NodeId) -> bool {
        self.primary == node || self.secondary == Some(node)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Advisory => write!(f, "advisory"),
            Severity::Blocking => write!(f, "blocking"),
        }
    }
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} at {}", self.severity(), self.kind.describe(), self.primary)?;
        if let ConflictKind::IncompatibleType { expected, found } = &self.kind {
            write!(f, " (expected {expected}, found {found})")?;
        }
        if let Some(secondary) = self.secondary {
            write!(f, ", see {secondary}")?;
        }
        Ok(())
    }
}
