//! The boundary with the parser.
//!
//! Rill does not own a concrete syntax. A host hands in a [`SourceParser`]
//! that turns text into an immutable [`Ast`]; everything downstream works
//! on trees only.

use rill_ir::{Ast, SharedInterner};

/// Turns source text into a syntax tree whose names live in `interner`.
pub trait SourceParser {
    fn parse(&self, text: &str, interner: &SharedInterner) -> Result<Ast, ParseError>;
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{line}:{column}: {message}")]
pub struct ParseError {
    /// One-based.
    pub line: usize,
    /// One-based, in characters.
    pub column: usize,
    pub message: String,
}

impl ParseError {
    pub fn new(line: usize, column: usize, message: impl Into<String>) -> Self {
        ParseError {
            line,
            column,
            message: message.into(),
        }
    }
}
