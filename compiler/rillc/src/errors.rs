//! Host-facing failures.
//!
//! Problems in a program are conflicts or exception values. These errors
//! are for misuse of a project or reactor and for faults below them.

use crate::parser::ParseError;
use rill_eval::EvalError;

#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    #[error("source `{name}` does not parse: {error}")]
    Parse { name: String, error: ParseError },

    #[error("no source named `{0}`")]
    UnknownSource(String),

    #[error("a source named `{0}` already exists")]
    DuplicateSource(String),

    #[error("a project needs at least one source")]
    Empty,

    #[error("source `{0}` borrows itself through other sources")]
    BorrowCycle(String),

    #[error("evaluation of `{0}` was suspended")]
    Suspended(String),

    #[error(transparent)]
    Eval(#[from] EvalError),

    #[error("project is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum ReactorError {
    #[error("reactor has not been started")]
    NotStarted,

    #[error("no stream named `{0}`")]
    UnknownStream(String),

    #[error(transparent)]
    Project(#[from] ProjectError),
}
