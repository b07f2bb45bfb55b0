//! Evaluator faults.
//!
//! These are defects in the evaluator's own bookkeeping or misuse of its API
//! by a host, never failures of the evaluated program: those are exception
//! values. A fault aborts the evaluation loudly instead of being absorbed.

use rill_ir::NodeId;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EvalError {
    #[error("evaluation has not been started")]
    NotStarted,

    #[error("jump by {distance} from step {cursor} leaves a sequence of {len} steps")]
    JumpOutOfBounds {
        cursor: usize,
        distance: i32,
        len: usize,
    },

    #[error("{0} has no standalone step")]
    Uncompilable(NodeId),

    #[error("{0} is not a function or structure definition")]
    NotCallable(NodeId),

    #[error("native {0} is not registered")]
    UnknownNative(u32),

    #[error("more than {} natives registered", u32::MAX)]
    TooManyNatives,

    #[error("more than {} streams defined", u32::MAX)]
    TooManyStreams,
}
