//! Rill Eval - step-wise evaluation of Rill programs
//!
//! This crate runs an immutable [`rill_ir::Ast`]:
//! - Compilation of nodes into cached, flat [`Step`] sequences
//! - [`Frame`]s holding a step cursor, a value stack and a scope
//! - The [`Evaluator`], advancing one step at a time so a host can pause,
//!   inspect and resume between any two steps
//! - Runtime [`Value`]s, including exceptions as first-class values
//! - The [`NativeRegistry`] of built-in operations
//! - The [`StreamRegistry`] of reactive inputs
//!
//! # Example
//!
//! ```ignore
//! let mut evaluator = Evaluator::new(Arc::new(ast));
//! evaluator.start();
//! while let StepOutcome::Pending = evaluator.step()? {
//!     println!("at {:?}, depth {}", evaluator.current_node(), evaluator.depth());
//! }
//! ```

mod compile;
mod config;
mod errors;
mod evaluator;
mod exception;
mod frame;
mod natives;
mod number;
mod scope;
mod step;
mod streams;
mod value;

pub use compile::{StepCache, Steps};
pub use config::{
    BudgetExceeded, EvalConfig, StepBudget, DEFAULT_HISTORY, DEFAULT_MAX_DEPTH,
    DEFAULT_STEP_LIMIT,
};
pub use errors::EvalError;
pub use evaluator::{
    EvaluationEvent, EvaluationInputs, Evaluator, EvaluatorBuilder, ObserverId, PauseHandle,
    RunOutcome, StepOutcome,
};
pub use exception::{Exception, ExceptionKind};
pub use frame::{Frame, FrameKind};
pub use natives::{
    LoopNames, NativeBody, NativeCall, NativeDefinition, NativeFn, NativeId, NativeRegistry,
};
pub use number::{ArithmeticError, Number};
pub use scope::{BindError, Scope, SharedScope};
pub use step::{HigherOrder, LoopPhase, NativeStep, Step};
pub use streams::{StreamChange, StreamId, StreamRegistry, StreamSignature};
pub use value::{Callee, Element, FunctionValue, Heap, StructureValue, Value, ValueKind};
