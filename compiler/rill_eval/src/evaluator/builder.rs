//! Evaluator construction.

use super::{Evaluator, PauseHandle};
use crate::compile::StepCache;
use crate::config::EvalConfig;
use crate::natives::NativeRegistry;
use crate::scope::SharedScope;
use rill_ir::Ast;
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// Builder for [`Evaluator`].
///
/// ```ignore
/// let evaluator = Evaluator::builder(ast)
///     .step_limit(10_000)
///     .max_depth(64)
///     .build();
/// ```
#[must_use]
pub struct EvaluatorBuilder {
    ast: Arc<Ast>,
    natives: Option<Arc<NativeRegistry>>,
    config: EvalConfig,
}

impl EvaluatorBuilder {
    pub fn new(ast: Arc<Ast>) -> Self {
        EvaluatorBuilder {
            ast,
            natives: None,
            config: EvalConfig::default(),
        }
    }

    /// Use `natives` instead of the standard catalog.
    pub fn natives(mut self, natives: Arc<NativeRegistry>) -> Self {
        self.natives = Some(natives);
        self
    }

    pub fn config(mut self, config: EvalConfig) -> Self {
        self.config = config;
        self
    }

    pub fn step_limit(mut self, limit: usize) -> Self {
        self.config.step_limit = limit;
        self
    }

    pub fn max_depth(mut self, depth: usize) -> Self {
        self.config.max_depth = depth;
        self
    }

    pub fn build(self) -> Evaluator {
        let natives = self
            .natives
            .unwrap_or_else(|| Arc::new(NativeRegistry::standard(self.ast.interner())));
        Evaluator {
            ast: self.ast,
            natives,
            cache: StepCache::new(),
            config: self.config,
            frames: Vec::new(),
            root: SharedScope::root(),
            result: None,
            trigger: None,
            borrowed: FxHashMap::default(),
            steps_taken: 0,
            pause: PauseHandle::default(),
            observers: Vec::new(),
            next_observer: 0,
        }
    }
}
