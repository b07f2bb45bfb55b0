//! Evaluation frames.
//!
//! A frame is one activation of a program, function, structure or native
//! body: a step cursor into its compiled sequence, a value stack, and the
//! scope its names resolve in. Frames execute in strict call/return order.

use crate::compile::Steps;
use crate::errors::EvalError;
use crate::natives::NativeId;
use crate::scope::SharedScope;
use crate::step::Step;
use crate::value::Value;
use rill_ir::NodeId;
use smallvec::SmallVec;

/// What a frame is running.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum FrameKind {
    Program,
    Function(NodeId),
    Structure(NodeId),
    Native(NativeId),
}

#[derive(Debug)]
pub struct Frame {
    kind: FrameKind,
    /// The node that started this frame: the program root or the call site.
    origin: NodeId,
    steps: Steps,
    cursor: usize,
    scope: SharedScope,
    values: SmallVec<[Value; 8]>,
}

impl Frame {
    pub fn new(kind: FrameKind, origin: NodeId, steps: Steps, scope: SharedScope) -> Self {
        Frame {
            kind,
            origin,
            steps,
            cursor: 0,
            scope,
            values: SmallVec::new(),
        }
    }

    pub fn kind(&self) -> FrameKind {
        self.kind
    }

    pub fn origin(&self) -> NodeId {
        self.origin
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn current_step(&self) -> Option<Step> {
        self.steps.get(self.cursor).copied()
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.steps.len()
    }

    pub(crate) fn advance(&mut self) {
        self.cursor += 1;
    }

    /// Move the cursor by `distance` steps. The following advance still
    /// applies, so the target must leave the cursor within the sequence or
    /// exactly at its end.
    pub(crate) fn jump(&mut self, distance: i32) -> Result<(), EvalError> {
        let out_of_bounds = || EvalError::JumpOutOfBounds {
            cursor: self.cursor,
            distance,
            len: self.steps.len(),
        };
        let target = i64::try_from(self.cursor).map_err(|_| out_of_bounds())? + i64::from(distance);
        let target = usize::try_from(target).map_err(|_| out_of_bounds())?;
        if target >= self.steps.len() {
            return Err(out_of_bounds());
        }
        self.cursor = target;
        Ok(())
    }

    pub fn scope(&self) -> &SharedScope {
        &self.scope
    }

    pub(crate) fn enter_scope(&mut self) {
        self.scope = self.scope.child();
    }

    pub(crate) fn exit_scope(&mut self) {
        if let Some(parent) = self.scope.parent() {
            self.scope = parent;
        }
    }

    pub(crate) fn push(&mut self, value: Value) {
        self.values.push(value);
    }

    pub(crate) fn pop(&mut self) -> Option<Value> {
        self.values.pop()
    }

    /// Pop the top `count` values, returned in the order they were pushed.
    pub(crate) fn pop_many(&mut self, count: usize) -> Option<Vec<Value>> {
        let start = self.values.len().checked_sub(count)?;
        Some(self.values.drain(start..).collect())
    }

    pub fn peek(&self) -> Option<&Value> {
        self.values.last()
    }

    pub fn stack_len(&self) -> usize {
        self.values.len()
    }
}
