//! The step-wise evaluator.
//!
//! The evaluator owns a stack of [`Frame`]s and advances the topmost one a
//! single [`Step`] at a time. Between any two calls to [`Evaluator::step`]
//! the whole state of a running program is that frame stack, so a host can
//! stop anywhere, inspect, and continue later.
//!
//! # Exceptions
//!
//! A failing step produces an exception [`Value`] instead of its result. The
//! evaluator then discards every frame and the exception becomes the
//! program's final value. The language has no handlers, so unwinding always
//! reaches the program boundary.
//!
//! # Budgets
//!
//! [`Evaluator::run`] takes a step limit. Running out yields a step-limit
//! exception on the program node; it is the only way a host bounds the
//! work of one evaluation.

mod builder;
mod finish;
mod operators;

use crate::compile::StepCache;
use crate::config::{EvalConfig, StepBudget};
use crate::errors::EvalError;
use crate::exception::ExceptionKind;
use crate::frame::{Frame, FrameKind};
use crate::natives::{NativeBody, NativeCall, NativeRegistry};
use crate::scope::SharedScope;
use crate::step::{NativeStep, Step};
use crate::value::{Callee, FunctionValue, Value, ValueKind};
use rill_ir::ast::NodeKind;
use rill_ir::{Ast, Name, NodeId};
use rustc_hash::FxHashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub use builder::EvaluatorBuilder;

/// Result of a single [`Evaluator::step`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// More steps remain.
    Pending,
    /// The program produced its final value (possibly an exception).
    Finished(Value),
}

/// Result of [`Evaluator::run`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RunOutcome {
    Finished(Value),
    /// A pause was requested; call `run` again to continue.
    Suspended,
}

/// Values supplied by the host when an evaluation starts.
#[derive(Clone, Debug, Default)]
pub struct EvaluationInputs {
    /// Latest value of each stream, bound in the root scope.
    pub streams: Vec<(Name, Value)>,
    /// Final values of other sources, available to `Borrow`.
    pub borrowed: Vec<(Name, Value)>,
    /// The stream whose change caused this evaluation.
    pub trigger: Option<Name>,
}

/// Notification delivered to observers.
#[derive(Debug)]
pub enum EvaluationEvent<'a> {
    /// A step completed; `depth` is the frame depth it ran at.
    Stepped { step: Step, depth: usize },
    Finished { value: &'a Value },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

type Observer = Box<dyn FnMut(&EvaluationEvent<'_>) + Send>;

/// Cloneable handle that requests a pause from anywhere, including from an
/// observer while `run` is in progress.
#[derive(Clone, Debug, Default)]
pub struct PauseHandle(Arc<AtomicBool>);

impl PauseHandle {
    pub fn pause(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn resume(&self) {
        self.0.store(false, Ordering::Release);
    }

    pub fn is_paused(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// What a step asks of the frame that ran it.
pub(crate) enum Flow {
    Continue,
    Push(Value),
    Throw(Value),
}

pub(crate) fn throw(kind: ExceptionKind, node: NodeId) -> Flow {
    Flow::Throw(Value::exception(kind, node))
}

pub struct Evaluator {
    ast: Arc<Ast>,
    natives: Arc<NativeRegistry>,
    cache: StepCache,
    config: EvalConfig,
    frames: Vec<Frame>,
    root: SharedScope,
    result: Option<Value>,
    trigger: Option<Name>,
    borrowed: FxHashMap<Name, Value>,
    steps_taken: usize,
    pause: PauseHandle,
    observers: Vec<(ObserverId, Observer)>,
    next_observer: u64,
}

impl Evaluator {
    /// An evaluator with the standard natives and default limits.
    pub fn new(ast: Arc<Ast>) -> Self {
        EvaluatorBuilder::new(ast).build()
    }

    pub fn builder(ast: Arc<Ast>) -> EvaluatorBuilder {
        EvaluatorBuilder::new(ast)
    }

    pub fn ast(&self) -> &Arc<Ast> {
        &self.ast
    }

    pub fn natives(&self) -> &Arc<NativeRegistry> {
        &self.natives
    }

    pub fn config(&self) -> EvalConfig {
        self.config
    }

    /// Start evaluating the program from scratch with no stream values.
    pub fn start(&mut self) {
        self.start_with(EvaluationInputs::default());
    }

    /// Start evaluating the program from scratch. Any evaluation in
    /// progress is abandoned.
    #[tracing::instrument(level = "debug", skip_all, fields(trigger = ?inputs.trigger))]
    pub fn start_with(&mut self, inputs: EvaluationInputs) {
        let root = SharedScope::root();
        for (name, value) in self.natives.values() {
            root.rebind(name, value);
        }
        // Streams shadow natives of the same name.
        for (name, value) in inputs.streams {
            root.rebind(name, value);
        }

        let program = self.ast.root();
        let steps = self.cache.compile(&self.ast, program);
        self.frames.clear();
        self.frames
            .push(Frame::new(FrameKind::Program, program, steps, root.child()));
        self.root = root;
        self.result = None;
        self.trigger = inputs.trigger;
        self.borrowed = inputs.borrowed.into_iter().collect();
        self.steps_taken = 0;
        self.pause.resume();
    }

    /// Start and run to completion within the configured step limit.
    pub fn evaluate(&mut self, inputs: EvaluationInputs) -> Result<RunOutcome, EvalError> {
        self.start_with(inputs);
        self.run(self.config.step_limit)
    }

    /// Execute exactly one step of the topmost frame.
    ///
    /// Frames whose sequences are exhausted by the step are popped right
    /// away and their values handed to their callers, so after the last
    /// step of the program this returns its final value.
    pub fn step(&mut self) -> Result<StepOutcome, EvalError> {
        if let Some(value) = &self.result {
            return Ok(StepOutcome::Finished(value.clone()));
        }
        let depth = self.frames.len();
        let Some(step) = self.frames.last().and_then(Frame::current_step) else {
            if depth == 0 {
                return Err(EvalError::NotStarted);
            }
            self.complete_frames();
            return Ok(self.outcome());
        };

        self.steps_taken += 1;
        tracing::trace!(?step, depth, "step");

        match self.execute(step)? {
            Flow::Continue => {}
            Flow::Push(value) => self.frames[depth - 1].push(value),
            Flow::Throw(exception) => {
                self.notify_step(step, depth);
                self.unwind(exception);
                return Ok(self.outcome());
            }
        }
        self.frames[depth - 1].advance();
        self.complete_frames();
        self.notify_step(step, depth);
        Ok(self.outcome())
    }

    /// Step until the program finishes, a pause is requested, or `limit`
    /// steps have run. Exhausting the limit finishes the program with a
    /// step-limit exception on the program node.
    pub fn run(&mut self, limit: usize) -> Result<RunOutcome, EvalError> {
        let mut budget = StepBudget::new(limit);
        loop {
            if let Some(value) = &self.result {
                return Ok(RunOutcome::Finished(value.clone()));
            }
            if self.pause.is_paused() {
                return Ok(RunOutcome::Suspended);
            }
            if budget.charge().is_err() {
                if self.frames.is_empty() {
                    return Err(EvalError::NotStarted);
                }
                tracing::debug!(limit, "step limit reached");
                let exception = Value::exception(ExceptionKind::StepLimit, self.ast.root());
                self.unwind(exception.clone());
                return Ok(RunOutcome::Finished(exception));
            }
            self.step()?;
        }
    }

    /// Call `function` with `arguments` on top of the current frame stack.
    ///
    /// With no evaluation in progress the callee becomes the bottom frame and
    /// its value becomes the final result.
    pub fn call(
        &mut self,
        function: &FunctionValue,
        arguments: Vec<Value>,
        origin: NodeId,
    ) -> Result<(), EvalError> {
        if self.frames.is_empty() {
            self.result = None;
        }
        if let Flow::Throw(exception) = self.start_call(function, arguments, origin)? {
            self.unwind(exception);
        }
        self.complete_frames();
        Ok(())
    }

    /// Move the current frame's cursor by `distance` steps.
    pub fn jump(&mut self, distance: i32) -> Result<(), EvalError> {
        self.frame_mut()?.jump(distance)
    }

    /// Resolve `name` from the current frame's scope outward.
    pub fn resolve(&self, name: Name) -> Option<Value> {
        match self.frames.last() {
            Some(frame) => frame.scope().lookup(name),
            None => self.root.lookup(name),
        }
    }

    // Host inspection

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Value on top of the current frame's stack.
    pub fn peek(&self) -> Option<&Value> {
        self.frames.last().and_then(Frame::peek)
    }

    /// The node the next step will work on.
    pub fn current_node(&self) -> Option<NodeId> {
        let frame = self.frames.last()?;
        Some(
            frame
                .current_step()
                .and_then(Step::node)
                .unwrap_or(frame.origin()),
        )
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn steps_taken(&self) -> usize {
        self.steps_taken
    }

    pub fn result(&self) -> Option<&Value> {
        self.result.as_ref()
    }

    pub fn is_finished(&self) -> bool {
        self.result.is_some()
    }

    pub fn trigger(&self) -> Option<Name> {
        self.trigger
    }

    // Suspension

    pub fn pause(&self) {
        self.pause.pause();
    }

    pub fn resume(&self) {
        self.pause.resume();
    }

    pub fn is_paused(&self) -> bool {
        self.pause.is_paused()
    }

    pub fn pause_handle(&self) -> PauseHandle {
        self.pause.clone()
    }

    // Observers

    /// Register a callback run after every step and when the program
    /// finishes.
    pub fn observe(
        &mut self,
        observer: impl FnMut(&EvaluationEvent<'_>) + Send + 'static,
    ) -> ObserverId {
        let id = ObserverId(self.next_observer);
        self.next_observer += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Remove a callback. Returns whether it was registered.
    pub fn ignore(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(observer, _)| *observer != id);
        self.observers.len() != before
    }

    fn notify_step(&mut self, step: Step, depth: usize) {
        let event = EvaluationEvent::Stepped { step, depth };
        for (_, observer) in &mut self.observers {
            observer(&event);
        }
    }

    fn notify_finished(&mut self) {
        if let Some(value) = &self.result {
            let event = EvaluationEvent::Finished { value };
            for (_, observer) in &mut self.observers {
                observer(&event);
            }
        }
    }

    // Internals

    fn outcome(&self) -> StepOutcome {
        match &self.result {
            Some(value) => StepOutcome::Finished(value.clone()),
            None => StepOutcome::Pending,
        }
    }

    pub(crate) fn frame(&self) -> Result<&Frame, EvalError> {
        self.frames.last().ok_or(EvalError::NotStarted)
    }

    pub(crate) fn frame_mut(&mut self) -> Result<&mut Frame, EvalError> {
        self.frames.last_mut().ok_or(EvalError::NotStarted)
    }

    /// Pop every exhausted frame, handing its value to its caller.
    fn complete_frames(&mut self) {
        while self.frames.last().is_some_and(Frame::is_exhausted) {
            let Some(mut frame) = self.frames.pop() else {
                return;
            };
            let value = frame
                .pop()
                .unwrap_or_else(|| Value::exception(ExceptionKind::ExpectedValue, frame.origin()));
            tracing::debug!(kind = ?frame.kind(), depth = self.frames.len(), "frame complete");

            if value.is_exception() {
                self.unwind(value);
                return;
            }
            match self.frames.last_mut() {
                Some(caller) => caller.push(value),
                None => {
                    self.result = Some(value);
                    self.notify_finished();
                }
            }
        }
    }

    /// Abandon every frame; `exception` becomes the final value.
    fn unwind(&mut self, exception: Value) {
        tracing::debug!(%exception, frames = self.frames.len(), "unwinding");
        self.frames.clear();
        self.result = Some(exception);
        self.notify_finished();
    }

    fn execute(&mut self, step: Step) -> Result<Flow, EvalError> {
        match step {
            Step::Finish(node) => self.finish(node),
            Step::Enter(_) => {
                self.frame_mut()?.enter_scope();
                Ok(Flow::Continue)
            }
            Step::Bind(node) => self.bind(node),
            Step::Jump(distance) => {
                self.jump(distance)?;
                Ok(Flow::Continue)
            }
            Step::JumpUnless { node, distance } => {
                let frame = self.frame_mut()?;
                match frame.pop() {
                    Some(Value::Boolean(true)) => Ok(Flow::Continue),
                    Some(Value::Boolean(false)) => {
                        frame.jump(distance)?;
                        Ok(Flow::Continue)
                    }
                    Some(other) => Ok(mismatch(ValueKind::Boolean, &other, node)),
                    None => Ok(throw(ExceptionKind::ExpectedValue, node)),
                }
            }
            Step::Branch {
                node,
                when,
                distance,
            } => {
                let frame = self.frame_mut()?;
                let top = frame.peek().map(|value| (value.as_bool(), value.kind()));
                match top {
                    Some((Some(value), _)) if value == when => frame.jump(distance)?,
                    Some((Some(_), _)) => {
                        frame.pop();
                    }
                    Some((None, found)) => {
                        let expected = ValueKind::Boolean;
                        return Ok(throw(ExceptionKind::TypeMismatch { expected, found }, node));
                    }
                    None => return Ok(throw(ExceptionKind::ExpectedValue, node)),
                }
                Ok(Flow::Continue)
            }
            Step::SkipIfBound { input, distance } => {
                let Some(NodeKind::Bind { name, .. }) = self.ast.kind(input) else {
                    return Err(EvalError::Uncompilable(input));
                };
                let name = *name;
                let frame = self.frame_mut()?;
                if frame.scope().is_bound_locally(name) {
                    frame.jump(distance)?;
                }
                Ok(Flow::Continue)
            }
            Step::Call { node, arity } => {
                let frame = self.frame_mut()?;
                let Some(arguments) = frame.pop_many(arity as usize) else {
                    return Ok(throw(ExceptionKind::ExpectedValue, node));
                };
                match frame.pop() {
                    Some(Value::Function(function)) => self.start_call(&function, arguments, node),
                    Some(other) => Ok(mismatch(ValueKind::Function, &other, node)),
                    None => Ok(throw(ExceptionKind::ExpectedValue, node)),
                }
            }
            Step::Instantiate(definition) => self.instantiate(definition),
            Step::Expected(node) => Ok(throw(ExceptionKind::ExpectedValue, node)),
            Step::Native(NativeStep::Apply(id)) => {
                let definition = self
                    .natives
                    .get(id)
                    .ok_or(EvalError::UnknownNative(id.index()))?;
                let NativeBody::Apply(body) = definition.body else {
                    return Err(EvalError::UnknownNative(id.index()));
                };
                let frame = self.frame()?;
                let call = NativeCall {
                    node: frame.origin(),
                    scope: frame.scope(),
                    inputs: &definition.inputs,
                };
                let value = body(&call);
                if value.is_exception() {
                    Ok(Flow::Throw(value))
                } else {
                    Ok(Flow::Push(value))
                }
            }
            Step::Native(NativeStep::Loop(op, phase)) => self.loop_step(op, phase),
        }
    }

    /// Bind the value on top of the stack, leaving it in place.
    fn bind(&mut self, node: NodeId) -> Result<Flow, EvalError> {
        let Some(NodeKind::Bind { name, .. }) = self.ast.kind(node) else {
            return Err(EvalError::Uncompilable(node));
        };
        let name = *name;
        let frame = self.frame()?;
        let Some(value) = frame.peek().cloned() else {
            return Ok(throw(ExceptionKind::ExpectedValue, node));
        };
        // Anonymous functions take the name they are bound to.
        let value = match value {
            Value::Function(function) if function.name.is_empty() => {
                Value::function(function.named(name))
            }
            other => other,
        };
        if frame.scope().bind(name, value).is_err() {
            return Ok(throw(ExceptionKind::AlreadyBound(name), node));
        }
        Ok(Flow::Continue)
    }

    /// Push a frame for `function`, bound to `arguments`.
    pub(crate) fn start_call(
        &mut self,
        function: &FunctionValue,
        arguments: Vec<Value>,
        origin: NodeId,
    ) -> Result<Flow, EvalError> {
        if self.frames.len() >= self.config.max_depth {
            return Ok(throw(ExceptionKind::RecursionLimit, origin));
        }

        let (kind, steps, scope) = match function.callee {
            Callee::Definition(definition) => {
                let inputs = match self.ast.kind(definition) {
                    Some(
                        NodeKind::Function { inputs, .. } | NodeKind::Structure { inputs, .. },
                    ) => *inputs,
                    _ => return Err(EvalError::NotCallable(definition)),
                };
                let scope = function.context.as_ref().unwrap_or(&self.root).child();
                if let Err(exception) = self.bind_inputs(inputs, arguments, &scope, origin) {
                    return Ok(Flow::Throw(exception));
                }
                let own = function.name;
                let shadowed = self.ast.list(inputs).iter().any(|&input| {
                    self.ast.kind(input).and_then(NodeKind::declared_name) == Some(own)
                });
                if !own.is_empty() && !shadowed {
                    scope.rebind(own, Value::function(function.clone()));
                }
                let kind = match self.ast.kind(definition) {
                    Some(NodeKind::Structure { .. }) => FrameKind::Structure(definition),
                    _ => FrameKind::Function(definition),
                };
                (kind, self.cache.entry(&self.ast, definition), scope)
            }
            Callee::Native(id) => {
                let definition = self
                    .natives
                    .get(id)
                    .ok_or(EvalError::UnknownNative(id.index()))?;
                let scope = self.root.child();
                if arguments.len() < definition.inputs.len() {
                    let missing = definition.inputs[arguments.len()];
                    return Ok(throw(ExceptionKind::MissingInput(missing), origin));
                }
                if arguments.len() > definition.inputs.len() {
                    return Ok(throw(ExceptionKind::UnexpectedInput, origin));
                }
                for (&name, value) in definition.inputs.iter().zip(arguments) {
                    scope.rebind(name, value);
                }
                (FrameKind::Native(id), definition.steps(), scope)
            }
        };

        tracing::debug!(?kind, depth = self.frames.len() + 1, "frame start");
        self.frames.push(Frame::new(kind, origin, steps, scope));
        Ok(Flow::Continue)
    }

    /// Bind call arguments to a definition's inputs. Inputs left unbound
    /// have defaults, which the entry sequence evaluates.
    fn bind_inputs(
        &self,
        inputs: rill_ir::NodeRange,
        arguments: Vec<Value>,
        scope: &SharedScope,
        origin: NodeId,
    ) -> Result<(), Value> {
        let mut arguments = arguments.into_iter();
        for &input in self.ast.list(inputs) {
            let Some(NodeKind::Bind {
                name,
                value,
                variadic,
                ..
            }) = self.ast.kind(input)
            else {
                continue;
            };
            let bound = if *variadic {
                scope.bind(*name, Value::sequence(arguments.by_ref().collect()))
            } else {
                match arguments.next() {
                    Some(argument) => scope.bind(*name, argument),
                    None if value.is_valid() => Ok(()),
                    None => {
                        return Err(Value::exception(ExceptionKind::MissingInput(*name), origin));
                    }
                }
            };
            if bound.is_err() {
                return Err(Value::exception(ExceptionKind::AlreadyBound(*name), input));
            }
        }
        if arguments.next().is_some() {
            return Err(Value::exception(ExceptionKind::UnexpectedInput, origin));
        }
        Ok(())
    }

    fn instantiate(&mut self, definition: NodeId) -> Result<Flow, EvalError> {
        let Some(NodeKind::Structure { inputs, .. }) = self.ast.kind(definition) else {
            return Err(EvalError::NotCallable(definition));
        };
        let scope = self.frame()?.scope().clone();
        let fields = self
            .ast
            .list(*inputs)
            .iter()
            .filter_map(|&input| self.ast.kind(input).and_then(NodeKind::declared_name))
            .map(|name| (name, scope.local(name).unwrap_or(Value::None)))
            .collect();
        Ok(Flow::Push(Value::structure(definition, fields, scope)))
    }
}

pub(crate) fn mismatch(expected: ValueKind, found: &Value, node: NodeId) -> Flow {
    throw(
        ExceptionKind::TypeMismatch {
            expected,
            found: found.kind(),
        },
        node,
    )
}
