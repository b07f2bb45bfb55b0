//! The native operation registry.
//!
//! An explicitly constructed, immutable table of built-in operations, handed
//! to the evaluator (and to the conflict analyzer for signatures) at start-up.
//! There is no process-wide registry: two evaluators may use different ones.
//!
//! Every native is called exactly like a user function: the evaluator binds
//! its named inputs in a fresh frame and runs its step sequence. Simple
//! natives are one `Apply` step; higher-order natives are step loops (see
//! [`higher_order`]).

pub(crate) mod higher_order;
mod standard;

use crate::compile::Steps;
use crate::errors::EvalError;
use crate::scope::SharedScope;
use crate::step::{HigherOrder, NativeStep, Step};
use crate::value::{FunctionValue, Value};
use rill_ir::{Name, NodeId, SharedInterner, Type};
use rustc_hash::FxHashMap;
use std::fmt;

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
pub struct NativeId(u32);

impl NativeId {
    pub fn index(self) -> u32 {
        self.0
    }
}

/// Body of a single-step native: `(requesting node, current frame) -> Value`.
pub type NativeFn = fn(&NativeCall<'_>) -> Value;

/// What a single-step native sees when it runs.
pub struct NativeCall<'a> {
    /// The call site that invoked the native.
    pub node: NodeId,
    /// The native's frame scope, holding its bound inputs.
    pub scope: &'a SharedScope,
    pub(crate) inputs: &'a [Name],
}

impl NativeCall<'_> {
    /// The `index`th input, or `none` if it is unbound.
    pub fn input(&self, index: usize) -> Value {
        self.inputs
            .get(index)
            .and_then(|&name| self.scope.local(name))
            .unwrap_or(Value::None)
    }
}

#[derive(Copy, Clone)]
pub enum NativeBody {
    Apply(NativeFn),
    Loop(HigherOrder),
}

pub struct NativeDefinition {
    pub name: Name,
    pub inputs: Vec<Name>,
    /// Static type, always a `Type::Function`.
    pub signature: Type,
    pub body: NativeBody,
    steps: Steps,
}

impl NativeDefinition {
    pub fn steps(&self) -> Steps {
        Steps::clone(&self.steps)
    }

    pub fn is_higher_order(&self) -> bool {
        matches!(self.body, NativeBody::Loop(_))
    }
}

impl fmt::Debug for NativeDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeDefinition")
            .field("name", &self.name)
            .field("inputs", &self.inputs)
            .field("signature", &self.signature)
            .field("higher_order", &self.is_higher_order())
            .finish()
    }
}

/// Names of the bindings a higher-order loop keeps in its frame.
#[derive(Copy, Clone, Debug)]
pub struct LoopNames {
    pub collection: Name,
    pub function: Name,
    pub initial: Name,
    pub index: Name,
    pub result: Name,
}

#[derive(Debug)]
pub struct NativeRegistry {
    definitions: Vec<NativeDefinition>,
    by_name: FxHashMap<Name, NativeId>,
    loop_names: LoopNames,
    interner: SharedInterner,
}

impl NativeRegistry {
    /// A registry with no natives.
    pub fn empty(interner: &SharedInterner) -> Self {
        NativeRegistry {
            definitions: Vec::new(),
            by_name: FxHashMap::default(),
            loop_names: LoopNames {
                collection: interner.intern("collection"),
                function: interner.intern("function"),
                initial: interner.intern("initial"),
                // Not valid identifiers, so user code cannot touch them.
                index: interner.intern("·index"),
                result: interner.intern("·result"),
            },
            interner: interner.clone(),
        }
    }

    /// The built-in catalog.
    pub fn standard(interner: &SharedInterner) -> Self {
        let mut registry = NativeRegistry::empty(interner);
        standard::register(&mut registry);
        higher_order::register(&mut registry);
        registry
    }

    /// Add a native. Later registrations under the same name shadow earlier
    /// ones.
    ///
    /// # Panics
    /// Panics if more than `u32::MAX` natives are registered.
    /// Use `try_register` for fallible registration.
    pub fn register(
        &mut self,
        name: &str,
        inputs: &[&str],
        signature: Type,
        body: NativeBody,
    ) -> NativeId {
        self.try_register(name, inputs, signature, body)
            .unwrap_or_else(|e| panic!("{e}"))
    }

    /// Add a native, or fail once the id space is exhausted.
    pub fn try_register(
        &mut self,
        name: &str,
        inputs: &[&str],
        signature: Type,
        body: NativeBody,
    ) -> Result<NativeId, EvalError> {
        let id = NativeId(
            u32::try_from(self.definitions.len()).map_err(|_| EvalError::TooManyNatives)?,
        );
        let steps: Steps = match body {
            NativeBody::Apply(_) => vec![Step::Native(NativeStep::Apply(id))].into(),
            NativeBody::Loop(op) => op.steps().to_vec().into(),
        };
        let name = self.interner.intern(name);
        self.definitions.push(NativeDefinition {
            name,
            inputs: inputs.iter().map(|input| self.interner.intern(input)).collect(),
            signature,
            body,
            steps,
        });
        self.by_name.insert(name, id);
        Ok(id)
    }

    pub fn lookup(&self, name: Name) -> Option<NativeId> {
        self.by_name.get(&name).copied()
    }

    pub fn get(&self, id: NativeId) -> Option<&NativeDefinition> {
        self.definitions.get(id.0 as usize)
    }

    pub fn is_higher_order(&self, id: NativeId) -> bool {
        self.get(id).is_some_and(NativeDefinition::is_higher_order)
    }

    /// Every visible native with the function value that calls it.
    pub fn values(&self) -> impl Iterator<Item = (Name, Value)> + '_ {
        self.by_name
            .iter()
            .map(|(&name, &id)| (name, Value::function(FunctionValue::native(id))))
    }

    pub fn loop_names(&self) -> LoopNames {
        self.loop_names
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}
