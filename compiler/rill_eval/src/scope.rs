//! Lexical scopes.
//!
//! A scope is a binding table plus a link to the scope it is nested in.
//! Name resolution walks those links and never consults global state.
//! Frames own their current scope. Closures hold a [`SharedScope::capture`]
//! of the scope they were created in rather than the live chain, so a scope
//! never reaches itself through a value bound in it.

use crate::value::Value;
use parking_lot::RwLock;
use rill_ir::Name;
use rustc_hash::FxHashMap;
use std::fmt;
use std::sync::Arc;

/// Error returned by [`Scope::bind`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BindError {
    /// The name is already bound in this scope.
    AlreadyBound,
}

#[derive(Default)]
pub struct Scope {
    bindings: FxHashMap<Name, Value>,
    parent: Option<SharedScope>,
}

impl Scope {
    pub fn new() -> Self {
        Scope::default()
    }

    pub fn with_parent(parent: SharedScope) -> Self {
        Scope {
            bindings: FxHashMap::default(),
            parent: Some(parent),
        }
    }

    /// Bind `name` once. A second binding of the same name fails.
    pub fn bind(&mut self, name: Name, value: Value) -> Result<(), BindError> {
        if self.bindings.contains_key(&name) {
            return Err(BindError::AlreadyBound);
        }
        self.bindings.insert(name, value);
        Ok(())
    }

    /// Bind or overwrite `name`. Reserved for state the evaluator itself
    /// updates in place, such as loop counters.
    pub fn rebind(&mut self, name: Name, value: Value) {
        self.bindings.insert(name, value);
    }

    /// Binding in this scope only.
    pub fn local(&self, name: Name) -> Option<&Value> {
        self.bindings.get(&name)
    }

    pub fn is_bound_locally(&self, name: Name) -> bool {
        self.bindings.contains_key(&name)
    }

    pub fn parent(&self) -> Option<&SharedScope> {
        self.parent.as_ref()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("bindings", &self.bindings.len())
            .field("nested", &self.parent.is_some())
            .finish()
    }
}

/// Thread-safe handle to a [`Scope`].
///
/// Evaluators share no mutable state with each other, but values (and the
/// scopes they capture) must be `Send` so a host can move a finished value
/// or a whole evaluator to another thread.
#[derive(Clone, Default)]
pub struct SharedScope(Arc<RwLock<Scope>>);

impl SharedScope {
    pub fn new(scope: Scope) -> Self {
        SharedScope(Arc::new(RwLock::new(scope)))
    }

    pub fn root() -> Self {
        SharedScope::new(Scope::new())
    }

    /// A new empty scope nested in `self`.
    #[must_use]
    pub fn child(&self) -> SharedScope {
        SharedScope::new(Scope::with_parent(self.clone()))
    }

    pub fn bind(&self, name: Name, value: Value) -> Result<(), BindError> {
        self.0.write().bind(name, value)
    }

    pub fn rebind(&self, name: Name, value: Value) {
        self.0.write().rebind(name, value);
    }

    pub fn local(&self, name: Name) -> Option<Value> {
        self.0.read().local(name).cloned()
    }

    pub fn is_bound_locally(&self, name: Name) -> bool {
        self.0.read().is_bound_locally(name)
    }

    pub fn parent(&self) -> Option<SharedScope> {
        self.0.read().parent().cloned()
    }

    /// Resolve `name` here or in the nearest enclosing scope that binds it.
    pub fn lookup(&self, name: Name) -> Option<Value> {
        let mut current = self.clone();
        loop {
            let next = {
                let scope = current.0.read();
                if let Some(value) = scope.local(name) {
                    return Some(value.clone());
                }
                scope.parent().cloned()
            };
            current = next?;
        }
    }

    /// Number of links from here to the root scope.
    pub fn nesting(&self) -> usize {
        let mut depth = 0;
        let mut current = self.parent();
        while let Some(scope) = current {
            depth += 1;
            current = scope.parent();
        }
        depth
    }

    /// A detached copy of every binding visible here, nested directly in
    /// the outermost scope. Inner bindings shadow outer ones; bindings made
    /// here later are not seen by the copy.
    #[must_use]
    pub fn capture(&self) -> SharedScope {
        let mut layers = Vec::new();
        let mut outermost = self.clone();
        while let Some(parent) = outermost.parent() {
            layers.push(outermost);
            outermost = parent;
        }

        let mut bindings = FxHashMap::default();
        for layer in layers.iter().rev() {
            for (name, value) in &layer.0.read().bindings {
                bindings.insert(*name, value.clone());
            }
        }
        SharedScope::new(Scope {
            bindings,
            parent: Some(outermost),
        })
    }

    #[cfg(test)]
    pub(crate) fn downgrade(&self) -> std::sync::Weak<RwLock<Scope>> {
        Arc::downgrade(&self.0)
    }

    pub fn ptr_eq(&self, other: &SharedScope) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for SharedScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SharedScope").field(&*self.0.read()).finish()
    }
}
