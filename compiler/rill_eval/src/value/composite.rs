//! Closures and structure instances.

use super::{Heap, Value};
use crate::natives::NativeId;
use crate::scope::SharedScope;
use rill_ir::{Name, NodeId};
use std::hash::{Hash, Hasher};

/// What a function value runs when called.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Callee {
    /// A `Function` or `Structure` node of the evaluated tree.
    Definition(NodeId),
    Native(NativeId),
}

/// A callable value.
///
/// User definitions close over a capture of the scope they were created in;
/// natives run in a fresh scope under the root. Two closures are equal only
/// when they share both definition and captured scope.
#[derive(Clone, Debug)]
pub struct FunctionValue {
    pub callee: Callee,
    pub context: Option<SharedScope>,
    /// Bound to the function itself in every call scope, unless an input
    /// declares the same name. Empty for anonymous functions.
    pub name: Name,
}

impl FunctionValue {
    pub fn native(id: NativeId) -> Self {
        FunctionValue {
            callee: Callee::Native(id),
            context: None,
            name: Name::EMPTY,
        }
    }

    pub fn closure(definition: NodeId, context: SharedScope) -> Self {
        FunctionValue {
            callee: Callee::Definition(definition),
            context: Some(context),
            name: Name::EMPTY,
        }
    }

    #[must_use]
    pub fn named(mut self, name: Name) -> Self {
        self.name = name;
        self
    }
}

impl PartialEq for FunctionValue {
    fn eq(&self, other: &Self) -> bool {
        self.callee == other.callee
            && match (&self.context, &other.context) {
                (Some(a), Some(b)) => a.ptr_eq(b),
                (None, None) => true,
                _ => false,
            }
    }
}

impl Eq for FunctionValue {}

impl Hash for FunctionValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.callee.hash(state);
    }
}

/// An instance of a `Structure` definition.
///
/// Equality is structural over the definition and field values; the scope
/// the fields were bound in is carried along but not compared.
#[derive(Clone, Debug)]
pub struct StructureValue {
    pub definition: NodeId,
    pub fields: Heap<Vec<(Name, Value)>>,
    pub scope: SharedScope,
}

impl StructureValue {
    pub fn field(&self, name: Name) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(field, _)| *field == name)
            .map(|(_, value)| value)
    }
}

impl PartialEq for StructureValue {
    fn eq(&self, other: &Self) -> bool {
        self.definition == other.definition && *self.fields == *other.fields
    }
}

impl Eq for StructureValue {}

impl Hash for StructureValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.definition.hash(state);
        self.fields.hash(state);
    }
}
