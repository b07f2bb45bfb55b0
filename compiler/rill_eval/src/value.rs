//! Runtime values.
//!
//! Values are immutable. Heap-backed variants share storage through
//! [`Heap`], whose constructor is private to this module: every heap value
//! is created through a factory method on [`Value`].
//!
//! Equality is structural. Sequences compare element-wise in order; sets and
//! mappings compare by membership, ignoring insertion order. Closures and
//! structure instances additionally carry the scope they came from.

mod composite;
mod heap;

use crate::exception::{Exception, ExceptionKind};
use crate::number::Number;
use crate::scope::SharedScope;
use indexmap::{IndexMap, IndexSet};
use rill_ir::{Name, NodeId};
use rustc_hash::FxHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

pub use composite::{Callee, FunctionValue, StructureValue};
pub use heap::Heap;

#[derive(Clone)]
pub enum Value {
    None,
    Boolean(bool),
    Number(Heap<Number>),
    Text(Heap<String>),
    /// Ordered, duplicates allowed.
    Sequence(Heap<Vec<Value>>),
    /// Unique by structural equality; iterates in insertion order.
    Set(Heap<IndexSet<Value>>),
    /// Unique keys; iterates in insertion order.
    Mapping(Heap<IndexMap<Value, Value>>),
    Function(FunctionValue),
    Structure(StructureValue),
    /// A failed evaluation, tagged with the node that failed.
    Exception(Heap<Exception>),
}

/// The variant of a value, without its contents.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ValueKind {
    None,
    Boolean,
    Number,
    Text,
    Sequence,
    Set,
    Mapping,
    Function,
    Structure,
    Exception,
}

impl ValueKind {
    pub fn name(self) -> &'static str {
        match self {
            ValueKind::None => "none",
            ValueKind::Boolean => "boolean",
            ValueKind::Number => "number",
            ValueKind::Text => "text",
            ValueKind::Sequence => "sequence",
            ValueKind::Set => "set",
            ValueKind::Mapping => "mapping",
            ValueKind::Function => "function",
            ValueKind::Structure => "structure",
            ValueKind::Exception => "exception",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// Factory methods (the only way to construct heap values)

impl Value {
    pub fn number(number: Number) -> Value {
        Value::Number(Heap::new(number))
    }

    /// A unitless integer.
    pub fn integer(value: i64) -> Value {
        Value::number(Number::integer(value, rill_ir::Unit::unitless()))
    }

    pub fn text(text: impl Into<String>) -> Value {
        Value::Text(Heap::new(text.into()))
    }

    pub fn sequence(items: Vec<Value>) -> Value {
        Value::Sequence(Heap::new(items))
    }

    /// Build a set, keeping the first of any structurally equal elements.
    pub fn set(items: impl IntoIterator<Item = Value>) -> Value {
        Value::Set(Heap::new(items.into_iter().collect()))
    }

    /// Build a mapping; a repeated key keeps its first position and last value.
    pub fn mapping(pairs: impl IntoIterator<Item = (Value, Value)>) -> Value {
        Value::Mapping(Heap::new(pairs.into_iter().collect()))
    }

    pub fn function(function: FunctionValue) -> Value {
        Value::Function(function)
    }

    pub fn structure(definition: NodeId, fields: Vec<(Name, Value)>, scope: SharedScope) -> Value {
        Value::Structure(StructureValue {
            definition,
            fields: Heap::new(fields),
            scope,
        })
    }

    pub fn exception(kind: ExceptionKind, node: NodeId) -> Value {
        Value::Exception(Heap::new(Exception { kind, node }))
    }
}

// Inspection

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::None => ValueKind::None,
            Value::Boolean(_) => ValueKind::Boolean,
            Value::Number(_) => ValueKind::Number,
            Value::Text(_) => ValueKind::Text,
            Value::Sequence(_) => ValueKind::Sequence,
            Value::Set(_) => ValueKind::Set,
            Value::Mapping(_) => ValueKind::Mapping,
            Value::Function(_) => ValueKind::Function,
            Value::Structure(_) => ValueKind::Structure,
            Value::Exception(_) => ValueKind::Exception,
        }
    }

    pub fn is_exception(&self) -> bool {
        matches!(self, Value::Exception(_))
    }

    pub fn as_exception(&self) -> Option<&Exception> {
        match self {
            Value::Exception(exception) => Some(exception),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<&Number> {
        match self {
            Value::Number(number) => Some(number),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Number of elements of a collection, or characters of a text.
    pub fn len(&self) -> Option<usize> {
        match self {
            Value::Text(text) => Some(text.chars().count()),
            Value::Sequence(items) => Some(items.len()),
            Value::Set(items) => Some(items.len()),
            Value::Mapping(pairs) => Some(pairs.len()),
            _ => None,
        }
    }

    /// The `index`th element of a collection in iteration order. Mapping
    /// elements are returned as their key and value.
    pub fn element(&self, index: usize) -> Option<Element<'_>> {
        match self {
            Value::Sequence(items) => items.get(index).map(Element::Single),
            Value::Set(items) => items.get_index(index).map(Element::Single),
            Value::Mapping(pairs) => pairs
                .get_index(index)
                .map(|(key, value)| Element::Pair(key, value)),
            _ => None,
        }
    }
}

/// One element of a collection.
#[derive(Copy, Clone, Debug)]
pub enum Element<'a> {
    Single(&'a Value),
    Pair(&'a Value, &'a Value),
}

// Equality and hashing

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::None, Value::None) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Sequence(a), Value::Sequence(b)) => a == b,
            // IndexSet and IndexMap equality ignore order.
            (Value::Set(a), Value::Set(b)) => a == b,
            (Value::Mapping(a), Value::Mapping(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => a == b,
            (Value::Structure(a), Value::Structure(b)) => a == b,
            (Value::Exception(a), Value::Exception(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

/// Hash of one element in isolation, combined commutatively for unordered
/// collections so that equal sets hash equally regardless of order.
fn element_hash(value: &impl Hash) -> u64 {
    let mut hasher = FxHasher::default();
    value.hash(&mut hasher);
    hasher.finish()
}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind().hash(state);
        match self {
            Value::None => {}
            Value::Boolean(value) => value.hash(state),
            Value::Number(number) => number.hash(state),
            Value::Text(text) => text.hash(state),
            Value::Sequence(items) => items.hash(state),
            Value::Set(items) => {
                let combined = items
                    .iter()
                    .map(element_hash)
                    .fold(0u64, u64::wrapping_add);
                combined.hash(state);
            }
            Value::Mapping(pairs) => {
                let combined = pairs
                    .iter()
                    .map(|pair| element_hash(&pair))
                    .fold(0u64, u64::wrapping_add);
                combined.hash(state);
            }
            Value::Function(function) => function.hash(state),
            Value::Structure(structure) => structure.hash(state),
            Value::Exception(exception) => exception.hash(state),
        }
    }
}

// Display

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn list<'a>(
            f: &mut fmt::Formatter<'_>,
            items: impl Iterator<Item = &'a Value>,
        ) -> fmt::Result {
            for (i, item) in items.enumerate() {
                if i > 0 {
                    f.write_str(" ")?;
                }
                write!(f, "{item}")?;
            }
            Ok(())
        }

        match self {
            Value::None => f.write_str("ø"),
            Value::Boolean(true) => f.write_str("⊤"),
            Value::Boolean(false) => f.write_str("⊥"),
            Value::Number(number) => write!(f, "{number}"),
            Value::Text(text) => write!(f, "\"{}\"", &**text),
            Value::Sequence(items) => {
                f.write_str("[")?;
                list(f, items.iter())?;
                f.write_str("]")
            }
            Value::Set(items) => {
                f.write_str("{")?;
                list(f, items.iter())?;
                f.write_str("}")
            }
            Value::Mapping(pairs) if pairs.is_empty() => f.write_str("{:}"),
            Value::Mapping(pairs) => {
                f.write_str("{")?;
                for (i, (key, value)) in pairs.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{key}:{value}")?;
                }
                f.write_str("}")
            }
            Value::Function(function) => match function.callee {
                Callee::Definition(node) => write!(f, "ƒ{node}"),
                Callee::Native(id) => write!(f, "ƒ native {}", id.index()),
            },
            Value::Structure(structure) => {
                write!(f, "structure{}(", structure.definition)?;
                list(f, structure.fields.iter().map(|(_, value)| value))?;
                f.write_str(")")
            }
            Value::Exception(exception) => write!(f, "{exception}"),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}

#[cfg(test)]
mod tests;
