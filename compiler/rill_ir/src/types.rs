//! Static types, as computed by the conflict analyzer.

use crate::{NodeId, Unit};
use std::fmt;

/// The static type of an expression.
///
/// `Any` stands in wherever a type cannot be known (unresolved names, type
/// cycles, partial trees). It is compatible in both directions so a single
/// root cause never cascades into a wall of mismatches.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum Type {
    Any,
    None,
    Boolean,
    Number(Unit),
    Text,
    Sequence(Box<Type>),
    Set(Box<Type>),
    Mapping(Box<Type>, Box<Type>),
    Function { inputs: Vec<Type>, output: Box<Type> },
    /// Instances of the structure defined at this node.
    Structure(NodeId),
}

impl Type {
    pub fn number() -> Type {
        Type::Number(Unit::unitless())
    }

    pub fn sequence_of(item: Type) -> Type {
        Type::Sequence(Box::new(item))
    }

    pub fn function(inputs: Vec<Type>, output: Type) -> Type {
        Type::Function {
            inputs,
            output: Box::new(output),
        }
    }

    pub fn is_any(&self) -> bool {
        matches!(self, Type::Any)
    }

    /// Whether a value of type `other` may flow where `self` is expected.
    pub fn accepts(&self, other: &Type) -> bool {
        match (self, other) {
            (Type::Any, _) | (_, Type::Any) => true,
            (Type::Sequence(a), Type::Sequence(b)) | (Type::Set(a), Type::Set(b)) => a.accepts(b),
            (Type::Mapping(ak, av), Type::Mapping(bk, bv)) => ak.accepts(bk) && av.accepts(bv),
            (
                Type::Function { inputs: ai, output: ao },
                Type::Function { inputs: bi, output: bo },
            ) => {
                ai.len() == bi.len()
                    && ai.iter().zip(bi).all(|(a, b)| b.accepts(a))
                    && ao.accepts(bo)
            }
            _ => self == other,
        }
    }

    /// The one type covering every type in `types`, or `Any` when they differ.
    pub fn common<'a>(mut types: impl Iterator<Item = &'a Type>) -> Type {
        let Some(first) = types.next() else {
            return Type::Any;
        };
        let mut common = first.clone();
        for ty in types {
            if common.is_any() {
                common = ty.clone();
            } else if !ty.is_any() && *ty != common {
                return Type::Any;
            }
        }
        common
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Any => f.write_str("any"),
            Type::None => f.write_str("none"),
            Type::Boolean => f.write_str("boolean"),
            Type::Number(unit) if unit.is_unitless() => f.write_str("number"),
            Type::Number(unit) => write!(f, "number {unit}"),
            Type::Text => f.write_str("text"),
            Type::Sequence(item) => write!(f, "[{item}]"),
            Type::Set(item) => write!(f, "{{{item}}}"),
            Type::Mapping(key, value) => write!(f, "{{{key}:{value}}}"),
            Type::Function { inputs, output } => {
                f.write_str("ƒ(")?;
                for (i, input) in inputs.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{input}")?;
                }
                write!(f, ") {output}")
            }
            Type::Structure(node) => write!(f, "structure {node}"),
        }
    }
}

#[cfg(test)]
mod tests;
