//! Single-step natives.

use super::{NativeBody, NativeCall, NativeRegistry};
use crate::exception::ExceptionKind;
use crate::number::Number;
use crate::value::{Value, ValueKind};
use rill_ir::Type;

pub(super) fn register(registry: &mut NativeRegistry) {
    let any_mapping = || Type::Mapping(Box::new(Type::Any), Box::new(Type::Any));

    registry.register(
        "length",
        &["collection"],
        Type::function(vec![Type::Any], Type::number()),
        NativeBody::Apply(length),
    );
    registry.register(
        "contains",
        &["collection", "value"],
        Type::function(vec![Type::Any, Type::Any], Type::Boolean),
        NativeBody::Apply(contains),
    );
    registry.register(
        "keys",
        &["mapping"],
        Type::function(vec![any_mapping()], Type::sequence_of(Type::Any)),
        NativeBody::Apply(keys),
    );
    registry.register(
        "values",
        &["mapping"],
        Type::function(vec![any_mapping()], Type::sequence_of(Type::Any)),
        NativeBody::Apply(values),
    );
    registry.register(
        "text",
        &["value"],
        Type::function(vec![Type::Any], Type::Text),
        NativeBody::Apply(text),
    );
}

fn mismatch(call: &NativeCall<'_>, expected: ValueKind, found: &Value) -> Value {
    Value::exception(
        ExceptionKind::TypeMismatch {
            expected,
            found: found.kind(),
        },
        call.node,
    )
}

fn length(call: &NativeCall<'_>) -> Value {
    let collection = call.input(0);
    match collection.len() {
        Some(len) => Value::number(Number::count(len)),
        None => mismatch(call, ValueKind::Sequence, &collection),
    }
}

fn contains(call: &NativeCall<'_>) -> Value {
    let collection = call.input(0);
    let needle = call.input(1);
    let found = match (&collection, &needle) {
        (Value::Sequence(items), _) => items.contains(&needle),
        (Value::Set(items), _) => items.contains(&needle),
        (Value::Mapping(pairs), _) => pairs.contains_key(&needle),
        (Value::Text(text), Value::Text(part)) => text.contains(part.as_str()),
        (Value::Text(_), other) => return mismatch(call, ValueKind::Text, other),
        (other, _) => return mismatch(call, ValueKind::Sequence, other),
    };
    Value::Boolean(found)
}

fn keys(call: &NativeCall<'_>) -> Value {
    match call.input(0) {
        Value::Mapping(pairs) => Value::sequence(pairs.keys().cloned().collect()),
        other => mismatch(call, ValueKind::Mapping, &other),
    }
}

fn values(call: &NativeCall<'_>) -> Value {
    match call.input(0) {
        Value::Mapping(pairs) => Value::sequence(pairs.values().cloned().collect()),
        other => mismatch(call, ValueKind::Mapping, &other),
    }
}

fn text(call: &NativeCall<'_>) -> Value {
    match call.input(0) {
        text @ Value::Text(_) => text,
        other => Value::text(other.to_string()),
    }
}
