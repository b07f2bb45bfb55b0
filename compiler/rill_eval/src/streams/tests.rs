use super::*;
use pretty_assertions::assert_eq;

#[test]
fn standard_streams_start_active_with_initial_values() {
    let interner = SharedInterner::new();
    let registry = StreamRegistry::standard(&interner);
    assert_eq!(registry.len(), 3);

    let time = registry.lookup(interner.intern("time")).unwrap();
    assert!(registry.is_active(time));
    assert_eq!(
        registry.latest(time),
        Some(&Value::number(Number::integer(0, Unit::dimension("ms"))))
    );

    let choice = registry.lookup(interner.intern("choice")).unwrap();
    assert_eq!(registry.latest(choice), Some(&Value::text("")));
    assert!(!registry.has_pending());
}

#[test]
fn recording_schedules_one_change_per_value() {
    let interner = SharedInterner::new();
    let mut registry = StreamRegistry::standard(&interner);
    let key = registry.lookup(interner.intern("key")).unwrap();

    assert!(registry.record(key, Value::text("a")));
    assert!(registry.record(key, Value::text("b")));

    let pending = registry.take_pending();
    assert_eq!(pending.len(), 2);
    assert_eq!(pending[1].name, interner.intern("key"));
    assert_eq!(pending[1].value, Value::text("b"));
    assert!(registry.take_pending().is_empty());
    assert_eq!(registry.latest(key), Some(&Value::text("b")));
}

#[test]
fn stopped_streams_drop_values_and_keep_history() {
    let interner = SharedInterner::new();
    let mut registry = StreamRegistry::standard(&interner);
    let key = registry.lookup(interner.intern("key")).unwrap();
    registry.record(key, Value::text("a"));
    registry.take_pending();

    registry.stop(key);
    assert!(!registry.record(key, Value::text("ignored")));
    assert!(!registry.has_pending());
    assert_eq!(registry.history(key).count(), 2);

    registry.start(key);
    assert!(registry.record(key, Value::text("b")));
    let history: Vec<_> = registry.history(key).cloned().collect();
    assert_eq!(
        history,
        vec![Value::text(""), Value::text("a"), Value::text("b")]
    );
}

#[test]
fn fallible_definition_returns_the_new_id() {
    let interner = SharedInterner::new();
    let mut registry = StreamRegistry::standard(&interner);
    let id = registry
        .try_define("mouse", Type::Text, Value::text("up"))
        .unwrap();
    assert_eq!(registry.lookup(interner.intern("mouse")), Some(id));
    assert_eq!(registry.latest(id), Some(&Value::text("up")));
    assert!(registry.is_active(id));
}

#[test]
fn history_is_bounded() {
    let interner = SharedInterner::new();
    let mut registry = StreamRegistry::with_capacity(&interner, 3);
    let counter = registry.define("counter", Type::number(), Value::integer(0));
    for i in 1..=5 {
        registry.record(counter, Value::integer(i));
    }
    let history: Vec<_> = registry.history(counter).cloned().collect();
    assert_eq!(
        history,
        vec![Value::integer(3), Value::integer(4), Value::integer(5)]
    );
    assert_eq!(registry.take_pending().len(), 5);
}

#[test]
fn bindings_and_signatures_cover_every_stream() {
    let interner = SharedInterner::new();
    let mut registry = StreamRegistry::standard(&interner);
    let time = registry.lookup(interner.intern("time")).unwrap();
    registry.stop_all();
    assert!(!registry.is_active(time));
    registry.start_all();
    registry.record(time, Value::number(Number::integer(16, Unit::dimension("ms"))));

    let bindings = registry.bindings();
    assert_eq!(bindings.len(), 3);
    assert!(bindings.contains(&(
        interner.intern("time"),
        Value::number(Number::integer(16, Unit::dimension("ms")))
    )));

    let names: Vec<_> = registry
        .signatures()
        .into_iter()
        .map(|signature| interner.lookup(signature.name).to_owned())
        .collect();
    assert_eq!(names, vec!["time", "choice", "key"]);
}

#[test]
fn unknown_streams_ignore_records() {
    let interner = SharedInterner::new();
    let mut registry = StreamRegistry::new(&interner);
    assert!(registry.is_empty());
    assert!(!registry.record(StreamId(7), Value::None));
    assert_eq!(registry.latest(StreamId(7)), None);
}
