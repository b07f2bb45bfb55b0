//! Reactive input streams.
//!
//! A stream is a named external input (elapsed time, a pointer choice, a key
//! press) with a current value and a bounded history. Recording a value
//! schedules one re-evaluation of the program; the host drains those with
//! [`StreamRegistry::take_pending`].
//!
//! Recording must not overlap a run: the registry is mutated only between
//! evaluations, by its single owner.

use crate::config::DEFAULT_HISTORY;
use crate::errors::EvalError;
use crate::number::Number;
use crate::value::Value;
use rill_ir::{Name, SharedInterner, Type, Unit};
use rustc_hash::FxHashMap;
use std::collections::VecDeque;

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
pub struct StreamId(u32);

impl StreamId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// What analysis needs to know about a stream.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct StreamSignature {
    pub name: Name,
    pub value_type: Type,
}

/// A recorded value waiting to be evaluated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StreamChange {
    pub stream: StreamId,
    pub name: Name,
    pub value: Value,
}

#[derive(Debug)]
struct Stream {
    signature: StreamSignature,
    /// Oldest first; never empty.
    history: VecDeque<Value>,
    active: bool,
}

#[derive(Debug)]
pub struct StreamRegistry {
    streams: Vec<Stream>,
    by_name: FxHashMap<Name, StreamId>,
    capacity: usize,
    pending: VecDeque<StreamChange>,
    interner: SharedInterner,
}

impl StreamRegistry {
    pub fn new(interner: &SharedInterner) -> Self {
        StreamRegistry::with_capacity(interner, DEFAULT_HISTORY)
    }

    /// A registry whose streams remember at most `capacity` values
    /// (at least one).
    pub fn with_capacity(interner: &SharedInterner, capacity: usize) -> Self {
        StreamRegistry {
            streams: Vec::new(),
            by_name: FxHashMap::default(),
            capacity: capacity.max(1),
            pending: VecDeque::new(),
            interner: interner.clone(),
        }
    }

    /// The built-in inputs: `time` in milliseconds, the latest pointer
    /// `choice` and the latest `key` pressed.
    pub fn standard(interner: &SharedInterner) -> Self {
        let mut registry = StreamRegistry::new(interner);
        let milliseconds = Unit::dimension("ms");
        registry.define(
            "time",
            Type::Number(milliseconds.clone()),
            Value::number(Number::integer(0, milliseconds)),
        );
        registry.define("choice", Type::Text, Value::text(""));
        registry.define("key", Type::Text, Value::text(""));
        registry
    }

    /// Add an active stream holding `initial`. Redefining a name replaces
    /// the stream it referred to.
    ///
    /// # Panics
    /// Panics if more than `u32::MAX` streams are defined.
    /// Use `try_define` for fallible definition.
    pub fn define(&mut self, name: &str, value_type: Type, initial: Value) -> StreamId {
        self.try_define(name, value_type, initial)
            .unwrap_or_else(|e| panic!("{e}"))
    }

    /// Add an active stream, or fail once the id space is exhausted.
    pub fn try_define(
        &mut self,
        name: &str,
        value_type: Type,
        initial: Value,
    ) -> Result<StreamId, EvalError> {
        let id = StreamId(u32::try_from(self.streams.len()).map_err(|_| EvalError::TooManyStreams)?);
        let name = self.interner.intern(name);
        self.streams.push(Stream {
            signature: StreamSignature { name, value_type },
            history: VecDeque::from([initial]),
            active: true,
        });
        self.by_name.insert(name, id);
        Ok(id)
    }

    pub fn lookup(&self, name: Name) -> Option<StreamId> {
        self.by_name.get(&name).copied()
    }

    pub fn name(&self, id: StreamId) -> Option<Name> {
        self.streams.get(id.index()).map(|stream| stream.signature.name)
    }

    /// Append `value` to an active stream and schedule a re-evaluation.
    /// Returns whether the value was kept; inactive and unknown streams
    /// drop it.
    pub fn record(&mut self, id: StreamId, value: Value) -> bool {
        let capacity = self.capacity;
        let Some(stream) = self.streams.get_mut(id.index()) else {
            return false;
        };
        if !stream.active {
            tracing::trace!(stream = id.0, "dropping value for inactive stream");
            return false;
        }

        stream.history.push_back(value.clone());
        while stream.history.len() > capacity {
            stream.history.pop_front();
        }
        tracing::debug!(stream = id.0, %value, "recorded");
        self.pending.push_back(StreamChange {
            stream: id,
            name: stream.signature.name,
            value,
        });
        true
    }

    /// Resume capturing values. History is kept.
    pub fn start(&mut self, id: StreamId) {
        if let Some(stream) = self.streams.get_mut(id.index()) {
            stream.active = true;
        }
    }

    /// Stop capturing values. History is kept.
    pub fn stop(&mut self, id: StreamId) {
        if let Some(stream) = self.streams.get_mut(id.index()) {
            stream.active = false;
        }
    }

    pub fn start_all(&mut self) {
        for stream in &mut self.streams {
            stream.active = true;
        }
    }

    pub fn stop_all(&mut self) {
        for stream in &mut self.streams {
            stream.active = false;
        }
    }

    pub fn is_active(&self, id: StreamId) -> bool {
        self.streams.get(id.index()).is_some_and(|stream| stream.active)
    }

    pub fn latest(&self, id: StreamId) -> Option<&Value> {
        self.streams.get(id.index()).and_then(|stream| stream.history.back())
    }

    /// Remembered values, oldest first.
    pub fn history(&self, id: StreamId) -> impl Iterator<Item = &Value> + '_ {
        self.streams
            .get(id.index())
            .into_iter()
            .flat_map(|stream| stream.history.iter())
    }

    /// The latest value of every stream, for seeding an evaluation.
    pub fn bindings(&self) -> Vec<(Name, Value)> {
        self.by_name
            .iter()
            .filter_map(|(&name, &id)| Some((name, self.latest(id)?.clone())))
            .collect()
    }

    pub fn signatures(&self) -> Vec<StreamSignature> {
        let mut signatures: Vec<_> = self
            .by_name
            .values()
            .filter_map(|id| self.streams.get(id.index()))
            .map(|stream| stream.signature.clone())
            .collect();
        signatures.sort_by_key(|signature| self.by_name.get(&signature.name).copied());
        signatures
    }

    /// Drain scheduled changes, oldest first. Each recorded value yields
    /// exactly one change.
    pub fn take_pending(&mut self) -> Vec<StreamChange> {
        self.pending.drain(..).collect()
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.streams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }
}

#[cfg(test)]
mod tests;
