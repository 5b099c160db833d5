//! Event sinks the resolver reports progress through.
//!
//! The engine never installs or consults a global logger; every client owns
//! the sink it was constructed with.

use std::sync::Mutex;

pub const TRACING_TARGET: &str = "dmr_resolver";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Enumerates supported `EventLevel` values.
pub enum EventLevel {
    Trace,
    Warning,
}

/// Trait contract for receiving resolver events in emission order.
pub trait ResolverEventSink: Send + Sync {
    fn emit(&self, level: EventLevel, message: &str);

    fn trace(&self, message: &str) {
        self.emit(EventLevel::Trace, message);
    }

    fn warning(&self, message: &str) {
        self.emit(EventLevel::Warning, message);
    }
}

#[derive(Debug, Clone, Copy, Default)]
/// Discards every event.
pub struct NoopSink;

impl ResolverEventSink for NoopSink {
    fn emit(&self, _level: EventLevel, _message: &str) {}
}

#[derive(Debug, Clone, Copy, Default)]
/// Forwards events to the `tracing` facade under the `dmr_resolver` target.
pub struct TracingSink;

impl ResolverEventSink for TracingSink {
    fn emit(&self, level: EventLevel, message: &str) {
        match level {
            EventLevel::Trace => tracing::trace!(target: TRACING_TARGET, "{message}"),
            EventLevel::Warning => tracing::warn!(target: TRACING_TARGET, "{message}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedEvent {
    pub level: EventLevel,
    pub message: String,
}

#[derive(Debug, Default)]
/// Keeps every event in memory, in order.
pub struct RecordingSink {
    events: Mutex<Vec<RecordedEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<RecordedEvent> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn messages(&self, level: EventLevel) -> Vec<String> {
        self.events()
            .into_iter()
            .filter(|event| event.level == level)
            .map(|event| event.message)
            .collect()
    }

    pub fn count(&self, level: EventLevel, message: &str) -> usize {
        self.events()
            .iter()
            .filter(|event| event.level == level && event.message == message)
            .count()
    }

    pub fn clear(&self) {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clear();
    }
}

impl ResolverEventSink for RecordingSink {
    fn emit(&self, level: EventLevel, message: &str) {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(RecordedEvent {
                level,
                message: message.to_string(),
            });
    }
}
