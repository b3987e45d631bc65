//! Event sink trait and implementations.
//!
//! The sink is the fire-and-forget observability seam of the core: the sync
//! engine reports per-cycle transaction markers and swallowed errors here,
//! and the pipeline reports stage transitions and ERROR-stage faults.

use async_trait::async_trait;
use tracing::{debug, info};

/// Trait for sinks receiving gateway events.
///
/// Event names are dotted paths, e.g. `sync.cycle.completed`,
/// `sync.filter.written`, `pipeline.stage.failed`,
/// `pipeline.error_stage.failed`.
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Emits an event asynchronously.
    async fn emit(&self, event_type: &str, data: Option<serde_json::Value>);

    /// Emits an event without awaiting or failing.
    ///
    /// Must never panic or block the caller; implementations log and
    /// suppress their own errors.
    fn try_emit(&self, event_type: &str, data: Option<serde_json::Value>);
}

/// A sink that discards all events.
///
/// Used as the default when no observability backend is wired up.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpEventSink;

#[async_trait]
impl EventSink for NoOpEventSink {
    async fn emit(&self, _event_type: &str, _data: Option<serde_json::Value>) {}

    fn try_emit(&self, _event_type: &str, _data: Option<serde_json::Value>) {}
}

/// A sink that forwards events to the tracing framework.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingEventSink {
    /// Log at debug level instead of info.
    verbose: bool,
}

impl LoggingEventSink {
    /// Creates an info-level logging sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a debug-level logging sink.
    #[must_use]
    pub fn debug() -> Self {
        Self { verbose: true }
    }

    fn log_event(self, event_type: &str, data: &Option<serde_json::Value>) {
        if self.verbose {
            debug!(event_type = %event_type, event_data = ?data, "gateway event");
        } else {
            info!(event_type = %event_type, event_data = ?data, "gateway event");
        }
    }
}

#[async_trait]
impl EventSink for LoggingEventSink {
    async fn emit(&self, event_type: &str, data: Option<serde_json::Value>) {
        self.log_event(event_type, &data);
    }

    fn try_emit(&self, event_type: &str, data: Option<serde_json::Value>) {
        self.log_event(event_type, &data);
    }
}

/// A collecting sink for tests.
#[derive(Debug, Default)]
pub struct CollectingEventSink {
    events: parking_lot::RwLock<Vec<(String, Option<serde_json::Value>)>>,
}

impl CollectingEventSink {
    /// Creates a new collecting sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all collected events.
    #[must_use]
    pub fn events(&self) -> Vec<(String, Option<serde_json::Value>)> {
        self.events.read().clone()
    }

    /// Returns the number of collected events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    /// Returns true if no events have been collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }

    /// Returns events whose type starts with the given prefix.
    #[must_use]
    pub fn events_of_type(&self, type_prefix: &str) -> Vec<(String, Option<serde_json::Value>)> {
        self.events
            .read()
            .iter()
            .filter(|(t, _)| t.starts_with(type_prefix))
            .cloned()
            .collect()
    }

    /// Returns how many events match the given type prefix.
    #[must_use]
    pub fn count_of_type(&self, type_prefix: &str) -> usize {
        self.events_of_type(type_prefix).len()
    }

    /// Clears all collected events.
    pub fn clear(&self) {
        self.events.write().clear();
    }
}

#[async_trait]
impl EventSink for CollectingEventSink {
    async fn emit(&self, event_type: &str, data: Option<serde_json::Value>) {
        self.events.write().push((event_type.to_string(), data));
    }

    fn try_emit(&self, event_type: &str, data: Option<serde_json::Value>) {
        self.events.write().push((event_type.to_string(), data));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_noop_sink_discards() {
        let sink = NoOpEventSink;
        sink.emit("sync.cycle.completed", None).await;
        sink.try_emit("sync.cycle.failed", Some(serde_json::json!({"error": "x"})));
    }

    #[tokio::test]
    async fn test_logging_sink_does_not_panic() {
        let sink = LoggingEventSink::debug();
        sink.emit("pipeline.stage.started", Some(serde_json::json!({"stage": "pre"})))
            .await;
        sink.try_emit("pipeline.stage.failed", None);
    }

    #[tokio::test]
    async fn test_collecting_sink_records_in_order() {
        let sink = CollectingEventSink::new();
        assert!(sink.is_empty());

        sink.emit("sync.cycle.completed", None).await;
        sink.try_emit("sync.filter.written", Some(serde_json::json!({"id": "F1"})));

        let events = sink.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].0, "sync.cycle.completed");
        assert_eq!(events[1].0, "sync.filter.written");
    }

    #[tokio::test]
    async fn test_collecting_sink_prefix_filter() {
        let sink = CollectingEventSink::new();
        sink.emit("pipeline.stage.started", None).await;
        sink.emit("pipeline.stage.failed", None).await;
        sink.emit("sync.cycle.completed", None).await;

        assert_eq!(sink.count_of_type("pipeline.stage."), 2);
        assert_eq!(sink.count_of_type("sync."), 1);

        sink.clear();
        assert!(sink.is_empty());
    }
}
