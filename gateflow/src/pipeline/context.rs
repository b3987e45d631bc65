//! Per-request scoped state.

use crate::errors::StageFailure;
use crate::utils::generate_uuid;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use uuid::Uuid;

/// Mutable state owned by exactly one request for exactly one pipeline run.
///
/// The executor clears the context unconditionally when the run ends,
/// whichever exit path was taken. No operation panics on an absent key.
#[derive(Debug)]
pub struct RequestContext {
    /// Correlation id for this request, stable across `clear`.
    id: Uuid,
    data: RwLock<HashMap<String, serde_json::Value>>,
    engine_ran: AtomicBool,
    failure: RwLock<Option<StageFailure>>,
}

impl RequestContext {
    /// Creates a fresh context with a generated request id.
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: generate_uuid(),
            data: RwLock::new(HashMap::new()),
            engine_ran: AtomicBool::new(false),
            failure: RwLock::new(None),
        }
    }

    /// Returns the request correlation id.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Stores a value under `key`, replacing any prior value.
    pub fn set(&self, key: impl Into<String>, value: serde_json::Value) {
        self.data.write().insert(key.into(), value);
    }

    /// Returns the value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<serde_json::Value> {
        self.data.read().get(key).cloned()
    }

    /// Returns true if `key` is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.data.read().contains_key(key)
    }

    /// Returns the number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Returns true if no keys are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }

    /// Marks that this request passed through the pipeline engine.
    pub fn mark_engine_ran(&self) {
        self.engine_ran.store(true, Ordering::SeqCst);
    }

    /// Returns whether the pipeline engine ran for this request.
    #[must_use]
    pub fn engine_ran(&self) -> bool {
        self.engine_ran.load(Ordering::SeqCst)
    }

    /// Captures a failure for the ERROR stage to consume.
    ///
    /// The slot holds at most one failure; a later capture replaces an
    /// earlier one.
    pub fn set_failure(&self, failure: StageFailure) {
        *self.failure.write() = Some(failure);
    }

    /// Returns the captured failure, if any.
    #[must_use]
    pub fn failure(&self) -> Option<StageFailure> {
        self.failure.read().clone()
    }

    /// Resets the context to its initial empty state.
    ///
    /// Safe to call any number of times.
    pub fn clear(&self) {
        self.data.write().clear();
        self.engine_ran.store(false, Ordering::SeqCst);
        *self.failure.write() = None;
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}
