//! Background synchronization of the filter set.
//!
//! One engine per process reconciles the local filter artifacts and the
//! [`FilterStore`] against the authoritative [`FilterSource`] on a fixed
//! cadence. A cycle never crashes the host: every failure is reported to the
//! event sink and retried on the next tick.

use crate::config::DynamicConfig;
use crate::core::FilterDescriptor;
use crate::errors::GatewayError;
use crate::events::EventSink;
use crate::sync::{FilterSource, FilterStore, FilterWriter};
use crate::utils::iso_timestamp;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// The fetch mode selected for one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CycleMode {
    Active,
    Canary,
}

impl CycleMode {
    fn label(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Canary => "canary",
        }
    }
}

/// Background engine keeping local filter state in agreement with the
/// filter source.
///
/// Single writer of the [`FilterStore`] and of the persisted artifacts.
/// [`FilterSyncEngine::start`] is idempotent under concurrent callers and
/// spawns exactly one background task for the process lifetime;
/// [`FilterSyncEngine::stop`] is observed promptly, including mid-sleep.
pub struct FilterSyncEngine {
    config: Arc<DynamicConfig>,
    source: Arc<dyn FilterSource>,
    writer: Arc<dyn FilterWriter>,
    store: Arc<FilterStore>,
    events: Arc<dyn EventSink>,
    started: AtomicBool,
    shutdown: watch::Sender<bool>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl FilterSyncEngine {
    /// Creates a new engine. Nothing runs until [`FilterSyncEngine::start`].
    #[must_use]
    pub fn new(
        config: Arc<DynamicConfig>,
        source: Arc<dyn FilterSource>,
        writer: Arc<dyn FilterWriter>,
        store: Arc<FilterStore>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            config,
            source,
            writer,
            store,
            events,
            started: AtomicBool::new(false),
            shutdown,
            task: Mutex::new(None),
        }
    }

    /// Returns the store this engine writes to.
    #[must_use]
    pub fn store(&self) -> Arc<FilterStore> {
        Arc::clone(&self.store)
    }

    /// Starts the background poll loop.
    ///
    /// The first caller wins and spawns the task; every later call is a
    /// no-op. Returns whether this call spawned the loop.
    pub fn start(self: &Arc<Self>) -> bool {
        if self
            .started
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return false;
        }

        let engine = Arc::clone(self);
        let mut shutdown_rx = self.shutdown.subscribe();
        let handle = tokio::spawn(async move {
            info!("filter sync engine started");
            loop {
                if *shutdown_rx.borrow() {
                    break;
                }
                engine.sync_once().await;

                let interval = engine.config.poller_interval();
                tokio::select! {
                    () = tokio::time::sleep(interval) => {}
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            break;
                        }
                    }
                }
            }
            info!("filter sync engine stopped");
        });
        *self.task.lock() = Some(handle);
        true
    }

    /// Requests the loop to stop.
    ///
    /// Cooperative and terminal: an in-flight cycle finishes, the pending
    /// sleep is interrupted, and the engine does not restart.
    pub fn stop(&self) {
        let _ = self.shutdown.send(true);
    }

    /// Returns true while the background task is live.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.task
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Runs one synchronization cycle.
    ///
    /// Never fails and never panics the caller: the cycle outcome is
    /// reported to the event sink as a completed transaction. With the
    /// poller disabled, or with neither active nor canary mode enabled,
    /// no fetch is issued.
    pub async fn sync_once(&self) {
        if !self.config.poller_enabled() {
            return;
        }

        let mode = if self.config.canary_enabled() {
            CycleMode::Canary
        } else if self.config.active_enabled() {
            CycleMode::Active
        } else {
            return;
        };
        let transaction = format!("{}-{}", mode.label(), self.source.kind());

        match self.run_cycle(mode).await {
            Ok(applied) => {
                self.events
                    .emit(
                        "sync.cycle.completed",
                        Some(serde_json::json!({
                            "transaction": transaction,
                            "applied": applied,
                            "at": iso_timestamp(),
                        })),
                    )
                    .await;
            }
            Err(err) => {
                error!(transaction = %transaction, error = %err, "filter sync cycle failed");
                self.events
                    .emit(
                        "sync.cycle.failed",
                        Some(serde_json::json!({
                            "transaction": transaction,
                            "error": err.to_string(),
                            "at": iso_timestamp(),
                        })),
                    )
                    .await;
            }
        }
    }

    /// Fetches, diffs and applies one descriptor set.
    ///
    /// Returns the number of descriptors persisted and committed.
    async fn run_cycle(&self, mode: CycleMode) -> Result<usize, GatewayError> {
        let mut merged: HashMap<String, FilterDescriptor> = HashMap::new();
        // Active first, canary second: the canary copy wins on id collision.
        for descriptor in self.source.active_filters().await? {
            merged.insert(descriptor.id.clone(), descriptor);
        }
        if mode == CycleMode::Canary {
            for descriptor in self.source.canary_filters().await? {
                merged.insert(descriptor.id.clone(), descriptor);
            }
        }

        let mut applied = 0;
        for descriptor in merged.into_values() {
            if self.store.is_current(&descriptor) {
                continue;
            }
            self.persist(&descriptor).await?;
            self.store.upsert(descriptor);
            applied += 1;
        }
        Ok(applied)
    }

    /// Persists one changed descriptor to its kind-resolved directory.
    async fn persist(&self, descriptor: &FilterDescriptor) -> Result<(), GatewayError> {
        let dir = self.config.path_for(descriptor.kind);
        let file_name = descriptor.file_name(&self.config.script_extension());

        self.writer
            .write(&dir, &file_name, &descriptor.content)
            .await?;

        info!(
            id = %descriptor.id,
            kind = %descriptor.kind,
            file = %dir.join(&file_name).display(),
            "filter written"
        );
        self.events.try_emit(
            "sync.filter.written",
            Some(serde_json::json!({
                "id": descriptor.id,
                "kind": descriptor.kind.to_string(),
                "revision": descriptor.fingerprint(),
                "file": file_name,
            })),
        );
        Ok(())
    }
}
