//! The authoritative filter source contract.

use crate::core::FilterDescriptor;
use crate::errors::GatewayError;
use async_trait::async_trait;
use parking_lot::RwLock;

/// The centrally-managed source of filter descriptors.
///
/// Backed by a database or remote service in production; the sync engine
/// tolerates any failure here and retries on its next cycle.
#[async_trait]
pub trait FilterSource: Send + Sync {
    /// A short label naming the backing implementation, used in cycle
    /// transaction markers (e.g. `"mysql"`, `"http"`, `"static"`).
    fn kind(&self) -> &str;

    /// Returns the fully-rolled-out filter set, in publication order.
    async fn active_filters(&self) -> Result<Vec<FilterDescriptor>, GatewayError>;

    /// Returns the staged-rollout filter set, in publication order.
    async fn canary_filters(&self) -> Result<Vec<FilterDescriptor>, GatewayError>;
}

/// An in-memory filter source.
///
/// Useful for fixtures and for embedding the core without a remote source;
/// both lists can be swapped at runtime.
#[derive(Debug, Default)]
pub struct StaticFilterSource {
    active: RwLock<Vec<FilterDescriptor>>,
    canary: RwLock<Vec<FilterDescriptor>>,
}

impl StaticFilterSource {
    /// Creates an empty source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a source with an initial active list.
    #[must_use]
    pub fn with_active(active: Vec<FilterDescriptor>) -> Self {
        Self {
            active: RwLock::new(active),
            canary: RwLock::new(Vec::new()),
        }
    }

    /// Replaces the active list.
    pub fn set_active(&self, filters: Vec<FilterDescriptor>) {
        *self.active.write() = filters;
    }

    /// Replaces the canary list.
    pub fn set_canary(&self, filters: Vec<FilterDescriptor>) {
        *self.canary.write() = filters;
    }
}

#[async_trait]
impl FilterSource for StaticFilterSource {
    fn kind(&self) -> &str {
        "static"
    }

    async fn active_filters(&self) -> Result<Vec<FilterDescriptor>, GatewayError> {
        Ok(self.active.read().clone())
    }

    async fn canary_filters(&self) -> Result<Vec<FilterDescriptor>, GatewayError> {
        Ok(self.canary.read().clone())
    }
}
