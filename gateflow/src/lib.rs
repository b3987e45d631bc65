//! # Gateflow
//!
//! The core of a request-filtering gateway, in two coupled halves:
//!
//! - **Filter synchronization**: a background engine polls the
//!   centrally-managed filter source, detects changed descriptors by
//!   full-value equality, persists them atomically to per-stage script
//!   directories and commits them to the process-local [`sync::FilterStore`].
//!   Staged rollout is built in: canary filters override active ones on id
//!   collision.
//! - **Request pipeline**: every inbound request is driven through
//!   `PRE → ROUTE → POST` with a dedicated ERROR recovery branch and a
//!   guaranteed [`pipeline::RequestContext`] cleanup on every exit path.
//!
//! Script compilation/execution, the HTTP container, the persistent filter
//! source and metrics backends are external collaborators behind the
//! [`sync::FilterSource`], [`sync::FilterWriter`], [`pipeline::FilterRunner`]
//! and [`events::EventSink`] traits.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use gateflow::prelude::*;
//! use std::sync::Arc;
//!
//! // Background sync domain.
//! let engine = Arc::new(FilterSyncEngine::new(
//!     Arc::new(DynamicConfig::default()),
//!     source,                         // your FilterSource
//!     Arc::new(DiskFilterWriter::new()),
//!     Arc::new(FilterStore::new()),
//!     Arc::new(LoggingEventSink::new()),
//! ));
//! engine.start();
//!
//! // Request domain, once per inbound request.
//! let executor = PipelineExecutor::new(runner); // your FilterRunner
//! let ctx = RequestContext::new();
//! let outcome = executor.run(&ctx).await;
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod config;
pub mod core;
pub mod errors;
pub mod events;
pub mod pipeline;
pub mod sync;
pub mod utils;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{DynamicConfig, GatewaySettings};
    pub use crate::core::{FilterDescriptor, FilterKind};
    pub use crate::errors::{GatewayError, StageFailure};
    pub use crate::events::{EventSink, LoggingEventSink, NoOpEventSink};
    pub use crate::pipeline::{
        FilterRunner, NoOpFilterRunner, PipelineExecutor, PipelineOutcome, PipelineState,
        RequestContext,
    };
    pub use crate::sync::{
        DiskFilterWriter, FilterSource, FilterStore, FilterSyncEngine, FilterWriter,
        StaticFilterSource,
    };
    pub use crate::utils::{generate_uuid, iso_timestamp};
}
