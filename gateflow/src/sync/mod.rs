//! Dynamic filter synchronization.
//!
//! The sync domain owns one background task per process: it polls the
//! authoritative [`FilterSource`], persists changed descriptors through a
//! [`FilterWriter`], and commits them to the [`FilterStore`] read by the
//! request domain.

mod poller;
mod source;
mod store;
mod writer;

pub use poller::FilterSyncEngine;
pub use source::{FilterSource, StaticFilterSource};
pub use store::FilterStore;
pub use writer::{DiskFilterWriter, FilterWriter};
