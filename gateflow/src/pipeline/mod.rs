//! The staged request pipeline.
//!
//! One [`PipelineExecutor`] run per inbound request, over an isolated
//! [`RequestContext`]; stage execution is delegated to the external
//! [`FilterRunner`] collaborator.

mod context;
mod executor;
mod runner;

pub use context::RequestContext;
pub use executor::{PipelineExecutor, PipelineOutcome, PipelineState};
pub use runner::{FilterRunner, NoOpFilterRunner};
