//! The filter resolution/execution seam.

use crate::core::FilterKind;
use crate::errors::GatewayError;
use crate::pipeline::RequestContext;
use async_trait::async_trait;

/// Resolves and executes the filters of one stage against a request.
///
/// This is the boundary to the script compiler/executor: given a stage, an
/// implementation looks up the ordered filters for that stage from the
/// synchronized filter set and runs them against the context. The executor
/// treats any returned error as that stage failing.
#[async_trait]
pub trait FilterRunner: Send + Sync {
    /// Runs all filters of `stage` in their defined order.
    async fn run_stage(&self, stage: FilterKind, ctx: &RequestContext)
        -> Result<(), GatewayError>;
}

/// A runner with no filters: every stage succeeds without side effects.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpFilterRunner;

#[async_trait]
impl FilterRunner for NoOpFilterRunner {
    async fn run_stage(
        &self,
        _stage: FilterKind,
        _ctx: &RequestContext,
    ) -> Result<(), GatewayError> {
        Ok(())
    }
}
