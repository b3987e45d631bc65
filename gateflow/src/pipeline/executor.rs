//! The staged request pipeline state machine.
//!
//! One run drives a request through `INIT → PRE → ROUTE → POST → DONE` with
//! an ERROR branch reachable from PRE, ROUTE and POST. The caller never
//! observes a raised failure: the outcome is a value, and the request
//! context is cleared on every exit path.

use crate::core::FilterKind;
use crate::errors::StageFailure;
use crate::events::{EventSink, NoOpEventSink};
use crate::pipeline::{FilterRunner, RequestContext};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error};

/// The states of one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    /// Context bound, nothing executed yet.
    Init,
    /// Running pre filters.
    Pre,
    /// Running route filters.
    Route,
    /// Running post filters.
    Post,
    /// Running the recovery branch.
    Error,
    /// Terminal; the context has been cleared.
    Done,
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Init => write!(f, "init"),
            Self::Pre => write!(f, "pre"),
            Self::Route => write!(f, "route"),
            Self::Post => write!(f, "post"),
            Self::Error => write!(f, "error"),
            Self::Done => write!(f, "done"),
        }
    }
}

impl PipelineState {
    /// Returns true for the terminal state.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }
}

/// Result of one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    /// True when every reached stage succeeded.
    pub success: bool,
    /// The first failure captured during the run, if any.
    pub failure: Option<StageFailure>,
    /// Total run time in milliseconds.
    pub duration_ms: f64,
}

/// Drives one request through the staged pipeline.
///
/// Stage execution is delegated to the [`FilterRunner`] collaborator; the
/// executor owns only the transition rules and the cleanup guarantee.
pub struct PipelineExecutor {
    runner: Arc<dyn FilterRunner>,
    events: Arc<dyn EventSink>,
}

impl PipelineExecutor {
    /// Creates an executor over the given runner, with events discarded.
    #[must_use]
    pub fn new(runner: Arc<dyn FilterRunner>) -> Self {
        Self {
            runner,
            events: Arc::new(NoOpEventSink),
        }
    }

    /// Sets the observability sink.
    #[must_use]
    pub fn with_events(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    /// Runs the full pipeline for one request.
    ///
    /// Infallible by contract: stage failures are recovered through the
    /// ERROR branch, undeclared faults are wrapped with status 500, and a
    /// fault inside the ERROR stage itself is reported and swallowed. The
    /// context is cleared before this returns, on every path.
    pub async fn run(&self, ctx: &RequestContext) -> PipelineOutcome {
        let start = Instant::now();
        debug!(request_id = %ctx.id(), state = %PipelineState::Init, "pipeline run starting");
        ctx.mark_engine_ran();

        let failure = self.drive(ctx).await;

        let outcome = PipelineOutcome {
            success: failure.is_none(),
            failure,
            duration_ms: start.elapsed().as_secs_f64() * 1000.0,
        };
        ctx.clear();
        debug!(
            request_id = %ctx.id(),
            state = %PipelineState::Done,
            success = outcome.success,
            "pipeline run finished"
        );
        outcome
    }

    /// Walks the stage transitions; returns the first captured failure.
    async fn drive(&self, ctx: &RequestContext) -> Option<StageFailure> {
        if let Err(failure) = self.stage(PipelineState::Pre, FilterKind::Pre, ctx).await {
            // ROUTE is skipped entirely; POST still runs once after recovery.
            self.recover(ctx, &failure).await;
            self.post_after_recovery(ctx).await;
            return Some(failure);
        }

        if let Err(failure) = self.stage(PipelineState::Route, FilterKind::Route, ctx).await {
            self.recover(ctx, &failure).await;
            self.post_after_recovery(ctx).await;
            return Some(failure);
        }

        if let Err(failure) = self.stage(PipelineState::Post, FilterKind::Post, ctx).await {
            // Direct POST failure: recover, but POST is not re-invoked.
            self.recover(ctx, &failure).await;
            return Some(failure);
        }

        None
    }

    /// Runs one stage, normalizing any error into a [`StageFailure`].
    async fn stage(
        &self,
        state: PipelineState,
        kind: FilterKind,
        ctx: &RequestContext,
    ) -> Result<(), StageFailure> {
        debug!(request_id = %ctx.id(), state = %state, "entering stage");
        self.events.try_emit(
            "pipeline.stage.started",
            Some(serde_json::json!({
                "stage": kind.to_string(),
                "request_id": ctx.id().to_string(),
            })),
        );

        match self.runner.run_stage(kind, ctx).await {
            Ok(()) => {
                self.events.try_emit(
                    "pipeline.stage.completed",
                    Some(serde_json::json!({
                        "stage": kind.to_string(),
                        "request_id": ctx.id().to_string(),
                    })),
                );
                Ok(())
            }
            Err(err) => {
                let failure = err.into_stage_failure();
                self.events.try_emit(
                    "pipeline.stage.failed",
                    Some(serde_json::json!({
                        "stage": kind.to_string(),
                        "request_id": ctx.id().to_string(),
                        "status": failure.status_code,
                        "cause": failure.cause,
                    })),
                );
                Err(failure)
            }
        }
    }

    /// Captures the failure and runs the ERROR branch.
    ///
    /// A fault raised inside the ERROR stage is reported and swallowed; it
    /// never propagates out of the pipeline.
    async fn recover(&self, ctx: &RequestContext, failure: &StageFailure) {
        ctx.set_failure(failure.clone());

        if let Err(error_failure) = self.stage(PipelineState::Error, FilterKind::Error, ctx).await {
            error!(
                request_id = %ctx.id(),
                cause = %error_failure.cause,
                "error stage itself failed"
            );
            self.events.try_emit(
                "pipeline.error_stage.failed",
                Some(serde_json::json!({
                    "request_id": ctx.id().to_string(),
                    "status": error_failure.status_code,
                    "cause": error_failure.cause,
                })),
            );
        }
    }

    /// Runs POST once after an ERROR branch taken from PRE or ROUTE.
    ///
    /// A failure here is treated independently of the one already recovered:
    /// it is captured and routed through ERROR again, and POST does not run
    /// a second time.
    async fn post_after_recovery(&self, ctx: &RequestContext) {
        if let Err(failure) = self.stage(PipelineState::Post, FilterKind::Post, ctx).await {
            self.recover(ctx, &failure).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::NoOpFilterRunner;

    #[test]
    fn test_state_display() {
        assert_eq!(PipelineState::Init.to_string(), "init");
        assert_eq!(PipelineState::Error.to_string(), "error");
    }

    #[test]
    fn test_only_done_is_terminal() {
        assert!(PipelineState::Done.is_terminal());
        assert!(!PipelineState::Pre.is_terminal());
        assert!(!PipelineState::Error.is_terminal());
    }

    #[tokio::test]
    async fn test_noop_run_succeeds_and_clears() {
        let executor = PipelineExecutor::new(Arc::new(NoOpFilterRunner));
        let ctx = RequestContext::new();
        ctx.set("request", serde_json::json!({"path": "/ping"}));

        let outcome = executor.run(&ctx).await;

        assert!(outcome.success);
        assert!(outcome.failure.is_none());
        assert!(ctx.is_empty());
        assert!(!ctx.engine_ran());
    }
}
