//! Error types for the gateflow core.
//!
//! Two containment domains share this taxonomy: sync-domain errors are
//! swallowed at the poll-cycle boundary and surface only through the event
//! sink, while request-domain errors are routed into the pipeline's ERROR
//! stage and never escape a run.

use thiserror::Error;

/// The main error type for gateflow operations.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Fetching descriptors from the filter source failed.
    #[error("filter source fetch failed: {0}")]
    Transport(String),

    /// Writing a filter artifact to disk failed.
    #[error("filter persistence failed for '{path}': {source}")]
    Persistence {
        /// The destination path of the failed write.
        path: String,
        /// The underlying IO failure.
        #[source]
        source: std::io::Error,
    },

    /// A declared failure raised by a pipeline stage.
    #[error("{0}")]
    Stage(#[from] StageFailure),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A generic internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// Returns the short kind name used to tag wrapped faults.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Transport(_) => "Transport",
            Self::Persistence { .. } => "Persistence",
            Self::Stage(_) => "Stage",
            Self::Io(_) => "Io",
            Self::Internal(_) => "Internal",
        }
    }

    /// Converts this error into a stage failure for the ERROR branch.
    ///
    /// Declared stage failures pass through unchanged. Anything else is an
    /// undeclared fault and is wrapped with status 500 and a cause tag naming
    /// the originating kind.
    #[must_use]
    pub fn into_stage_failure(self) -> StageFailure {
        match self {
            Self::Stage(failure) => failure,
            other => {
                let kind = other.kind_name();
                StageFailure::unhandled(kind, other.to_string())
            }
        }
    }
}

/// A declared failure raised during a PRE, ROUTE or POST stage.
///
/// Carries the severity reported to the client and a cause tag consumed by
/// the ERROR stage filters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} (status {status_code}, cause {cause})")]
pub struct StageFailure {
    /// The severity/status reported for this failure.
    pub status_code: u16,
    /// A short tag identifying the failure class.
    pub cause: String,
    /// Human-readable description.
    pub message: String,
}

impl StageFailure {
    /// Creates a new stage failure.
    #[must_use]
    pub fn new(status_code: u16, cause: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status_code,
            cause: cause.into(),
            message: message.into(),
        }
    }

    /// Wraps an undeclared fault with the fixed 500 severity.
    ///
    /// The cause tag records the originating fault's kind so ERROR filters
    /// can distinguish wrapped faults from declared failures.
    #[must_use]
    pub fn unhandled(kind: &str, message: impl Into<String>) -> Self {
        Self {
            status_code: 500,
            cause: format!("UNHANDLED_EXCEPTION_{kind}"),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_failure_display() {
        let failure = StageFailure::new(403, "FORBIDDEN", "blocked by policy");
        let rendered = failure.to_string();

        assert!(rendered.contains("blocked by policy"));
        assert!(rendered.contains("403"));
        assert!(rendered.contains("FORBIDDEN"));
    }

    #[test]
    fn test_unhandled_wrap_carries_kind_tag() {
        let failure = StageFailure::unhandled("Transport", "connection refused");

        assert_eq!(failure.status_code, 500);
        assert_eq!(failure.cause, "UNHANDLED_EXCEPTION_Transport");
    }

    #[test]
    fn test_into_stage_failure_passes_declared_through() {
        let declared = StageFailure::new(429, "RATE_LIMITED", "slow down");
        let err = GatewayError::Stage(declared.clone());

        assert_eq!(err.into_stage_failure(), declared);
    }

    #[test]
    fn test_into_stage_failure_wraps_undeclared() {
        let err = GatewayError::Transport("timed out".to_string());
        let failure = err.into_stage_failure();

        assert_eq!(failure.status_code, 500);
        assert_eq!(failure.cause, "UNHANDLED_EXCEPTION_Transport");
        assert!(failure.message.contains("timed out"));
    }

    #[test]
    fn test_kind_name() {
        assert_eq!(GatewayError::Internal("x".to_string()).kind_name(), "Internal");
        assert_eq!(
            GatewayError::Transport("x".to_string()).kind_name(),
            "Transport"
        );
    }
}
