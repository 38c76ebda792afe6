//! Error types for session orchestration and the external clients
//!
//! Per-sample failures never surface here; they are logged and absorbed by
//! the sampler. Only failures the user has to act on (restart the session)
//! propagate as `SessionError`.

use crate::session::SessionState;
use thiserror::Error;

/// Session-level failures surfaced to the user boundary
#[derive(Debug, Error)]
pub enum SessionError {
    /// Start attempted without an active capture resource
    #[error("precondition failed: {0}")]
    Precondition(String),

    /// Operation not valid in the current state
    #[error("invalid state: cannot {operation} while {state}")]
    InvalidState {
        operation: &'static str,
        state: SessionState,
    },

    /// Too few samples to build a report
    #[error("insufficient data: {count} samples collected, at least {required} required")]
    InsufficientData { count: usize, required: usize },

    /// Report client failed to render the chart
    #[error("report generation failed: {0:#}")]
    Report(anyhow::Error),

    /// Capture device could not be acquired
    #[error("capture failed: {0:#}")]
    Capture(anyhow::Error),
}

impl SessionError {
    /// Sample count carried by `InsufficientData`
    pub fn sample_count(&self) -> Option<usize> {
        match self {
            SessionError::InsufficientData { count, .. } => Some(*count),
            _ => None,
        }
    }
}

/// External collaborator errors
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network communication error
    #[error("Network error: {0}")]
    Network(String),

    /// Service returned a non-success status
    #[error("API error {0}: {1}")]
    Api(u16, String),

    /// Failed to parse the service response
    #[error("Parse error: {0}")]
    Parse(String),

    /// Service answered but refused the request (`{"error": ...}` body)
    #[error("Rejected: {0}")]
    Rejected(String),

    /// Report service refused for lack of samples
    #[error("Insufficient data: {0} samples")]
    InsufficientData(usize),

    /// No reply within the configured timeout
    #[error("Timed out after {0}s")]
    Timeout(u64),
}
