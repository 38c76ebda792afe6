use super::state::SessionState;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Point-in-time view of the session for status queries
#[derive(Debug, Clone, Serialize)]
pub struct SessionStatus {
    /// Current lifecycle state
    pub state: SessionState,

    /// Id of the current (or last) session, if one was started
    pub session_id: Option<Uuid>,

    /// Wall-clock start of the current session
    pub started_at: Option<DateTime<Utc>>,

    /// Milliseconds since start while recording; frozen at stop
    pub elapsed_ms: u64,

    /// Samples held in the history
    pub sample_count: usize,

    /// Classification requests dispatched by the sampler
    pub dispatched_count: usize,
}
