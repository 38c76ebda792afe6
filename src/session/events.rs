use super::state::SessionState;
use crate::emotion::Emotion;
use crate::report::Report;
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::debug;

/// Notifications for the presentation layer.
///
/// The core never renders anything itself; adapters subscribe and draw.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    StateChanged {
        state: SessionState,
    },
    Elapsed {
        elapsed_ms: u64,
        /// `mm:ss`
        display: String,
    },
    SampleRecorded {
        count: usize,
        captured_at_ms: u64,
        dominant_emotion: Emotion,
        label: String,
        emoji: String,
        confidence_score: f64,
    },
    SampleSkipped {
        captured_at_ms: u64,
        reason: String,
    },
    ReportReady {
        report: Box<Report>,
    },
    SessionDiscarded {
        reason: String,
    },
}

impl SessionEvent {
    /// Wire name of the variant, as used for the `type` tag
    pub fn kind(&self) -> &'static str {
        match self {
            SessionEvent::StateChanged { .. } => "state_changed",
            SessionEvent::Elapsed { .. } => "elapsed",
            SessionEvent::SampleRecorded { .. } => "sample_recorded",
            SessionEvent::SampleSkipped { .. } => "sample_skipped",
            SessionEvent::ReportReady { .. } => "report_ready",
            SessionEvent::SessionDiscarded { .. } => "session_discarded",
        }
    }
}

/// Cloneable publisher over a broadcast channel
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<SessionEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.tx.subscribe()
    }

    /// Publish; having no subscribers is fine
    pub fn emit(&self, event: SessionEvent) {
        if self.tx.send(event).is_err() {
            debug!("No event subscribers");
        }
    }
}
