use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tokio::time::Instant;

/// Lifecycle of a practice session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// No capture resource held
    Idle,
    /// Capture resource acquired, not recording
    Previewing,
    /// Sampler and timer running, history accepting samples
    Recording,
    /// Tasks cancelled, history frozen
    Stopped,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Idle => "idle",
            SessionState::Previewing => "previewing",
            SessionState::Recording => "recording",
            SessionState::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// Monotonic session clock anchored at `start()`.
///
/// Uses tokio's `Instant` so paused-time tests drive it deterministically.
#[derive(Debug, Clone, Copy)]
pub struct SessionClock {
    started: Instant,
}

impl SessionClock {
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed().as_millis() as u64
    }
}
