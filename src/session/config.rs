use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Cadences and buffering for a practice session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Period of the frame sampler
    /// Default: 2000 ms
    pub sample_interval_ms: u64,

    /// Period of the elapsed-time display
    /// Default: 1000 ms
    pub timer_interval_ms: u64,

    /// Capacity of the event broadcast channel; slow subscribers skip ahead
    pub event_buffer: usize,
}

impl SessionConfig {
    pub fn sample_interval(&self) -> Duration {
        Duration::from_millis(self.sample_interval_ms)
    }

    pub fn timer_interval(&self) -> Duration {
        Duration::from_millis(self.timer_interval_ms)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            sample_interval_ms: 2000,
            timer_interval_ms: 1000,
            event_buffer: 64,
        }
    }
}
