//! Practice session orchestration
//!
//! This module provides the `SessionController` that manages:
//! - Capture lifecycle (preview, recording, teardown)
//! - Periodic frame sampling and asynchronous classification
//! - The ordered, session-scoped sample history
//! - The elapsed-time display timer
//! - Report synthesis when a session stops

mod config;
mod controller;
mod events;
mod history;
mod sample;
mod sampler;
mod state;
mod stats;
mod ticker;
mod timer;

pub use config::SessionConfig;
pub use controller::SessionController;
pub use events::{EventBus, SessionEvent};
pub use history::{AppendOutcome, History};
pub use sample::Sample;
pub use state::{SessionClock, SessionState};
pub use stats::SessionStatus;
pub use ticker::Ticker;
pub use timer::format_elapsed;
