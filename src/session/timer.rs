use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::controller::Shared;
use super::events::{EventBus, SessionEvent};
use super::state::SessionClock;
use super::ticker::Ticker;

/// `mm:ss`, floored to whole seconds; minutes keep counting past 59
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Publishes the elapsed session time every `period`. Display only.
pub(crate) fn spawn_timer(
    session_id: Uuid,
    clock: SessionClock,
    shared: Arc<Mutex<Shared>>,
    events: EventBus,
    period: Duration,
) -> Ticker {
    Ticker::spawn("Session timer", period, move || {
        let shared = Arc::clone(&shared);
        let events = events.clone();
        async move {
            if !shared.lock().await.is_recording(session_id) {
                return ControlFlow::Break(());
            }

            let elapsed = clock.elapsed();
            events.emit(SessionEvent::Elapsed {
                elapsed_ms: elapsed.as_millis() as u64,
                display: format_elapsed(elapsed),
            });

            ControlFlow::Continue(())
        }
    })
}
