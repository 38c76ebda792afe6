use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::config::SessionConfig;
use super::events::{EventBus, SessionEvent};
use super::history::History;
use super::sample::Sample;
use super::sampler::FrameSampler;
use super::state::{SessionClock, SessionState};
use super::stats::SessionStatus;
use super::ticker::Ticker;
use super::timer::spawn_timer;
use crate::capture::{CaptureSource, FrameEncoder};
use crate::clients::{ClassificationClient, ReportClient};
use crate::error::SessionError;
use crate::report::{Report, Synthesizer};

/// State shared between the controller and its periodic tasks.
///
/// Lock order: `Shared` before the capture source, never the reverse.
pub(crate) struct Shared {
    pub(crate) state: SessionState,
    pub(crate) session_id: Option<Uuid>,
    pub(crate) started_at: Option<DateTime<Utc>>,
    pub(crate) clock: Option<SessionClock>,
    pub(crate) stopped_elapsed_ms: Option<u64>,
    pub(crate) history: Option<History>,
    pub(crate) tasks: Vec<Ticker>,
    pub(crate) dispatched: usize,
}

impl Shared {
    fn new() -> Self {
        Self {
            state: SessionState::Idle,
            session_id: None,
            started_at: None,
            clock: None,
            stopped_elapsed_ms: None,
            history: None,
            tasks: Vec::new(),
            dispatched: 0,
        }
    }

    /// True while `session_id` is the session currently recording
    pub(crate) fn is_recording(&self, session_id: Uuid) -> bool {
        self.state == SessionState::Recording && self.session_id == Some(session_id)
    }

    /// Cancel every running task; each is cancelled at most once
    fn cancel_tasks(&mut self) -> Vec<JoinHandle<()>> {
        let handles = self.tasks.iter_mut().filter_map(Ticker::cancel).collect();
        self.tasks.clear();
        handles
    }
}

/// Drives one practice session at a time.
///
/// Owns the capture source exclusively: acquired by `preview`, released by
/// `dispose` or on drop, and kept across `stop` so a new session can start
/// without re-acquiring.
pub struct SessionController {
    config: SessionConfig,
    encoder: FrameEncoder,
    capture: Arc<Mutex<Box<dyn CaptureSource>>>,
    classifier: Arc<dyn ClassificationClient>,
    reporter: Arc<dyn ReportClient>,
    synthesizer: Synthesizer,
    shared: Arc<Mutex<Shared>>,
    events: EventBus,
}

impl SessionController {
    pub fn new(
        config: SessionConfig,
        encoder: FrameEncoder,
        capture: Box<dyn CaptureSource>,
        classifier: Arc<dyn ClassificationClient>,
        reporter: Arc<dyn ReportClient>,
        synthesizer: Synthesizer,
    ) -> Self {
        info!(
            "Session controller created (capture: {}, sample every {}ms, timer every {}ms)",
            capture.name(),
            config.sample_interval_ms,
            config.timer_interval_ms
        );

        let events = EventBus::new(config.event_buffer);

        Self {
            config,
            encoder,
            capture: Arc::new(Mutex::new(capture)),
            classifier,
            reporter,
            synthesizer,
            shared: Arc::new(Mutex::new(Shared::new())),
            events,
        }
    }

    /// Subscribe to session events
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub fn synthesizer(&self) -> &Synthesizer {
        &self.synthesizer
    }

    pub async fn state(&self) -> SessionState {
        self.shared.lock().await.state
    }

    /// Ordered samples of the current (or frozen) history
    pub async fn history(&self) -> Vec<Sample> {
        let shared = self.shared.lock().await;
        shared
            .history
            .as_ref()
            .map(|history| history.samples().to_vec())
            .unwrap_or_default()
    }

    pub async fn status(&self) -> SessionStatus {
        let shared = self.shared.lock().await;
        let elapsed_ms = match (shared.state, shared.clock, shared.stopped_elapsed_ms) {
            (SessionState::Recording, Some(clock), _) => clock.elapsed_ms(),
            (_, _, Some(frozen)) => frozen,
            _ => 0,
        };

        SessionStatus {
            state: shared.state,
            session_id: shared.session_id,
            started_at: shared.started_at,
            elapsed_ms,
            sample_count: shared.history.as_ref().map(History::len).unwrap_or(0),
            dispatched_count: shared.dispatched,
        }
    }

    /// Acquire the capture source (Idle → Previewing). No-op once held.
    pub async fn preview(&self) -> Result<(), SessionError> {
        let mut shared = self.shared.lock().await;
        if shared.state != SessionState::Idle {
            debug!("Capture already held ({})", shared.state);
            return Ok(());
        }

        {
            let mut capture = self.capture.lock().await;
            capture.acquire().await.map_err(SessionError::Capture)?;
            info!("Capture source acquired: {}", capture.name());
        }

        shared.state = SessionState::Previewing;
        drop(shared);

        self.events.emit(SessionEvent::StateChanged {
            state: SessionState::Previewing,
        });
        Ok(())
    }

    /// Start a new session with an empty history.
    ///
    /// Needs an active capture source; otherwise fails with `Precondition`
    /// and the state is left untouched.
    pub async fn start(&self) -> Result<Uuid, SessionError> {
        let mut shared = self.shared.lock().await;

        match shared.state {
            SessionState::Recording => {
                warn!("Recording already started");
                return Err(SessionError::InvalidState {
                    operation: "start",
                    state: shared.state,
                });
            }
            SessionState::Idle => {
                return Err(SessionError::Precondition(
                    "capture source not ready".to_string(),
                ));
            }
            SessionState::Previewing | SessionState::Stopped => {}
        }

        if !self.capture.lock().await.is_active() {
            return Err(SessionError::Precondition(
                "capture source not ready".to_string(),
            ));
        }

        let session_id = Uuid::new_v4();
        let clock = SessionClock::start();

        info!("Starting practice session: {}", session_id);

        shared.session_id = Some(session_id);
        shared.started_at = Some(Utc::now());
        shared.clock = Some(clock);
        shared.stopped_elapsed_ms = None;
        shared.history = Some(History::new(session_id));
        shared.dispatched = 0;
        shared.state = SessionState::Recording;

        let timer = spawn_timer(
            session_id,
            clock,
            Arc::clone(&self.shared),
            self.events.clone(),
            self.config.timer_interval(),
        );

        let sampler = FrameSampler {
            session_id,
            clock,
            capture: Arc::clone(&self.capture),
            encoder: self.encoder,
            classifier: Arc::clone(&self.classifier),
            shared: Arc::clone(&self.shared),
            events: self.events.clone(),
        }
        .spawn(self.config.sample_interval());

        shared.tasks = vec![timer, sampler];
        drop(shared);

        self.events.emit(SessionEvent::StateChanged {
            state: SessionState::Recording,
        });

        Ok(session_id)
    }

    /// Stop recording, freeze the history and build the report.
    ///
    /// The state change and task cancellation happen under one lock, so no
    /// tick observes `Recording` afterwards. Classification replies still in
    /// flight are dropped by the append guard. Calling `stop` when not
    /// recording fails with `InvalidState` and touches nothing.
    pub async fn stop(&self) -> Result<Report, SessionError> {
        let (history, handles) = {
            let mut shared = self.shared.lock().await;
            if shared.state != SessionState::Recording {
                warn!("Recording not active ({})", shared.state);
                return Err(SessionError::InvalidState {
                    operation: "stop",
                    state: shared.state,
                });
            }

            shared.state = SessionState::Stopped;
            shared.stopped_elapsed_ms = shared.clock.map(|clock| clock.elapsed_ms());
            let handles = shared.cancel_tasks();

            let session_id = shared.session_id.unwrap_or_else(Uuid::nil);
            let history = match shared.history.as_mut() {
                Some(history) => {
                    history.freeze();
                    history.clone()
                }
                None => History::new(session_id),
            };

            (history, handles)
        };

        for handle in handles {
            if let Err(e) = handle.await {
                error!("Session task panicked: {}", e);
            }
        }

        info!(
            "Practice session {} stopped: {} samples",
            history.session_id(),
            history.len()
        );

        self.events.emit(SessionEvent::StateChanged {
            state: SessionState::Stopped,
        });

        match self
            .synthesizer
            .synthesize(&history, self.reporter.as_ref())
            .await
        {
            Ok(report) => {
                self.events.emit(SessionEvent::ReportReady {
                    report: Box::new(report.clone()),
                });
                Ok(report)
            }
            Err(e) => {
                self.discard(history.session_id(), &e).await;
                Err(e)
            }
        }
    }

    /// Tear down: cancel tasks, drop the history, release capture (→ Idle)
    pub async fn dispose(&self) {
        let handles = {
            let mut shared = self.shared.lock().await;
            if shared.state == SessionState::Idle {
                return;
            }

            let handles = shared.cancel_tasks();
            shared.state = SessionState::Idle;
            shared.history = None;
            shared.clock = None;

            let mut capture = self.capture.lock().await;
            capture.release();
            info!("Capture source released: {}", capture.name());

            handles
        };

        for handle in handles {
            if let Err(e) = handle.await {
                error!("Session task panicked: {}", e);
            }
        }

        self.events.emit(SessionEvent::StateChanged {
            state: SessionState::Idle,
        });
    }

    /// Failed report: the session cannot be recovered, drop its history
    async fn discard(&self, session_id: Uuid, reason: &SessionError) {
        {
            let mut shared = self.shared.lock().await;
            if shared.state == SessionState::Stopped && shared.session_id == Some(session_id) {
                shared.history = None;
            }
        }

        warn!("Practice session {} discarded: {}", session_id, reason);
        self.events.emit(SessionEvent::SessionDiscarded {
            reason: reason.to_string(),
        });
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        let held = match self.shared.try_lock() {
            Ok(mut shared) => {
                // Dropped join handles detach; the cancelled tasks exit on their own
                let _ = shared.cancel_tasks();
                let held = shared.state != SessionState::Idle;
                shared.state = SessionState::Idle;
                held
            }
            Err(_) => true,
        };

        if !held {
            return;
        }

        match self.capture.try_lock() {
            Ok(mut capture) => {
                capture.release();
                info!("Capture source released on drop: {}", capture.name());
            }
            Err(_) => warn!("Capture source busy during drop; not released"),
        }
    }
}
