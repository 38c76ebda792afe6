use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::controller::Shared;
use super::events::{EventBus, SessionEvent};
use super::history::AppendOutcome;
use super::sample::Sample;
use super::state::SessionClock;
use super::ticker::Ticker;
use crate::capture::{CaptureSource, FrameEncoder};
use crate::clients::{Classification, ClassificationClient};
use crate::error::ClientError;

/// Periodically grabs a frame and sends it off for classification.
///
/// Ticks never wait for classification: each reply is handled by its own
/// task, so requests can overlap and complete in any order.
pub(crate) struct FrameSampler {
    pub(crate) session_id: Uuid,
    pub(crate) clock: SessionClock,
    pub(crate) capture: Arc<Mutex<Box<dyn CaptureSource>>>,
    pub(crate) encoder: FrameEncoder,
    pub(crate) classifier: Arc<dyn ClassificationClient>,
    pub(crate) shared: Arc<Mutex<Shared>>,
    pub(crate) events: EventBus,
}

impl FrameSampler {
    pub(crate) fn spawn(self, period: Duration) -> Ticker {
        let sampler = Arc::new(self);
        Ticker::spawn("Frame sampler", period, move || {
            let sampler = Arc::clone(&sampler);
            async move { sampler.tick().await }
        })
    }

    async fn tick(&self) -> ControlFlow<()> {
        if !self.shared.lock().await.is_recording(self.session_id) {
            return ControlFlow::Break(());
        }

        let (captured_at_ms, frame) = {
            let mut source = self.capture.lock().await;
            let captured_at_ms = self.clock.elapsed_ms();
            (captured_at_ms, source.capture_frame().await)
        };

        let frame = match frame {
            Ok(frame) => frame,
            Err(e) => {
                warn!("Frame capture failed at {}ms: {:#}", captured_at_ms, e);
                self.skip(captured_at_ms, format!("capture failed: {:#}", e));
                return ControlFlow::Continue(());
            }
        };

        let encoded = match self.encoder.encode(&frame) {
            Ok(encoded) => encoded,
            Err(e) => {
                warn!("Frame encoding failed at {}ms: {:#}", captured_at_ms, e);
                self.skip(captured_at_ms, format!("encoding failed: {:#}", e));
                return ControlFlow::Continue(());
            }
        };

        {
            // stop() may have landed while the capture was in flight
            let mut shared = self.shared.lock().await;
            if !shared.is_recording(self.session_id) {
                debug!(
                    "Session {} no longer recording, dropping frame captured at {}ms",
                    self.session_id, captured_at_ms
                );
                return ControlFlow::Break(());
            }
            shared.dispatched += 1;
        }

        debug!(
            "Dispatching frame captured at {}ms ({} bytes)",
            captured_at_ms, encoded.byte_len
        );

        let classifier = Arc::clone(&self.classifier);
        let shared = Arc::clone(&self.shared);
        let events = self.events.clone();
        let session_id = self.session_id;

        tokio::spawn(async move {
            let result = classifier.classify(&encoded).await;
            deliver(&shared, &events, session_id, captured_at_ms, result).await;
        });

        ControlFlow::Continue(())
    }

    fn skip(&self, captured_at_ms: u64, reason: String) {
        self.events.emit(SessionEvent::SampleSkipped {
            captured_at_ms,
            reason,
        });
    }
}

/// Handle one classification reply.
///
/// Failures are logged and skipped. Successes are appended only if
/// `session_id` is still the recording session at this moment.
pub(crate) async fn deliver(
    shared: &Mutex<Shared>,
    events: &EventBus,
    session_id: Uuid,
    captured_at_ms: u64,
    result: Result<Classification, ClientError>,
) -> AppendOutcome {
    let sample = match result
        .map_err(anyhow::Error::from)
        .and_then(|classification| classification.into_sample(captured_at_ms))
    {
        Ok(sample) => sample,
        Err(e) => {
            warn!(
                "Classification failed for frame at {}ms, skipping: {:#}",
                captured_at_ms, e
            );
            events.emit(SessionEvent::SampleSkipped {
                captured_at_ms,
                reason: format!("{:#}", e),
            });
            return AppendOutcome::Discarded;
        }
    };

    record_sample(shared, events, session_id, sample).await
}

/// Append guard: checks the session state at append time
pub(crate) async fn record_sample(
    shared: &Mutex<Shared>,
    events: &EventBus,
    session_id: Uuid,
    sample: Sample,
) -> AppendOutcome {
    let mut guard = shared.lock().await;

    if !guard.is_recording(session_id) {
        debug!(
            "Discarding late classification for session {} (captured at {}ms, state {})",
            session_id,
            sample.captured_at_ms(),
            guard.state
        );
        return AppendOutcome::Discarded;
    }

    let Some(history) = guard.history.as_mut() else {
        return AppendOutcome::Discarded;
    };

    let dominant_emotion = sample.dominant_emotion();
    let confidence_score = sample.confidence_score();
    let captured_at_ms = sample.captured_at_ms();

    let outcome = history.append(sample);
    if let AppendOutcome::Stored(_) = outcome {
        let count = history.len();
        info!(
            "Sample {} recorded at {}ms: {} ({:.1})",
            count, captured_at_ms, dominant_emotion, confidence_score
        );
        events.emit(SessionEvent::SampleRecorded {
            count,
            captured_at_ms,
            dominant_emotion,
            label: dominant_emotion.label().to_string(),
            emoji: dominant_emotion.emoji().to_string(),
            confidence_score,
        });
    }

    outcome
}
