// Test doubles for the capture device and the analysis services

#![allow(dead_code)]

use anyhow::{bail, Result};
use image::{Rgb, RgbImage};
use practice_coach::capture::{CaptureSource, EncodedFrame, Frame, FrameEncoder};
use practice_coach::clients::{
    ChartReference, Classification, ClassificationClient, Personality, ReportClient,
    SimilarityClient, SimilarityResult,
};
use practice_coach::emotion::{Emotion, EmotionDistribution};
use practice_coach::error::ClientError;
use practice_coach::report::Synthesizer;
use practice_coach::session::{Sample, SessionConfig, SessionController};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Counters shared with a `FakeCamera` after it is boxed into the controller
#[derive(Debug, Default)]
pub struct CameraCounters {
    pub acquired: AtomicUsize,
    pub released: AtomicUsize,
    pub captured: AtomicUsize,
}

/// Camera that always has a frame once acquired (unless built `blind`)
pub struct FakeCamera {
    counters: Arc<CameraCounters>,
    acquired: bool,
    has_frame: bool,
    capture_delay: Duration,
}

impl FakeCamera {
    pub fn new() -> (Self, Arc<CameraCounters>) {
        let counters = Arc::new(CameraCounters::default());
        (
            Self {
                counters: Arc::clone(&counters),
                acquired: false,
                has_frame: true,
                capture_delay: Duration::ZERO,
            },
            counters,
        )
    }

    /// Acquires fine but never produces a frame
    pub fn blind() -> (Self, Arc<CameraCounters>) {
        let (mut camera, counters) = Self::new();
        camera.has_frame = false;
        (camera, counters)
    }

    /// Each capture takes `delay` before the frame comes back
    pub fn slow(delay: Duration) -> (Self, Arc<CameraCounters>) {
        let (mut camera, counters) = Self::new();
        camera.capture_delay = delay;
        (camera, counters)
    }
}

#[async_trait::async_trait]
impl CaptureSource for FakeCamera {
    async fn acquire(&mut self) -> Result<()> {
        if !self.acquired {
            self.acquired = true;
            self.counters.acquired.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }

    fn is_active(&self) -> bool {
        self.acquired && self.has_frame
    }

    async fn capture_frame(&mut self) -> Result<Frame> {
        if !self.is_active() {
            bail!("camera inactive");
        }
        if !self.capture_delay.is_zero() {
            tokio::time::sleep(self.capture_delay).await;
        }
        self.counters.captured.fetch_add(1, Ordering::SeqCst);
        Ok(test_frame())
    }

    fn release(&mut self) {
        if self.acquired {
            self.acquired = false;
            self.counters.released.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn name(&self) -> &str {
        "fake camera"
    }
}

pub fn test_frame() -> Frame {
    Frame::new(RgbImage::from_pixel(16, 12, Rgb([180, 140, 120])))
}

pub fn classification(dominant: Emotion, confidence: f64) -> Classification {
    Classification {
        emotion_distribution: EmotionDistribution::new()
            .with(dominant, confidence)
            .with(Emotion::Neutral, 100.0 - confidence),
        dominant_emotion: dominant,
        confidence_score: confidence,
    }
}

/// One scripted reply: how long the service takes and what it answers
pub struct Reply {
    pub delay: Duration,
    pub result: Result<Classification, ClientError>,
}

impl Reply {
    pub fn ok(delay_ms: u64, confidence: f64) -> Self {
        Self {
            delay: Duration::from_millis(delay_ms),
            result: Ok(classification(Emotion::Happy, confidence)),
        }
    }

    pub fn err(delay_ms: u64) -> Self {
        Self {
            delay: Duration::from_millis(delay_ms),
            result: Err(ClientError::Network("connection reset".to_string())),
        }
    }
}

/// Answers calls from a script, in call order
pub struct ScriptedClassifier {
    script: Mutex<VecDeque<Reply>>,
    pub calls: AtomicUsize,
}

impl ScriptedClassifier {
    pub fn new(replies: Vec<Reply>) -> Self {
        Self {
            script: Mutex::new(replies.into()),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait::async_trait]
impl ClassificationClient for ScriptedClassifier {
    async fn classify(&self, _frame: &EncodedFrame) -> Result<Classification, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let reply = self.script.lock().unwrap().pop_front();

        match reply {
            Some(reply) => {
                tokio::time::sleep(reply.delay).await;
                reply.result
            }
            None => Err(ClientError::Rejected("script exhausted".to_string())),
        }
    }
}

/// Chart renderer that records what it was asked to draw
pub struct FakeReporter {
    fail: bool,
    pub calls: AtomicUsize,
    pub rendered: Mutex<Vec<u64>>,
}

impl FakeReporter {
    pub fn ok() -> Self {
        Self {
            fail: false,
            calls: AtomicUsize::new(0),
            rendered: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::ok()
        }
    }
}

pub const CHART: &str = "/static/reports/chart-1.png";

#[async_trait::async_trait]
impl ReportClient for FakeReporter {
    async fn render_chart(&self, history: &[Sample]) -> Result<ChartReference, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.rendered.lock().unwrap() = history.iter().map(Sample::captured_at_ms).collect();

        if self.fail {
            return Err(ClientError::Api(500, "renderer crashed".to_string()));
        }
        Ok(ChartReference(CHART.to_string()))
    }
}

/// Similarity service that is never reachable
pub struct OfflineSimilarity;

#[async_trait::async_trait]
impl SimilarityClient for OfflineSimilarity {
    async fn analyze(&self, _image: &EncodedFrame) -> Result<SimilarityResult, ClientError> {
        Err(ClientError::Network("offline".to_string()))
    }
}

/// Similarity service that remembers the size of the last upload
#[derive(Default)]
pub struct RecordingSimilarity {
    pub seen: Mutex<Option<(u32, u32)>>,
}

#[async_trait::async_trait]
impl SimilarityClient for RecordingSimilarity {
    async fn analyze(&self, image: &EncodedFrame) -> Result<SimilarityResult, ClientError> {
        *self.seen.lock().unwrap() = Some((image.width, image.height));
        Ok(SimilarityResult {
            personality: Personality {
                main_trait: "calm".to_string(),
                score: 80.0,
            },
            similar_animals: Vec::new(),
            result_title: None,
        })
    }
}

pub fn small_encoder() -> FrameEncoder {
    FrameEncoder::new(16, 12, 0.8)
}

pub fn controller(
    camera: FakeCamera,
    classifier: Arc<ScriptedClassifier>,
    reporter: Arc<FakeReporter>,
) -> SessionController {
    SessionController::new(
        SessionConfig::default(),
        small_encoder(),
        Box::new(camera),
        classifier,
        reporter,
        Synthesizer::default(),
    )
}

pub fn sample(captured_at_ms: u64, confidence: f64) -> Sample {
    Sample::new(
        captured_at_ms,
        EmotionDistribution::new()
            .with(Emotion::Happy, confidence)
            .with(Emotion::Neutral, 100.0 - confidence),
        Emotion::Happy,
        confidence,
    )
    .unwrap()
}
