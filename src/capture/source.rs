use anyhow::{Context, Result};
use image::RgbImage;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::pushed::{FramePusher, PushedFrameSource};
use super::still::StillImageSource;

/// One still frame grabbed from the capture device
#[derive(Debug, Clone)]
pub struct Frame {
    /// Raw RGB pixels; shared so repeated captures of the same image are cheap
    pub image: Arc<RgbImage>,
}

impl Frame {
    pub fn new(image: RgbImage) -> Self {
        Self {
            image: Arc::new(image),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// Which capture backend to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureKind {
    /// Frames pushed by the client that owns the camera
    Pushed,
    /// A fixed image file served for every capture
    Still,
}

/// Configuration for frame capture and encoding
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    pub source: CaptureKind,

    /// Image file for `CaptureKind::Still`
    pub still_path: Option<String>,

    /// Target resolution sent to the classifier
    pub width: u32,
    pub height: u32,

    /// Lossy encoding quality, 0.0-1.0
    pub jpeg_quality: f32,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            source: CaptureKind::Pushed,
            still_path: None,
            width: 640,
            height: 480,
            jpeg_quality: 0.8,
        }
    }
}

/// Camera-like frame source
///
/// Implementations:
/// - Pushed: latest frame uploaded by the presentation client
/// - Still: one image file (demos and offline runs)
#[async_trait::async_trait]
pub trait CaptureSource: Send + Sync {
    /// Acquire the device. Calling it again while held is a no-op.
    async fn acquire(&mut self) -> Result<()>;

    /// Acquired and able to produce a frame right now
    fn is_active(&self) -> bool;

    /// Grab the current frame
    async fn capture_frame(&mut self) -> Result<Frame>;

    /// Release the device. Synchronous so it can run from `Drop`; repeated
    /// calls are no-ops.
    fn release(&mut self);

    /// Backend name for logging
    fn name(&self) -> &str;
}

/// Capture source plus the push handle when the source takes uploads
pub struct CaptureHandles {
    pub source: Box<dyn CaptureSource>,
    pub pusher: Option<FramePusher>,
}

/// Capture source factory
pub struct CaptureSourceFactory;

impl CaptureSourceFactory {
    pub fn create(config: &CaptureConfig) -> Result<CaptureHandles> {
        match config.source {
            CaptureKind::Pushed => {
                let (source, pusher) = PushedFrameSource::new();
                Ok(CaptureHandles {
                    source: Box::new(source),
                    pusher: Some(pusher),
                })
            }

            CaptureKind::Still => {
                let path = config
                    .still_path
                    .as_deref()
                    .context("capture.still_path is required for the still source")?;
                Ok(CaptureHandles {
                    source: Box::new(StillImageSource::new(path)),
                    pusher: None,
                })
            }
        }
    }
}
