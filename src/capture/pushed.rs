// Frames uploaded by the client that owns the camera
//
// In the browser flow the page holds the camera stream. It uploads frames to
// the server, and the sampler grabs whichever frame is newest when it ticks.

use anyhow::{anyhow, bail, Context, Result};
use base64::Engine;
use tokio::sync::watch;
use tracing::{debug, info};

use super::source::{CaptureSource, Frame};

/// Upload side of a `PushedFrameSource`
#[derive(Debug, Clone)]
pub struct FramePusher {
    tx: watch::Sender<Option<Frame>>,
}

impl FramePusher {
    /// Replace the latest frame
    pub fn push(&self, frame: Frame) {
        // send_replace works with zero receivers
        self.tx.send_replace(Some(frame));
    }

    /// Decode a `data:image/...;base64,` URL (or bare base64) and push it
    pub fn push_data_url(&self, data_url: &str) -> Result<()> {
        let frame = decode_data_url(data_url)?;
        debug!("Pushed frame {}x{}", frame.width(), frame.height());
        self.push(frame);
        Ok(())
    }
}

/// Latest-frame source fed by a `FramePusher`
pub struct PushedFrameSource {
    rx: watch::Receiver<Option<Frame>>,
    acquired: bool,
}

impl PushedFrameSource {
    pub fn new() -> (Self, FramePusher) {
        let (tx, rx) = watch::channel(None);
        (
            Self {
                rx,
                acquired: false,
            },
            FramePusher { tx },
        )
    }
}

#[async_trait::async_trait]
impl CaptureSource for PushedFrameSource {
    async fn acquire(&mut self) -> Result<()> {
        if !self.acquired {
            info!("Pushed frame source acquired");
            self.acquired = true;
        }
        Ok(())
    }

    fn is_active(&self) -> bool {
        self.acquired && self.rx.borrow().is_some()
    }

    async fn capture_frame(&mut self) -> Result<Frame> {
        if !self.acquired {
            bail!("pushed frame source not acquired");
        }

        self.rx
            .borrow_and_update()
            .clone()
            .ok_or_else(|| anyhow!("no frame pushed yet"))
    }

    fn release(&mut self) {
        if self.acquired {
            info!("Pushed frame source released");
            self.acquired = false;
        }
    }

    fn name(&self) -> &str {
        "pushed frames"
    }
}

/// Decode a `data:image/...;base64,` URL (or bare base64) into a frame
pub fn decode_data_url(data_url: &str) -> Result<Frame> {
    let payload = match data_url.split_once(',') {
        Some((header, payload)) if header.starts_with("data:") => payload,
        _ => data_url,
    };

    let bytes = base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .context("Frame is not valid base64")?;

    let image = image::load_from_memory(&bytes)
        .context("Frame is not a decodable image")?
        .to_rgb8();

    Ok(Frame::new(image))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::FrameEncoder;
    use image::RgbImage;

    #[tokio::test]
    async fn test_inactive_until_frame_pushed() {
        let (mut source, pusher) = PushedFrameSource::new();
        assert!(!source.is_active());

        source.acquire().await.unwrap();
        assert!(!source.is_active());
        assert!(source.capture_frame().await.is_err());

        pusher.push(Frame::new(RgbImage::new(4, 4)));
        assert!(source.is_active());
        assert_eq!(source.capture_frame().await.unwrap().width(), 4);

        source.release();
        assert!(!source.is_active());
    }

    #[tokio::test]
    async fn test_push_data_url_round_trips_encoder_output() {
        let (mut source, pusher) = PushedFrameSource::new();
        source.acquire().await.unwrap();

        let encoded = FrameEncoder::new(32, 24, 0.8)
            .encode(&Frame::new(RgbImage::new(64, 48)))
            .unwrap();
        pusher.push_data_url(&encoded.data_url).unwrap();

        let frame = source.capture_frame().await.unwrap();
        assert_eq!((frame.width(), frame.height()), (32, 24));
    }

    #[test]
    fn test_push_rejects_garbage() {
        let (_source, pusher) = PushedFrameSource::new();
        assert!(pusher.push_data_url("data:image/jpeg;base64,@@@").is_err());
    }
}
