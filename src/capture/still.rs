use anyhow::{bail, Context, Result};
use std::path::PathBuf;
use tracing::info;

use super::source::{CaptureSource, Frame};

/// Serves a single image file for every capture
pub struct StillImageSource {
    path: PathBuf,
    frame: Option<Frame>,
}

impl StillImageSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            frame: None,
        }
    }
}

#[async_trait::async_trait]
impl CaptureSource for StillImageSource {
    async fn acquire(&mut self) -> Result<()> {
        if self.frame.is_some() {
            return Ok(());
        }

        let path = self.path.clone();
        let image = tokio::task::spawn_blocking(move || image::open(&path))
            .await
            .context("Image loading task panicked")?
            .with_context(|| format!("Failed to open still image: {}", self.path.display()))?
            .to_rgb8();

        info!(
            "Still image source acquired: {} ({}x{})",
            self.path.display(),
            image.width(),
            image.height()
        );

        self.frame = Some(Frame::new(image));
        Ok(())
    }

    fn is_active(&self) -> bool {
        self.frame.is_some()
    }

    async fn capture_frame(&mut self) -> Result<Frame> {
        match &self.frame {
            Some(frame) => Ok(frame.clone()),
            None => bail!("still image source not acquired"),
        }
    }

    fn release(&mut self) {
        if self.frame.take().is_some() {
            info!("Still image source released: {}", self.path.display());
        }
    }

    fn name(&self) -> &str {
        "still image"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_acquire_loads_file_and_release_drops_it() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("face.png");
        RgbImage::new(8, 6).save(&path)?;

        let mut source = StillImageSource::new(&path);
        assert!(!source.is_active());

        source.acquire().await?;
        assert!(source.is_active());
        let frame = source.capture_frame().await?;
        assert_eq!((frame.width(), frame.height()), (8, 6));

        source.release();
        source.release();
        assert!(!source.is_active());
        assert!(source.capture_frame().await.is_err());

        Ok(())
    }

    #[tokio::test]
    async fn test_missing_file_fails_acquire() {
        let mut source = StillImageSource::new("/nonexistent/face.png");
        assert!(source.acquire().await.is_err());
        assert!(!source.is_active());
    }
}
