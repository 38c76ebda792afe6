use anyhow::{Context, Result};
use base64::Engine;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::RgbImage;

use super::source::{CaptureConfig, Frame};

/// A frame in its transfer representation
#[derive(Debug, Clone)]
pub struct EncodedFrame {
    /// `data:image/jpeg;base64,...`
    pub data_url: String,
    pub width: u32,
    pub height: u32,
    /// Size of the JPEG payload before base64
    pub byte_len: usize,
}

impl EncodedFrame {
    /// Raw JPEG bytes (for multipart uploads)
    pub fn jpeg_bytes(&self) -> Result<Vec<u8>> {
        let payload = self
            .data_url
            .split_once(',')
            .map(|(_, payload)| payload)
            .unwrap_or(&self.data_url);

        base64::engine::general_purpose::STANDARD
            .decode(payload)
            .context("Encoded frame is not valid base64")
    }
}

/// Resizes frames to the target resolution and JPEG-encodes them
#[derive(Debug, Clone, Copy)]
pub struct FrameEncoder {
    width: u32,
    height: u32,
    quality: u8,
}

impl FrameEncoder {
    /// `quality` is 0.0-1.0, mapped onto the JPEG 1-100 scale
    pub fn new(width: u32, height: u32, quality: f32) -> Self {
        let quality = (quality * 100.0).round().clamp(1.0, 100.0) as u8;
        Self {
            width: width.max(1),
            height: height.max(1),
            quality,
        }
    }

    pub fn from_config(config: &CaptureConfig) -> Self {
        Self::new(config.width, config.height, config.jpeg_quality)
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }

    /// Resize to the target resolution and encode
    pub fn encode(&self, frame: &Frame) -> Result<EncodedFrame> {
        if frame.width() == self.width && frame.height() == self.height {
            return self.encode_image(&frame.image);
        }

        let resized = imageops::resize(&*frame.image, self.width, self.height, FilterType::Triangle);
        self.encode_image(&resized)
    }

    /// Encode at the frame's own dimensions, for uploads that must not be reshaped
    pub fn encode_native(&self, frame: &Frame) -> Result<EncodedFrame> {
        self.encode_image(&frame.image)
    }

    fn encode_image(&self, image: &RgbImage) -> Result<EncodedFrame> {
        let mut jpeg = Vec::new();
        JpegEncoder::new_with_quality(&mut jpeg, self.quality)
            .encode_image(image)
            .context("Failed to JPEG-encode frame")?;

        let data_url = format!(
            "data:image/jpeg;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(&jpeg)
        );

        Ok(EncodedFrame {
            data_url,
            width: image.width(),
            height: image.height(),
            byte_len: jpeg.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quality_mapping() {
        assert_eq!(FrameEncoder::new(640, 480, 0.8).quality(), 80);
        assert_eq!(FrameEncoder::new(640, 480, 0.0).quality(), 1);
        assert_eq!(FrameEncoder::new(640, 480, 1.5).quality(), 100);
    }

    #[test]
    fn test_encode_resizes_to_target() {
        let encoder = FrameEncoder::new(64, 48, 0.8);
        let encoded = encoder.encode(&Frame::new(RgbImage::new(320, 240))).unwrap();

        assert!(encoded.data_url.starts_with("data:image/jpeg;base64,"));
        assert_eq!((encoded.width, encoded.height), (64, 48));

        let bytes = encoded.jpeg_bytes().unwrap();
        assert_eq!(bytes.len(), encoded.byte_len);
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (64, 48));
    }

    #[test]
    fn test_encode_native_keeps_portrait_shape() {
        let encoder = FrameEncoder::new(640, 480, 0.8);
        let encoded = encoder
            .encode_native(&Frame::new(RgbImage::new(90, 160)))
            .unwrap();

        assert_eq!((encoded.width, encoded.height), (90, 160));
        let decoded = image::load_from_memory(&encoded.jpeg_bytes().unwrap()).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (90, 160));
    }
}
