use crate::emotion::{Emotion, EmotionDistribution};
use anyhow::{bail, Result};
use serde::Serialize;

/// One timestamped classification result.
///
/// Fields are private so a `Sample` cannot change after it is recorded; the
/// constructor enforces the confidence range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sample {
    /// Milliseconds since the session started, taken when the frame was grabbed
    captured_at_ms: u64,

    /// Per-emotion probabilities reported by the classifier
    emotion_distribution: EmotionDistribution,

    /// Label the classifier considered dominant
    dominant_emotion: Emotion,

    /// Classifier confidence, 0-100
    confidence_score: f64,
}

impl Sample {
    pub fn new(
        captured_at_ms: u64,
        emotion_distribution: EmotionDistribution,
        dominant_emotion: Emotion,
        confidence_score: f64,
    ) -> Result<Self> {
        if !(0.0..=100.0).contains(&confidence_score) {
            bail!(
                "confidence score {} outside 0-100 (captured at {}ms)",
                confidence_score,
                captured_at_ms
            );
        }

        Ok(Self {
            captured_at_ms,
            emotion_distribution,
            dominant_emotion,
            confidence_score,
        })
    }

    pub fn captured_at_ms(&self) -> u64 {
        self.captured_at_ms
    }

    pub fn emotion_distribution(&self) -> &EmotionDistribution {
        &self.emotion_distribution
    }

    pub fn dominant_emotion(&self) -> Emotion {
        self.dominant_emotion
    }

    pub fn confidence_score(&self) -> f64 {
        self.confidence_score
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_out_of_range_confidence() {
        let dist = EmotionDistribution::single(Emotion::Happy);
        assert!(Sample::new(0, dist.clone(), Emotion::Happy, 100.5).is_err());
        assert!(Sample::new(0, dist.clone(), Emotion::Happy, -1.0).is_err());
        assert!(Sample::new(0, dist.clone(), Emotion::Happy, f64::NAN).is_err());
        assert!(Sample::new(0, dist, Emotion::Happy, 100.0).is_ok());
    }
}
