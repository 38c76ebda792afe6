use serde::{Deserialize, Serialize};

use crate::emotion::Emotion;
use crate::session::Sample;

/// Chart series over a session, one point per sample
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    pub captured_at_ms: Vec<u64>,
    pub happy: Vec<f64>,
    pub neutral: Vec<f64>,
    pub fear: Vec<f64>,
    pub confidence: Vec<f64>,
}

impl Timeline {
    pub fn from_samples(samples: &[Sample]) -> Self {
        let mut timeline = Self::default();

        for sample in samples {
            let dist = sample.emotion_distribution();
            timeline.captured_at_ms.push(sample.captured_at_ms());
            timeline.happy.push(dist.probability(Emotion::Happy));
            timeline.neutral.push(dist.probability(Emotion::Neutral));
            timeline.fear.push(dist.probability(Emotion::Fear));
            timeline.confidence.push(sample.confidence_score());
        }

        timeline
    }

    pub fn len(&self) -> usize {
        self.captured_at_ms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.captured_at_ms.is_empty()
    }
}
