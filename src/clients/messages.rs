use serde::{Deserialize, Serialize};

use crate::emotion::{Emotion, EmotionDistribution};
use crate::report::Timeline;
use crate::session::Sample;

/// Classification request: one encoded still
#[derive(Debug, Serialize, Deserialize)]
pub struct ClassifyRequest {
    /// `data:image/jpeg;base64,...`
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

/// Classification reply envelope
#[derive(Debug, Serialize, Deserialize)]
pub struct ClassifyResponse {
    #[serde(default)]
    pub success: bool,
    pub emotion: Option<Classification>,
    pub error: Option<String>,
}

/// Classifier output for one frame
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Classification {
    #[serde(rename = "emotions", alias = "emotion_distribution")]
    pub emotion_distribution: EmotionDistribution,
    pub dominant_emotion: Emotion,
    pub confidence_score: f64,
}

impl Classification {
    /// Attach the capture timestamp; fails when the score is out of range
    pub fn into_sample(self, captured_at_ms: u64) -> anyhow::Result<Sample> {
        Sample::new(
            captured_at_ms,
            self.emotion_distribution,
            self.dominant_emotion,
            self.confidence_score,
        )
    }
}

/// One history row as the report service expects it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Milliseconds since session start
    pub timestamp: u64,
    pub emotions: EmotionDistribution,
    pub dominant_emotion: Emotion,
    pub confidence_score: f64,
}

impl From<&Sample> for HistoryEntry {
    fn from(sample: &Sample) -> Self {
        Self {
            timestamp: sample.captured_at_ms(),
            emotions: sample.emotion_distribution().clone(),
            dominant_emotion: sample.dominant_emotion(),
            confidence_score: sample.confidence_score(),
        }
    }
}

/// Chart rendering request: the full ordered history
#[derive(Debug, Serialize, Deserialize)]
pub struct ChartRequest {
    pub emotion_history: Vec<HistoryEntry>,
    pub timeline: Timeline,
}

impl ChartRequest {
    pub fn from_history(history: &[Sample]) -> Self {
        Self {
            emotion_history: history.iter().map(HistoryEntry::from).collect(),
            timeline: Timeline::from_samples(history),
        }
    }
}

/// Chart rendering reply envelope
#[derive(Debug, Serialize, Deserialize)]
pub struct ChartResponse {
    #[serde(default)]
    pub success: bool,
    /// Where the rendered chart lives (URL or path)
    pub report_image: Option<String>,
    pub error: Option<String>,
}

/// Similarity request for the NATS/JSON transports
#[derive(Debug, Serialize, Deserialize)]
pub struct SimilarityRequest {
    pub image: String,
}

/// Personality read from a single photo
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Personality {
    pub main_trait: String,
    pub score: f64,
}

/// One look-alike match
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimilarAnimal {
    pub name: String,
    pub image: String,
    pub similarity: f64,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// Similarity reply envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimilarityResponse {
    #[serde(default)]
    pub success: bool,
    pub personality: Option<Personality>,
    #[serde(default, alias = "similar_faces")]
    pub similar_animals: Vec<SimilarAnimal>,
    pub result_title: Option<String>,
    pub error: Option<String>,
}

/// Error body returned by the services on non-2xx replies
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
