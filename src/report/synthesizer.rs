use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{info, warn};
use uuid::Uuid;

use super::rubric::{Rubric, TipBook};
use super::timeline::Timeline;
use crate::clients::{ChartReference, ReportClient};
use crate::emotion::{Emotion, EmotionDistribution};
use crate::error::{ClientError, SessionError};
use crate::session::{History, Sample};

/// Fewest samples a report can be built from
pub const MIN_SAMPLES: usize = 3;

/// Length of the best-moments list (shorter histories return all samples)
pub const BEST_MOMENT_COUNT: usize = 3;

/// Rubric and tip tables
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub rubric: Rubric,
    pub tips: TipBook,
}

/// Everything derived from the samples alone
#[derive(Debug, Clone, Serialize)]
pub struct ReportSummary {
    pub grade: String,
    pub title: String,
    pub message: String,
    pub color: String,
    pub average_confidence: f64,
    pub dominant_emotion: Emotion,
    pub average_emotions: EmotionDistribution,
    pub tips: Vec<String>,
    pub best_moments: Vec<Sample>,
    pub sample_count: usize,
    pub timeline: Timeline,
}

/// Final performance report for one session
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub session_id: Uuid,
    #[serde(flatten)]
    pub summary: ReportSummary,
    pub chart_reference: ChartReference,
}

/// Turns a finished history into a report
#[derive(Debug, Clone, Default)]
pub struct Synthesizer {
    config: ReportConfig,
}

impl Synthesizer {
    pub fn new(config: ReportConfig) -> Self {
        Self { config }
    }

    pub fn rubric(&self) -> &Rubric {
        &self.config.rubric
    }

    /// Pure aggregation over `samples` (any order).
    ///
    /// Refuses with `InsufficientData` below `MIN_SAMPLES`; never returns a
    /// partial summary.
    pub fn summarize(&self, samples: &[Sample]) -> Result<ReportSummary, SessionError> {
        let count = samples.len();
        if count < MIN_SAMPLES {
            return Err(SessionError::InsufficientData {
                count,
                required: MIN_SAMPLES,
            });
        }

        let average_confidence = average_confidence(samples);
        let average_emotions =
            EmotionDistribution::mean(samples.iter().map(Sample::emotion_distribution));
        let dominant_emotion = average_emotions
            .dominant()
            .unwrap_or_else(|| most_frequent_dominant(samples));

        let band = self.config.rubric.band_for(average_confidence);
        let tips = self.config.tips.tips_for(dominant_emotion).to_vec();

        let mut ordered = samples.to_vec();
        ordered.sort_by_key(Sample::captured_at_ms);

        Ok(ReportSummary {
            grade: band.grade.clone(),
            title: band.title.clone(),
            message: band.message.clone(),
            color: band.color.clone(),
            average_confidence,
            dominant_emotion,
            average_emotions,
            tips,
            best_moments: best_moments(samples, BEST_MOMENT_COUNT),
            sample_count: count,
            timeline: Timeline::from_samples(&ordered),
        })
    }

    /// Summarize `history` and have the report client render its chart.
    ///
    /// The sample-count check runs before any request is made.
    pub async fn synthesize(
        &self,
        history: &History,
        client: &dyn ReportClient,
    ) -> Result<Report, SessionError> {
        let summary = self.summarize(history.samples())?;

        info!(
            "Synthesizing report for session {}: {} samples, average confidence {:.1}, grade {}",
            history.session_id(),
            summary.sample_count,
            summary.average_confidence,
            summary.grade
        );

        let chart_reference = client
            .render_chart(history.samples())
            .await
            .map_err(|e| {
                warn!("Chart rendering failed for session {}: {}", history.session_id(), e);
                match e {
                    ClientError::InsufficientData(count) => SessionError::InsufficientData {
                        count,
                        required: MIN_SAMPLES,
                    },
                    other => SessionError::Report(other.into()),
                }
            })?;

        Ok(Report {
            session_id: history.session_id(),
            summary,
            chart_reference,
        })
    }
}

/// Arithmetic mean of the confidence scores
pub fn average_confidence(samples: &[Sample]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    samples.iter().map(Sample::confidence_score).sum::<f64>() / samples.len() as f64
}

/// Top `limit` samples by confidence, highest first; ties go to the earlier capture
pub fn best_moments(samples: &[Sample], limit: usize) -> Vec<Sample> {
    let mut ranked: Vec<&Sample> = samples.iter().collect();
    ranked.sort_by(|a, b| {
        b.confidence_score()
            .total_cmp(&a.confidence_score())
            .then_with(|| a.captured_at_ms().cmp(&b.captured_at_ms()))
    });

    ranked.into_iter().take(limit).cloned().collect()
}

fn most_frequent_dominant(samples: &[Sample]) -> Emotion {
    let mut counts: BTreeMap<Emotion, usize> = BTreeMap::new();
    for sample in samples {
        *counts.entry(sample.dominant_emotion()).or_insert(0) += 1;
    }

    let mut best = (Emotion::Neutral, 0usize);
    for (emotion, count) in counts {
        if count > best.1 {
            best = (emotion, count);
        }
    }
    best.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(at: u64, confidence: f64, dominant: Emotion) -> Sample {
        Sample::new(at, EmotionDistribution::new(), dominant, confidence).unwrap()
    }

    #[test]
    fn test_mode_used_when_distributions_empty() {
        let samples = vec![
            sample(0, 60.0, Emotion::Sad),
            sample(2000, 60.0, Emotion::Surprise),
            sample(4000, 60.0, Emotion::Surprise),
        ];

        let summary = Synthesizer::default().summarize(&samples).unwrap();
        assert_eq!(summary.dominant_emotion, Emotion::Surprise);
    }

    #[test]
    fn test_best_moments_shorter_than_limit() {
        let samples = vec![sample(0, 10.0, Emotion::Happy), sample(5, 20.0, Emotion::Happy)];
        let best = best_moments(&samples, 3);
        assert_eq!(best.len(), 2);
        assert_eq!(best[0].confidence_score(), 20.0);
    }
}
