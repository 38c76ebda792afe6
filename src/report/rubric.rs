use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::emotion::Emotion;

/// One threshold band of the grading rubric
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RubricBand {
    /// Lowest average confidence (inclusive) that earns this band
    pub min_confidence: f64,
    pub grade: String,
    pub title: String,
    pub message: String,
    /// CSS colour used by the presentation layer
    pub color: String,
}

impl RubricBand {
    fn new(min_confidence: f64, grade: &str, title: &str, message: &str, color: &str) -> Self {
        Self {
            min_confidence,
            grade: grade.to_string(),
            title: title.to_string(),
            message: message.to_string(),
            color: color.to_string(),
        }
    }
}

/// Ordered table mapping average confidence to grade and copy.
///
/// Bands are kept sorted by `min_confidence`, highest first. A score below
/// every threshold falls into the lowest band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<RubricBand>", into = "Vec<RubricBand>")]
pub struct Rubric {
    bands: Vec<RubricBand>,
}

impl Rubric {
    pub fn new(mut bands: Vec<RubricBand>) -> Result<Self> {
        if bands.is_empty() {
            bail!("rubric needs at least one band");
        }
        if bands.iter().any(|band| !band.min_confidence.is_finite()) {
            bail!("rubric thresholds must be finite numbers");
        }

        bands.sort_by(|a, b| b.min_confidence.total_cmp(&a.min_confidence));
        Ok(Self { bands })
    }

    /// Band for an average confidence score
    pub fn band_for(&self, score: f64) -> &RubricBand {
        let lowest = &self.bands[self.bands.len() - 1];
        self.bands
            .iter()
            .find(|band| score >= band.min_confidence)
            .unwrap_or(lowest)
    }

    pub fn bands(&self) -> &[RubricBand] {
        &self.bands
    }
}

impl Default for Rubric {
    fn default() -> Self {
        Self {
            bands: vec![
                RubricBand::new(
                    70.0,
                    "A",
                    "Confident delivery",
                    "You looked self-assured for most of the session.",
                    "#4CAF50",
                ),
                RubricBand::new(
                    50.0,
                    "B",
                    "Steady, with room to grow",
                    "Your composure held. A little more warmth will lift it further.",
                    "#FF9800",
                ),
                RubricBand::new(
                    0.0,
                    "C",
                    "Nerves showed through",
                    "Your expression looked tense at times. Keep practising!",
                    "#F44336",
                ),
            ],
        }
    }
}

impl TryFrom<Vec<RubricBand>> for Rubric {
    type Error = anyhow::Error;

    fn try_from(bands: Vec<RubricBand>) -> Result<Self> {
        Self::new(bands)
    }
}

impl From<Rubric> for Vec<RubricBand> {
    fn from(rubric: Rubric) -> Self {
        rubric.bands
    }
}

/// Canned advice keyed by the session's dominant emotion
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TipBook {
    pub by_emotion: HashMap<Emotion, Vec<String>>,
    /// Used for emotions without their own entry
    pub default: Vec<String>,
}

impl TipBook {
    pub fn tips_for(&self, emotion: Emotion) -> &[String] {
        self.by_emotion
            .get(&emotion)
            .map(Vec::as_slice)
            .unwrap_or(&self.default)
    }
}

fn tips(lines: &[&str]) -> Vec<String> {
    lines.iter().map(|line| line.to_string()).collect()
}

impl Default for TipBook {
    fn default() -> Self {
        let mut by_emotion = HashMap::new();
        by_emotion.insert(
            Emotion::Happy,
            tips(&[
                "Positive energy comes through clearly",
                "Keep this expression for the real interview or talk",
                "A smile builds a connection with your audience",
            ]),
        );
        by_emotion.insert(
            Emotion::Neutral,
            tips(&[
                "Your calm composure works well",
                "Add a smile at the key points",
                "Use changes of expression to underline your message",
            ]),
        );
        by_emotion.insert(
            Emotion::Fear,
            tips(&[
                "Take a deep breath and slow down",
                "Confidence grows with every repetition",
                "Picture the audience as friends",
                "You are doing better than you think",
            ]),
        );
        by_emotion.insert(
            Emotion::Surprise,
            tips(&[
                "Your expressions are lively",
                "Tone it down slightly and it will be spot on",
                "Save this expression for the important moments",
            ]),
        );

        Self {
            by_emotion,
            default: tips(&[
                "Practise smiling in front of a mirror",
                "Start each run with a positive mindset",
                "Try playing music you like while you practise",
            ]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_band_edges() {
        let rubric = Rubric::default();
        assert_eq!(rubric.band_for(70.0).grade, "A");
        assert_eq!(rubric.band_for(69.99).grade, "B");
        assert_eq!(rubric.band_for(50.0).grade, "B");
        assert_eq!(rubric.band_for(49.9).grade, "C");
        assert_eq!(rubric.band_for(0.0).grade, "C");
    }

    #[test]
    fn test_bands_sorted_on_construction() {
        let rubric = Rubric::new(vec![
            RubricBand::new(0.0, "low", "", "", "red"),
            RubricBand::new(80.0, "high", "", "", "green"),
            RubricBand::new(40.0, "mid", "", "", "orange"),
        ])
        .unwrap();

        assert_eq!(rubric.band_for(85.0).grade, "high");
        assert_eq!(rubric.band_for(45.0).grade, "mid");
        assert_eq!(rubric.band_for(10.0).grade, "low");
    }

    #[test]
    fn test_score_below_every_threshold_gets_lowest_band() {
        let rubric = Rubric::new(vec![
            RubricBand::new(90.0, "top", "", "", ""),
            RubricBand::new(60.0, "floor", "", "", ""),
        ])
        .unwrap();

        assert_eq!(rubric.band_for(12.0).grade, "floor");
    }

    #[test]
    fn test_empty_rubric_rejected() {
        assert!(Rubric::new(Vec::new()).is_err());
        assert!(serde_json::from_str::<Rubric>("[]").is_err());
    }

    #[test]
    fn test_tips_fall_back_to_default() {
        let book = TipBook::default();
        assert_eq!(book.tips_for(Emotion::Fear).len(), 4);
        assert_eq!(book.tips_for(Emotion::Angry), book.default.as_slice());
        assert_eq!(book.tips_for(Emotion::Sad), book.default.as_slice());
    }
}
