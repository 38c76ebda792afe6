use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Facial expression labels reported by the classification service
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Angry,
    Disgust,
    Fear,
    Happy,
    Sad,
    Surprise,
    Neutral,
}

impl Emotion {
    pub const ALL: [Emotion; 7] = [
        Emotion::Angry,
        Emotion::Disgust,
        Emotion::Fear,
        Emotion::Happy,
        Emotion::Sad,
        Emotion::Surprise,
        Emotion::Neutral,
    ];

    /// Wire name (matches the serde representation)
    pub fn as_str(&self) -> &'static str {
        match self {
            Emotion::Angry => "angry",
            Emotion::Disgust => "disgust",
            Emotion::Fear => "fear",
            Emotion::Happy => "happy",
            Emotion::Sad => "sad",
            Emotion::Surprise => "surprise",
            Emotion::Neutral => "neutral",
        }
    }

    /// Human-readable label for the live read-out
    pub fn label(&self) -> &'static str {
        match self {
            Emotion::Angry => "Angry",
            Emotion::Disgust => "Disgusted",
            Emotion::Fear => "Anxious",
            Emotion::Happy => "Happy",
            Emotion::Sad => "Sad",
            Emotion::Surprise => "Surprised",
            Emotion::Neutral => "Neutral",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Emotion::Angry => "😠",
            Emotion::Disgust => "🤢",
            Emotion::Fear => "😰",
            Emotion::Happy => "😊",
            Emotion::Sad => "😢",
            Emotion::Surprise => "😮",
            Emotion::Neutral => "😐",
        }
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Emotion → probability mapping (percent, 0-100) for one frame
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmotionDistribution(BTreeMap<Emotion, f64>);

impl EmotionDistribution {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, emotion: Emotion, probability: f64) -> Self {
        self.0.insert(emotion, probability);
        self
    }

    /// Distribution with all mass on one emotion
    pub fn single(emotion: Emotion) -> Self {
        Self::new().with(emotion, 100.0)
    }

    /// Probability for `emotion`, 0 when the classifier did not report it
    pub fn probability(&self, emotion: Emotion) -> f64 {
        self.0.get(&emotion).copied().unwrap_or(0.0)
    }

    /// Highest-probability emotion; ties go to the earlier label in `Emotion::ALL`
    pub fn dominant(&self) -> Option<Emotion> {
        let mut best: Option<(Emotion, f64)> = None;
        for (&emotion, &probability) in &self.0 {
            match best {
                Some((_, top)) if probability <= top => {}
                _ => best = Some((emotion, probability)),
            }
        }
        best.map(|(emotion, _)| emotion)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Emotion, f64)> + '_ {
        self.0.iter().map(|(e, p)| (*e, *p))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Per-emotion arithmetic mean over several distributions.
    ///
    /// Emotions missing from a distribution count as 0 for that frame.
    pub fn mean<'a, I>(distributions: I) -> Self
    where
        I: IntoIterator<Item = &'a EmotionDistribution>,
    {
        let mut sums: BTreeMap<Emotion, f64> = BTreeMap::new();
        let mut count = 0usize;

        for distribution in distributions {
            count += 1;
            for (emotion, probability) in distribution.iter() {
                *sums.entry(emotion).or_insert(0.0) += probability;
            }
        }

        if count == 0 {
            return Self::default();
        }

        Self(
            sums.into_iter()
                .map(|(emotion, sum)| (emotion, sum / count as f64))
                .collect(),
        )
    }
}

impl FromIterator<(Emotion, f64)> for EmotionDistribution {
    fn from_iter<T: IntoIterator<Item = (Emotion, f64)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
