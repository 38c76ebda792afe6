// Integration tests for report synthesis

mod common;

use anyhow::Result;
use common::{sample, FakeReporter, CHART};
use practice_coach::clients::{ChartReference, ReportClient};
use practice_coach::emotion::{Emotion, EmotionDistribution};
use practice_coach::error::{ClientError, SessionError};
use practice_coach::report::{best_moments, Synthesizer};
use practice_coach::session::{History, Sample};
use std::sync::atomic::Ordering;
use uuid::Uuid;

fn history_of(samples: Vec<Sample>) -> History {
    let mut history = History::new(Uuid::new_v4());
    for s in samples {
        history.append(s);
    }
    history.freeze();
    history
}

fn scores(samples: &[Sample]) -> Vec<f64> {
    samples.iter().map(|s| s.confidence_score()).collect()
}

#[test]
fn test_average_and_best_moments() -> Result<()> {
    let samples = vec![
        sample(2_000, 40.0),
        sample(4_000, 90.0),
        sample(6_000, 70.0),
    ];

    let summary = Synthesizer::default().summarize(&samples)?;

    assert!((summary.average_confidence - 66.7).abs() < 0.1);
    assert_eq!(scores(&summary.best_moments), vec![90.0, 70.0, 40.0]);
    assert_eq!(summary.grade, "B");
    assert_eq!(summary.color, "#FF9800");
    assert_eq!(summary.sample_count, 3);
    assert_eq!(summary.timeline.captured_at_ms, vec![2_000, 4_000, 6_000]);

    Ok(())
}

#[test]
fn test_average_independent_of_order() -> Result<()> {
    let synthesizer = Synthesizer::default();
    let forward = vec![sample(0, 33.0), sample(1, 47.5), sample(2, 81.0), sample(3, 12.25)];
    let mut reversed = forward.clone();
    reversed.reverse();

    let a = synthesizer.summarize(&forward)?;
    let b = synthesizer.summarize(&reversed)?;

    assert!((a.average_confidence - b.average_confidence).abs() < 1e-9);
    assert_eq!(scores(&a.best_moments), scores(&b.best_moments));

    Ok(())
}

#[test]
fn test_best_moment_ties_prefer_earlier_capture() {
    let samples = vec![
        sample(6_000, 80.0),
        sample(2_000, 80.0),
        sample(4_000, 80.0),
        sample(8_000, 10.0),
    ];

    let best = best_moments(&samples, 3);
    let at: Vec<u64> = best.iter().map(|s| s.captured_at_ms()).collect();
    assert_eq!(at, vec![2_000, 4_000, 6_000]);
}

#[test]
fn test_best_moments_is_at_most_three() -> Result<()> {
    let samples: Vec<Sample> = (0..10).map(|i| sample(i * 2_000, i as f64 * 10.0)).collect();
    let summary = Synthesizer::default().summarize(&samples)?;

    assert_eq!(scores(&summary.best_moments), vec![90.0, 80.0, 70.0]);
    Ok(())
}

#[test]
fn test_rubric_bands() -> Result<()> {
    let synthesizer = Synthesizer::default();

    let high = synthesizer.summarize(&[sample(0, 70.0), sample(1, 70.0), sample(2, 70.0)])?;
    assert_eq!(high.grade, "A");
    assert_eq!(high.color, "#4CAF50");

    let low = synthesizer.summarize(&[sample(0, 49.0), sample(1, 49.0), sample(2, 49.0)])?;
    assert_eq!(low.grade, "C");
    assert_eq!(low.color, "#F44336");

    Ok(())
}

#[test]
fn test_insufficient_data_reports_count() {
    let synthesizer = Synthesizer::default();

    for count in 0..3u64 {
        let samples: Vec<Sample> = (0..count).map(|i| sample(i, 90.0)).collect();
        let err = synthesizer.summarize(&samples).unwrap_err();
        assert_eq!(err.sample_count(), Some(count as usize));
    }
}

#[test]
fn test_tips_follow_dominant_emotion() -> Result<()> {
    let fearful = |at: u64| {
        Sample::new(
            at,
            EmotionDistribution::new()
                .with(Emotion::Fear, 70.0)
                .with(Emotion::Happy, 30.0),
            Emotion::Fear,
            45.0,
        )
    };
    let samples = vec![fearful(0)?, fearful(2_000)?, fearful(4_000)?];

    let synthesizer = Synthesizer::default();
    let summary = synthesizer.summarize(&samples)?;

    assert_eq!(summary.dominant_emotion, Emotion::Fear);
    assert!(!summary.tips.is_empty());
    assert!((summary.average_emotions.probability(Emotion::Fear) - 70.0).abs() < 1e-9);

    Ok(())
}

#[tokio::test]
async fn test_chart_reference_passed_through() -> Result<()> {
    let history = history_of(vec![
        sample(6_000, 70.0),
        sample(2_000, 40.0),
        sample(4_000, 90.0),
    ]);
    let reporter = FakeReporter::ok();

    let report = Synthesizer::default().synthesize(&history, &reporter).await?;

    assert_eq!(report.session_id, history.session_id());
    assert_eq!(report.chart_reference, ChartReference(CHART.to_string()));
    assert_eq!(*reporter.rendered.lock().unwrap(), vec![2_000, 4_000, 6_000]);

    Ok(())
}

#[tokio::test]
async fn test_too_few_samples_never_reach_renderer() -> Result<()> {
    let history = history_of(vec![sample(2_000, 40.0), sample(4_000, 90.0)]);
    let reporter = FakeReporter::ok();

    let err = Synthesizer::default()
        .synthesize(&history, &reporter)
        .await
        .unwrap_err();

    assert!(matches!(err, SessionError::InsufficientData { count: 2, .. }));
    assert_eq!(reporter.calls.load(Ordering::SeqCst), 0);

    Ok(())
}

#[tokio::test]
async fn test_renderer_failure_is_report_error() -> Result<()> {
    let history = history_of(vec![sample(0, 50.0), sample(1, 60.0), sample(2, 70.0)]);

    let err = Synthesizer::default()
        .synthesize(&history, &FakeReporter::failing())
        .await
        .unwrap_err();

    assert!(matches!(err, SessionError::Report(_)));
    Ok(())
}

struct RefusingReporter;

#[async_trait::async_trait]
impl ReportClient for RefusingReporter {
    async fn render_chart(&self, history: &[Sample]) -> Result<ChartReference, ClientError> {
        Err(ClientError::InsufficientData(history.len()))
    }
}

#[tokio::test]
async fn test_renderer_refusal_maps_to_insufficient_data() -> Result<()> {
    let history = history_of(vec![sample(0, 50.0), sample(1, 60.0), sample(2, 70.0)]);

    let err = Synthesizer::default()
        .synthesize(&history, &RefusingReporter)
        .await
        .unwrap_err();

    assert!(matches!(err, SessionError::InsufficientData { count: 3, .. }));
    Ok(())
}
