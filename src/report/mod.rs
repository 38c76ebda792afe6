//! Report synthesis
//!
//! Turns the frozen sample history of a finished session into a report:
//! - average confidence and the rubric band it falls in (grade, copy, colour)
//! - tips keyed by the dominant emotion
//! - the best moments, ranked by confidence
//! - chart series, with rendering delegated to the report client

mod rubric;
mod synthesizer;
mod timeline;

pub use rubric::{Rubric, RubricBand, TipBook};
pub use synthesizer::{
    average_confidence, best_moments, Report, ReportConfig, ReportSummary, Synthesizer,
    BEST_MOMENT_COUNT, MIN_SAMPLES,
};
pub use timeline::Timeline;
