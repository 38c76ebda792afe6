use super::sample::Sample;
use tracing::debug;
use uuid::Uuid;

/// Result of an append attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendOutcome {
    /// Stored at this position (0-based, ordered by capture time)
    Stored(usize),
    /// History already frozen; sample dropped
    Discarded,
}

/// Append-only sample log for one session.
///
/// Classification replies can complete out of dispatch order, so `append`
/// inserts by `captured_at_ms` rather than pushing. Reads always see the
/// samples ordered by non-decreasing capture time; equal timestamps keep
/// arrival order.
#[derive(Debug, Clone)]
pub struct History {
    session_id: Uuid,
    samples: Vec<Sample>,
    frozen: bool,
}

impl History {
    pub fn new(session_id: Uuid) -> Self {
        Self {
            session_id,
            samples: Vec::new(),
            frozen: false,
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Insert `sample` in capture-time order. No-op once frozen.
    pub fn append(&mut self, sample: Sample) -> AppendOutcome {
        if self.frozen {
            debug!(
                "History {} frozen, dropping sample captured at {}ms",
                self.session_id,
                sample.captured_at_ms()
            );
            return AppendOutcome::Discarded;
        }

        let at = sample.captured_at_ms();
        let index = self
            .samples
            .partition_point(|existing| existing.captured_at_ms() <= at);
        self.samples.insert(index, sample);

        AppendOutcome::Stored(index)
    }

    /// Stop accepting samples. Idempotent.
    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Ordered read-only view
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}
