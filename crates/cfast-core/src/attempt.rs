//! The hand-off to a persistence collaborator.
//!
//! A finished session is flattened into an [`AttemptRecord`]: the keys that
//! identify the attempt, the summary metrics, and the scored-phase events.
//! Where the record goes is up to whoever implements [`AttemptSink`].

use serde::{Deserialize, Serialize};

use crate::event::QuestionEvent;
use crate::phase::Phase;
use crate::session::TrialSession;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Identity of one attempt, independent of its outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptMeta {
    pub seed: u64,
    pub difficulty: f64,
    pub practice_questions: u32,
    /// Practice block length for continuous tests, which count practice in
    /// seconds rather than questions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub practice_duration_s: Option<f64>,
    pub scored_duration_s: f64,
    pub scored_started_at_s: Option<f64>,
    pub ended_at_s: Option<f64>,
}

/// One scored event in the persistence shape shared by every test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedEvent {
    pub seq: usize,
    pub phase: Phase,
    pub kind: String,
    pub prompt: String,
    pub expected: String,
    pub response: String,
    pub is_correct: bool,
    pub score: f64,
    pub presented_at_ms: Option<i64>,
    pub answered_at_ms: i64,
    pub rt_ms: Option<i64>,
}

impl From<&QuestionEvent> for RecordedEvent {
    fn from(e: &QuestionEvent) -> Self {
        let trimmed = e.raw.trim();
        let response = if trimmed.is_empty() {
            e.user_answer.to_string()
        } else {
            trimmed.to_string()
        };
        Self {
            seq: e.index,
            phase: e.phase,
            kind: "question".to_string(),
            prompt: e.prompt.clone(),
            expected: e.correct_answer.to_string(),
            response,
            is_correct: e.is_correct,
            score: e.score,
            presented_at_ms: Some(to_ms(e.presented_at_s)),
            answered_at_ms: to_ms(e.answered_at_s),
            rt_ms: Some(to_ms(e.response_time_s)),
        }
    }
}

/// Persistable summary and event log of a finished attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub test_code: String,
    pub test_version: u32,
    #[serde(flatten)]
    pub meta: AttemptMeta,

    pub attempted: u32,
    pub correct: u32,
    pub accuracy: f64,
    pub throughput_per_min: f64,
    pub total_score: f64,
    pub max_score: f64,
    pub score_ratio: f64,
    pub mean_rt_ms: Option<f64>,
    pub median_rt_ms: Option<f64>,

    pub events: Vec<RecordedEvent>,
}

impl AttemptRecord {
    /// Flatten a session. Most meaningful once it has reached
    /// [`Phase::Results`], but callable at any time.
    pub fn from_session(
        session: &dyn TrialSession,
        test_code: impl Into<String>,
        test_version: u32,
    ) -> Self {
        let summary = session.scored_summary();
        let events = session.scored_events();
        let (mean_rt_ms, median_rt_ms) = rt_stats_ms(&events);

        Self {
            test_code: test_code.into(),
            test_version,
            meta: session.attempt_meta(),
            attempted: summary.attempted,
            correct: summary.correct,
            accuracy: summary.accuracy,
            throughput_per_min: summary.throughput_per_min,
            total_score: summary.total_score,
            max_score: summary.max_score,
            score_ratio: summary.score_ratio,
            mean_rt_ms,
            median_rt_ms,
            events,
        }
    }
}

// ---------------------------------------------------------------------------
// Sink
// ---------------------------------------------------------------------------

/// Errors a sink may report while storing a record.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("failed to write attempt record: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode attempt record: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Destination for finished attempts.
pub trait AttemptSink {
    fn store(&mut self, record: &AttemptRecord) -> Result<(), SinkError>;
}

impl<T: AttemptSink + ?Sized> AttemptSink for &mut T {
    fn store(&mut self, record: &AttemptRecord) -> Result<(), SinkError> {
        (**self).store(record)
    }
}

// Compile-time assertion: AttemptSink must be object-safe.
const _: () = {
    fn _assert_object_safe(_: &dyn AttemptSink) {}
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

pub(crate) fn to_ms(seconds: f64) -> i64 {
    (seconds * 1000.0).round() as i64
}

/// Mean and median over whole-millisecond response times. Events without
/// a response time are skipped.
fn rt_stats_ms(events: &[RecordedEvent]) -> (Option<f64>, Option<f64>) {
    let mut rts: Vec<i64> = events.iter().filter_map(|e| e.rt_ms).collect();
    if rts.is_empty() {
        return (None, None);
    }
    rts.sort_unstable();

    let n = rts.len();
    let mean = rts.iter().sum::<i64>() as f64 / n as f64;
    let mid = n / 2;
    let median = if n % 2 == 1 {
        rts[mid] as f64
    } else {
        (rts[mid - 1] + rts[mid]) as f64 / 2.0
    };
    (Some(mean), Some(median))
}
