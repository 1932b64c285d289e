//! Event log entries and the scored-phase summary derived from them.

use serde::{Deserialize, Serialize};

use crate::phase::Phase;
use crate::scoring::clamp01;

// ---------------------------------------------------------------------------
// Question events
// ---------------------------------------------------------------------------

/// One answered trial in a discrete harness.
///
/// `user_answer` is the parsed value; `raw` keeps the untouched input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionEvent {
    pub index: usize,
    pub phase: Phase,
    pub prompt: String,
    pub correct_answer: i64,
    pub user_answer: i64,
    pub raw: String,
    pub is_correct: bool,
    pub score: f64,
    pub max_score: f64,
    pub presented_at_s: f64,
    pub answered_at_s: f64,
    pub response_time_s: f64,
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

/// Aggregate over scored-phase events only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptSummary {
    pub attempted: u32,
    pub correct: u32,
    pub accuracy: f64,
    pub duration_s: f64,
    pub throughput_per_min: f64,
    pub mean_response_time_s: Option<f64>,
    pub total_score: f64,
    pub max_score: f64,
    pub score_ratio: f64,
}

/// Running scored-phase counters.
///
/// Every recorded score is clamped to `[0, 1]` before it is added, and each
/// record contributes exactly 1.0 to `max_score`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScoreTally {
    pub attempted: u32,
    pub correct: u32,
    pub total_score: f64,
    pub max_score: f64,
}

impl ScoreTally {
    /// Add one scored record. Returns the clamped score that was applied.
    pub fn record(&mut self, score: f64, is_correct: bool) -> f64 {
        let score = clamp01(score);
        self.attempted += 1;
        self.max_score += 1.0;
        self.total_score += score;
        if is_correct {
            self.correct += 1;
        }
        score
    }

    /// Build the summary for a block of `duration_s` seconds.
    ///
    /// `response_times` are the scored events' response times; an empty
    /// iterator yields `mean_response_time_s == None`.
    pub fn summarize(
        &self,
        duration_s: f64,
        response_times: impl IntoIterator<Item = f64>,
    ) -> AttemptSummary {
        let (sum, count) = response_times
            .into_iter()
            .fold((0.0, 0u32), |(sum, n), rt| (sum + rt, n + 1));
        let mean = (count > 0).then(|| sum / f64::from(count));

        let accuracy = if self.attempted == 0 {
            0.0
        } else {
            f64::from(self.correct) / f64::from(self.attempted)
        };
        let throughput = if duration_s > 0.0 {
            f64::from(self.attempted) / duration_s * 60.0
        } else {
            0.0
        };
        let score_ratio = if self.max_score <= 0.0 {
            0.0
        } else {
            self.total_score / self.max_score
        };

        AttemptSummary {
            attempted: self.attempted,
            correct: self.correct,
            accuracy,
            duration_s,
            throughput_per_min: throughput,
            mean_response_time_s: mean,
            total_score: self.total_score,
            max_score: self.max_score,
            score_ratio,
        }
    }
}

/// Render the multi-line results block shown once a block has finished.
pub fn results_text(summary: &AttemptSummary) -> String {
    let accuracy_pct = (summary.accuracy * 100.0).round() as i64;
    let rt = match summary.mean_response_time_s {
        Some(rt) => format!("{rt:.2}s"),
        None => "n/a".to_string(),
    };
    format!(
        "Results\nAttempted: {}\nCorrect: {}\nAccuracy: {accuracy_pct}%\nMean RT: {rt}\nThroughput: {:.1}/min",
        summary.attempted, summary.correct, summary.throughput_per_min
    )
}
