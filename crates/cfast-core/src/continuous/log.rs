//! Shared event log for continuous-engine channels.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::attempt::{RecordedEvent, to_ms};
use crate::event::{AttemptSummary, ScoreTally};
use crate::phase::Phase;
use crate::scoring::{clamp01, is_full_credit};

/// How one channel event was resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome<K> {
    pub kind: K,
    pub expected: String,
    pub response: String,
    pub is_correct: bool,
    pub score: f64,
    pub response_time_s: Option<f64>,
}

impl<K> Outcome<K> {
    pub fn correct(kind: K, expected: impl Into<String>, response: impl Into<String>) -> Self {
        Self {
            kind,
            expected: expected.into(),
            response: response.into(),
            is_correct: true,
            score: 1.0,
            response_time_s: None,
        }
    }

    pub fn wrong(kind: K, expected: impl Into<String>, response: impl Into<String>) -> Self {
        Self {
            kind,
            expected: expected.into(),
            response: response.into(),
            is_correct: false,
            score: 0.0,
            response_time_s: None,
        }
    }

    /// Partial credit. Correct only at full credit.
    pub fn partial(
        kind: K,
        expected: impl Into<String>,
        response: impl Into<String>,
        score: f64,
    ) -> Self {
        let score = clamp01(score);
        Self {
            kind,
            expected: expected.into(),
            response: response.into(),
            is_correct: is_full_credit(score),
            score,
            response_time_s: None,
        }
    }

    pub fn with_response_time(mut self, rt_s: f64) -> Self {
        self.response_time_s = Some(rt_s);
        self
    }
}

/// A resolved channel event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelEvent<K> {
    pub index: usize,
    pub phase: Phase,
    pub kind: K,
    pub expected: String,
    pub response: String,
    pub is_correct: bool,
    pub score: f64,
    pub max_score: f64,
    /// Simulation time of resolution, seconds since the run started.
    pub at_s: f64,
    pub response_time_s: Option<f64>,
}

impl<K: fmt::Display> From<&ChannelEvent<K>> for RecordedEvent {
    fn from(e: &ChannelEvent<K>) -> Self {
        let kind = e.kind.to_string();
        Self {
            seq: e.index,
            phase: e.phase,
            prompt: kind.clone(),
            kind,
            expected: e.expected.clone(),
            response: e.response.clone(),
            is_correct: e.is_correct,
            score: e.score,
            presented_at_ms: e.response_time_s.map(|rt| to_ms(e.at_s - rt)),
            answered_at_ms: to_ms(e.at_s),
            rt_ms: e.response_time_s.map(to_ms),
        }
    }
}

/// Event log plus scored counters. Only events recorded while the phase
/// is [`Phase::Scored`] touch the counters.
#[derive(Debug, Clone)]
pub struct ChannelLog<K> {
    phase: Phase,
    events: Vec<ChannelEvent<K>>,
    tally: ScoreTally,
}

impl<K> Default for ChannelLog<K> {
    fn default() -> Self {
        Self {
            phase: Phase::Instructions,
            events: Vec::new(),
            tally: ScoreTally::default(),
        }
    }
}

impl<K> ChannelLog<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub(crate) fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
    }

    pub fn record(&mut self, at_s: f64, outcome: Outcome<K>) {
        let score = clamp01(outcome.score);
        if self.phase == Phase::Scored {
            self.tally.record(score, outcome.is_correct);
        }
        self.events.push(ChannelEvent {
            index: self.events.len(),
            phase: self.phase,
            kind: outcome.kind,
            expected: outcome.expected,
            response: outcome.response,
            is_correct: outcome.is_correct,
            score,
            max_score: 1.0,
            at_s,
            response_time_s: outcome.response_time_s,
        });
    }

    pub fn events(&self) -> &[ChannelEvent<K>] {
        &self.events
    }

    pub fn tally(&self) -> &ScoreTally {
        &self.tally
    }

    /// Summary over scored events. Events without a response time (expiry
    /// misses, collisions, false alarms) are left out of the mean.
    ///
    /// They still count as attempted, so `attempted > 0` does not imply a
    /// mean: a block whose only scored event is a false alarm reports
    /// `attempted == 1` and `mean_response_time_s == None`.
    pub fn summarize(&self, duration_s: f64) -> AttemptSummary {
        let rts = self
            .events
            .iter()
            .filter(|e| e.phase == Phase::Scored)
            .filter_map(|e| e.response_time_s);
        self.tally.summarize(duration_s, rts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn practice_events_do_not_count() {
        let mut log = ChannelLog::new();
        log.set_phase(Phase::Practice);
        log.record(0.5, Outcome::correct("beep", "BEEP", "TRIGGER"));
        assert_eq!(log.tally().attempted, 0);
        assert_eq!(log.events().len(), 1);
        assert_eq!(log.events()[0].phase, Phase::Practice);
    }

    #[test]
    fn scored_events_accumulate() {
        let mut log = ChannelLog::new();
        log.set_phase(Phase::Scored);
        log.record(1.0, Outcome::correct("beep", "BEEP", "TRIGGER").with_response_time(0.4));
        log.record(2.0, Outcome::wrong("false_alarm", "NO_CUE", "BEEP"));
        log.record(3.0, Outcome::partial("sequence", "12345", "12335", 0.8).with_response_time(0.6));

        let s = log.summarize(60.0);
        assert_eq!(s.attempted, 3);
        assert_eq!(s.correct, 1);
        assert!((s.total_score - 1.8).abs() < 1e-9);
        assert_eq!(s.max_score, 3.0);
        assert!((s.mean_response_time_s.unwrap() - 0.5).abs() < 1e-9);
        assert_eq!(log.events()[2].index, 2);
    }

    #[test]
    fn lone_false_alarm_is_attempted_without_a_mean() {
        let mut log = ChannelLog::new();
        log.set_phase(Phase::Scored);
        log.record(1.0, Outcome::wrong("false_alarm", "NO_CUE", "BEEP"));

        let s = log.summarize(60.0);
        assert_eq!(s.attempted, 1);
        assert_eq!(s.correct, 0);
        assert_eq!(s.mean_response_time_s, None);
    }

    #[test]
    fn partial_outcome_clamps_and_grades() {
        let full = Outcome::partial("sequence", "1", "1", 1.2);
        assert_eq!(full.score, 1.0);
        assert!(full.is_correct);
        let low = Outcome::partial("sequence", "1", "2", -1.0);
        assert_eq!(low.score, 0.0);
        assert!(!low.is_correct);
    }

    #[test]
    fn recorded_event_derives_presentation_time() {
        let mut log = ChannelLog::new();
        log.set_phase(Phase::Scored);
        log.record(2.5, Outcome::correct("beep", "BEEP", "TRIGGER").with_response_time(0.5));
        log.record(3.0, Outcome::wrong("collision", "inside tube", "collision"));
        let with_rt = RecordedEvent::from(&log.events()[0]);
        assert_eq!(with_rt.presented_at_ms, Some(2000));
        assert_eq!(with_rt.answered_at_ms, 2500);
        assert_eq!(with_rt.rt_ms, Some(500));
        assert_eq!(with_rt.kind, "beep");
        let without = RecordedEvent::from(&log.events()[1]);
        assert_eq!(without.presented_at_ms, None);
        assert_eq!(without.rt_ms, None);
    }
}
