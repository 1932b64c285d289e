//! Shell-facing interface shared by the discrete harness and the
//! continuous engine.
//!
//! A rendering shell or headless driver only needs [`TrialSession`]: it
//! starts phases, pumps `update()`, forwards input and reads snapshots.

use crate::attempt::{AttemptMeta, RecordedEvent};
use crate::event::AttemptSummary;
use crate::phase::Phase;
use crate::problem::Payload;

/// Pure view-model for the rendering shell.
#[derive(Debug, Clone, PartialEq)]
pub struct TestSnapshot {
    pub title: String,
    pub phase: Phase,
    pub prompt: String,
    pub input_hint: String,
    pub time_remaining_s: Option<f64>,
    pub attempted_scored: u32,
    pub correct_scored: u32,
    pub payload: Option<Payload>,
    /// Verdict on the last practice answer, for shells that show one.
    pub practice_feedback: Option<String>,
}

/// One running test attempt.
///
/// Lifecycle calls made out of order are silent no-ops. Input rejection is
/// a `false` return, never an error.
pub trait TrialSession {
    fn title(&self) -> &str;

    fn phase(&self) -> Phase;

    /// False only while the scored block is running.
    fn can_exit(&self) -> bool {
        self.phase().can_exit()
    }

    fn start_practice(&mut self);

    fn start_scored(&mut self);

    /// Apply any time-driven transition that is due. Safe to call at any
    /// cadence.
    fn update(&mut self);

    /// Forward one raw input line or command token. Returns `true` if it
    /// was accepted.
    fn submit_answer(&mut self, raw: &str) -> bool;

    /// Continuous-control axes. Discrete tests ignore them.
    fn set_control(&mut self, _horizontal: f64, _vertical: f64) {}

    fn time_remaining_s(&self) -> Option<f64>;

    fn snapshot(&self) -> TestSnapshot;

    fn scored_summary(&self) -> AttemptSummary;

    /// Keys a persistence collaborator needs to file this attempt.
    fn attempt_meta(&self) -> AttemptMeta;

    /// Scored-phase events flattened to the persistence shape.
    fn scored_events(&self) -> Vec<RecordedEvent>;
}

impl<T: TrialSession + ?Sized> TrialSession for Box<T> {
    fn title(&self) -> &str {
        (**self).title()
    }
    fn phase(&self) -> Phase {
        (**self).phase()
    }
    fn can_exit(&self) -> bool {
        (**self).can_exit()
    }
    fn start_practice(&mut self) {
        (**self).start_practice()
    }
    fn start_scored(&mut self) {
        (**self).start_scored()
    }
    fn update(&mut self) {
        (**self).update()
    }
    fn submit_answer(&mut self, raw: &str) -> bool {
        (**self).submit_answer(raw)
    }
    fn set_control(&mut self, horizontal: f64, vertical: f64) {
        (**self).set_control(horizontal, vertical)
    }
    fn time_remaining_s(&self) -> Option<f64> {
        (**self).time_remaining_s()
    }
    fn snapshot(&self) -> TestSnapshot {
        (**self).snapshot()
    }
    fn scored_summary(&self) -> AttemptSummary {
        (**self).scored_summary()
    }
    fn attempt_meta(&self) -> AttemptMeta {
        (**self).attempt_meta()
    }
    fn scored_events(&self) -> Vec<RecordedEvent> {
        (**self).scored_events()
    }
}

// Compile-time assertion: TrialSession must be object-safe.
const _: () = {
    fn _assert_object_safe(_: &dyn TrialSession) {}
};
