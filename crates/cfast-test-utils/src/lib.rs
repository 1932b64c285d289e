//! Shared test utilities for cfast integration tests.
//!
//! Provides scripted generators and scorers with known outputs, an in-memory
//! attempt sink, harness fixtures on a [`ManualClock`], and frame-stepping
//! drivers for any [`TrialSession`].

use cfast_core::attempt::{AttemptRecord, AttemptSink, SinkError};
use cfast_core::clock::ManualClock;
use cfast_core::generator::ProblemGenerator;
use cfast_core::harness::{HarnessConfig, TimedTrialHarness};
use cfast_core::phase::Phase;
use cfast_core::problem::{Payload, Problem};
use cfast_core::scoring::AnswerScorer;
use cfast_core::session::{TestSnapshot, TrialSession};
use cfast_core::tasks::auditory_capacity::ScriptedPolicy;

/// Frame period used by the drivers, matching a 60 Hz shell.
pub const FRAME_S: f64 = 1.0 / 60.0;

// ---------------------------------------------------------------------------
// Generators and scorers
// ---------------------------------------------------------------------------

/// Deals a fixed list of problems in order, cycling when exhausted, and
/// remembers the difficulty of every request.
#[derive(Debug, Clone)]
pub struct ScriptedGenerator {
    problems: Vec<Problem>,
    next: usize,
    pub requested: Vec<f64>,
}

impl ScriptedGenerator {
    /// # Panics
    ///
    /// Panics if `problems` is empty.
    pub fn new(problems: Vec<Problem>) -> Self {
        assert!(!problems.is_empty(), "ScriptedGenerator needs at least one problem");
        Self {
            problems,
            next: 0,
            requested: Vec::new(),
        }
    }

    /// `"{n} + 0 ="` with answer `n`, for each `n` in `answers`.
    pub fn from_answers(answers: &[i64]) -> Self {
        Self::new(
            answers
                .iter()
                .map(|&n| Problem::new(format!("{n} + 0 ="), n))
                .collect(),
        )
    }

    /// Number of problems dealt so far.
    pub fn dealt(&self) -> usize {
        self.requested.len()
    }
}

impl ProblemGenerator for ScriptedGenerator {
    fn next_problem(&mut self, difficulty: f64) -> Problem {
        self.requested.push(difficulty);
        let problem = self.problems[self.next % self.problems.len()].clone();
        self.next += 1;
        problem
    }
}

/// Scores every answer the same.
#[derive(Debug, Clone, Copy)]
pub struct FixedScorer(pub f64);

impl AnswerScorer for FixedScorer {
    fn score(&self, _problem: &Problem, _user_answer: i64, _raw: &str) -> f64 {
        self.0
    }
}

// ---------------------------------------------------------------------------
// Sink
// ---------------------------------------------------------------------------

/// Keeps every stored record in memory.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub records: Vec<AttemptRecord>,
}

impl AttemptSink for RecordingSink {
    fn store(&mut self, record: &AttemptRecord) -> Result<(), SinkError> {
        self.records.push(record.clone());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub type ScriptedHarness = TimedTrialHarness<ScriptedGenerator, ManualClock>;

/// A harness dealing `"n + 0 ="` problems with answers 1, 2, 3, ... cycling
/// every ten, plus the clock that drives it.
pub fn scripted_harness(
    practice_questions: u32,
    scored_duration_s: f64,
) -> (ScriptedHarness, ManualClock) {
    scripted_harness_with(
        HarnessConfig::new(0, scored_duration_s).practice_questions(practice_questions),
    )
}

pub fn scripted_harness_with(config: HarnessConfig) -> (ScriptedHarness, ManualClock) {
    let clock = ManualClock::new();
    let answers: Vec<i64> = (1..=10).collect();
    let generator = ScriptedGenerator::from_answers(&answers);
    let harness = TimedTrialHarness::new(config, generator, clock.clone())
        .expect("valid fixture config")
        .with_title("Scripted");
    (harness, clock)
}

/// The answer to the problem on screen, read back from its prompt.
pub fn answer_on_screen(snapshot: &TestSnapshot) -> Option<i64> {
    snapshot.prompt.split_whitespace().next()?.parse().ok()
}

// ---------------------------------------------------------------------------
// Drivers
// ---------------------------------------------------------------------------

/// Step `session` one frame at a time until it reaches `until`.
///
/// Each frame advances `clock` by [`FRAME_S`], calls `update()`, takes a
/// snapshot and, unless the target phase was reached, hands both to
/// `on_frame`. Returns the number of frames stepped.
///
/// # Panics
///
/// Panics if the phase is not reached within `max_frames`.
pub fn drive_until_phase<S, F>(
    session: &mut S,
    clock: &ManualClock,
    until: Phase,
    max_frames: usize,
    mut on_frame: F,
) -> usize
where
    S: TrialSession + ?Sized,
    F: FnMut(&mut S, &TestSnapshot),
{
    for frame in 1..=max_frames {
        clock.advance(FRAME_S);
        session.update();
        let snapshot = session.snapshot();
        if snapshot.phase == until {
            return frame;
        }
        on_frame(session, &snapshot);
    }
    panic!("phase {until} was not reached in {max_frames} frames");
}

/// [`drive_until_phase`] with the divided-attention [`ScriptedPolicy`]
/// playing.
pub fn drive_with_policy<S>(
    session: &mut S,
    clock: &ManualClock,
    policy: &mut ScriptedPolicy,
    until: Phase,
    max_frames: usize,
) -> usize
where
    S: TrialSession + ?Sized,
{
    drive_until_phase(session, clock, until, max_frames, |s, snap| {
        let Some(Payload::AuditoryCapacity(payload)) = &snap.payload else {
            return;
        };
        let action = policy.act(payload);
        s.set_control(action.horizontal, action.vertical);
        for command in &action.commands {
            s.submit_answer(command);
        }
    })
}
