//! Discrete timed-trial harness.
//!
//! Drives one attempt through the lifecycle
//!
//! ```text
//! instructions -> practice -> practice_done -> scored -> results
//! ```
//!
//! dealing problems from a [`ProblemGenerator`], scoring answers with an
//! [`AnswerScorer`] and timing the scored block with an injected [`Clock`].
//! Nothing happens on its own: time-driven transitions only occur inside
//! [`TimedTrialHarness::update`] or [`TimedTrialHarness::submit_answer`].

use tracing::{debug, info};

use crate::attempt::{AttemptMeta, RecordedEvent};
use crate::clock::Clock;
use crate::error::ConfigError;
use crate::event::{AttemptSummary, QuestionEvent, ScoreTally, results_text};
use crate::generator::ProblemGenerator;
use crate::phase::Phase;
use crate::problem::Problem;
use crate::scoring::{AnswerScorer, ExactScorer, clamp01, is_full_credit};
use crate::session::{TestSnapshot, TrialSession};

const DEFAULT_INPUT_HINT: &str = "Type answer then Enter";

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Construction-time settings for one attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct HarnessConfig {
    pub seed: u64,
    /// Difficulty scalar in `[0, 1]`.
    pub difficulty: f64,
    pub practice_questions: u32,
    /// Length of the scored block in seconds. Must be > 0.
    pub scored_duration_s: f64,
}

impl HarnessConfig {
    pub fn new(seed: u64, scored_duration_s: f64) -> Self {
        Self {
            seed,
            scored_duration_s,
            ..Self::default()
        }
    }

    pub fn difficulty(mut self, difficulty: f64) -> Self {
        self.difficulty = difficulty;
        self
    }

    pub fn practice_questions(mut self, count: u32) -> Self {
        self.practice_questions = count;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        ConfigError::require_unit(self.difficulty)?;
        ConfigError::require_positive("scored_duration_s", self.scored_duration_s)?;
        Ok(())
    }
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            difficulty: 0.5,
            practice_questions: 5,
            scored_duration_s: 120.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

/// The problem on screen and when it appeared.
#[derive(Debug, Clone)]
struct Dealt {
    problem: Problem,
    presented_at_s: f64,
}

/// Discrete question/answer harness, generic over its generator, clock and
/// scorer. Without an explicit scorer, answers are tolerance-matched by
/// [`ExactScorer`].
pub struct TimedTrialHarness<G, C, S = ExactScorer> {
    title: String,
    instructions: Vec<String>,
    input_hint: String,
    config: HarnessConfig,

    generator: G,
    scorer: S,
    clock: C,

    phase: Phase,
    current: Option<Dealt>,
    events: Vec<QuestionEvent>,
    practice_answered: u32,
    practice_feedback: Option<String>,
    scored_started_at_s: Option<f64>,
    ended_at_s: Option<f64>,
    tally: ScoreTally,
}

impl<G, C> TimedTrialHarness<G, C, ExactScorer>
where
    G: ProblemGenerator,
    C: Clock,
{
    /// Validate `config` and build a harness in [`Phase::Instructions`].
    pub fn new(config: HarnessConfig, generator: G, clock: C) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            title: String::new(),
            instructions: Vec::new(),
            input_hint: DEFAULT_INPUT_HINT.to_string(),
            config,
            generator,
            scorer: ExactScorer,
            clock,
            phase: Phase::Instructions,
            current: None,
            events: Vec::new(),
            practice_answered: 0,
            practice_feedback: None,
            scored_started_at_s: None,
            ended_at_s: None,
            tally: ScoreTally::default(),
        })
    }
}

impl<G, C, S> TimedTrialHarness<G, C, S>
where
    G: ProblemGenerator,
    C: Clock,
    S: AnswerScorer,
{
    /// Replace the scorer.
    pub fn with_scorer<S2: AnswerScorer>(self, scorer: S2) -> TimedTrialHarness<G, C, S2> {
        TimedTrialHarness {
            title: self.title,
            instructions: self.instructions,
            input_hint: self.input_hint,
            config: self.config,
            generator: self.generator,
            scorer,
            clock: self.clock,
            phase: self.phase,
            current: self.current,
            events: self.events,
            practice_answered: self.practice_answered,
            practice_feedback: self.practice_feedback,
            scored_started_at_s: self.scored_started_at_s,
            ended_at_s: self.ended_at_s,
            tally: self.tally,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_instructions(mut self, lines: Vec<String>) -> Self {
        self.instructions = lines;
        self
    }

    pub fn with_input_hint(mut self, hint: impl Into<String>) -> Self {
        self.input_hint = hint.into();
        self
    }

    // -- accessors ----------------------------------------------------------

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn instructions(&self) -> &[String] {
        &self.instructions
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn seed(&self) -> u64 {
        self.config.seed
    }

    pub fn difficulty(&self) -> f64 {
        self.config.difficulty
    }

    pub fn practice_questions(&self) -> u32 {
        self.config.practice_questions
    }

    pub fn scored_duration_s(&self) -> f64 {
        self.config.scored_duration_s
    }

    pub fn scored_started_at_s(&self) -> Option<f64> {
        self.scored_started_at_s
    }

    pub fn ended_at_s(&self) -> Option<f64> {
        self.ended_at_s
    }

    /// Full event log, practice events included, in recording order.
    pub fn events(&self) -> &[QuestionEvent] {
        &self.events
    }

    pub fn current_problem(&self) -> Option<&Problem> {
        self.current.as_ref().map(|d| &d.problem)
    }

    /// False only while the scored block is running.
    pub fn can_exit(&self) -> bool {
        self.phase.can_exit()
    }

    // -- lifecycle ----------------------------------------------------------

    /// Leave the instructions screen. With zero practice questions this
    /// goes straight to [`Phase::PracticeDone`] without dealing.
    pub fn start_practice(&mut self) {
        if self.phase != Phase::Instructions {
            debug!(phase = %self.phase, "start_practice ignored");
            return;
        }
        if self.config.practice_questions == 0 {
            self.transition(Phase::PracticeDone);
            return;
        }
        self.transition(Phase::Practice);
        self.deal();
    }

    /// Begin the timed block. Allowed from [`Phase::PracticeDone`], or
    /// directly from [`Phase::Instructions`] when no practice is configured.
    pub fn start_scored(&mut self) {
        let gate_open = match self.phase {
            Phase::PracticeDone => true,
            Phase::Instructions => self.config.practice_questions == 0,
            _ => false,
        };
        if !gate_open {
            debug!(phase = %self.phase, "start_scored ignored");
            return;
        }

        let now = self.clock.now();
        self.scored_started_at_s = Some(now);
        self.transition(Phase::Scored);
        info!(
            seed = self.config.seed,
            difficulty = self.config.difficulty,
            duration_s = self.config.scored_duration_s,
            "scored block started"
        );
        self.deal();
    }

    /// Finish the scored block once its duration has elapsed. No-op in any
    /// other phase or before the deadline.
    pub fn update(&mut self) {
        if self.phase != Phase::Scored {
            return;
        }
        if self.time_remaining_s() == Some(0.0) {
            self.finish();
        }
    }

    /// Seconds left in the scored block, clamped at zero. `None` outside
    /// [`Phase::Scored`].
    pub fn time_remaining_s(&self) -> Option<f64> {
        if self.phase != Phase::Scored {
            return None;
        }
        let started = self.scored_started_at_s?;
        let remaining = self.config.scored_duration_s - (self.clock.now() - started);
        Some(remaining.max(0.0))
    }

    /// Submit one typed answer. Returns `true` if it was accepted.
    ///
    /// An answer submitted at the exact instant the scored block runs out is
    /// still scored, after which the attempt moves to [`Phase::Results`]
    /// without dealing again. Empty or non-numeric input is rejected; if the
    /// block has already run out, rejection still ends it.
    pub fn submit_answer(&mut self, raw: &str) -> bool {
        if !self.phase.accepts_input() {
            return false;
        }
        let expired = self.phase == Phase::Scored && self.time_remaining_s() == Some(0.0);

        let trimmed = raw.trim();
        let parsed = if trimmed.is_empty() {
            None
        } else {
            trimmed.parse::<i64>().ok()
        };
        let Some(user_answer) = parsed else {
            if expired {
                self.finish();
            }
            return false;
        };

        let Some(dealt) = self.current.take() else {
            panic!("no problem dealt while phase {} accepts input", self.phase);
        };

        let answered_at_s = self.clock.now();
        let score = clamp01(self.scorer.score(&dealt.problem, user_answer, raw));
        let is_correct = is_full_credit(score);

        self.events.push(QuestionEvent {
            index: self.events.len(),
            phase: self.phase,
            prompt: dealt.problem.prompt().to_string(),
            correct_answer: dealt.problem.answer(),
            user_answer,
            raw: raw.to_string(),
            is_correct,
            score,
            max_score: 1.0,
            presented_at_s: dealt.presented_at_s,
            answered_at_s,
            response_time_s: (answered_at_s - dealt.presented_at_s).max(0.0),
        });

        match self.phase {
            Phase::Scored => {
                self.tally.record(score, is_correct);
                if expired {
                    self.finish();
                    return true;
                }
            }
            _ => {
                self.practice_feedback = Some(if is_correct {
                    "Correct!".to_string()
                } else {
                    format!("Incorrect, answer is {}", dealt.problem.answer())
                });
                self.practice_answered += 1;
                if self.practice_answered >= self.config.practice_questions {
                    self.transition(Phase::PracticeDone);
                    return true;
                }
            }
        }

        self.deal();
        true
    }

    // -- views --------------------------------------------------------------

    /// Summary over scored-phase events only.
    pub fn scored_summary(&self) -> AttemptSummary {
        let rts = self
            .events
            .iter()
            .filter(|e| e.phase == Phase::Scored)
            .map(|e| e.response_time_s);
        self.tally.summarize(self.config.scored_duration_s, rts)
    }

    pub fn current_prompt(&self) -> String {
        match self.phase {
            Phase::Instructions => "Press Enter to begin practice.".to_string(),
            Phase::PracticeDone => "Practice complete. Press Enter to start the timed test.".to_string(),
            Phase::Results => results_text(&self.scored_summary()),
            Phase::Practice | Phase::Scored => self
                .current_problem()
                .map(|p| p.prompt().to_string())
                .unwrap_or_default(),
        }
    }

    /// Verdict on the last practice answer. Cleared once the scored block
    /// starts.
    pub fn practice_feedback(&self) -> Option<String> {
        match self.phase {
            Phase::Practice | Phase::PracticeDone => self.practice_feedback.clone(),
            _ => None,
        }
    }

    pub fn snapshot(&self) -> TestSnapshot {
        TestSnapshot {
            title: self.title.clone(),
            phase: self.phase,
            prompt: self.current_prompt(),
            input_hint: self.input_hint.clone(),
            time_remaining_s: self.time_remaining_s(),
            attempted_scored: self.tally.attempted,
            correct_scored: self.tally.correct,
            payload: self.current_problem().and_then(|p| p.payload().cloned()),
            practice_feedback: self.practice_feedback(),
        }
    }

    // -- internals ----------------------------------------------------------

    fn transition(&mut self, to: Phase) {
        debug_assert!(
            Phase::is_valid_transition(self.phase, to),
            "invalid phase transition {} -> {}",
            self.phase,
            to
        );
        debug!(from = %self.phase, to = %to, "phase transition");
        self.phase = to;
        if to != Phase::Practice && to != Phase::Scored {
            self.current = None;
        }
    }

    fn finish(&mut self) {
        self.ended_at_s = Some(self.clock.now());
        self.transition(Phase::Results);
        info!(
            attempted = self.tally.attempted,
            correct = self.tally.correct,
            total_score = self.tally.total_score,
            "scored block finished"
        );
    }

    fn deal(&mut self) {
        let problem = self.generator.next_problem(self.config.difficulty);
        self.current = Some(Dealt {
            problem,
            presented_at_s: self.clock.now(),
        });
    }
}

impl<G, C, S> TrialSession for TimedTrialHarness<G, C, S>
where
    G: ProblemGenerator,
    C: Clock,
    S: AnswerScorer,
{
    fn title(&self) -> &str {
        &self.title
    }

    fn phase(&self) -> Phase {
        self.phase
    }

    fn start_practice(&mut self) {
        TimedTrialHarness::start_practice(self)
    }

    fn start_scored(&mut self) {
        TimedTrialHarness::start_scored(self)
    }

    fn update(&mut self) {
        TimedTrialHarness::update(self)
    }

    fn submit_answer(&mut self, raw: &str) -> bool {
        TimedTrialHarness::submit_answer(self, raw)
    }

    fn time_remaining_s(&self) -> Option<f64> {
        TimedTrialHarness::time_remaining_s(self)
    }

    fn snapshot(&self) -> TestSnapshot {
        TimedTrialHarness::snapshot(self)
    }

    fn scored_summary(&self) -> AttemptSummary {
        TimedTrialHarness::scored_summary(self)
    }

    fn attempt_meta(&self) -> AttemptMeta {
        AttemptMeta {
            seed: self.config.seed,
            difficulty: self.config.difficulty,
            practice_questions: self.config.practice_questions,
            practice_duration_s: None,
            scored_duration_s: self.config.scored_duration_s,
            scored_started_at_s: self.scored_started_at_s,
            ended_at_s: self.ended_at_s,
        }
    }

    fn scored_events(&self) -> Vec<RecordedEvent> {
        self.events
            .iter()
            .filter(|e| e.phase == Phase::Scored)
            .map(RecordedEvent::from)
            .collect()
    }
}

impl<G, C, S> std::fmt::Debug for TimedTrialHarness<G, C, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimedTrialHarness")
            .field("title", &self.title)
            .field("phase", &self.phase)
            .field("config", &self.config)
            .field("events", &self.events.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    /// Deals `n + n = ?` for n = 1, 2, 3, ...
    struct Counting(i64);

    impl ProblemGenerator for Counting {
        fn next_problem(&mut self, _difficulty: f64) -> Problem {
            self.0 += 1;
            Problem::new(format!("{0} + {0} =", self.0), self.0 * 2)
        }
    }

    fn harness(practice: u32, duration: f64) -> (TimedTrialHarness<Counting, ManualClock>, ManualClock) {
        let clock = ManualClock::new();
        let config = HarnessConfig::new(1, duration).practice_questions(practice);
        let h = TimedTrialHarness::new(config, Counting(0), clock.clone()).unwrap();
        (h, clock)
    }

    #[test]
    fn rejects_bad_config() {
        let clock = ManualClock::new();
        let bad = HarnessConfig::new(1, 0.0);
        assert!(TimedTrialHarness::new(bad, Counting(0), clock.clone()).is_err());
        let bad = HarnessConfig::new(1, 10.0).difficulty(1.5);
        assert!(TimedTrialHarness::new(bad, Counting(0), clock).is_err());
    }

    #[test]
    fn practice_then_scored_flow() {
        let (mut h, clock) = harness(2, 30.0);
        assert_eq!(h.phase(), Phase::Instructions);
        assert!(h.current_problem().is_none());

        h.start_practice();
        assert_eq!(h.phase(), Phase::Practice);
        assert_eq!(h.current_prompt(), "1 + 1 =");
        assert_eq!(h.time_remaining_s(), None);

        assert!(h.submit_answer("2"));
        assert!(h.submit_answer("5"));
        assert_eq!(h.phase(), Phase::PracticeDone);
        assert!(h.current_problem().is_none());

        clock.advance(3.0);
        h.start_scored();
        assert_eq!(h.phase(), Phase::Scored);
        assert_eq!(h.scored_started_at_s(), Some(3.0));
        assert_eq!(h.current_prompt(), "3 + 3 =");
        assert!(!h.can_exit());

        let summary = h.scored_summary();
        assert_eq!(summary.attempted, 0);
    }

    #[test]
    fn zero_practice_skips_dealing() {
        let (mut h, _clock) = harness(0, 30.0);
        h.start_practice();
        assert_eq!(h.phase(), Phase::PracticeDone);
        assert!(h.current_problem().is_none());
        assert!(h.events().is_empty());
    }

    #[test]
    fn start_scored_ignored_during_practice() {
        let (mut h, _clock) = harness(3, 30.0);
        h.start_scored();
        assert_eq!(h.phase(), Phase::Instructions);
        h.start_practice();
        h.start_scored();
        assert_eq!(h.phase(), Phase::Practice);
        assert_eq!(h.scored_started_at_s(), None);
    }

    #[test]
    fn rejected_input_keeps_state() {
        let (mut h, _clock) = harness(0, 30.0);
        h.start_scored();
        assert!(!h.submit_answer(""));
        assert!(!h.submit_answer("   "));
        assert!(!h.submit_answer("forty"));
        assert!(!h.submit_answer("4.5"));
        assert_eq!(h.phase(), Phase::Scored);
        assert!(h.events().is_empty());
        assert_eq!(h.current_prompt(), "1 + 1 =");
    }

    #[test]
    fn submit_outside_input_phases_is_rejected() {
        let (mut h, _clock) = harness(1, 30.0);
        assert!(!h.submit_answer("2"));
        h.start_practice();
        h.submit_answer("2");
        assert_eq!(h.phase(), Phase::PracticeDone);
        assert!(!h.submit_answer("2"));
    }

    #[test]
    fn answer_is_trimmed_but_raw_is_kept() {
        let (mut h, clock) = harness(0, 30.0);
        h.start_scored();
        clock.advance(1.25);
        assert!(h.submit_answer("  2 "));
        let e = &h.events()[0];
        assert_eq!(e.raw, "  2 ");
        assert_eq!(e.user_answer, 2);
        assert!(e.is_correct);
        assert_eq!(e.response_time_s, 1.25);
    }

    #[test]
    fn grace_instant_answer_is_scored_then_ends() {
        let (mut h, clock) = harness(0, 5.0);
        h.start_scored();
        clock.advance(5.0);
        assert_eq!(h.time_remaining_s(), Some(0.0));
        assert!(h.submit_answer("2"));
        assert_eq!(h.phase(), Phase::Results);
        assert!(h.current_problem().is_none());
        let s = h.scored_summary();
        assert_eq!((s.attempted, s.correct), (1, 1));
        assert_eq!(h.ended_at_s(), Some(5.0));
    }

    #[test]
    fn expired_empty_submission_ends_block() {
        let (mut h, clock) = harness(0, 5.0);
        h.start_scored();
        clock.advance(7.0);
        assert!(!h.submit_answer(""));
        assert_eq!(h.phase(), Phase::Results);
        assert!(!h.submit_answer("2"));
        assert_eq!(h.scored_summary().attempted, 0);
    }

    #[test]
    fn custom_scorer_result_is_clamped() {
        struct Generous;
        impl AnswerScorer for Generous {
            fn score(&self, _p: &Problem, _a: i64, _r: &str) -> f64 {
                3.0
            }
        }
        let (h, _clock) = harness(0, 10.0);
        let mut h = h.with_scorer(Generous);
        h.start_scored();
        h.submit_answer("999");
        assert_eq!(h.events()[0].score, 1.0);
        assert!(h.events()[0].is_correct);
    }

    #[test]
    fn results_prompt_reports_summary() {
        let (mut h, clock) = harness(0, 60.0);
        h.start_scored();
        clock.advance(1.0);
        h.submit_answer("2");
        clock.advance(60.0);
        h.update();
        assert_eq!(h.phase(), Phase::Results);
        assert_eq!(
            h.current_prompt(),
            "Results\nAttempted: 1\nCorrect: 1\nAccuracy: 100%\nMean RT: 1.00s\nThroughput: 1.0/min"
        );
    }

    #[test]
    fn snapshot_reflects_counters() {
        let (h, _clock) = harness(0, 10.0);
        let mut h = h.with_title("Numbers").with_input_hint("digits");
        h.start_scored();
        h.submit_answer("2");
        h.submit_answer("0");
        let snap = h.snapshot();
        assert_eq!(snap.title, "Numbers");
        assert_eq!(snap.input_hint, "digits");
        assert_eq!(snap.attempted_scored, 2);
        assert_eq!(snap.correct_scored, 1);
        assert_eq!(snap.time_remaining_s, Some(10.0));
        assert!(snap.payload.is_none());
    }
}
