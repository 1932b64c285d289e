//! Fixed-tick continuous engine.
//!
//! Some tests are not question/answer pairs but continuous tracking with
//! concurrent interrupt channels. [`ContinuousEngine`] owns the lifecycle,
//! the tick accumulator and the shared event log; the task itself is a
//! [`Simulation`] stepped once per whole tick.
//!
//! Phase boundaries are checked once per [`ContinuousEngine::update`], after
//! the tick loop. Nothing runs in the background.

pub mod channel;
pub mod log;

use std::fmt;

use tracing::{debug, info};

use crate::attempt::{AttemptMeta, RecordedEvent};
use crate::clock::Clock;
use crate::error::ConfigError;
use crate::event::{AttemptSummary, results_text};
use crate::phase::Phase;
use crate::problem::Payload;
use crate::session::{TestSnapshot, TrialSession};

pub use channel::{ActiveCue, CueChannel, CueStatus};
pub use log::{ChannelEvent, ChannelLog, Outcome};

/// Longest wall-clock gap a single `update()` will simulate. Anything
/// beyond is dropped instead of replayed.
pub const MAX_UPDATE_DT_S: f64 = 0.5;

// ---------------------------------------------------------------------------
// Simulation capability
// ---------------------------------------------------------------------------

/// The task-specific half of a continuous test.
pub trait Simulation {
    /// Event kind tag recorded in the log.
    type Kind: Copy + PartialEq + fmt::Debug + fmt::Display;

    /// Reset all run state for a fresh practice or scored run.
    fn begin_run(&mut self);

    /// Advance one fixed tick. `sim_s` is the run time after this tick.
    fn step(&mut self, sim_s: f64, dt: f64, log: &mut ChannelLog<Self::Kind>);

    /// Handle one normalized (trimmed, upper-case, non-empty) command.
    /// Returns `true` if accepted.
    fn handle_command(
        &mut self,
        command: &str,
        sim_s: f64,
        log: &mut ChannelLog<Self::Kind>,
    ) -> bool;

    /// Control axes, already clamped to `[-1, 1]`.
    fn set_control(&mut self, horizontal: f64, vertical: f64);

    fn payload(&self, sim_s: f64, log: &ChannelLog<Self::Kind>) -> Option<Payload>;

    /// Extra task-specific lines appended to the results prompt.
    fn results_lines(&self) -> Vec<String> {
        Vec::new()
    }

    fn running_prompt(&self) -> String {
        "Manage all channels continuously until time expires.".to_string()
    }
}

// ---------------------------------------------------------------------------
// Timing
// ---------------------------------------------------------------------------

/// Tick rate and phase durations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineTiming {
    pub tick_hz: f64,
    /// Zero skips practice entirely.
    pub practice_duration_s: f64,
    pub scored_duration_s: f64,
}

impl EngineTiming {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ConfigError::require_positive("tick_hz", self.tick_hz)?;
        ConfigError::require_non_negative("practice_duration_s", self.practice_duration_s)?;
        ConfigError::require_positive("scored_duration_s", self.scored_duration_s)?;
        Ok(())
    }

    pub fn tick_dt(&self) -> f64 {
        1.0 / self.tick_hz
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

pub struct ContinuousEngine<S: Simulation, C> {
    title: String,
    instructions: Vec<String>,
    input_hint: String,
    seed: u64,
    difficulty: f64,
    timing: EngineTiming,

    sim: S,
    clock: C,

    phase: Phase,
    phase_started_at_s: f64,
    last_update_at_s: f64,
    accumulator_s: f64,
    sim_elapsed_s: f64,
    scored_started_at_s: Option<f64>,
    ended_at_s: Option<f64>,
    log: ChannelLog<S::Kind>,
}

impl<S, C> ContinuousEngine<S, C>
where
    S: Simulation,
    C: Clock,
{
    /// Validate and build an engine in [`Phase::Instructions`]. `seed` is
    /// carried for the attempt record; the simulation owns its own stream.
    pub fn new(
        sim: S,
        clock: C,
        seed: u64,
        difficulty: f64,
        timing: EngineTiming,
    ) -> Result<Self, ConfigError> {
        ConfigError::require_unit(difficulty)?;
        timing.validate()?;
        let now = clock.now();
        Ok(Self {
            title: String::new(),
            instructions: Vec::new(),
            input_hint: String::new(),
            seed,
            difficulty,
            timing,
            sim,
            clock,
            phase: Phase::Instructions,
            phase_started_at_s: now,
            last_update_at_s: now,
            accumulator_s: 0.0,
            sim_elapsed_s: 0.0,
            scored_started_at_s: None,
            ended_at_s: None,
            log: ChannelLog::new(),
        })
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

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn difficulty(&self) -> f64 {
        self.difficulty
    }

    pub fn timing(&self) -> &EngineTiming {
        &self.timing
    }

    pub fn simulation(&self) -> &S {
        &self.sim
    }

    /// Simulated seconds since the current run started.
    pub fn sim_elapsed_s(&self) -> f64 {
        self.sim_elapsed_s
    }

    pub fn events(&self) -> &[ChannelEvent<S::Kind>] {
        self.log.events()
    }

    pub fn can_exit(&self) -> bool {
        self.phase.can_exit()
    }

    pub fn set_control(&mut self, horizontal: f64, vertical: f64) {
        self.sim
            .set_control(horizontal.clamp(-1.0, 1.0), vertical.clamp(-1.0, 1.0));
    }

    pub fn start_practice(&mut self) {
        if self.phase != Phase::Instructions {
            debug!(phase = %self.phase, "start_practice ignored");
            return;
        }
        if self.timing.practice_duration_s <= 0.0 {
            self.transition(Phase::PracticeDone);
            self.phase_started_at_s = self.clock.now();
            return;
        }
        self.transition(Phase::Practice);
        self.begin_run();
    }

    pub fn start_scored(&mut self) {
        if self.phase != Phase::PracticeDone {
            debug!(phase = %self.phase, "start_scored ignored");
            return;
        }
        self.transition(Phase::Scored);
        self.begin_run();
        self.scored_started_at_s = Some(self.phase_started_at_s);
        info!(
            seed = self.seed,
            difficulty = self.difficulty,
            duration_s = self.timing.scored_duration_s,
            tick_hz = self.timing.tick_hz,
            "continuous scored block started"
        );
    }

    /// Convert elapsed clock time into whole ticks, step the simulation for
    /// each, then apply any due phase boundary.
    pub fn update(&mut self) {
        let now = self.clock.now();
        let dt = now - self.last_update_at_s;
        self.last_update_at_s = now;

        if dt > 0.0 {
            let tick_dt = self.timing.tick_dt();
            self.accumulator_s += dt.min(MAX_UPDATE_DT_S);
            while self.accumulator_s >= tick_dt {
                self.accumulator_s -= tick_dt;
                if self.phase.accepts_input() {
                    self.sim_elapsed_s += tick_dt;
                    self.sim.step(self.sim_elapsed_s, tick_dt, &mut self.log);
                }
            }
        }

        self.refresh_phase_boundaries(now);
    }

    /// Forward one command token. Returns `true` if it was accepted.
    pub fn submit_answer(&mut self, raw: &str) -> bool {
        if !self.phase.accepts_input() {
            return false;
        }
        let command = raw.trim().to_uppercase();
        if command.is_empty() {
            return false;
        }
        self.sim
            .handle_command(&command, self.sim_elapsed_s, &mut self.log)
    }

    /// Time left in the running practice or scored block.
    pub fn time_remaining_s(&self) -> Option<f64> {
        let duration = match self.phase {
            Phase::Practice => self.timing.practice_duration_s,
            Phase::Scored => self.timing.scored_duration_s,
            _ => return None,
        };
        let elapsed = self.clock.now() - self.phase_started_at_s;
        Some((duration - elapsed).max(0.0))
    }

    pub fn scored_summary(&self) -> AttemptSummary {
        self.log.summarize(self.timing.scored_duration_s)
    }

    pub fn current_prompt(&self) -> String {
        match self.phase {
            Phase::Instructions => {
                let mut lines = self.instructions.clone();
                if !lines.is_empty() {
                    lines.push(String::new());
                }
                lines.push("Press Enter to start practice.".to_string());
                lines.join("\n")
            }
            Phase::PracticeDone => {
                "Practice complete. Press Enter to begin the timed scored block.".to_string()
            }
            Phase::Results => {
                let mut text = results_text(&self.scored_summary());
                for line in self.sim.results_lines() {
                    text.push('\n');
                    text.push_str(&line);
                }
                text
            }
            Phase::Practice | Phase::Scored => self.sim.running_prompt(),
        }
    }

    pub fn snapshot(&self) -> TestSnapshot {
        let payload = if self.phase.accepts_input() {
            self.sim.payload(self.sim_elapsed_s, &self.log)
        } else {
            None
        };
        let tally = self.log.tally();
        TestSnapshot {
            title: self.title.clone(),
            phase: self.phase,
            prompt: self.current_prompt(),
            input_hint: self.input_hint.clone(),
            time_remaining_s: self.time_remaining_s(),
            attempted_scored: tally.attempted,
            correct_scored: tally.correct,
            payload,
            practice_feedback: None,
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
        self.log.set_phase(to);
    }

    fn begin_run(&mut self) {
        let now = self.clock.now();
        self.phase_started_at_s = now;
        self.last_update_at_s = now;
        self.accumulator_s = 0.0;
        self.sim_elapsed_s = 0.0;
        self.sim.begin_run();
    }

    fn refresh_phase_boundaries(&mut self, now: f64) {
        let (duration, next) = match self.phase {
            Phase::Practice => (self.timing.practice_duration_s, Phase::PracticeDone),
            Phase::Scored => (self.timing.scored_duration_s, Phase::Results),
            _ => return,
        };
        if now - self.phase_started_at_s < duration {
            return;
        }
        self.transition(next);
        self.phase_started_at_s = now;
        self.last_update_at_s = now;
        self.accumulator_s = 0.0;

        if next == Phase::Results {
            self.ended_at_s = Some(now);
            let tally = self.log.tally();
            info!(
                attempted = tally.attempted,
                correct = tally.correct,
                total_score = tally.total_score,
                "continuous scored block finished"
            );
        }
    }
}

impl<S, C> TrialSession for ContinuousEngine<S, C>
where
    S: Simulation,
    C: Clock,
{
    fn title(&self) -> &str {
        &self.title
    }

    fn phase(&self) -> Phase {
        self.phase
    }

    fn start_practice(&mut self) {
        ContinuousEngine::start_practice(self)
    }

    fn start_scored(&mut self) {
        ContinuousEngine::start_scored(self)
    }

    fn update(&mut self) {
        ContinuousEngine::update(self)
    }

    fn submit_answer(&mut self, raw: &str) -> bool {
        ContinuousEngine::submit_answer(self, raw)
    }

    fn set_control(&mut self, horizontal: f64, vertical: f64) {
        ContinuousEngine::set_control(self, horizontal, vertical)
    }

    fn time_remaining_s(&self) -> Option<f64> {
        ContinuousEngine::time_remaining_s(self)
    }

    fn snapshot(&self) -> TestSnapshot {
        ContinuousEngine::snapshot(self)
    }

    fn scored_summary(&self) -> AttemptSummary {
        ContinuousEngine::scored_summary(self)
    }

    fn attempt_meta(&self) -> AttemptMeta {
        AttemptMeta {
            seed: self.seed,
            difficulty: self.difficulty,
            practice_questions: 0,
            practice_duration_s: Some(self.timing.practice_duration_s),
            scored_duration_s: self.timing.scored_duration_s,
            scored_started_at_s: self.scored_started_at_s,
            ended_at_s: self.ended_at_s,
        }
    }

    fn scored_events(&self) -> Vec<RecordedEvent> {
        self.log
            .events()
            .iter()
            .filter(|e| e.phase == Phase::Scored)
            .map(RecordedEvent::from)
            .collect()
    }
}

impl<S: Simulation, C> fmt::Debug for ContinuousEngine<S, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContinuousEngine")
            .field("title", &self.title)
            .field("phase", &self.phase)
            .field("timing", &self.timing)
            .field("sim_elapsed_s", &self.sim_elapsed_s)
            .field("events", &self.log.events().len())
            .finish()
    }
}
