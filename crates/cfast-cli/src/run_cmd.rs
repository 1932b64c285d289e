//! `cfast run` command: play one attempt headlessly and record it.
//!
//! Time is simulated with a [`ManualClock`], so a thirteen-minute test
//! finishes in well under a second and replays exactly for the same seed.

use std::path::Path;
use std::rc::Rc;

use anyhow::{Context, Result, bail};
use tracing::{debug, info};

use cfast_core::attempt::{AttemptRecord, AttemptSink};
use cfast_core::catalog::{self, SessionOptions, TestKind};
use cfast_core::clock::{Clock, ManualClock};
use cfast_core::generator::ProblemGenerator;
use cfast_core::phase::Phase;
use cfast_core::problem::Payload;
use cfast_core::rng::SeededStream;
use cfast_core::session::TrialSession;
use cfast_core::tasks::auditory_capacity::ScriptedPolicy;

use crate::sink::JsonlSink;

/// Frame length used when flying the continuous test.
pub const FRAME_S: f64 = 1.0 / 60.0;

/// Seconds the autopilot spends on each discrete question.
pub const DEFAULT_THINK_TIME_S: f64 = 3.0;

/// Offset added to the canonical answer when the autopilot errs on purpose.
const WRONG_ANSWER_OFFSET: i64 = 97;

/// Mixed into the session seed so the autopilot's coin does not share a
/// stream with the generator.
const COIN_SALT: u64 = 0x9E37_79B9_7F4A_7C15;

/// Everything that determines one headless attempt.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub code: String,
    pub session: SessionOptions,
    /// Share of discrete questions answered correctly, in `[0, 1]`.
    pub accuracy: f64,
    pub think_time_s: f64,
}

impl RunOptions {
    pub fn new(code: impl Into<String>, seed: u64) -> Self {
        Self {
            code: code.into(),
            session: SessionOptions::new(seed),
            accuracy: 1.0,
            think_time_s: DEFAULT_THINK_TIME_S,
        }
    }
}

/// A finished headless attempt.
#[derive(Debug)]
pub struct PlayedAttempt {
    /// The results screen text.
    pub results: String,
    pub record: AttemptRecord,
}

// -----------------------------------------------------------------------
// Command
// -----------------------------------------------------------------------

/// Run the run command.
pub fn run_run(opts: &RunOptions, output: &Path) -> Result<()> {
    let played = play(opts)?;

    println!("{}", played.results);
    println!();

    let mut sink = JsonlSink::new(output);
    sink.store(&played.record)
        .with_context(|| format!("failed to record attempt in {}", output.display()))?;
    if let Some(id) = sink.last_id() {
        println!("Recorded attempt {id} in {}", sink.path().display());
    }
    Ok(())
}

/// Play one attempt to the results screen without touching the filesystem.
pub fn play(opts: &RunOptions) -> Result<PlayedAttempt> {
    if !(0.0..=1.0).contains(&opts.accuracy) {
        bail!("accuracy must be in [0, 1], got {}", opts.accuracy);
    }
    if opts.think_time_s.is_nan() || opts.think_time_s <= 0.0 {
        bail!("think time must be positive, got {}", opts.think_time_s);
    }

    let code = opts.code.as_str();
    let entry = catalog::builtin()
        .get(code)
        .with_context(|| format!("unknown test code: {code} (see `cfast list`)"))?;

    let clock = ManualClock::new();
    let mut session = catalog::build(code, Rc::new(clock.clone()), &opts.session)
        .with_context(|| format!("failed to set up {code}"))?;

    info!(
        code,
        seed = opts.session.seed,
        difficulty = opts.session.difficulty,
        "starting headless attempt"
    );

    match entry.kind {
        TestKind::Discrete => {
            let mirror = catalog::mirror_generator(code, opts.session.seed)?
                .with_context(|| format!("{code} has no problem generator"))?;
            let mut autopilot = QuestionAutopilot::new(mirror, opts);
            answer_questions(session.as_mut(), &clock, &mut autopilot)?;
        }
        TestKind::Continuous => {
            let practice_s = opts
                .session
                .practice
                .map_or(entry.practice_duration_s, f64::from);
            let scored_s = opts
                .session
                .scored_duration_s
                .unwrap_or(entry.scored_duration_s);
            fly(session.as_mut(), &clock, practice_s, scored_s)?;
        }
    }

    let snapshot = session.snapshot();
    if snapshot.phase != Phase::Results {
        bail!("attempt stopped in phase {} instead of results", snapshot.phase);
    }
    let record = AttemptRecord::from_session(session.as_ref(), code, entry.version);
    info!(
        code,
        attempted = record.attempted,
        correct = record.correct,
        elapsed_s = clock.now(),
        "headless attempt finished"
    );

    Ok(PlayedAttempt {
        results: snapshot.prompt,
        record,
    })
}

// -----------------------------------------------------------------------
// Discrete autopilot
// -----------------------------------------------------------------------

/// Predicts each question with a mirror generator and errs at a fixed rate.
struct QuestionAutopilot {
    mirror: Box<dyn ProblemGenerator>,
    coin: SeededStream,
    difficulty: f64,
    accuracy: f64,
    think_time_s: f64,
}

impl QuestionAutopilot {
    fn new(mirror: Box<dyn ProblemGenerator>, opts: &RunOptions) -> Self {
        Self {
            mirror,
            coin: SeededStream::new(opts.session.seed ^ COIN_SALT),
            difficulty: opts.session.difficulty,
            accuracy: opts.accuracy,
            think_time_s: opts.think_time_s,
        }
    }

    /// Answer the question on screen after the think time has passed.
    fn answer(&mut self, session: &mut dyn TrialSession, clock: &ManualClock) -> Result<()> {
        let problem = self.mirror.next_problem(self.difficulty);
        let on_screen = session.snapshot().prompt;
        if on_screen != problem.prompt() {
            bail!(
                "autopilot lost track of the question stream: expected {:?}, saw {:?}",
                problem.prompt(),
                on_screen
            );
        }
        let answer = if self.coin.random() < self.accuracy {
            problem.answer()
        } else {
            problem.answer() + WRONG_ANSWER_OFFSET
        };
        clock.advance(self.think_time_s);
        session.submit_answer(&answer.to_string());
        Ok(())
    }
}

/// Answer every practice and scored question until the results screen.
fn answer_questions(
    session: &mut dyn TrialSession,
    clock: &ManualClock,
    autopilot: &mut QuestionAutopilot,
) -> Result<()> {
    session.start_practice();
    while session.phase() == Phase::Practice {
        autopilot.answer(session, clock)?;
    }
    debug!(phase = %session.phase(), "practice finished");

    session.start_scored();
    while session.phase() == Phase::Scored {
        autopilot.answer(session, clock)?;
        session.update();
    }
    Ok(())
}

// -----------------------------------------------------------------------
// Continuous autopilot
// -----------------------------------------------------------------------

/// Fly the practice and scored blocks frame by frame with the scripted
/// policy.
fn fly(
    session: &mut dyn TrialSession,
    clock: &ManualClock,
    practice_s: f64,
    scored_s: f64,
) -> Result<()> {
    let mut policy = ScriptedPolicy::new();

    session.start_practice();
    fly_until(session, clock, &mut policy, Phase::PracticeDone, practice_s)?;
    session.start_scored();
    fly_until(session, clock, &mut policy, Phase::Results, scored_s)
}

fn fly_until(
    session: &mut dyn TrialSession,
    clock: &ManualClock,
    policy: &mut ScriptedPolicy,
    until: Phase,
    block_s: f64,
) -> Result<()> {
    let max_frames = (block_s / FRAME_S).ceil() as usize + 60;
    let mut frames = 0usize;

    while session.phase() != until {
        if frames >= max_frames {
            bail!("phase {until} not reached after {frames} frames");
        }
        frames += 1;

        clock.advance(FRAME_S);
        session.update();
        let Some(Payload::AuditoryCapacity(payload)) = session.snapshot().payload else {
            continue;
        };
        let action = policy.act(&payload);
        session.set_control(action.horizontal, action.vertical);
        for command in &action.commands {
            session.submit_answer(command);
        }
    }
    debug!(phase = %until, frames, "block flown");
    Ok(())
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------
