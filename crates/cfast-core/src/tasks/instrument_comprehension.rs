//! Attitude-instrument interpretation: pick the option (1-4) matching the
//! aircraft's bank, pitch and heading. Near misses earn partial credit
//! through a weighted attitude error.

use std::fmt;

use crate::clock::Clock;
use crate::error::ConfigError;
use crate::generator::ProblemGenerator;
use crate::harness::{HarnessConfig, TimedTrialHarness};
use crate::problem::{Payload, Problem};
use crate::rng::SeededStream;
use crate::scoring::{AnswerScorer, ScoreBand, circular_error_deg, clamp01, lerp_int};

pub const CODE: &str = "instrument_comprehension";

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstrumentTrialKind {
    AttitudeMatch,
    AttitudeWithCallout,
}

/// Bank (negative = left), pitch (negative = nose down) and heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attitude {
    pub bank_deg: i64,
    pub pitch_deg: i64,
    pub heading_deg: i64,
}

impl Attitude {
    /// Weighted Manhattan distance: bank counts double, pitch triple,
    /// heading by its circular error.
    pub fn error_to(&self, other: &Attitude) -> u32 {
        let bank = self.bank_deg.abs_diff(other.bank_deg);
        let pitch = self.pitch_deg.abs_diff(other.pitch_deg);
        let heading = u64::from(circular_error_deg(self.heading_deg, other.heading_deg));
        u32::try_from(bank * 2 + pitch * 3 + heading).unwrap_or(u32::MAX)
    }
}

impl fmt::Display for Attitude {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, {}, HDG {:03}",
            bank_text(self.bank_deg),
            pitch_text(self.pitch_deg),
            self.heading_deg
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InstrumentOption {
    pub code: i64,
    pub label: String,
    pub attitude: Attitude,
    /// Error of this option against the true attitude.
    pub error: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InstrumentPayload {
    pub kind: InstrumentTrialKind,
    pub attitude: Attitude,
    pub verbal_cue: String,
    pub options: Vec<InstrumentOption>,
    pub band: ScoreBand,
}

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

/// Looks up the chosen option's error and scores it through the band.
/// Unknown option codes score 0.
#[derive(Debug, Clone, Copy, Default)]
pub struct InstrumentScorer;

impl AnswerScorer for InstrumentScorer {
    fn score(&self, problem: &Problem, user_answer: i64, _raw: &str) -> f64 {
        let Some(Payload::Instrument(payload)) = problem.payload() else {
            return if user_answer == problem.answer() { 1.0 } else { 0.0 };
        };
        payload
            .options
            .iter()
            .find(|o| o.code == user_answer)
            .map_or(0.0, |o| payload.band.score(o.error))
    }
}

// ---------------------------------------------------------------------------
// Generator
// ---------------------------------------------------------------------------

/// Draw order per problem: heading `randint`, bank `randint` + `random`
/// (sign), pitch `randint` + `random`, kind `random`, then `sample` of the
/// four candidate slots.
#[derive(Debug, Clone)]
pub struct InstrumentGenerator {
    rng: SeededStream,
}

impl InstrumentGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SeededStream::new(seed),
        }
    }

    fn sample_heading(&mut self, d: f64) -> i64 {
        let step = lerp_int(45, 10, d).max(1);
        if step <= 1 {
            return self.rng.randint(0, 359);
        }
        let q = self.rng.randint(0, 359 / step);
        (q * step).rem_euclid(360)
    }

    fn signed_magnitude(&mut self, lo: i64, hi: i64) -> i64 {
        let mag_lo = lo.min(hi).max(1);
        let mag_hi = lo.max(hi).max(mag_lo);
        let magnitude = self.rng.randint(mag_lo, mag_hi);
        if self.rng.random() < 0.5 { -magnitude } else { magnitude }
    }
}

impl ProblemGenerator for InstrumentGenerator {
    fn next_problem(&mut self, difficulty: f64) -> Problem {
        let d = clamp01(difficulty);

        let heading = self.sample_heading(d);
        let bank = self.signed_magnitude(lerp_int(22, 8, d), lerp_int(38, 24, d));
        let pitch = self.signed_magnitude(lerp_int(8, 3, d), lerp_int(16, 10, d));
        let truth = Attitude {
            bank_deg: bank,
            pitch_deg: pitch,
            heading_deg: heading,
        };

        let near = lerp_int(25, 8, d).max(5);
        let far = lerp_int(95, 40, d);

        let kind = if self.rng.random() < 0.5 {
            InstrumentTrialKind::AttitudeMatch
        } else {
            InstrumentTrialKind::AttitudeWithCallout
        };

        // Slot 0 is the true attitude; the rest are distractors.
        let candidates = [
            (bank, pitch, heading),
            (bank, pitch, heading + near),
            (-bank, pitch, heading),
            (-bank, -pitch, heading + far),
        ];
        let order = self.rng.sample(&[0usize, 1, 2, 3], 4);

        let mut correct_code = 0;
        let options: Vec<InstrumentOption> = order
            .iter()
            .zip(1i64..)
            .map(|(&slot, code)| {
                let (b, p, h) = candidates[slot];
                let attitude = Attitude {
                    bank_deg: b,
                    pitch_deg: p,
                    heading_deg: h.rem_euclid(360),
                };
                if slot == 0 {
                    correct_code = code;
                }
                InstrumentOption {
                    code,
                    label: attitude.to_string(),
                    attitude,
                    error: truth.error_to(&attitude),
                }
            })
            .collect();

        let prompt = match kind {
            InstrumentTrialKind::AttitudeMatch => {
                "Select the option number (1-4) that best matches the instruments."
            }
            InstrumentTrialKind::AttitudeWithCallout => {
                "Select the option number (1-4) that matches instruments and callout."
            }
        };

        let payload = InstrumentPayload {
            kind,
            attitude: truth,
            verbal_cue: verbal_cue(kind, bank, pitch),
            options,
            band: ScoreBand::new(0, lerp_int(110, 70, d) as u32),
        };
        Problem::new(prompt, correct_code).with_payload(Payload::Instrument(payload))
    }
}

fn bank_text(bank_deg: i64) -> String {
    let side = if bank_deg < 0 { "left" } else { "right" };
    format!("bank {side} {}°", bank_deg.abs())
}

fn pitch_text(pitch_deg: i64) -> String {
    let dir = if pitch_deg < 0 { "down" } else { "up" };
    format!("nose {dir} {}°", pitch_deg.abs())
}

fn verbal_cue(kind: InstrumentTrialKind, bank_deg: i64, pitch_deg: i64) -> String {
    match kind {
        InstrumentTrialKind::AttitudeMatch => format!(
            "Instrument cue: {}; {}.",
            bank_text(bank_deg),
            pitch_text(pitch_deg)
        ),
        InstrumentTrialKind::AttitudeWithCallout => {
            let turn = if bank_deg < 0 { "turning left" } else { "turning right" };
            let trend = if pitch_deg < 0 { "descending" } else { "climbing" };
            format!("Crew callout: {turn}, {trend}.")
        }
    }
}

pub fn build_instrument_comprehension_test<C: Clock>(
    clock: C,
    config: HarnessConfig,
) -> Result<TimedTrialHarness<InstrumentGenerator, C, InstrumentScorer>, ConfigError> {
    let generator = InstrumentGenerator::new(config.seed);
    let harness = TimedTrialHarness::new(config, generator, clock)?.with_scorer(InstrumentScorer);
    Ok(super::describe_harness(harness, CODE))
}
