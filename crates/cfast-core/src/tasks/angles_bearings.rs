//! Angle and bearing estimation, scored with a linear error band.

use crate::clock::Clock;
use crate::error::ConfigError;
use crate::generator::ProblemGenerator;
use crate::harness::{HarnessConfig, TimedTrialHarness};
use crate::problem::{Payload, Problem};
use crate::rng::SeededStream;
use crate::scoring::{AnswerScorer, ScoreBand, circular_error_deg, clamp01, lerp_int};

pub const CODE: &str = "angles_bearings_degrees";

const LABELS: [char; 6] = ['A', 'B', 'C', 'D', 'E', 'F'];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnglesBearingsKind {
    /// Smaller angle between two rays.
    AngleBetweenLines,
    /// Bearing of a labelled point from the centre, wrapping at 360.
    BearingFromReference,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnglesBearingsPayload {
    pub kind: AnglesBearingsKind,
    pub reference_bearing_deg: i64,
    pub target_bearing_deg: i64,
    pub object_label: Option<char>,
    pub band: ScoreBand,
}

/// Scores with the payload's band; bearing errors wrap around the circle.
/// Problems without an angles payload fall back to exact match.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnglesBearingsScorer;

impl AnswerScorer for AnglesBearingsScorer {
    fn score(&self, problem: &Problem, user_answer: i64, _raw: &str) -> f64 {
        let Some(Payload::AnglesBearings(payload)) = problem.payload() else {
            return if user_answer == problem.answer() { 1.0 } else { 0.0 };
        };
        let err = match payload.kind {
            AnglesBearingsKind::BearingFromReference => {
                circular_error_deg(user_answer, problem.answer())
            }
            AnglesBearingsKind::AngleBetweenLines => {
                u32::try_from(user_answer.abs_diff(problem.answer())).unwrap_or(u32::MAX)
            }
        };
        payload.band.score(err)
    }
}

/// Draw order per problem: one `random` picks the kind. An angle problem
/// then draws `randint` (reference), `randint` (quantized angle), `random`
/// (direction). A bearing problem draws `randint` (quantized bearing) and
/// `choice` (label).
#[derive(Debug, Clone)]
pub struct AnglesBearingsGenerator {
    rng: SeededStream,
}

impl AnglesBearingsGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SeededStream::new(seed),
        }
    }

    fn angle_problem(&mut self, d: f64) -> Problem {
        let reference = self.rng.randint(0, 359);
        let step = lerp_int(15, 1, d);
        let angle = self.sample_quantized(lerp_int(75, 12, d), lerp_int(130, 170, d), step);
        let clockwise = self.rng.random() < 0.5;
        let target = if clockwise {
            (reference + angle).rem_euclid(360)
        } else {
            (reference - angle).rem_euclid(360)
        };

        let payload = AnglesBearingsPayload {
            kind: AnglesBearingsKind::AngleBetweenLines,
            reference_bearing_deg: reference,
            target_bearing_deg: target,
            object_label: None,
            band: ScoreBand::new(lerp_int(4, 2, d) as u32, lerp_int(35, 15, d) as u32),
        };
        Problem::new(
            "Estimate the smaller angle between the two rays (degrees).",
            angle,
        )
        .with_payload(Payload::AnglesBearings(payload))
    }

    fn bearing_problem(&mut self, d: f64) -> Problem {
        let bearing = self.sample_quantized(0, 359, lerp_int(15, 1, d));
        let label = *self.rng.choice(&LABELS);

        let payload = AnglesBearingsPayload {
            kind: AnglesBearingsKind::BearingFromReference,
            reference_bearing_deg: 0,
            target_bearing_deg: bearing,
            object_label: Some(label),
            band: ScoreBand::new(lerp_int(5, 2, d) as u32, lerp_int(40, 18, d) as u32),
        };
        Problem::new(
            format!("Estimate the bearing of point {label} from the center (000-359)."),
            bearing,
        )
        .with_payload(Payload::AnglesBearings(payload))
    }

    /// A multiple of `step` in `[lo, hi]`, or any integer there when
    /// `step <= 1`. One `randint` either way.
    fn sample_quantized(&mut self, lo: i64, hi: i64, step: i64) -> i64 {
        if step <= 1 {
            return self.rng.randint(lo, hi);
        }
        let q = self.rng.randint(lo.div_euclid(step), hi.div_euclid(step));
        let mut value = q * step;
        if value < lo {
            value += step;
        }
        if value > hi {
            value -= step;
        }
        value.clamp(lo, hi)
    }
}

impl ProblemGenerator for AnglesBearingsGenerator {
    fn next_problem(&mut self, difficulty: f64) -> Problem {
        let d = clamp01(difficulty);
        if self.rng.random() < 0.5 {
            self.angle_problem(d)
        } else {
            self.bearing_problem(d)
        }
    }
}

pub fn build_angles_bearings_test<C: Clock>(
    clock: C,
    config: HarnessConfig,
) -> Result<TimedTrialHarness<AnglesBearingsGenerator, C, AnglesBearingsScorer>, ConfigError> {
    let generator = AnglesBearingsGenerator::new(config.seed);
    let harness = TimedTrialHarness::new(config, generator, clock)?.with_scorer(AnglesBearingsScorer);
    Ok(super::describe_harness(harness, CODE))
}
