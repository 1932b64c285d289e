use crate::rng::SeededStream;
use crate::scoring::{clamp01, lerp_int};

use super::{Color, ColorRule, Shape};

pub const CALLSIGNS: [&str; 10] = [
    "EAGLE", "RAVEN", "FALCON", "VIPER", "COBRA", "TALON", "MOOSE", "LANCER", "SABER", "NOVA",
];
pub const COLORS: [Color; 4] = [Color::Red, Color::Green, Color::Blue, Color::Yellow];
pub const SHAPES: [Shape; 3] = [Shape::Circle, Shape::Triangle, Shape::Square];

/// A gate about to be spawned.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GatePlan {
    pub y_norm: f64,
    pub color: Color,
    pub shape: Shape,
    pub aperture_norm: f64,
}

/// A drift vector applied to the ball for `duration_s`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Disturbance {
    pub vx: f64,
    pub vy: f64,
    pub duration_s: f64,
}

/// Seeded source of all scenario content.
///
/// Every method consumes a fixed number of draws:
///
/// | method               | draws                                  |
/// |----------------------|----------------------------------------|
/// | `assign_callsigns`   | `sample(_, 3)`                         |
/// | `next_callsign_cue`  | `choice`                               |
/// | `next_sequence`      | `randint` per digit                    |
/// | `next_color_command` | `choice` (none if only one option)     |
/// | `next_gate`          | `uniform`, `choice`, `choice`, `uniform` |
/// | `next_disturbance`   | `uniform` x 4                          |
/// | `jittered_interval`  | `uniform`                              |
/// | `build_color_rules`  | `choice` per colour                    |
#[derive(Debug, Clone)]
pub struct ScenarioGenerator {
    rng: SeededStream,
}

impl ScenarioGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SeededStream::new(seed),
        }
    }

    pub fn assign_callsigns(&mut self) -> Vec<&'static str> {
        self.rng.sample(&CALLSIGNS, 3)
    }

    pub fn next_callsign_cue(&mut self) -> &'static str {
        *self.rng.choice(&CALLSIGNS)
    }

    /// Four to seven digits, longer with difficulty.
    pub fn next_sequence(&mut self, difficulty: f64) -> String {
        let n = lerp_int(4, 7, clamp01(difficulty));
        (0..n)
            .map(|_| char::from(b'0' + self.rng.randint(0, 9) as u8))
            .collect()
    }

    /// A colour different from the ball's, avoiding a repeat of the last
    /// command when possible.
    pub fn next_color_command(&mut self, current: Color, last: Option<Color>) -> Color {
        let mut options: Vec<Color> = COLORS
            .into_iter()
            .filter(|&c| c != current && Some(c) != last)
            .collect();
        if options.is_empty() {
            options = COLORS.into_iter().filter(|&c| c != current).collect();
        }
        if options.is_empty() {
            return current;
        }
        *self.rng.choice(&options)
    }

    pub fn next_gate(&mut self, difficulty: f64) -> GatePlan {
        let d = clamp01(difficulty);
        let y_span = 0.50 - 0.11 * d;
        let y_norm = self.rng.uniform(-y_span, y_span);
        let color = *self.rng.choice(&COLORS);
        let shape = *self.rng.choice(&SHAPES);
        let aperture_norm = (0.23 - 0.10 * d + self.rng.uniform(-0.02, 0.02)).clamp(0.08, 0.26);
        GatePlan {
            y_norm,
            color,
            shape,
            aperture_norm,
        }
    }

    pub fn next_disturbance(&mut self, difficulty: f64) -> Disturbance {
        let d = clamp01(difficulty);
        let magnitude = self.rng.uniform(0.15 + 0.10 * d, 0.34 + 0.12 * d);
        let vx = self.rng.uniform(-magnitude, magnitude);
        let vy = self.rng.uniform(-magnitude, magnitude);

        let dur_lo = (0.85 - 0.34 * d).max(0.28);
        let dur_hi = (1.40 - 0.42 * d).max(dur_lo + 0.05);
        let duration_s = self.rng.uniform(dur_lo, dur_hi);
        Disturbance { vx, vy, duration_s }
    }

    /// `base_s` jittered by up to ±22 %, tightening with difficulty.
    pub fn jittered_interval(&mut self, base_s: f64, difficulty: f64) -> f64 {
        let tightness = 0.22 - 0.12 * clamp01(difficulty);
        let lo = (base_s * (1.0 - tightness)).max(0.12);
        let hi = (base_s * (1.0 + tightness)).max(lo + 0.02);
        self.rng.uniform(lo, hi)
    }

    pub fn build_color_rules(&mut self) -> Vec<ColorRule> {
        COLORS
            .into_iter()
            .map(|color| ColorRule {
                color,
                required_shape: *self.rng.choice(&SHAPES),
            })
            .collect()
    }
}
