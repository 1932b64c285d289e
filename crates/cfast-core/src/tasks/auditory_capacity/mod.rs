//! Divided-attention test on the continuous engine.
//!
//! The candidate steers a ball through a tube while handling four
//! concurrent cue channels:
//!
//! - call signs: respond only to the three assigned call signs
//! - beeps: trigger whenever one sounds
//! - colour commands: switch the ball to the commanded colour
//! - digit sequences: memorize while shown, then type them back
//!
//! Gates drift toward the ball and are scored the instant they cross it.

mod autopilot;
mod generator;
mod simulation;

use std::fmt;
use std::str::FromStr;

pub use autopilot::{PolicyAction, ScriptedPolicy};
pub use generator::{CALLSIGNS, COLORS, Disturbance, GatePlan, SHAPES, ScenarioGenerator};
pub use simulation::AuditorySimulation;

use crate::clock::Clock;
use crate::continuous::{ContinuousEngine, EngineTiming};
use crate::error::ConfigError;

pub const CODE: &str = "auditory_capacity";

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Timing, gains and channel schedule for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditoryCapacityConfig {
    pub practice_duration_s: f64,
    pub scored_duration_s: f64,
    pub tick_hz: f64,

    pub control_gain: f64,
    pub disturbance_gain: f64,
    pub tube_half_width: f64,
    pub tube_half_height: f64,

    pub gate_speed_norm_per_s: f64,
    pub gate_interval_s: f64,

    pub callsign_interval_s: f64,
    pub beep_interval_s: f64,
    pub color_command_interval_s: f64,
    pub sequence_interval_s: f64,

    pub cue_window_s: f64,
    pub sequence_display_s: f64,
    pub sequence_response_s: f64,
}

impl Default for AuditoryCapacityConfig {
    fn default() -> Self {
        Self {
            practice_duration_s: 60.0,
            scored_duration_s: 13.0 * 60.0,
            tick_hz: 120.0,
            control_gain: 1.24,
            disturbance_gain: 0.64,
            tube_half_width: 0.92,
            tube_half_height: 0.56,
            gate_speed_norm_per_s: 0.72,
            gate_interval_s: 2.0,
            callsign_interval_s: 1.95,
            beep_interval_s: 1.60,
            color_command_interval_s: 4.40,
            sequence_interval_s: 8.20,
            cue_window_s: 1.25,
            sequence_display_s: 1.75,
            sequence_response_s: 3.50,
        }
    }
}

impl AuditoryCapacityConfig {
    pub fn timing(&self) -> EngineTiming {
        EngineTiming {
            tick_hz: self.tick_hz,
            practice_duration_s: self.practice_duration_s,
            scored_duration_s: self.scored_duration_s,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.timing().validate()?;
        ConfigError::require_positive("cue_window_s", self.cue_window_s)?;
        ConfigError::require_positive("sequence_display_s", self.sequence_display_s)?;
        ConfigError::require_positive("sequence_response_s", self.sequence_response_s)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Vocabulary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    Red,
    Green,
    Blue,
    Yellow,
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Red => "RED",
            Self::Green => "GREEN",
            Self::Blue => "BLUE",
            Self::Yellow => "YELLOW",
        };
        f.write_str(s)
    }
}

impl FromStr for Color {
    type Err = ColorParseError;

    /// Accepts full names, initials, and the Q/W/E key aliases
    /// (Q = blue, W = green, E = yellow, R = red). Case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "R" | "RED" => Ok(Self::Red),
            "W" | "G" | "GREEN" => Ok(Self::Green),
            "Q" | "B" | "BLUE" => Ok(Self::Blue),
            "E" | "Y" | "YELLOW" => Ok(Self::Yellow),
            _ => Err(ColorParseError(s.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`Color`] string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid colour: {0:?}")]
pub struct ColorParseError(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    Circle,
    Triangle,
    Square,
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Circle => "CIRCLE",
            Self::Triangle => "TRIANGLE",
            Self::Square => "SQUARE",
        };
        f.write_str(s)
    }
}

/// Log tag for each kind of resolved event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuditoryEventKind {
    Callsign,
    Beep,
    Color,
    Sequence,
    Gate,
    Collision,
    FalseAlarm,
}

impl fmt::Display for AuditoryEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Callsign => "callsign",
            Self::Beep => "beep",
            Self::Color => "color",
            Self::Sequence => "sequence",
            Self::Gate => "gate",
            Self::Collision => "collision",
            Self::FalseAlarm => "false_alarm",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// Payload
// ---------------------------------------------------------------------------

/// A gate of this colour must be flown with a ball of the same colour and
/// a gate of the required shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorRule {
    pub color: Color,
    pub required_shape: Shape,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GateView {
    pub gate_id: u32,
    pub x_norm: f64,
    pub y_norm: f64,
    pub color: Color,
    pub shape: Shape,
    pub aperture_norm: f64,
}

/// Everything a renderer needs for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditoryCapacityPayload {
    pub ball_x: f64,
    pub ball_y: f64,
    pub control_x: f64,
    pub control_y: f64,
    pub disturbance_x: f64,
    pub disturbance_y: f64,
    pub tube_half_width: f64,
    pub tube_half_height: f64,

    pub ball_color: Color,
    pub ball_color_strength: f64,

    pub assigned_callsigns: Vec<&'static str>,
    pub callsign_cue: Option<&'static str>,
    pub beep_active: bool,
    pub color_command: Option<Color>,
    /// Digits currently on display, if a sequence is being shown.
    pub sequence_display: Option<String>,
    pub sequence_response_open: bool,

    pub color_rules: Vec<ColorRule>,
    pub gates: Vec<GateView>,

    pub gate_hits: u32,
    pub gate_misses: u32,
    pub collisions: u32,
    pub false_alarms: u32,
    pub points: f64,

    pub background_noise_level: f64,
    pub distortion_level: f64,
}

// ---------------------------------------------------------------------------
// Sequence recall scoring
// ---------------------------------------------------------------------------

/// Partial-credit digit recall.
///
/// Only digits are compared. An exact match earns 1.0; otherwise the share
/// of positions that match, minus a length penalty of up to 0.45.
pub fn score_sequence_answer(expected: &str, response: &str) -> f64 {
    let expected: Vec<char> = expected.chars().filter(char::is_ascii_digit).collect();
    let response: Vec<char> = response.chars().filter(char::is_ascii_digit).collect();

    if expected.is_empty() {
        return 0.0;
    }
    if response == expected {
        return 1.0;
    }

    let target_len = expected.len() as f64;
    let matches = expected
        .iter()
        .zip(response.iter())
        .filter(|(e, r)| e == r)
        .count() as f64;
    let len_delta = response.len().abs_diff(expected.len()) as f64;
    let penalty = (len_delta / target_len * 0.45).min(0.45);

    (matches / target_len - penalty).clamp(0.0, 1.0)
}

// ---------------------------------------------------------------------------
// Construction
// ---------------------------------------------------------------------------

pub type AuditoryCapacityEngine<C> = ContinuousEngine<AuditorySimulation, C>;

/// Build the divided-attention test.
pub fn build_auditory_capacity_test<C: Clock>(
    clock: C,
    seed: u64,
    difficulty: f64,
    config: AuditoryCapacityConfig,
) -> Result<AuditoryCapacityEngine<C>, ConfigError> {
    config.validate()?;
    let timing = config.timing();
    let sim = AuditorySimulation::new(seed, difficulty, config);
    let mut engine = ContinuousEngine::new(sim, clock, seed, difficulty, timing)?;
    if let Some(entry) = crate::catalog::builtin().get(CODE) {
        engine = engine
            .with_title(&entry.title)
            .with_instructions(entry.instructions.clone())
            .with_input_hint(&entry.input_hint);
    }
    Ok(engine)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_scoring_exact_partial_and_zero() {
        assert_eq!(score_sequence_answer("12345", "12345"), 1.0);
        assert!((score_sequence_answer("12345", "12335") - 0.8).abs() < 1e-9);
        assert_eq!(score_sequence_answer("12345", "99999"), 0.0);
    }

    #[test]
    fn sequence_scoring_penalizes_length() {
        // 4 of 5 positions, one digit short: 0.8 - 0.09
        assert!((score_sequence_answer("12345", "1234") - 0.71).abs() < 1e-9);
        assert_eq!(score_sequence_answer("", "1"), 0.0);
        assert_eq!(score_sequence_answer("12", ""), 0.0);
        assert_eq!(score_sequence_answer("1-2-3", "123"), 1.0);
    }

    #[test]
    fn colour_aliases() {
        for (raw, want) in [
            ("r", Color::Red),
            ("RED", Color::Red),
            ("w", Color::Green),
            ("G", Color::Green),
            ("q", Color::Blue),
            ("Blue", Color::Blue),
            ("E", Color::Yellow),
            (" yellow ", Color::Yellow),
        ] {
            assert_eq!(raw.parse::<Color>().unwrap(), want, "{raw}");
        }
        assert!("PURPLE".parse::<Color>().is_err());
        assert_eq!("x".parse::<Color>().unwrap_err().to_string(), "invalid colour: \"x\"");
    }

    #[test]
    fn config_validation() {
        assert!(AuditoryCapacityConfig::default().validate().is_ok());
        let bad = AuditoryCapacityConfig {
            cue_window_s: 0.0,
            ..Default::default()
        };
        assert!(bad.validate().is_err());
        let bad = AuditoryCapacityConfig {
            tick_hz: -1.0,
            ..Default::default()
        };
        assert!(bad.validate().is_err());
        let bad = AuditoryCapacityConfig {
            practice_duration_s: -1.0,
            ..Default::default()
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn kind_display_is_snake_case() {
        assert_eq!(AuditoryEventKind::FalseAlarm.to_string(), "false_alarm");
        assert_eq!(Color::Yellow.to_string(), "YELLOW");
        assert_eq!(Shape::Triangle.to_string(), "TRIANGLE");
    }
}
