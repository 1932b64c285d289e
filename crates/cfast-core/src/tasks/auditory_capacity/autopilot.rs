//! Scripted policy for headless runs.
//!
//! Reads one frame's payload and decides control axes plus any commands to
//! send. It never looks inside the simulation, so it sees exactly what a
//! candidate would.

use super::AuditoryCapacityPayload;

const HORIZONTAL_GAIN: f64 = 2.1;
const VERTICAL_GAIN: f64 = 3.8;

/// What to do this frame.
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyAction {
    pub horizontal: f64,
    pub vertical: f64,
    pub commands: Vec<String>,
}

/// Centres the ball horizontally and tracks the height of the next gate it
/// has yet to reach. Answers assigned callsigns and replays sequences from
/// memory.
#[derive(Debug, Clone, Default)]
pub struct ScriptedPolicy {
    remembered_sequence: Option<String>,
}

impl ScriptedPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn act(&mut self, p: &AuditoryCapacityPayload) -> PolicyAction {
        // Gates move right to left; one at or behind the ball is already scored.
        let target_y = p
            .gates
            .iter()
            .filter(|g| g.x_norm > p.ball_x)
            .min_by(|a, b| a.x_norm.total_cmp(&b.x_norm))
            .map_or(0.0, |g| g.y_norm);
        let horizontal = (-p.ball_x * HORIZONTAL_GAIN).clamp(-1.0, 1.0);
        let vertical = ((target_y - p.ball_y) * VERTICAL_GAIN).clamp(-1.0, 1.0);

        let mut commands = Vec::new();
        if p.callsign_cue.is_some_and(|cue| p.assigned_callsigns.contains(&cue)) {
            commands.push("CALL".to_string());
        }
        if p.beep_active {
            commands.push("BEEP".to_string());
        }
        if let Some(color) = p.color_command {
            commands.push(format!("COL:{color}"));
        }
        if let Some(digits) = &p.sequence_display {
            self.remembered_sequence = Some(digits.clone());
        }
        if let Some(digits) = self
            .remembered_sequence
            .take_if(|_| p.sequence_response_open)
        {
            commands.push(format!("SEQ:{digits}"));
        }

        PolicyAction {
            horizontal,
            vertical,
            commands,
        }
    }
}
