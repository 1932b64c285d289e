use crate::continuous::{ActiveCue, ChannelLog, CueChannel, CueStatus, Outcome, Simulation};
use crate::problem::Payload;

use super::generator::{Disturbance, ScenarioGenerator};
use super::{
    AuditoryCapacityConfig, AuditoryCapacityPayload, AuditoryEventKind, Color, ColorRule, GateView,
    Shape, score_sequence_answer,
};

type Log = ChannelLog<AuditoryEventKind>;

const BALL_LIMIT_X: f64 = 1.15;
const BALL_LIMIT_Y: f64 = 0.92;
const GATE_SPAWN_X: f64 = 1.20;
const GATE_DESPAWN_X: f64 = -1.25;
const MIN_GATE_SPEED: f64 = 0.15;
const COLOR_FADE_PER_S: f64 = 0.19;

const FIRST_GATE_AT_S: f64 = 0.85;
const FIRST_CALLSIGN_AT_S: f64 = 1.10;
const FIRST_BEEP_AT_S: f64 = 0.95;
const FIRST_COLOR_AT_S: f64 = 2.15;
const FIRST_SEQUENCE_AT_S: f64 = 3.10;

#[derive(Debug, Clone)]
struct LiveGate {
    view: GateView,
    scored: bool,
}

/// Ball tracking, gates and four cue channels.
///
/// Per tick: disturbance, ball motion, tube collision, gates, then the
/// call-sign, beep, colour and sequence channels in that order. The
/// ball's colour strength fades last.
#[derive(Debug, Clone)]
pub struct AuditorySimulation {
    config: AuditoryCapacityConfig,
    difficulty: f64,
    r#gen: ScenarioGenerator,

    assigned_callsigns: Vec<&'static str>,
    color_rules: Vec<ColorRule>,

    ball_x: f64,
    ball_y: f64,
    control_x: f64,
    control_y: f64,
    disturbance: Disturbance,
    disturbance_until_s: f64,
    outside_tube: bool,

    ball_color: Color,
    ball_color_strength: f64,
    last_color_command: Option<Color>,

    gates: Vec<LiveGate>,
    next_gate_id: u32,
    next_gate_at_s: f64,

    callsigns: CueChannel<&'static str>,
    beeps: CueChannel<()>,
    colors: CueChannel<Color>,
    sequences: CueChannel<String>,

    gate_hits: u32,
    gate_misses: u32,
    collisions: u32,
    false_alarms: u32,
}

impl AuditorySimulation {
    pub fn new(seed: u64, difficulty: f64, config: AuditoryCapacityConfig) -> Self {
        Self {
            config,
            difficulty,
            r#gen: ScenarioGenerator::new(seed),
            assigned_callsigns: Vec::new(),
            color_rules: Vec::new(),
            ball_x: 0.0,
            ball_y: 0.0,
            control_x: 0.0,
            control_y: 0.0,
            disturbance: Disturbance {
                vx: 0.0,
                vy: 0.0,
                duration_s: 0.0,
            },
            disturbance_until_s: 0.0,
            outside_tube: false,
            ball_color: Color::Red,
            ball_color_strength: 1.0,
            last_color_command: None,
            gates: Vec::new(),
            next_gate_id: 1,
            next_gate_at_s: FIRST_GATE_AT_S,
            callsigns: CueChannel::new(FIRST_CALLSIGN_AT_S),
            beeps: CueChannel::new(FIRST_BEEP_AT_S),
            colors: CueChannel::new(FIRST_COLOR_AT_S),
            sequences: CueChannel::new(FIRST_SEQUENCE_AT_S),
            gate_hits: 0,
            gate_misses: 0,
            collisions: 0,
            false_alarms: 0,
        }
    }

    pub fn assigned_callsigns(&self) -> &[&'static str] {
        &self.assigned_callsigns
    }

    pub fn ball_position(&self) -> (f64, f64) {
        (self.ball_x, self.ball_y)
    }

    pub fn ball_color(&self) -> Color {
        self.ball_color
    }

    pub fn gate_hits(&self) -> u32 {
        self.gate_hits
    }

    pub fn gate_misses(&self) -> u32 {
        self.gate_misses
    }

    pub fn collisions(&self) -> u32 {
        self.collisions
    }

    pub fn false_alarms(&self) -> u32 {
        self.false_alarms
    }

    /// Shape a gate must have to be flown with a ball of `color`.
    pub fn shape_for_color(&self, color: Color) -> Shape {
        self.color_rules
            .iter()
            .find(|r| r.color == color)
            .map_or(Shape::Circle, |r| r.required_shape)
    }

    fn jittered(&mut self, base_s: f64) -> f64 {
        self.r#gen.jittered_interval(base_s, self.difficulty)
    }

    // -- per-tick updates ---------------------------------------------------

    fn update_disturbance(&mut self, sim_s: f64) {
        if sim_s < self.disturbance_until_s {
            return;
        }
        self.disturbance = self.r#gen.next_disturbance(self.difficulty);
        self.disturbance_until_s = sim_s + self.disturbance.duration_s;
    }

    fn move_ball(&mut self, sim_s: f64, dt: f64, log: &mut Log) {
        let gain = self.config.control_gain;
        let drift = self.config.disturbance_gain;
        self.ball_x += (self.control_x * gain + self.disturbance.vx * drift) * dt;
        self.ball_y += (self.control_y * gain + self.disturbance.vy * drift) * dt;
        self.ball_x = self.ball_x.clamp(-BALL_LIMIT_X, BALL_LIMIT_X);
        self.ball_y = self.ball_y.clamp(-BALL_LIMIT_Y, BALL_LIMIT_Y);

        let outside = self.ball_x.abs() > self.config.tube_half_width
            || self.ball_y.abs() > self.config.tube_half_height;
        if outside && !self.outside_tube {
            self.collisions += 1;
            log.record(
                sim_s,
                Outcome::wrong(AuditoryEventKind::Collision, "inside tube", "collision"),
            );
        }
        self.outside_tube = outside;
    }

    fn update_gates(&mut self, sim_s: f64, dt: f64, log: &mut Log) {
        if sim_s >= self.next_gate_at_s {
            let plan = self.r#gen.next_gate(self.difficulty);
            self.gates.push(LiveGate {
                view: GateView {
                    gate_id: self.next_gate_id,
                    x_norm: GATE_SPAWN_X,
                    y_norm: plan.y_norm,
                    color: plan.color,
                    shape: plan.shape,
                    aperture_norm: plan.aperture_norm,
                },
                scored: false,
            });
            self.next_gate_id += 1;
            self.next_gate_at_s = sim_s + self.jittered(self.config.gate_interval_s);
        }

        let speed = self.config.gate_speed_norm_per_s.max(MIN_GATE_SPEED);
        let expected_shape = self.shape_for_color(self.ball_color);
        let (ball_x, ball_y, ball_color) = (self.ball_x, self.ball_y, self.ball_color);

        let mut hits = 0;
        let mut misses = 0;
        for gate in &mut self.gates {
            gate.view.x_norm -= speed * dt;
            if gate.scored || gate.view.x_norm > ball_x {
                continue;
            }
            gate.scored = true;

            let g = &gate.view;
            let inside_aperture = (ball_y - g.y_norm).abs() <= g.aperture_norm;
            let passed = inside_aperture
                && g.color == ball_color
                && g.shape == expected_shape
                && !self.outside_tube;
            if passed {
                hits += 1;
            } else {
                misses += 1;
            }

            let expected = format!("{ball_color}/{expected_shape}");
            let response = format!(
                "{}/{}/{}",
                g.color,
                g.shape,
                if inside_aperture { "PASS" } else { "MISS" }
            );
            let outcome = if passed {
                Outcome::correct(AuditoryEventKind::Gate, expected, response)
            } else {
                Outcome::wrong(AuditoryEventKind::Gate, expected, response)
            };
            log.record(sim_s, outcome);
        }
        self.gate_hits += hits;
        self.gate_misses += misses;
        self.gates.retain(|g| g.view.x_norm >= GATE_DESPAWN_X);
    }

    fn update_callsigns(&mut self, sim_s: f64, log: &mut Log) {
        if self.callsigns.is_due(sim_s) {
            let target = self.r#gen.next_callsign_cue();
            let mut cue = ActiveCue::new(target, sim_s, self.config.cue_window_s);
            if !self.assigned_callsigns.contains(&target) {
                cue = cue.distractor();
            }
            let interval = self.jittered(self.config.callsign_interval_s);
            self.callsigns.issue(cue, interval);
        }

        let Some(cue) = self.callsigns.take_expired(sim_s) else {
            return;
        };
        let outcome = if cue.expects_response {
            Outcome::wrong(AuditoryEventKind::Callsign, cue.target, "MISS")
        } else {
            Outcome::correct(
                AuditoryEventKind::Callsign,
                format!("IGNORE:{}", cue.target),
                "NO_RESPONSE",
            )
        };
        log.record(sim_s, outcome);
    }

    fn update_beeps(&mut self, sim_s: f64, log: &mut Log) {
        if self.beeps.is_due(sim_s) {
            let interval = self.jittered(self.config.beep_interval_s);
            self.beeps
                .issue(ActiveCue::new((), sim_s, self.config.cue_window_s), interval);
        }
        if self.beeps.take_expired(sim_s).is_some() {
            log.record(
                sim_s,
                Outcome::wrong(AuditoryEventKind::Beep, "BEEP", "MISS"),
            );
        }
    }

    fn update_colors(&mut self, sim_s: f64, log: &mut Log) {
        if self.colors.is_due(sim_s) {
            let target = self
                .r#gen
                .next_color_command(self.ball_color, self.last_color_command);
            self.last_color_command = Some(target);
            let interval = self.jittered(self.config.color_command_interval_s);
            self.colors
                .issue(ActiveCue::new(target, sim_s, self.config.cue_window_s), interval);
        }
        if let Some(cue) = self.colors.take_expired(sim_s) {
            log.record(
                sim_s,
                Outcome::wrong(AuditoryEventKind::Color, cue.target.to_string(), "MISS"),
            );
        }
    }

    fn update_sequences(&mut self, sim_s: f64, log: &mut Log) {
        if self.sequences.is_due(sim_s) {
            let digits = self.r#gen.next_sequence(self.difficulty);
            let interval = self.jittered(self.config.sequence_interval_s);
            let cue = ActiveCue::delayed(
                digits,
                sim_s,
                self.config.sequence_display_s,
                self.config.sequence_response_s,
            );
            self.sequences.issue(cue, interval);
        }
        if let Some(cue) = self.sequences.take_expired(sim_s) {
            log.record(
                sim_s,
                Outcome::wrong(AuditoryEventKind::Sequence, cue.target, "MISS"),
            );
        }
    }

    // -- responses ----------------------------------------------------------

    fn false_alarm(&mut self, channel: impl Into<String>, sim_s: f64, log: &mut Log) -> bool {
        self.false_alarms += 1;
        log.record(
            sim_s,
            Outcome::wrong(AuditoryEventKind::FalseAlarm, "NO_CUE", channel),
        );
        true
    }

    fn respond_callsign(&mut self, sim_s: f64, log: &mut Log) -> bool {
        let Some((cue, rt)) = self.callsigns.resolve(sim_s) else {
            return self.false_alarm("CALL", sim_s, log);
        };
        let outcome = if cue.expects_response {
            Outcome::correct(AuditoryEventKind::Callsign, cue.target, cue.target)
        } else {
            Outcome::wrong(
                AuditoryEventKind::Callsign,
                format!("IGNORE:{}", cue.target),
                "FALSE_TRIGGER",
            )
        };
        log.record(sim_s, outcome.with_response_time(rt));
        true
    }

    fn respond_beep(&mut self, sim_s: f64, log: &mut Log) -> bool {
        let Some((_, rt)) = self.beeps.resolve(sim_s) else {
            return self.false_alarm("BEEP", sim_s, log);
        };
        log.record(
            sim_s,
            Outcome::correct(AuditoryEventKind::Beep, "BEEP", "TRIGGER").with_response_time(rt),
        );
        true
    }

    fn respond_color(&mut self, color: Color, sim_s: f64, log: &mut Log) -> bool {
        let Some((cue, rt)) = self.colors.resolve(sim_s) else {
            return self.false_alarm(format!("COL:{color}"), sim_s, log);
        };
        let hit = color == cue.target && color != self.ball_color;
        let (expected, response) = (cue.target.to_string(), color.to_string());
        let outcome = if hit {
            Outcome::correct(AuditoryEventKind::Color, expected, response)
        } else {
            Outcome::wrong(AuditoryEventKind::Color, expected, response)
        };
        log.record(sim_s, outcome.with_response_time(rt));
        if hit {
            self.ball_color = color;
            self.ball_color_strength = 1.0;
        }
        true
    }

    fn respond_sequence(&mut self, raw: &str, sim_s: f64, log: &mut Log) -> bool {
        match self.sequences.status(sim_s) {
            CueStatus::Idle => return self.false_alarm("SEQ", sim_s, log),
            CueStatus::Pending => return false,
            CueStatus::Open => {}
        }
        let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
        if digits.is_empty() {
            return false;
        }
        let Some((cue, rt)) = self.sequences.resolve(sim_s) else {
            return false;
        };
        let score = score_sequence_answer(&cue.target, &digits);
        log.record(
            sim_s,
            Outcome::partial(AuditoryEventKind::Sequence, cue.target, digits, score)
                .with_response_time(rt),
        );
        true
    }
}

impl Simulation for AuditorySimulation {
    type Kind = AuditoryEventKind;

    fn begin_run(&mut self) {
        self.assigned_callsigns = self.r#gen.assign_callsigns();
        self.color_rules = self.r#gen.build_color_rules();

        self.ball_x = 0.0;
        self.ball_y = 0.0;
        self.control_x = 0.0;
        self.control_y = 0.0;
        self.disturbance = Disturbance {
            vx: 0.0,
            vy: 0.0,
            duration_s: 0.0,
        };
        self.disturbance_until_s = 0.0;
        self.outside_tube = false;

        self.ball_color = Color::Red;
        self.ball_color_strength = 1.0;
        self.last_color_command = None;

        self.gates.clear();
        self.next_gate_at_s = FIRST_GATE_AT_S;
        self.callsigns.reset();
        self.beeps.reset();
        self.colors.reset();
        self.sequences.reset();

        self.gate_hits = 0;
        self.gate_misses = 0;
        self.collisions = 0;
        self.false_alarms = 0;
    }

    fn step(&mut self, sim_s: f64, dt: f64, log: &mut Log) {
        self.update_disturbance(sim_s);
        self.move_ball(sim_s, dt, log);
        self.update_gates(sim_s, dt, log);
        self.update_callsigns(sim_s, log);
        self.update_beeps(sim_s, log);
        self.update_colors(sim_s, log);
        self.update_sequences(sim_s, log);
        self.ball_color_strength = (self.ball_color_strength - COLOR_FADE_PER_S * dt).max(0.0);
    }

    fn handle_command(&mut self, command: &str, sim_s: f64, log: &mut Log) -> bool {
        match command {
            "CALL" | "CALLSIGN" | "CS" => self.respond_callsign(sim_s, log),
            "BEEP" | "TRIGGER" | "SPACE" => self.respond_beep(sim_s, log),
            _ => {
                if let Some(rest) = command.strip_prefix("COL:") {
                    match rest.parse::<Color>() {
                        Ok(color) => self.respond_color(color, sim_s, log),
                        Err(_) => false,
                    }
                } else if let Some(rest) = command.strip_prefix("SEQ:") {
                    self.respond_sequence(rest, sim_s, log)
                } else {
                    false
                }
            }
        }
    }

    fn set_control(&mut self, horizontal: f64, vertical: f64) {
        self.control_x = horizontal;
        self.control_y = vertical;
    }

    fn payload(&self, sim_s: f64, log: &Log) -> Option<Payload> {
        let (sequence_display, sequence_response_open) = match self.sequences.active() {
            Some(cue) if sim_s < cue.opens_at_s => (Some(cue.target.clone()), false),
            Some(cue) => (None, sim_s <= cue.expires_at_s),
            None => (None, false),
        };

        Some(Payload::AuditoryCapacity(AuditoryCapacityPayload {
            ball_x: self.ball_x,
            ball_y: self.ball_y,
            control_x: self.control_x,
            control_y: self.control_y,
            disturbance_x: self.disturbance.vx,
            disturbance_y: self.disturbance.vy,
            tube_half_width: self.config.tube_half_width,
            tube_half_height: self.config.tube_half_height,
            ball_color: self.ball_color,
            ball_color_strength: self.ball_color_strength,
            assigned_callsigns: self.assigned_callsigns.clone(),
            callsign_cue: self.callsigns.active().map(|c| c.target),
            beep_active: self.beeps.active().is_some(),
            color_command: self.colors.active().map(|c| c.target),
            sequence_display,
            sequence_response_open,
            color_rules: self.color_rules.clone(),
            gates: self.gates.iter().map(|g| g.view).collect(),
            gate_hits: self.gate_hits,
            gate_misses: self.gate_misses,
            collisions: self.collisions,
            false_alarms: self.false_alarms,
            points: log.tally().total_score,
            background_noise_level: 0.35 + 0.45 * self.difficulty,
            distortion_level: 0.20 + 0.60 * self.difficulty,
        }))
    }

    fn results_lines(&self) -> Vec<String> {
        vec![
            format!("Gates: {} hit, {} missed", self.gate_hits, self.gate_misses),
            format!("Collisions: {}", self.collisions),
            format!("False alarms: {}", self.false_alarms),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phase::Phase;

    fn sim() -> (AuditorySimulation, Log) {
        let mut s = AuditorySimulation::new(5, 0.5, AuditoryCapacityConfig::default());
        s.begin_run();
        let mut log = Log::new();
        log.set_phase(Phase::Scored);
        (s, log)
    }

    fn run(s: &mut AuditorySimulation, log: &mut Log, from_s: f64, to_s: f64) -> f64 {
        let dt = 1.0 / 120.0;
        let mut t = from_s;
        while t + dt <= to_s + 1e-12 {
            t += dt;
            s.step(t, dt, log);
        }
        t
    }

    #[test]
    fn idle_responses_are_false_alarms() {
        let (mut s, mut log) = sim();
        assert!(s.handle_command("BEEP", 0.1, &mut log));
        assert!(s.handle_command("COL:R", 0.1, &mut log));
        assert!(s.handle_command("SEQ:123", 0.1, &mut log));
        assert!(s.handle_command("CALL", 0.1, &mut log));
        assert_eq!(s.false_alarms(), 4);
        let responses: Vec<&str> = log.events().iter().map(|e| e.response.as_str()).collect();
        assert_eq!(responses, vec!["BEEP", "COL:RED", "SEQ", "CALL"]);
        assert!(log.events().iter().all(|e| e.expected == "NO_CUE"));
    }

    fn unassigned_callsign(s: &AuditorySimulation) -> &'static str {
        crate::tasks::auditory_capacity::CALLSIGNS
            .iter()
            .copied()
            .find(|cs| !s.assigned_callsigns().contains(cs))
            .unwrap()
    }

    #[test]
    fn ignored_distractor_callsign_scores_correct() {
        let (mut s, mut log) = sim();
        let cs = unassigned_callsign(&s);
        s.callsigns.issue(ActiveCue::new(cs, 0.5, 1.0).distractor(), 60.0);

        s.update_callsigns(1.0, &mut log);
        assert!(log.events().is_empty());

        s.update_callsigns(1.6, &mut log);
        let e = log.events().last().unwrap();
        assert_eq!(e.kind, AuditoryEventKind::Callsign);
        assert!(e.is_correct);
        assert_eq!(e.expected, format!("IGNORE:{cs}"));
        assert_eq!(e.response, "NO_RESPONSE");
        assert_eq!(e.response_time_s, None);
        assert!(s.callsigns.active().is_none());
    }

    #[test]
    fn answering_a_distractor_callsign_is_a_false_trigger() {
        let (mut s, mut log) = sim();
        let cs = unassigned_callsign(&s);
        s.callsigns.issue(ActiveCue::new(cs, 0.5, 1.0).distractor(), 60.0);

        assert!(s.handle_command("CALL", 0.8, &mut log));
        let e = log.events().last().unwrap();
        assert_eq!(e.kind, AuditoryEventKind::Callsign);
        assert!(!e.is_correct);
        assert_eq!(e.score, 0.0);
        assert_eq!(e.expected, format!("IGNORE:{cs}"));
        assert_eq!(e.response, "FALSE_TRIGGER");
        assert!((e.response_time_s.unwrap() - 0.3).abs() < 1e-9);
        // Answered cues are not false alarms and do not expire again.
        assert_eq!(s.false_alarms(), 0);
        s.update_callsigns(1.6, &mut log);
        assert_eq!(log.events().len(), 1);
    }

    #[test]
    fn unanswered_assigned_callsign_is_a_miss() {
        let (mut s, mut log) = sim();
        let cs = s.assigned_callsigns()[0];
        s.callsigns.issue(ActiveCue::new(cs, 0.5, 1.0), 60.0);

        s.update_callsigns(1.6, &mut log);
        let e = log.events().last().unwrap();
        assert!(!e.is_correct);
        assert_eq!(e.expected, cs);
        assert_eq!(e.response, "MISS");
    }

    #[test]
    fn unknown_commands_are_rejected() {
        let (mut s, mut log) = sim();
        assert!(!s.handle_command("JUMP", 0.1, &mut log));
        assert!(!s.handle_command("COL:PURPLE", 0.1, &mut log));
        assert!(log.events().is_empty());
    }

    #[test]
    fn beep_hit_then_expiry_miss() {
        let (mut s, mut log) = sim();
        let t = run(&mut s, &mut log, 0.0, 1.0);
        assert!(s.beeps.active().is_some());
        assert!(s.handle_command("SPACE", t, &mut log));
        let hit = log.events().last().unwrap();
        assert_eq!(hit.kind, AuditoryEventKind::Beep);
        assert!(hit.is_correct);
        assert!(hit.response_time_s.unwrap() < 0.1);

        // Let the next beep lapse.
        let start = s.beeps.next_at_s();
        run(&mut s, &mut log, t, start + 1.4);
        assert!(
            log.events()
                .iter()
                .any(|e| e.kind == AuditoryEventKind::Beep && e.response == "MISS")
        );
    }

    #[test]
    fn sequence_rejects_while_shown_and_scores_after() {
        let (mut s, mut log) = sim();
        let t = run(&mut s, &mut log, 0.0, 3.2);
        let target = s.sequences.active().unwrap().target.clone();
        assert_eq!(s.sequences.status(t), CueStatus::Pending);
        assert!(!s.handle_command(&format!("SEQ:{target}"), t, &mut log));

        let t = run(&mut s, &mut log, t, 5.2);
        assert!(!s.handle_command("SEQ:", t, &mut log));
        assert!(s.handle_command(&format!("SEQ:{target}"), t, &mut log));
        let e = log
            .events()
            .iter()
            .rfind(|e| e.kind == AuditoryEventKind::Sequence)
            .unwrap();
        assert!(e.is_correct);
        assert_eq!(e.score, 1.0);
    }

    #[test]
    fn correct_colour_command_changes_ball() {
        let (mut s, mut log) = sim();
        let t = run(&mut s, &mut log, 0.0, 2.2);
        let target = s.colors.active().unwrap().target;
        assert_ne!(target, Color::Red);
        assert!(s.handle_command(&format!("COL:{target}"), t, &mut log));
        assert_eq!(s.ball_color(), target);
        let e = log.events().last().unwrap();
        assert!(e.is_correct);
        assert_eq!(e.expected, target.to_string());
    }

    #[test]
    fn leaving_the_tube_counts_one_collision() {
        let (mut s, mut log) = sim();
        s.set_control(1.0, 0.0);
        run(&mut s, &mut log, 0.0, 2.0);
        assert_eq!(s.collisions(), 1);
        let (x, _) = s.ball_position();
        assert!(x <= BALL_LIMIT_X);
    }

    #[test]
    fn gates_are_scored_once_when_crossing() {
        let (mut s, mut log) = sim();
        run(&mut s, &mut log, 0.0, 4.5);
        let gate_events = log
            .events()
            .iter()
            .filter(|e| e.kind == AuditoryEventKind::Gate)
            .count() as u32;
        assert!(gate_events >= 1);
        assert_eq!(gate_events, s.gate_hits() + s.gate_misses());
    }

    #[test]
    fn begin_run_resets_counters_and_schedule() {
        let (mut s, mut log) = sim();
        s.handle_command("BEEP", 0.1, &mut log);
        run(&mut s, &mut log, 0.0, 3.0);
        s.begin_run();
        assert_eq!(s.false_alarms(), 0);
        assert_eq!(s.collisions(), 0);
        assert!(s.gates.is_empty());
        assert_eq!(s.beeps.next_at_s(), FIRST_BEEP_AT_S);
        assert_eq!(s.assigned_callsigns().len(), 3);
    }

    #[test]
    fn payload_exposes_sequence_display_window() {
        let (mut s, mut log) = sim();
        let t = run(&mut s, &mut log, 0.0, 3.2);
        let Some(Payload::AuditoryCapacity(p)) = s.payload(t, &log) else {
            panic!("missing payload");
        };
        assert!(p.sequence_display.is_some());
        assert!(!p.sequence_response_open);
        assert_eq!(p.color_rules.len(), 4);
        assert!((p.background_noise_level - 0.575).abs() < 1e-9);
    }
}
