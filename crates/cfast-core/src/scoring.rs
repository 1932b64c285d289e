//! Answer scoring: the scorer capability, the exact-match policy and the
//! linear full/zero-credit band shared by every partial-credit task.

use crate::problem::Problem;

/// Scores at or above `1.0 - CORRECT_EPSILON` count as fully correct.
pub const CORRECT_EPSILON: f64 = 1e-9;

/// Maps a problem and a parsed response to credit in `[0, 1]`.
///
/// The harness clamps whatever is returned, so implementations need not.
pub trait AnswerScorer {
    fn score(&self, problem: &Problem, user_answer: i64, raw: &str) -> f64;
}

impl<S: AnswerScorer + ?Sized> AnswerScorer for Box<S> {
    fn score(&self, problem: &Problem, user_answer: i64, raw: &str) -> f64 {
        (**self).score(problem, user_answer, raw)
    }
}

// Compile-time assertion: AnswerScorer must be object-safe.
const _: () = {
    fn _assert_object_safe(_: &dyn AnswerScorer) {}
};

/// 1.0 iff the answer is within the problem's tolerance.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactScorer;

impl AnswerScorer for ExactScorer {
    fn score(&self, problem: &Problem, user_answer: i64, _raw: &str) -> f64 {
        if problem.accepts(user_answer) { 1.0 } else { 0.0 }
    }
}

/// Linear partial-credit band.
///
/// An error at or below `full` earns 1.0, at or above `zero` earns 0.0,
/// and anything in between interpolates as `(zero - err) / (zero - full)`.
/// Construction forces `zero >= full + 1` so the band never collapses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreBand {
    full: u32,
    zero: u32,
}

impl ScoreBand {
    pub fn new(full: u32, zero: u32) -> Self {
        Self {
            full,
            zero: zero.max(full.saturating_add(1)),
        }
    }

    pub fn full(&self) -> u32 {
        self.full
    }

    pub fn zero(&self) -> u32 {
        self.zero
    }

    pub fn score(&self, err: u32) -> f64 {
        if err <= self.full {
            return 1.0;
        }
        if err >= self.zero {
            return 0.0;
        }
        clamp01(f64::from(self.zero - err) / f64::from(self.zero - self.full))
    }
}

/// Integer interpolation between `a` and `b`.
///
/// `t <= 0` yields `a`, `t >= 1` yields `b`; in between the midpoint is
/// rounded to the nearest integer with ties away from zero.
pub fn lerp_int(a: i64, b: i64, t: f64) -> i64 {
    if t <= 0.0 {
        return a;
    }
    if t >= 1.0 {
        return b;
    }
    (a as f64 + (b - a) as f64 * t).round() as i64
}

/// Clamp to `[0, 1]`. NaN maps to 0.
pub fn clamp01(x: f64) -> f64 {
    if x.is_nan() || x <= 0.0 {
        0.0
    } else if x >= 1.0 {
        1.0
    } else {
        x
    }
}

/// Whether a clamped score counts as a fully correct answer.
pub fn is_full_credit(score: f64) -> bool {
    score >= 1.0 - CORRECT_EPSILON
}

/// Shortest angular distance between two bearings, in whole degrees.
pub fn circular_error_deg(a: i64, b: i64) -> u32 {
    let diff = (a.rem_euclid(360) - b.rem_euclid(360)).unsigned_abs() as u32;
    diff.min(360 - diff)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_edges() {
        let band = ScoreBand::new(2, 20);
        assert_eq!(band.score(0), 1.0);
        assert_eq!(band.score(2), 1.0);
        assert_eq!(band.score(20), 0.0);
        assert_eq!(band.score(500), 0.0);
    }

    #[test]
    fn band_interpolates_linearly() {
        let band = ScoreBand::new(2, 20);
        assert!((band.score(10) - 10.0 / 18.0).abs() < 1e-9);
        assert!((band.score(11) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn degenerate_band_is_widened() {
        let band = ScoreBand::new(5, 3);
        assert_eq!(band.zero(), 6);
        assert_eq!(band.score(5), 1.0);
        assert_eq!(band.score(6), 0.0);
    }

    #[test]
    fn band_with_max_full_does_not_overflow() {
        let band = ScoreBand::new(u32::MAX, 0);
        assert_eq!(band.zero(), u32::MAX);
        assert_eq!(band.score(u32::MAX), 1.0);
    }

    #[test]
    fn lerp_int_clamps_and_rounds() {
        assert_eq!(lerp_int(9, 99, -0.5), 9);
        assert_eq!(lerp_int(9, 99, 0.0), 9);
        assert_eq!(lerp_int(9, 99, 1.0), 99);
        assert_eq!(lerp_int(9, 99, 7.0), 99);
        assert_eq!(lerp_int(9, 99, 0.5), 54);
        // 4 + 3 * 0.5 = 5.5 rounds away from zero
        assert_eq!(lerp_int(4, 7, 0.5), 6);
        // 15 - 14 * 0.25 = 11.5
        assert_eq!(lerp_int(15, 1, 0.25), 12);
    }

    #[test]
    fn lerp_int_descending_range() {
        assert_eq!(lerp_int(75, 12, 0.5), 44);
        assert_eq!(lerp_int(110, 70, 0.5), 90);
    }

    #[test]
    fn clamp01_handles_nan_and_bounds() {
        assert_eq!(clamp01(f64::NAN), 0.0);
        assert_eq!(clamp01(-3.0), 0.0);
        assert_eq!(clamp01(3.0), 1.0);
        assert_eq!(clamp01(0.25), 0.25);
    }

    #[test]
    fn circular_error_wraps() {
        assert_eq!(circular_error_deg(350, 10), 20);
        assert_eq!(circular_error_deg(10, 350), 20);
        assert_eq!(circular_error_deg(0, 180), 180);
        assert_eq!(circular_error_deg(-90, 270), 0);
        assert_eq!(circular_error_deg(725, 5), 0);
    }

    #[test]
    fn exact_scorer_uses_tolerance() {
        let p = Problem::new("q", 50).with_tolerance(2);
        assert_eq!(ExactScorer.score(&p, 52, "52"), 1.0);
        assert_eq!(ExactScorer.score(&p, 53, "53"), 0.0);
    }

    #[test]
    fn full_credit_epsilon() {
        assert!(is_full_credit(1.0));
        assert!(is_full_credit(1.0 - 1e-12));
        assert!(!is_full_credit(0.999));
    }
}
