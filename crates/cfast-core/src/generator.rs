//! The problem-generator capability consumed by the harness.

use crate::problem::Problem;

/// Produces the next trial for a given difficulty.
///
/// Implementations own their [`SeededStream`](crate::rng::SeededStream) and
/// must be a pure function of (stream state, difficulty), consuming draws
/// in a fixed documented order. A second generator built from the same seed
/// can then be stepped alongside the harness to predict every answer.
pub trait ProblemGenerator {
    /// Deal the next problem. `difficulty` is clamped to `[0, 1]` by the
    /// implementation.
    fn next_problem(&mut self, difficulty: f64) -> Problem;
}

impl<G: ProblemGenerator + ?Sized> ProblemGenerator for Box<G> {
    fn next_problem(&mut self, difficulty: f64) -> Problem {
        (**self).next_problem(difficulty)
    }
}

// Compile-time assertion: ProblemGenerator must be object-safe.
const _: () = {
    fn _assert_object_safe(_: &dyn ProblemGenerator) {}
};
