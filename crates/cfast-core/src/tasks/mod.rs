//! Built-in tests.
//!
//! Each discrete test is a [`ProblemGenerator`] (plus an optional
//! [`AnswerScorer`]) wrapped in a [`TimedTrialHarness`]. The divided-attention
//! test is a [`Simulation`](crate::continuous::Simulation) on the continuous
//! engine. Titles, instructions and input hints come from the catalog.

pub mod angles_bearings;
pub mod auditory_capacity;
pub mod instrument_comprehension;
pub mod numerical_operations;

use crate::clock::Clock;
use crate::generator::ProblemGenerator;
use crate::harness::TimedTrialHarness;
use crate::scoring::AnswerScorer;

/// Apply the catalog's title, instructions and input hint for `code`.
/// Unknown codes leave the harness untouched.
pub(crate) fn describe_harness<G, C, S>(
    harness: TimedTrialHarness<G, C, S>,
    code: &str,
) -> TimedTrialHarness<G, C, S>
where
    G: ProblemGenerator,
    C: Clock,
    S: AnswerScorer,
{
    match crate::catalog::builtin().get(code) {
        Some(entry) => harness
            .with_title(&entry.title)
            .with_instructions(entry.instructions.clone())
            .with_input_hint(&entry.input_hint),
        None => harness,
    }
}
