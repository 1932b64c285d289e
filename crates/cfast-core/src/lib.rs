//! Core of the cfast aptitude trainer.
//!
//! Every test follows the same lifecycle:
//!
//! ```text
//! instructions -> practice -> practice_done -> scored -> results
//! ```
//!
//! Discrete tests deal problems from a seeded [`generator::ProblemGenerator`]
//! inside a [`harness::TimedTrialHarness`]. Continuous tests run a
//! [`continuous::Simulation`] on the fixed-tick
//! [`continuous::ContinuousEngine`]. Both expose the same
//! [`session::TrialSession`] surface to a shell or headless driver, and
//! both read time from an injected [`clock::Clock`], so a run is fully
//! determined by its seed, difficulty and input timeline.

pub mod attempt;
pub mod catalog;
pub mod clock;
pub mod continuous;
pub mod error;
pub mod event;
pub mod generator;
pub mod harness;
pub mod phase;
pub mod problem;
pub mod rng;
pub mod scoring;
pub mod session;
pub mod tasks;
