//! Mental arithmetic (+ - × ÷) with integer answers.

use crate::clock::Clock;
use crate::error::ConfigError;
use crate::generator::ProblemGenerator;
use crate::harness::{HarnessConfig, TimedTrialHarness};
use crate::problem::Problem;
use crate::rng::SeededStream;
use crate::scoring::{clamp01, lerp_int};

pub const CODE: &str = "numerical_operations";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operator {
    Add,
    Sub,
    Mul,
    Div,
}

/// Arithmetic problem generator.
///
/// Draw order per problem: one `uniform` for the operator, then two
/// `randint` for the operands (divisor before quotient for division).
/// Easy difficulties favour addition and subtraction; hard ones shift
/// weight toward multiplication and division.
#[derive(Debug, Clone)]
pub struct NumericalOperationsGenerator {
    rng: SeededStream,
}

impl NumericalOperationsGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SeededStream::new(seed),
        }
    }

    fn pick_operator(&mut self, d: f64) -> Operator {
        let r = self.rng.uniform(0.0, 1.0);
        if r < 0.45 - 0.20 * d {
            Operator::Add
        } else if r < 0.80 - 0.20 * d {
            Operator::Sub
        } else if r < 0.92 + 0.04 * d {
            Operator::Mul
        } else {
            Operator::Div
        }
    }
}

impl ProblemGenerator for NumericalOperationsGenerator {
    fn next_problem(&mut self, difficulty: f64) -> Problem {
        let d = clamp01(difficulty);
        match self.pick_operator(d) {
            Operator::Add => {
                let hi = lerp_int(9, 99, d);
                let a = self.rng.randint(1, hi);
                let b = self.rng.randint(1, hi);
                Problem::new(format!("{a} + {b} ="), a + b)
            }
            Operator::Sub => {
                let hi = lerp_int(9, 99, d);
                let a = self.rng.randint(1, hi);
                let b = self.rng.randint(1, hi);
                let (a, b) = if b > a { (b, a) } else { (a, b) };
                Problem::new(format!("{a} - {b} ="), a - b)
            }
            Operator::Mul => {
                let a = self.rng.randint(2, lerp_int(9, 25, d));
                let b = self.rng.randint(2, lerp_int(9, 15, d));
                Problem::new(format!("{a} × {b} ="), a * b)
            }
            Operator::Div => {
                let hi = lerp_int(9, 25, d);
                let divisor = self.rng.randint(2, hi);
                let quotient = self.rng.randint(2, hi);
                Problem::new(format!("{} ÷ {divisor} =", divisor * quotient), quotient)
            }
        }
    }
}

/// Build the arithmetic test with exact-match scoring.
pub fn build_numerical_operations_test<C: Clock>(
    clock: C,
    config: HarnessConfig,
) -> Result<TimedTrialHarness<NumericalOperationsGenerator, C>, ConfigError> {
    let generator = NumericalOperationsGenerator::new(config.seed);
    let harness = TimedTrialHarness::new(config, generator, clock)?;
    Ok(super::describe_harness(harness, CODE))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_binary(prompt: &str) -> (i64, &str, i64) {
        let parts: Vec<&str> = prompt.trim_end_matches(" =").split(' ').collect();
        (parts[0].parse().unwrap(), parts[1], parts[2].parse().unwrap())
    }

    #[test]
    fn answers_match_prompts() {
        let mut g = NumericalOperationsGenerator::new(42);
        for i in 0..300 {
            let d = (i % 11) as f64 / 10.0;
            let p = g.next_problem(d);
            let (a, op, b) = parse_binary(p.prompt());
            let expected = match op {
                "+" => a + b,
                "-" => a - b,
                "×" => a * b,
                "÷" => {
                    assert_eq!(a % b, 0, "division must be exact: {}", p.prompt());
                    a / b
                }
                other => panic!("unexpected operator {other}"),
            };
            assert_eq!(p.answer(), expected, "{}", p.prompt());
            assert!(p.answer() >= 0);
        }
    }

    #[test]
    fn easy_operands_stay_single_digit() {
        let mut g = NumericalOperationsGenerator::new(9);
        for _ in 0..200 {
            let p = g.next_problem(0.0);
            let (a, op, b) = parse_binary(p.prompt());
            if op == "+" || op == "-" {
                assert!((1..=9).contains(&a) && (1..=9).contains(&b));
            }
        }
    }

    #[test]
    fn hard_difficulty_produces_every_operator() {
        let mut g = NumericalOperationsGenerator::new(5);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..400 {
            let p = g.next_problem(1.0);
            seen.insert(parse_binary(p.prompt()).1.to_string());
        }
        assert_eq!(seen.len(), 4);
    }

    #[test]
    fn built_test_uses_catalog_description() {
        let clock = crate::clock::ManualClock::new();
        let h = build_numerical_operations_test(clock, HarnessConfig::new(1, 120.0)).unwrap();
        assert_eq!(h.title(), "Numerical Operations");
        assert!(!h.instructions().is_empty());
    }
}
