//! Test lifecycle phases and the allowed transition graph.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Lifecycle phase of a test attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Instructions,
    Practice,
    PracticeDone,
    Scored,
    Results,
}

impl Phase {
    /// Check whether `from -> to` is an edge in the lifecycle graph:
    ///
    /// ```text
    /// instructions  -> practice
    /// instructions  -> practice_done  (zero practice configured)
    /// instructions  -> scored         (zero practice, start scored directly)
    /// practice      -> practice_done
    /// practice_done -> scored
    /// scored        -> results
    /// ```
    ///
    /// There is no edge out of `results`.
    pub fn is_valid_transition(from: Phase, to: Phase) -> bool {
        matches!(
            (from, to),
            (Phase::Instructions, Phase::Practice)
                | (Phase::Instructions, Phase::PracticeDone)
                | (Phase::Instructions, Phase::Scored)
                | (Phase::Practice, Phase::PracticeDone)
                | (Phase::PracticeDone, Phase::Scored)
                | (Phase::Scored, Phase::Results)
        )
    }

    /// Whether answers are accepted in this phase.
    pub fn accepts_input(self) -> bool {
        matches!(self, Phase::Practice | Phase::Scored)
    }

    /// Whether the surrounding shell may navigate away.
    pub fn can_exit(self) -> bool {
        self != Phase::Scored
    }

    /// Position in the lifecycle, used to check monotonicity.
    pub fn ordinal(self) -> u8 {
        match self {
            Phase::Instructions => 0,
            Phase::Practice => 1,
            Phase::PracticeDone => 2,
            Phase::Scored => 3,
            Phase::Results => 4,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Instructions => "instructions",
            Self::Practice => "practice",
            Self::PracticeDone => "practice_done",
            Self::Scored => "scored",
            Self::Results => "results",
        };
        f.write_str(s)
    }
}

impl FromStr for Phase {
    type Err = PhaseParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "instructions" => Ok(Self::Instructions),
            "practice" => Ok(Self::Practice),
            "practice_done" => Ok(Self::PracticeDone),
            "scored" => Ok(Self::Scored),
            "results" => Ok(Self::Results),
            other => Err(PhaseParseError(other.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`Phase`] string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid phase: {0:?}")]
pub struct PhaseParseError(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Phase; 5] = [
        Phase::Instructions,
        Phase::Practice,
        Phase::PracticeDone,
        Phase::Scored,
        Phase::Results,
    ];

    #[test]
    fn display_round_trips_through_from_str() {
        for phase in ALL {
            assert_eq!(phase.to_string().parse::<Phase>().unwrap(), phase);
        }
        assert!("finished".parse::<Phase>().is_err());
    }

    #[test]
    fn valid_transitions_only_move_forward() {
        for from in ALL {
            for to in ALL {
                if Phase::is_valid_transition(from, to) {
                    assert!(
                        to.ordinal() > from.ordinal(),
                        "{from} -> {to} must move forward"
                    );
                }
            }
        }
    }

    #[test]
    fn results_is_terminal() {
        for to in ALL {
            assert!(!Phase::is_valid_transition(Phase::Results, to));
        }
    }

    #[test]
    fn practice_cannot_skip_to_scored() {
        assert!(!Phase::is_valid_transition(Phase::Practice, Phase::Scored));
        assert!(!Phase::is_valid_transition(Phase::PracticeDone, Phase::Practice));
    }

    #[test]
    fn exit_locked_only_while_scored() {
        for phase in ALL {
            assert_eq!(phase.can_exit(), phase != Phase::Scored);
        }
    }

    #[test]
    fn serde_uses_snake_case() {
        let json = serde_json::to_string(&Phase::PracticeDone).unwrap();
        assert_eq!(json, "\"practice_done\"");
    }
}
