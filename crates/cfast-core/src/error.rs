//! Construction-time configuration errors.
//!
//! Input rejection (bad answers, closed phases) is never an error; it is a
//! `false` return from the submitting call. Only invalid configuration is
//! reported through these types.

/// A configuration value was out of range.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("difficulty must be in [0.0, 1.0], got {0}")]
    InvalidDifficulty(f64),

    #[error("{field} must be > 0, got {value}")]
    NonPositive { field: &'static str, value: f64 },

    #[error("{field} must be >= 0, got {value}")]
    Negative { field: &'static str, value: f64 },
}

impl ConfigError {
    /// Reject `value` unless it is strictly positive and finite.
    pub(crate) fn require_positive(field: &'static str, value: f64) -> Result<(), Self> {
        if value.is_finite() && value > 0.0 {
            Ok(())
        } else {
            Err(Self::NonPositive { field, value })
        }
    }

    /// Reject `value` unless it is non-negative and finite.
    pub(crate) fn require_non_negative(field: &'static str, value: f64) -> Result<(), Self> {
        if value.is_finite() && value >= 0.0 {
            Ok(())
        } else {
            Err(Self::Negative { field, value })
        }
    }

    pub(crate) fn require_unit(value: f64) -> Result<(), Self> {
        if (0.0..=1.0).contains(&value) {
            Ok(())
        } else {
            Err(Self::InvalidDifficulty(value))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_check() {
        assert!(ConfigError::require_positive("tick_hz", 120.0).is_ok());
        assert_eq!(
            ConfigError::require_positive("tick_hz", 0.0),
            Err(ConfigError::NonPositive {
                field: "tick_hz",
                value: 0.0
            })
        );
        assert!(ConfigError::require_positive("tick_hz", f64::NAN).is_err());
    }

    #[test]
    fn non_negative_check() {
        assert!(ConfigError::require_non_negative("practice_duration_s", 0.0).is_ok());
        assert!(ConfigError::require_non_negative("practice_duration_s", -0.1).is_err());
    }

    #[test]
    fn unit_interval_check_rejects_nan() {
        assert!(ConfigError::require_unit(0.0).is_ok());
        assert!(ConfigError::require_unit(1.0).is_ok());
        assert!(ConfigError::require_unit(1.01).is_err());
        assert!(ConfigError::require_unit(f64::NAN).is_err());
    }

    #[test]
    fn display_messages() {
        assert_eq!(
            ConfigError::InvalidDifficulty(1.5).to_string(),
            "difficulty must be in [0.0, 1.0], got 1.5"
        );
        assert_eq!(
            ConfigError::NonPositive {
                field: "scored_duration_s",
                value: -2.0
            }
            .to_string(),
            "scored_duration_s must be > 0, got -2"
        );
    }
}
