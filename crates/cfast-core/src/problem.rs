//! The unit of question content dealt by a generator.

use crate::tasks::angles_bearings::AnglesBearingsPayload;
use crate::tasks::auditory_capacity::AuditoryCapacityPayload;
use crate::tasks::instrument_comprehension::InstrumentPayload;

/// Task-specific structured data attached to a problem or a continuous
/// engine snapshot, for renderers that need more than the prompt text.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    AnglesBearings(AnglesBearingsPayload),
    Instrument(InstrumentPayload),
    AuditoryCapacity(AuditoryCapacityPayload),
}

/// One trial: prompt text, canonical integer answer, accepted tolerance and
/// an optional payload.
///
/// Built once by a generator and never mutated afterwards.
///
/// ```
/// use cfast_core::problem::Problem;
///
/// let p = Problem::new("12 + 30 =", 42).with_tolerance(1);
/// assert_eq!(p.answer(), 42);
/// assert!(p.accepts(43));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Problem {
    prompt: String,
    answer: i64,
    tolerance: i64,
    payload: Option<Payload>,
}

impl Problem {
    pub fn new(prompt: impl Into<String>, answer: i64) -> Self {
        Self {
            prompt: prompt.into(),
            answer,
            tolerance: 0,
            payload: None,
        }
    }

    /// Accept answers within `tolerance` of the canonical answer.
    pub fn with_tolerance(mut self, tolerance: i64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_payload(mut self, payload: Payload) -> Self {
        self.payload = Some(payload);
        self
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn answer(&self) -> i64 {
        self.answer
    }

    /// Configured tolerance. A negative value behaves as zero.
    pub fn tolerance(&self) -> i64 {
        self.tolerance
    }

    pub fn payload(&self) -> Option<&Payload> {
        self.payload.as_ref()
    }

    /// Exact-match check honoring the tolerance.
    pub fn accepts(&self, user_answer: i64) -> bool {
        let tol = self.tolerance.max(0);
        user_answer.abs_diff(self.answer) <= tol.unsigned_abs()
    }
}
