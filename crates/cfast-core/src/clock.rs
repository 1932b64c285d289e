//! Monotonic time source injected into every harness and engine.
//!
//! Core logic never reads wall-clock time directly. Production code uses
//! [`MonotonicClock`]; tests and the headless driver use [`ManualClock`],
//! which only moves when told to.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

/// A source of monotonically non-decreasing seconds.
///
/// The trait is object-safe so callers can hold `Rc<dyn Clock>` when the
/// concrete clock is chosen at runtime.
pub trait Clock {
    /// Current time in seconds. The origin is arbitrary but fixed.
    fn now(&self) -> f64;
}

impl<C: Clock + ?Sized> Clock for Rc<C> {
    fn now(&self) -> f64 {
        (**self).now()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> f64 {
        (**self).now()
    }
}

// Compile-time assertion: Clock must be object-safe.
const _: () = {
    fn _assert_object_safe(_: &dyn Clock) {}
};

/// Production clock backed by [`Instant`].
///
/// Seconds are measured from the moment the clock was created.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

/// Deterministic clock that only changes through [`ManualClock::advance`]
/// or [`ManualClock::set`].
///
/// Clones share the same underlying time, so a test can hand one clone to
/// a harness and keep another to script time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    t: Rc<Cell<f64>>,
}

impl ManualClock {
    /// Create a clock reading `0.0`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a clock reading `start` seconds.
    pub fn starting_at(start: f64) -> Self {
        Self {
            t: Rc::new(Cell::new(start)),
        }
    }

    /// Move time forward by `seconds`. Negative values are ignored so the
    /// clock stays monotonic.
    pub fn advance(&self, seconds: f64) {
        if seconds > 0.0 {
            self.t.set(self.t.get() + seconds);
        }
    }

    /// Jump to an absolute reading. Ignored if it would move time backwards.
    pub fn set(&self, seconds: f64) {
        if seconds > self.t.get() {
            self.t.set(seconds);
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        self.t.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_starts_at_zero_and_never_moves_on_its_own() {
        let clock = ManualClock::new();
        assert_eq!(clock.now(), 0.0);
        assert_eq!(clock.now(), 0.0);
    }

    #[test]
    fn manual_clock_clones_share_time() {
        let clock = ManualClock::new();
        let handle = clock.clone();
        handle.advance(1.5);
        assert_eq!(clock.now(), 1.5);
    }

    #[test]
    fn manual_clock_refuses_to_go_backwards() {
        let clock = ManualClock::starting_at(10.0);
        clock.advance(-3.0);
        clock.set(4.0);
        assert_eq!(clock.now(), 10.0);
        clock.set(12.0);
        assert_eq!(clock.now(), 12.0);
    }

    #[test]
    fn monotonic_clock_is_non_decreasing() {
        let clock = MonotonicClock::new();
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }

    #[test]
    fn rc_dyn_clock_delegates() {
        let manual = ManualClock::starting_at(3.0);
        let shared: Rc<dyn Clock> = Rc::new(manual.clone());
        manual.advance(1.0);
        assert_eq!(shared.now(), 4.0);
    }
}
