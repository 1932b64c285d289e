//! Cue-and-respond channel micro state machine.
//!
//! ```text
//! idle --issue--> cued --respond--> idle   (resolved by response)
//!                 cued --expire---> idle   (resolved by expiry)
//! idle --respond--> false alarm (stays idle)
//! ```
//!
//! A cue may open for responses some time after it is issued (a sequence
//! is shown first, then recalled). Responses before it opens are rejected
//! without resolving it.

/// A cue currently awaiting resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveCue<T> {
    pub target: T,
    pub issued_at_s: f64,
    /// Responses are accepted from this instant.
    pub opens_at_s: f64,
    /// The cue resolves as expired at or after this instant.
    pub expires_at_s: f64,
    /// False for distractor cues that should be ignored.
    pub expects_response: bool,
}

impl<T> ActiveCue<T> {
    /// A cue that opens immediately and stays open for `window_s`.
    pub fn new(target: T, issued_at_s: f64, window_s: f64) -> Self {
        Self::delayed(target, issued_at_s, 0.0, window_s)
    }

    /// A cue that opens after `delay_s` and then stays open for `window_s`.
    pub fn delayed(target: T, issued_at_s: f64, delay_s: f64, window_s: f64) -> Self {
        let opens_at_s = issued_at_s + delay_s;
        Self {
            target,
            issued_at_s,
            opens_at_s,
            expires_at_s: opens_at_s + window_s,
            expects_response: true,
        }
    }

    /// Mark as a distractor: letting it expire is the correct behaviour.
    pub fn distractor(mut self) -> Self {
        self.expects_response = false;
        self
    }
}

/// What a response would hit right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CueStatus {
    /// No cue is active; a response is a false alarm.
    Idle,
    /// A cue is active but not yet accepting responses.
    Pending,
    Open,
}

/// One independent channel with its own schedule.
#[derive(Debug, Clone)]
pub struct CueChannel<T> {
    first_at_s: f64,
    next_at_s: f64,
    active: Option<ActiveCue<T>>,
}

impl<T> CueChannel<T> {
    /// A channel whose first cue becomes due at `first_at_s` into a run.
    pub fn new(first_at_s: f64) -> Self {
        Self {
            first_at_s,
            next_at_s: first_at_s,
            active: None,
        }
    }

    /// Back to the start-of-run schedule with nothing active.
    pub fn reset(&mut self) {
        self.next_at_s = self.first_at_s;
        self.active = None;
    }

    /// A new cue is due: nothing active and the schedule has been reached.
    pub fn is_due(&self, sim_s: f64) -> bool {
        self.active.is_none() && sim_s >= self.next_at_s
    }

    /// Activate `cue` and schedule the next one `interval_s` after it.
    pub fn issue(&mut self, cue: ActiveCue<T>, interval_s: f64) {
        self.next_at_s = cue.issued_at_s + interval_s;
        self.active = Some(cue);
    }

    pub fn active(&self) -> Option<&ActiveCue<T>> {
        self.active.as_ref()
    }

    pub fn next_at_s(&self) -> f64 {
        self.next_at_s
    }

    pub fn status(&self, sim_s: f64) -> CueStatus {
        match &self.active {
            None => CueStatus::Idle,
            Some(cue) if sim_s < cue.opens_at_s => CueStatus::Pending,
            Some(_) => CueStatus::Open,
        }
    }

    /// Remove and return the active cue if its deadline has passed.
    pub fn take_expired(&mut self, sim_s: f64) -> Option<ActiveCue<T>> {
        match &self.active {
            Some(cue) if sim_s >= cue.expires_at_s => self.active.take(),
            _ => None,
        }
    }

    /// Resolve the active cue by a response. Returns the cue and the
    /// response time measured from when it opened, or `None` if no open
    /// cue exists.
    pub fn resolve(&mut self, sim_s: f64) -> Option<(ActiveCue<T>, f64)> {
        if self.status(sim_s) != CueStatus::Open {
            return None;
        }
        let cue = self.active.take()?;
        let rt = (sim_s - cue.opens_at_s).max(0.0);
        Some((cue, rt))
    }
}
