//! Pure transition logic for the debounced single-flight search coalescer.
//!
//! Nothing here touches timers or the network. Each transition returns the
//! [`Action`] the driver has to perform, which keeps every interleaving of
//! notifications, timer expiry and fetch completion testable without a runtime.

/// Externally visible phase of a coalescer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// Nothing requested, nothing running.
    #[default]
    Idle,
    /// A debounce timer is counting down towards the first dispatch of a burst.
    Debouncing,
    /// One fetch is outstanding and nothing new has been requested since it started.
    InFlight,
    /// One fetch is outstanding and the query changed while it was running.
    InFlightWithPending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    None,
    StartTimer,
    Dispatch,
}

#[derive(Debug, Clone, Default)]
pub struct CoalescerState {
    pending: bool,
    in_flight: bool,
    debouncing: bool,
}

impl CoalescerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_changed(&mut self) -> Action {
        self.pending = true;

        if self.debouncing || self.in_flight {
            return Action::None;
        }

        self.debouncing = true;
        Action::StartTimer
    }

    pub fn on_timer_fired(&mut self) -> Action {
        self.debouncing = false;

        // The pending flag stays raised here so the running fetch's completion
        // still serves it.
        if self.in_flight {
            return Action::None;
        }

        self.begin_dispatch()
    }

    pub fn on_completed(&mut self) -> Action {
        debug_assert!(self.in_flight, "completion without an outstanding fetch");
        self.in_flight = false;

        if self.pending {
            return self.begin_dispatch();
        }

        Action::None
    }

    pub fn phase(&self) -> Phase {
        match (self.in_flight, self.pending, self.debouncing) {
            (true, true, _) => Phase::InFlightWithPending,
            (true, false, _) => Phase::InFlight,
            (false, _, true) => Phase::Debouncing,
            (false, _, false) => Phase::Idle,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// A raised pending flag must always be owned by a running timer or fetch.
    pub fn is_steady(&self) -> bool {
        !self.pending || self.in_flight || self.debouncing
    }

    fn begin_dispatch(&mut self) -> Action {
        self.pending = false;
        self.in_flight = true;
        Action::Dispatch
    }
}

#[cfg(test)]
#[path = "tests/state_tests.rs"]
mod tests;
