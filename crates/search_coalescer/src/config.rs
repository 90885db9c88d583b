use std::time::Duration;

/// Quiet period between the first keystroke of a burst and its dispatch.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);
/// Upper bound on a single outstanding search before it counts as failed.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_EVENT_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoalescerConfig {
    pub debounce: Duration,
    /// `None` lets a fetch run forever, which parks the coalescer in flight.
    pub request_timeout: Option<Duration>,
    pub event_capacity: usize,
}

impl Default for CoalescerConfig {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            request_timeout: Some(DEFAULT_REQUEST_TIMEOUT),
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

impl CoalescerConfig {
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn with_request_timeout(mut self, request_timeout: Option<Duration>) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    pub fn with_event_capacity(mut self, event_capacity: usize) -> Self {
        self.event_capacity = event_capacity.max(1);
        self
    }
}
