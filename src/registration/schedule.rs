use std::time::{Duration, Instant};

/// Cancellable single-slot scheduler backing the debounced interactions.
///
/// Each `schedule` call replaces any pending task, so at most one task is
/// ever outstanding; `poll` fires the task once its deadline has passed.
/// Time is passed in explicitly, which keeps the engine single-threaded and
/// lets tests drive the clock without sleeping.
#[derive(Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<(Instant, T)>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Replace any pending task and restart the settle window from `now`.
    pub fn schedule(&mut self, payload: T, now: Instant) {
        self.pending = Some((now + self.delay, payload));
    }

    /// Fire the pending task if its settle window has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some((deadline, _)) if now >= *deadline => {
                self.pending.take().map(|(_, payload)| payload)
            }
            _ => None,
        }
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}
