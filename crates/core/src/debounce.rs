//! Quiet-period debouncing driven by caller-supplied timestamps.
//!
//! Timestamps are durations since any fixed origin (a host clock, an
//! `Instant` captured at start-up), so the same code runs natively and
//! under wasm where `Instant::now` is unavailable.

use std::time::Duration;

/// Quiet period before a slider change propagates.
pub const THRESHOLD_DEBOUNCE: Duration = Duration::from_millis(50);

/// Coalesces bursts of values: every push restarts the timer and only the
/// last value is released once the input has been quiet for the delay.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<(T, Duration)>,
}

impl<T> Default for Debouncer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Debouncer<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            delay: THRESHOLD_DEBOUNCE,
            pending: None,
        }
    }

    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Record `value` observed at `now`, replacing any pending value.
    pub fn push(&mut self, value: T, now: Duration) {
        self.pending = Some((value, now + self.delay));
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// When the pending value becomes due.
    pub fn deadline(&self) -> Option<Duration> {
        self.pending.as_ref().map(|(_, due)| *due)
    }

    /// Release the pending value once its quiet period has elapsed.
    pub fn poll(&mut self, now: Duration) -> Option<T> {
        match &self.pending {
            Some((_, due)) if now >= *due => self.pending.take().map(|(value, _)| value),
            _ => None,
        }
    }

    /// Release the pending value immediately.
    pub fn flush(&mut self) -> Option<T> {
        self.pending.take().map(|(value, _)| value)
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }
}
