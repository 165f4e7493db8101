//! Modification stamps and timing utilities
//!
//! Every object that takes part in cache invalidation owns a [`TimeStamp`]
//! and bumps it when it changes. Stamps are drawn from one process-wide
//! counter, so stamps from unrelated objects are directly comparable.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

static GLOBAL_MODIFIED_TIME: AtomicU64 = AtomicU64::new(0);

/// Advance the global modification counter and return the new value
pub fn next_modified_time() -> u64 {
    GLOBAL_MODIFIED_TIME.fetch_add(1, Ordering::Relaxed) + 1
}

/// Monotonic modification stamp
///
/// A zero stamp means "never modified".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeStamp(u64);

impl TimeStamp {
    /// Create a stamp that has never been modified
    pub const fn new() -> Self {
        Self(0)
    }

    /// Create a stamp that is already newer than every existing one
    pub fn now() -> Self {
        Self(next_modified_time())
    }

    /// Mark the owner as modified
    pub fn modified(&mut self) {
        self.0 = next_modified_time();
    }

    /// Raw counter value
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Whether this stamp was never set
    pub const fn is_never(self) -> bool {
        self.0 == 0
    }
}

/// Simple stopwatch for measuring elapsed time
pub struct Stopwatch {
    start_time: Option<Instant>,
    elapsed: Duration,
}

impl Default for Stopwatch {
    fn default() -> Self {
        Self::new()
    }
}

impl Stopwatch {
    /// Create a new stopped stopwatch
    pub const fn new() -> Self {
        Self {
            start_time: None,
            elapsed: Duration::ZERO,
        }
    }

    /// Create a new stopwatch and start it immediately
    pub fn start_new() -> Self {
        let mut stopwatch = Self::new();
        stopwatch.start();
        stopwatch
    }

    /// Start the stopwatch
    pub fn start(&mut self) {
        self.start_time = Some(Instant::now());
    }

    /// Get the elapsed time
    pub fn elapsed(&self) -> Duration {
        let current_elapsed = self.start_time.map_or(Duration::ZERO, |start| start.elapsed());
        self.elapsed + current_elapsed
    }

    /// Get the elapsed time in milliseconds
    pub fn elapsed_millis(&self) -> f64 {
        self.elapsed().as_secs_f64() * 1000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_stamp_is_never_modified() {
        let stamp = TimeStamp::new();
        assert!(stamp.is_never());
        assert_eq!(stamp.get(), 0);
    }

    #[test]
    fn test_modified_is_strictly_increasing() {
        let mut a = TimeStamp::new();
        let mut b = TimeStamp::new();
        a.modified();
        b.modified();
        assert!(b > a);
        a.modified();
        assert!(a > b);
    }

    #[test]
    fn test_now_is_newer_than_earlier_stamps() {
        let mut earlier = TimeStamp::new();
        earlier.modified();
        assert!(TimeStamp::now() > earlier);
    }
}
