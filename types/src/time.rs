//! Timestamp type used throughout the verification engines.
//!
//! Timestamps are Unix epoch milliseconds (UTC). Challenge windows are short
//! (hundreds of milliseconds), so second resolution is not enough.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// A Unix timestamp in milliseconds since epoch (UTC).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(u64);

impl Timestamp {
    /// The epoch (time zero).
    pub const EPOCH: Self = Self(0);

    pub fn new(millis: u64) -> Self {
        Self(millis)
    }

    /// Get the current system time as a `Timestamp`.
    pub fn now() -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system clock before Unix epoch")
            .as_millis() as u64;
        Self(millis)
    }

    pub fn as_millis(&self) -> u64 {
        self.0
    }

    /// This timestamp moved forward by `millis`.
    pub fn saturating_add_ms(&self, millis: u64) -> Self {
        Self(self.0.saturating_add(millis))
    }

    /// Milliseconds elapsed since this timestamp (relative to `now`).
    pub fn elapsed_since(&self, now: Timestamp) -> u64 {
        now.0.saturating_sub(self.0)
    }

    /// Whether this deadline has been reached relative to `now`.
    pub fn has_elapsed(&self, now: Timestamp) -> bool {
        now.0 >= self.0
    }

    /// Milliseconds remaining until this timestamp, zero if already past.
    pub fn millis_until(&self, now: Timestamp) -> u64 {
        self.0.saturating_sub(now.0)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saturating_add_does_not_wrap() {
        let t = Timestamp::new(u64::MAX - 10);
        assert_eq!(t.saturating_add_ms(100), Timestamp::new(u64::MAX));
    }

    #[test]
    fn elapsed_since_is_zero_for_future_timestamps() {
        let t = Timestamp::new(5_000);
        assert_eq!(t.elapsed_since(Timestamp::new(4_000)), 0);
        assert_eq!(t.elapsed_since(Timestamp::new(6_500)), 1_500);
    }

    #[test]
    fn deadline_elapses_at_exact_instant() {
        let deadline = Timestamp::new(1_000);
        assert!(!deadline.has_elapsed(Timestamp::new(999)));
        assert!(deadline.has_elapsed(Timestamp::new(1_000)));
        assert!(deadline.has_elapsed(Timestamp::new(1_001)));
    }

    #[test]
    fn millis_until_clamps_past_deadlines_to_zero() {
        let deadline = Timestamp::new(2_000);
        assert_eq!(deadline.millis_until(Timestamp::new(1_200)), 800);
        assert_eq!(deadline.millis_until(Timestamp::new(2_000)), 0);
        assert_eq!(deadline.millis_until(Timestamp::new(3_000)), 0);
    }
}
