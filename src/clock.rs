//! Time source for derived fields.
//!
//! Durations of active contexts depend on "now". The clock is sampled once
//! per request and the sample is passed down explicitly, so every record in a
//! response is evaluated against the same instant.

use crate::types::Timestamp;

/// Source of the current wall-clock time in epoch milliseconds.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// Wall clock backed by the system time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Clock frozen at a fixed instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub Timestamp);

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        self.0
    }
}
