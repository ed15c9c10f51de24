//! Context duration: elapsed time derived from lifecycle timestamps.
//!
//! A context can be interrupted and restored any number of times, but only
//! the latest interruption and restoration are kept. The effective end of the
//! span is chosen from those timestamps alone; the advisory `status` field
//! plays no part.

use crate::error::ApiError;
use crate::types::Timestamp;
use serde::Serialize;

/// Lifecycle timestamps of a context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lifecycle {
    pub started: Timestamp,
    pub ended: Option<Timestamp>,
    pub interrupted: Option<Timestamp>,
    pub restored: Option<Timestamp>,
}

/// Which lifecycle configuration selected the effective end time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleRule {
    /// Never ended, interrupted or restored.
    Active,
    /// Ended without ever being interrupted.
    Ended,
    /// Interrupted and not restored yet.
    Paused,
    /// Restored after the latest interruption and still running.
    Resumed,
    /// The latest restoration predates the latest interruption.
    PausedAgain,
    /// Ended while interrupted, never restored.
    EndedWhilePaused,
    /// Ended after an interruption that outlived the latest restoration.
    EndedWhilePausedAgain,
    /// Restored after the latest interruption, then ended.
    EndedAfterResume,
    /// Restored without a recorded interruption.
    Unclassified,
}

/// Pick the effective end time of a context at `now`.
pub fn effective_end(lifecycle: &Lifecycle, now: Timestamp) -> (LifecycleRule, Timestamp) {
    match (lifecycle.ended, lifecycle.interrupted, lifecycle.restored) {
        (None, None, None) => (LifecycleRule::Active, now),
        (Some(ended), None, _) => (LifecycleRule::Ended, ended),
        (None, Some(interrupted), None) => (LifecycleRule::Paused, interrupted),
        (None, Some(interrupted), Some(restored)) if restored > interrupted => {
            (LifecycleRule::Resumed, now)
        }
        (None, Some(interrupted), Some(_)) => (LifecycleRule::PausedAgain, interrupted),
        (Some(_), Some(interrupted), None) => (LifecycleRule::EndedWhilePaused, interrupted),
        (Some(_), Some(interrupted), Some(restored)) if restored <= interrupted => {
            (LifecycleRule::EndedWhilePausedAgain, interrupted)
        }
        (Some(ended), Some(_), Some(_)) => (LifecycleRule::EndedAfterResume, ended),
        (None, None, Some(_)) => (LifecycleRule::Unclassified, now),
    }
}

/// Duration of a context in milliseconds at `now`.
///
/// The result is exactly `end - started`. A negative value means the stored
/// timestamps contradict each other and is reported, not clamped.
pub fn compute_duration(lifecycle: &Lifecycle, now: Timestamp) -> Result<i64, ApiError> {
    let (rule, end) = effective_end(lifecycle, now);
    let duration = end - lifecycle.started;
    if duration < 0 {
        return Err(ApiError::DataIntegrity(format!(
            "negative duration {}ms (rule {:?}, started {}, end {})",
            duration, rule, lifecycle.started, end
        )));
    }
    Ok(duration)
}
