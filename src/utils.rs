//! Small time helpers shared across the crate.

use std::time::{SystemTime, UNIX_EPOCH};

/// Returns the current wall-clock time as nanoseconds since the Unix epoch.
///
/// Latency delays in this crate are sub-millisecond, so everything that
/// touches the event queue works in nanoseconds.
#[must_use]
pub fn current_time_nanos() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

/// Converts a latency expressed in seconds into whole nanoseconds.
///
/// Negative inputs are treated as zero.
#[must_use]
pub fn nanos_from_secs(secs: f64) -> u64 {
    (secs.max(0.0) * 1e9) as u64
}

/// Converts nanoseconds into seconds.
#[must_use]
pub fn secs_from_nanos(nanos: u64) -> f64 {
    nanos as f64 / 1e9
}
