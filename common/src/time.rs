//! Time utilities and constants for Ratewise.

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use parking_lot::Mutex;
use std::sync::Arc;

/// Timing constants.
pub mod constants {
    use super::Duration;

    /// How long a fetched rate stays fresh (1 hour).
    pub fn cache_ttl() -> Duration {
        Duration::hours(1)
    }

    /// Upstream request timeout (10 seconds).
    pub fn request_timeout() -> Duration {
        Duration::seconds(10)
    }
}

/// A timestamp with timezone (always UTC).
pub type Timestamp = DateTime<Utc>;

/// Get the current timestamp.
pub fn now() -> Timestamp {
    Utc::now()
}

/// Format a timestamp as ISO-8601 with millisecond precision, e.g.
/// `2024-05-01T12:30:00.000Z`.
pub fn to_iso8601(timestamp: Timestamp) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Source of the current time.
///
/// Cache expiry reads time through this trait so tests can move time forward
/// without sleeping.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        now()
    }
}

/// Manually driven clock for tests and simulations.
#[derive(Debug, Clone)]
pub struct ManualClock {
    current: Arc<Mutex<Timestamp>>,
}

impl ManualClock {
    /// Create a clock frozen at `start`.
    pub fn new(start: Timestamp) -> Self {
        Self {
            current: Arc::new(Mutex::new(start)),
        }
    }

    /// Move the clock forward.
    pub fn advance(&self, by: Duration) {
        let mut current = self.current.lock();
        *current = *current + by;
    }

    /// Jump to an absolute time.
    pub fn set(&self, to: Timestamp) {
        *self.current.lock() = to;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(now())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        *self.current.lock()
    }
}

/// Shared clock handle.
pub type SharedClock = Arc<dyn Clock>;
