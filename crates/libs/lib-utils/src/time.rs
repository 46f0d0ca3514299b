//! # Time Utilities
//!
//! The [`Clock`] seam used by the session store and chat service.

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;

/// Get current UTC time.
pub fn now_utc() -> DateTime<Utc> {
    Utc::now()
}

// region:    --- Clock
/// Source of "now" for anything that stamps or ages records.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        now_utc()
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    current: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            current: Mutex::new(start),
        }
    }

    /// Move the clock forward by `by`.
    pub fn advance(&self, by: Duration) {
        let mut current = self.current.lock();
        *current += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(now_utc())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.current.lock()
    }
}
// endregion: --- Clock

// endregion: --- Tests
