//! Wall-clock sources for the daily reset.

use chrono::{DateTime, Duration as TimeDelta, Utc};
use std::fmt::Debug;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::time::Instant;

/// Source of the current wall-clock time.
pub trait Clock: Debug + Send + Sync + 'static {
    fn now(&self) -> DateTime<Utc>;
}

/// Platform wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Wall clock driven by tokio time plus an adjustable offset.
///
/// Monotonic progress follows `tokio::time::Instant`, so a paused test
/// runtime advances it. `jump` moves only the wall clock, the way a user
/// or NTP changing the system time would.
#[derive(Debug, Clone)]
pub struct ManualClock {
    base_wall: DateTime<Utc>,
    base_instant: Instant,
    offset: Arc<Mutex<TimeDelta>>,
}

impl ManualClock {
    pub fn starting_at(wall: DateTime<Utc>) -> Self {
        Self {
            base_wall: wall,
            base_instant: Instant::now(),
            offset: Arc::new(Mutex::new(TimeDelta::zero())),
        }
    }

    /// Shifts the wall clock by `delta` (negative moves it backwards).
    pub fn jump(&self, delta: TimeDelta) {
        let mut offset = self.offset.lock().unwrap_or_else(PoisonError::into_inner);
        *offset = *offset + delta;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        let elapsed = TimeDelta::from_std(self.base_instant.elapsed())
            .unwrap_or_else(|_| TimeDelta::zero());
        let offset = *self.offset.lock().unwrap_or_else(PoisonError::into_inner);
        self.base_wall + elapsed + offset
    }
}
