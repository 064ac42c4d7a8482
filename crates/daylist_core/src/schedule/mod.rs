//! Daily reset scheduling.
//!
//! # Responsibility
//! - Compute the next local midnight.
//! - Arm a cancellable background timer that clears the day's list.
//!
//! # Invariants
//! - Exactly one reset per armed deadline.
//! - Cancellation is idempotent and safe after firing.
//! - A failure to arm never affects task operations.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod clock;
pub mod midnight;
pub mod scheduler;

pub use clock::{Clock, ManualClock, SystemClock};
pub use midnight::{next_local_midnight, next_system_midnight};
pub use scheduler::{MidnightHandle, MidnightScheduler, ResetCallback, MAX_SLEEP_SLICE};

/// What the timer does after its first reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResetPolicy {
    /// Re-arm for every following midnight of a long session.
    #[default]
    Rearm,
    /// Fire at the first midnight only.
    Once,
}

/// Errors raised while arming the daily reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleError {
    NoRuntime,
    AlreadyArmed,
}

impl Display for ScheduleError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoRuntime => write!(f, "no async runtime available to arm the daily reset"),
            Self::AlreadyArmed => write!(f, "daily reset is already armed"),
        }
    }
}

impl Error for ScheduleError {}
