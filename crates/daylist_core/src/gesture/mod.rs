//! Row gesture interpretation.
//!
//! # Responsibility
//! - Define the raw press events the UI toolkit delivers per row.
//! - Define the semantic commands those events resolve to.
//! - Hold the timing parameters shared with the UI.
//!
//! # Invariants
//! - Interpretation is event-driven; no timers run here.
//! - Tap windows are tracked per row, never globally.

use serde::{Deserialize, Serialize};
use std::time::Duration;

pub mod discriminator;

pub use discriminator::GestureDiscriminator;

use crate::model::task::TaskId;

/// Hold time after which the toolkit reports a long-press.
pub const LONG_PRESS_MS: u64 = 500;
/// Maximum gap between two taps on one row that counts as a double-tap.
pub const DOUBLE_TAP_MS: u64 = 300;

/// Raw press event routed from one list row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressEvent {
    /// Tap released before the long-press delay.
    ShortPress,
    /// Finger held past the long-press delay.
    LongPress,
    /// Press aborted by the toolkit (finger slid off, scroll took over).
    PressCancel,
}

/// Semantic row command produced by the discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "command", content = "task_id", rename_all = "snake_case")]
pub enum RowCommand {
    Toggle(TaskId),
    Delete(TaskId),
}

impl RowCommand {
    pub fn task_id(self) -> TaskId {
        match self {
            Self::Toggle(id) | Self::Delete(id) => id,
        }
    }

    /// Stable label used across the FFI boundary.
    pub fn label(self) -> &'static str {
        match self {
            Self::Toggle(_) => "toggle",
            Self::Delete(_) => "delete",
        }
    }
}

/// Gesture timing parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Passed through to the toolkit as its long-press delay.
    pub long_press_ms: u64,
    pub double_tap_ms: u64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            long_press_ms: LONG_PRESS_MS,
            double_tap_ms: DOUBLE_TAP_MS,
        }
    }
}

impl GestureConfig {
    pub fn long_press_delay(&self) -> Duration {
        Duration::from_millis(self.long_press_ms)
    }

    /// Double-tap window; zero falls back to the default.
    pub fn double_tap_window(&self) -> Duration {
        match self.double_tap_ms {
            0 => Duration::from_millis(DOUBLE_TAP_MS),
            ms => Duration::from_millis(ms),
        }
    }
}
