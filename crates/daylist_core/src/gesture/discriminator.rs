//! Per-row tap/long-press discriminator.
//!
//! # Responsibility
//! - Turn raw press events into toggle/delete/ignore.
//! - Debounce the release that some toolkits report after a long-press.
//!
//! # Invariants
//! - A double-tap needs two short-presses on the same row, strictly less than
//!   the window apart.
//! - A long-press always yields exactly one toggle and discards pending taps.
//! - A single tap never yields a command.
//! - The release debounce lasts one window after the long-press; later taps
//!   are ordinary taps.
//!
//! State per row: IDLE (no log) or ARMED (`last_press_at` set). For one
//! window after a long-press the row also holds `long_press_at`, and the
//! first short-press inside it is taken as that gesture's release.

use crate::gesture::{GestureConfig, PressEvent, RowCommand};
use crate::model::task::TaskId;
use log::debug;
use std::collections::HashMap;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct PressLog {
    last_press_at: Option<Instant>,
    long_press_at: Option<Instant>,
}

impl PressLog {
    fn expire(&mut self, now: Instant, window: Duration) {
        if !within(self.long_press_at, now, window) {
            self.long_press_at = None;
        }
        if !within(self.last_press_at, now, window) {
            self.last_press_at = None;
        }
    }
}

fn within(since: Option<Instant>, now: Instant, window: Duration) -> bool {
    since.is_some_and(|at| now.saturating_duration_since(at) < window)
}

/// Event-driven gesture state machine keyed by row id.
#[derive(Debug)]
pub struct GestureDiscriminator {
    window: Duration,
    logs: HashMap<TaskId, PressLog>,
    last_row: Option<TaskId>,
}

impl Default for GestureDiscriminator {
    fn default() -> Self {
        Self::new(GestureConfig::default())
    }
}

impl GestureDiscriminator {
    pub fn new(config: GestureConfig) -> Self {
        Self {
            window: config.double_tap_window(),
            logs: HashMap::new(),
            last_row: None,
        }
    }

    /// Feeds one raw event for row `id` observed at `at`.
    pub fn handle(&mut self, id: TaskId, event: PressEvent, at: Instant) -> Option<RowCommand> {
        let window = self.window;
        self.logs.retain(|_, log| {
            log.expire(at, window);
            *log != PressLog::default()
        });
        self.end_gesture_elsewhere(id);

        let command = match event {
            PressEvent::ShortPress => self.short_press(id, at),
            PressEvent::LongPress => self.long_press(id, at),
            PressEvent::PressCancel => {
                self.press_cancel(id);
                None
            }
        };
        debug!(
            "event=gesture module=gesture row={} input={:?} command={}",
            id,
            event,
            command.map_or("none", RowCommand::label)
        );
        command
    }

    fn short_press(&mut self, id: TaskId, at: Instant) -> Option<RowCommand> {
        let log = self.logs.entry(id).or_default();
        if log.long_press_at.take().is_some() {
            self.prune(id);
            return None;
        }

        let armed_at = log.last_press_at;
        match armed_at {
            Some(first) if at.saturating_duration_since(first) < self.window => {
                self.logs.remove(&id);
                Some(RowCommand::Delete(id))
            }
            _ => {
                log.last_press_at = Some(at);
                None
            }
        }
    }

    fn long_press(&mut self, id: TaskId, at: Instant) -> Option<RowCommand> {
        let log = self.logs.entry(id).or_default();
        log.last_press_at = None;
        log.long_press_at = Some(at);
        Some(RowCommand::Toggle(id))
    }

    fn press_cancel(&mut self, id: TaskId) {
        if let Some(log) = self.logs.get_mut(&id) {
            log.long_press_at = None;
            self.prune(id);
        }
    }

    /// Drops any state for a row that no longer exists.
    pub fn forget(&mut self, id: TaskId) {
        self.logs.remove(&id);
        if self.last_row == Some(id) {
            self.last_row = None;
        }
    }

    pub fn clear(&mut self) {
        self.logs.clear();
        self.last_row = None;
    }

    /// Number of rows currently holding a press log.
    pub fn pending_rows(&self) -> usize {
        self.logs.len()
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    // Single-touch surface: an event on another row means the previous
    // gesture has been released.
    fn end_gesture_elsewhere(&mut self, id: TaskId) {
        if let Some(previous) = self.last_row.replace(id) {
            if previous != id {
                if let Some(log) = self.logs.get_mut(&previous) {
                    log.long_press_at = None;
                }
                self.prune(previous);
            }
        }
    }

    fn prune(&mut self, id: TaskId) {
        if self.logs.get(&id) == Some(&PressLog::default()) {
            self.logs.remove(&id);
        }
    }
}
