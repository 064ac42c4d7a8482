//! Board session: the single screen's state and command sinks.
//!
//! # Responsibility
//! - Own the task store, gesture discriminator and midnight timer together.
//! - Apply row commands to the store as soon as they are recognised.
//! - Hand out snapshots whose count always matches their rows.
//!
//! # Invariants
//! - Lock order is store, then gestures. Gestures are resolved while the
//!   store is held, so a reset can never re-target a pending command.
//! - The timer is armed at most once per board and cancelled on shutdown/drop.

use crate::config::BoardConfig;
use crate::gesture::{GestureDiscriminator, PressEvent, RowCommand};
use crate::model::task::{Task, TaskId};
use crate::schedule::{Clock, MidnightHandle, MidnightScheduler, ResetCallback, ScheduleError};
use crate::store::task_store::TaskStore;
use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;
use tokio::runtime::Handle;

/// Render-ready view of the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardSnapshot {
    pub title: String,
    pub tasks: Vec<Task>,
    pub incomplete_count: usize,
    pub next_reset_at: Option<DateTime<Utc>>,
}

/// Process-wide state for one app session.
#[derive(Debug)]
pub struct Board {
    config: BoardConfig,
    store: Arc<Mutex<TaskStore>>,
    gestures: Arc<Mutex<GestureDiscriminator>>,
    timer: Mutex<Option<MidnightHandle>>,
}

impl Default for Board {
    fn default() -> Self {
        Self::new(BoardConfig::default())
    }
}

impl Board {
    pub fn new(config: BoardConfig) -> Self {
        let gestures = GestureDiscriminator::new(config.gesture);
        Self {
            config,
            store: Arc::default(),
            gestures: Arc::new(Mutex::new(gestures)),
            timer: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    /// Commit sink for the footer input. Blank text is ignored.
    pub fn add_task(&self, text: impl Into<String>) -> Option<TaskId> {
        lock(&self.store).add(text)
    }

    /// Short-press sink for a row.
    pub fn on_row_press(&self, id: TaskId, at: Instant) -> Option<RowCommand> {
        self.dispatch(id, PressEvent::ShortPress, at)
    }

    /// Long-press sink for a row.
    pub fn on_row_long_press(&self, id: TaskId, at: Instant) -> Option<RowCommand> {
        self.dispatch(id, PressEvent::LongPress, at)
    }

    pub fn on_row_press_cancel(&self, id: TaskId, at: Instant) {
        self.dispatch(id, PressEvent::PressCancel, at);
    }

    fn dispatch(&self, id: TaskId, event: PressEvent, at: Instant) -> Option<RowCommand> {
        let mut store = lock(&self.store);
        let mut gestures = lock(&self.gestures);

        if store.get(id).is_none() {
            gestures.forget(id);
            return None;
        }

        let command = gestures.handle(id, event, at)?;
        match command {
            RowCommand::Toggle(id) => {
                store.toggle(id);
            }
            RowCommand::Delete(id) => {
                store.delete(id);
                gestures.forget(id);
            }
        }
        Some(command)
    }

    pub fn incomplete_count(&self) -> usize {
        lock(&self.store).incomplete_count()
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        let next_reset_at = self.next_reset_at();
        let store = lock(&self.store);
        BoardSnapshot {
            title: self.config.title.clone(),
            tasks: store.tasks().to_vec(),
            incomplete_count: store.incomplete_count(),
            next_reset_at,
        }
    }

    /// Clears the list immediately, as the midnight timer would.
    pub fn reset_now(&self) {
        let mut store = lock(&self.store);
        let mut gestures = lock(&self.gestures);
        store.reset();
        gestures.clear();
    }

    /// Arms the daily reset on the ambient tokio runtime.
    ///
    /// # Errors
    /// - `AlreadyArmed` when a timer is already running for this board.
    /// - `NoRuntime` when called outside a tokio runtime.
    pub fn start_daily_reset(&self, clock: Arc<dyn Clock>) -> Result<(), ScheduleError> {
        let mut timer = self.claim_timer_slot()?;
        let handle = self.scheduler(clock).arm(self.reset_callback())?;
        *timer = Some(handle);
        Ok(())
    }

    /// Arms the daily reset for an explicit deadline on the ambient runtime.
    ///
    /// # Errors
    /// Same as [`Board::start_daily_reset`].
    pub fn start_daily_reset_at(
        &self,
        clock: Arc<dyn Clock>,
        deadline: DateTime<Utc>,
    ) -> Result<(), ScheduleError> {
        let mut timer = self.claim_timer_slot()?;
        let handle = self
            .scheduler(clock)
            .arm_at(deadline, self.reset_callback())?;
        *timer = Some(handle);
        Ok(())
    }

    /// Arms the daily reset on a caller-owned runtime.
    ///
    /// # Errors
    /// - `AlreadyArmed` when a timer is already running for this board.
    pub fn start_daily_reset_on(
        &self,
        runtime: &Handle,
        clock: Arc<dyn Clock>,
    ) -> Result<(), ScheduleError> {
        let mut timer = self.claim_timer_slot()?;
        *timer = Some(self.scheduler(clock).arm_on(runtime, self.reset_callback()));
        Ok(())
    }

    pub fn is_daily_reset_armed(&self) -> bool {
        lock(&self.timer)
            .as_ref()
            .is_some_and(MidnightHandle::is_active)
    }

    pub fn next_reset_at(&self) -> Option<DateTime<Utc>> {
        lock(&self.timer)
            .as_ref()
            .filter(|handle| handle.is_active())
            .map(MidnightHandle::deadline)
    }

    /// Cancels the midnight timer. Idempotent.
    pub fn shutdown(&self) {
        if let Some(handle) = lock(&self.timer).take() {
            handle.cancel();
            info!("event=board_shutdown module=session status=ok");
        }
    }

    fn claim_timer_slot(&self) -> Result<MutexGuard<'_, Option<MidnightHandle>>, ScheduleError> {
        let timer = lock(&self.timer);
        if timer.as_ref().is_some_and(MidnightHandle::is_active) {
            warn!("event=reset_arm module=session status=skipped reason=already_armed");
            return Err(ScheduleError::AlreadyArmed);
        }
        Ok(timer)
    }

    fn scheduler(&self, clock: Arc<dyn Clock>) -> MidnightScheduler {
        MidnightScheduler::new(clock).with_policy(self.config.reset_policy)
    }

    fn reset_callback(&self) -> ResetCallback {
        let store = Arc::clone(&self.store);
        let gestures = Arc::clone(&self.gestures);
        Box::new(move |deadline| {
            let mut store = lock(&store);
            let mut gestures = lock(&gestures);
            store.reset();
            gestures.clear();
            info!(
                "event=daily_reset module=session status=ok deadline={}",
                deadline.to_rfc3339()
            );
        })
    }
}

impl Drop for Board {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::Board;
    use crate::gesture::RowCommand;
    use crate::model::task::TaskId;
    use crate::schedule::{ScheduleError, SystemClock};
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    #[test]
    fn presses_on_unknown_rows_are_ignored() {
        let board = Board::default();
        let t0 = Instant::now();
        let ghost = TaskId::new(7);

        assert_eq!(board.on_row_long_press(ghost, t0), None);
        assert_eq!(board.on_row_press(ghost, t0), None);
        assert_eq!(board.on_row_press(ghost, t0 + Duration::from_millis(50)), None);
    }

    #[test]
    fn long_press_toggles_through_the_store() {
        let board = Board::default();
        let id = board.add_task("buy milk").expect("added");

        assert_eq!(
            board.on_row_long_press(id, Instant::now()),
            Some(RowCommand::Toggle(id))
        );
        assert_eq!(board.incomplete_count(), 0);
        assert!(board.snapshot().tasks[0].completed);
    }

    #[test]
    fn arming_without_runtime_leaves_board_usable() {
        let board = Board::default();
        let err = board
            .start_daily_reset(Arc::new(SystemClock))
            .unwrap_err();
        assert_eq!(err, ScheduleError::NoRuntime);
        assert!(!board.is_daily_reset_armed());
        assert!(board.add_task("still works").is_some());
    }

    #[tokio::test]
    async fn second_arm_is_rejected_and_shutdown_is_idempotent() {
        let board = Board::default();
        board
            .start_daily_reset(Arc::new(SystemClock))
            .expect("first arm");
        assert!(board.is_daily_reset_armed());
        assert!(board.next_reset_at().is_some());
        assert_eq!(
            board.start_daily_reset(Arc::new(SystemClock)).unwrap_err(),
            ScheduleError::AlreadyArmed
        );

        board.shutdown();
        board.shutdown();
        assert!(!board.is_daily_reset_armed());
        assert!(board.snapshot().next_reset_at.is_none());
    }
}
