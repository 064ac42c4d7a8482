//! Cancellable midnight timer.
//!
//! # Responsibility
//! - Run one background loop that fires the daily reset at local midnight.
//! - Re-arm for the following midnight unless told to fire only once.
//!
//! # Invariants
//! - The deadline is a wall-clock instant; the loop re-reads the clock at
//!   least every `MAX_SLEEP_SLICE`, so clock jumps are honoured.
//! - The callback runs at most once per armed deadline.
//! - After `MidnightHandle::cancel` returns, the callback never starts again.

use crate::schedule::clock::Clock;
use crate::schedule::midnight::next_system_midnight;
use crate::schedule::{ResetPolicy, ScheduleError};
use chrono::{DateTime, Utc};
use log::{error, info};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Longest single sleep before the wall clock is checked again.
pub const MAX_SLEEP_SLICE: Duration = Duration::from_secs(60);

/// Callback invoked with the deadline that was reached.
pub type ResetCallback = Box<dyn Fn(DateTime<Utc>) + Send + Sync>;

/// Builder for the midnight timer.
#[derive(Debug, Clone)]
pub struct MidnightScheduler {
    clock: Arc<dyn Clock>,
    policy: ResetPolicy,
    slice: Duration,
}

impl MidnightScheduler {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            policy: ResetPolicy::default(),
            slice: MAX_SLEEP_SLICE,
        }
    }

    pub fn with_policy(mut self, policy: ResetPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Override the clock re-check interval.
    pub fn with_sleep_slice(mut self, slice: Duration) -> Self {
        self.slice = slice.max(Duration::from_millis(1));
        self
    }

    /// Next local midnight as seen by this scheduler's clock.
    pub fn next_deadline(&self) -> DateTime<Utc> {
        next_system_midnight(self.clock.now())
    }

    /// Arms for the next local midnight on the ambient tokio runtime.
    ///
    /// # Errors
    /// - `NoRuntime` when called outside a tokio runtime.
    pub fn arm(self, on_reset: ResetCallback) -> Result<MidnightHandle, ScheduleError> {
        let deadline = self.next_deadline();
        self.arm_at(deadline, on_reset)
    }

    /// Arms for an explicit deadline on the ambient tokio runtime.
    ///
    /// # Errors
    /// - `NoRuntime` when called outside a tokio runtime.
    pub fn arm_at(
        self,
        deadline: DateTime<Utc>,
        on_reset: ResetCallback,
    ) -> Result<MidnightHandle, ScheduleError> {
        let runtime = Handle::try_current().map_err(|err| {
            error!("event=reset_arm module=schedule status=error reason=no_runtime detail={err}");
            ScheduleError::NoRuntime
        })?;
        Ok(self.spawn_on(&runtime, deadline, on_reset))
    }

    /// Arms for the next local midnight on a caller-owned runtime.
    pub fn arm_on(self, runtime: &Handle, on_reset: ResetCallback) -> MidnightHandle {
        let deadline = self.next_deadline();
        self.spawn_on(runtime, deadline, on_reset)
    }

    fn spawn_on(
        self,
        runtime: &Handle,
        deadline: DateTime<Utc>,
        on_reset: ResetCallback,
    ) -> MidnightHandle {
        let shared = Arc::new(TimerShared {
            deadline: Mutex::new(deadline),
            fired: AtomicU64::new(0),
            active: AtomicBool::new(true),
            fire_gate: Mutex::new(()),
        });
        let cancel = CancellationToken::new();

        info!(
            "event=reset_arm module=schedule status=ok deadline={} policy={:?}",
            deadline.to_rfc3339(),
            self.policy
        );
        let task = runtime.spawn(self.run(deadline, on_reset, Arc::clone(&shared), cancel.clone()));

        MidnightHandle {
            cancel,
            shared,
            task,
        }
    }

    async fn run(
        self,
        mut deadline: DateTime<Utc>,
        on_reset: ResetCallback,
        shared: Arc<TimerShared>,
        cancel: CancellationToken,
    ) {
        loop {
            let now = self.clock.now();
            if now >= deadline {
                if !shared.fire(&cancel, deadline, &on_reset) {
                    break;
                }
                match self.policy {
                    ResetPolicy::Once => break,
                    ResetPolicy::Rearm => {
                        deadline = next_system_midnight(now);
                        shared.set_deadline(deadline);
                        info!(
                            "event=reset_rearm module=schedule status=ok deadline={}",
                            deadline.to_rfc3339()
                        );
                        continue;
                    }
                }
            }

            let remaining = (deadline - now)
                .to_std()
                .unwrap_or(Duration::ZERO)
                .min(self.slice);
            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                () = tokio::time::sleep(remaining) => {}
            }
        }
        shared.active.store(false, Ordering::SeqCst);
    }
}

#[derive(Debug)]
struct TimerShared {
    deadline: Mutex<DateTime<Utc>>,
    fired: AtomicU64,
    active: AtomicBool,
    fire_gate: Mutex<()>,
}

impl TimerShared {
    /// Runs the callback unless cancelled. Returns `false` when cancelled.
    fn fire(
        &self,
        cancel: &CancellationToken,
        deadline: DateTime<Utc>,
        on_reset: &ResetCallback,
    ) -> bool {
        let _gate = self.fire_gate.lock().unwrap_or_else(PoisonError::into_inner);
        if cancel.is_cancelled() {
            return false;
        }
        on_reset(deadline);
        let fired = self.fired.fetch_add(1, Ordering::SeqCst) + 1;
        info!(
            "event=reset_fire module=schedule status=ok deadline={} fired={fired}",
            deadline.to_rfc3339()
        );
        true
    }

    fn set_deadline(&self, deadline: DateTime<Utc>) {
        *self.deadline.lock().unwrap_or_else(PoisonError::into_inner) = deadline;
    }
}

/// Owner handle for an armed timer. Dropping it cancels the timer.
#[derive(Debug)]
pub struct MidnightHandle {
    cancel: CancellationToken,
    shared: Arc<TimerShared>,
    task: JoinHandle<()>,
}

impl MidnightHandle {
    /// Stops the timer. Idempotent, and a no-op once the loop has ended.
    pub fn cancel(&self) {
        let _gate = self
            .shared
            .fire_gate
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if !self.cancel.is_cancelled() {
            info!(
                "event=reset_cancel module=schedule status=ok fired={}",
                self.fired_count()
            );
        }
        self.cancel.cancel();
    }

    /// Deadline currently being waited on (the last one after firing once).
    pub fn deadline(&self) -> DateTime<Utc> {
        *self
            .shared
            .deadline
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn fired_count(&self) -> u64 {
        self.shared.fired.load(Ordering::SeqCst)
    }

    /// Whether the background loop is still waiting for a deadline.
    pub fn is_active(&self) -> bool {
        self.shared.active.load(Ordering::SeqCst) && !self.task.is_finished()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

impl Drop for MidnightHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}
