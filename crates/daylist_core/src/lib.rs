//! Core logic for Daylist, a single-screen daily to-do list.
//! This crate owns the list invariants, row gesture semantics and the
//! midnight reset; rendering lives in the host UI.

pub mod config;
pub mod gesture;
pub mod logging;
pub mod model;
pub mod schedule;
pub mod session;
pub mod store;

pub use config::{BoardConfig, ConfigError};
pub use gesture::{
    GestureConfig, GestureDiscriminator, PressEvent, RowCommand, DOUBLE_TAP_MS, LONG_PRESS_MS,
};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::task::{Task, TaskId, TaskValidationError};
pub use schedule::{
    next_local_midnight, Clock, ManualClock, MidnightHandle, MidnightScheduler, ResetPolicy,
    ScheduleError, SystemClock,
};
pub use session::{Board, BoardSnapshot};
pub use store::task_store::{TaskListSnapshot, TaskStore};

/// Minimal health-check API for host integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
