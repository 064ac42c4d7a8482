//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose the board's command sinks and snapshot to Dart via FRB.
//! - Own the process-wide board and the runtime that drives its midnight timer.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - The board exists only between `board_init` and `board_shutdown`; board
//!   calls outside that span answer `ok = false` and change nothing.
//! - Row timestamps are taken on the Rust side at call time.
//! - Unknown or malformed task ids are no-ops, never errors.

use daylist_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    Board, BoardConfig, GestureConfig, RowCommand, ScheduleError, SystemClock, TaskId,
};
use log::{info, warn};
use once_cell::sync::OnceCell;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;
use tokio::runtime::{Builder, Runtime};

const TIMER_THREAD_NAME: &str = "daylist-timer";
const COMMAND_NONE: &str = "none";
const NOT_INITIALIZED: &str = "Board not initialized; call board_init first.";

static BOARD: Mutex<Option<Arc<Board>>> = Mutex::new(None);
static TIMER_RUNTIME: OnceCell<Runtime> = OnceCell::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Generic action response envelope for board commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardActionResponse {
    /// Whether the call was accepted.
    pub ok: bool,
    /// Task the call created or acted on.
    pub task_id: Option<i64>,
    /// `toggle | delete | none`.
    pub command: String,
    /// Human-readable response message for diagnostics.
    pub message: String,
}

impl BoardActionResponse {
    fn success(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            task_id: None,
            command: COMMAND_NONE.to_string(),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            ..Self::success(message)
        }
    }

    fn with_task(mut self, id: TaskId) -> Self {
        self.task_id = Some(task_id_to_ffi(id));
        self
    }

    fn from_command(command: Option<RowCommand>, id: TaskId) -> Self {
        let response = match command {
            Some(command) => Self {
                command: command.label().to_string(),
                ..Self::success(format!("Row {}.", command.label()))
            },
            None => Self::success("No action."),
        };
        response.with_task(id)
    }
}

/// One rendered row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRowView {
    pub task_id: i64,
    pub text: String,
    /// Drives strike-through text and the completed background.
    pub completed: bool,
}

/// Everything the single screen renders in one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardSnapshotView {
    pub title: String,
    pub incomplete_count: u32,
    pub items: Vec<TaskRowView>,
    pub input_placeholder: String,
    pub commit_label: String,
    /// Next daily reset in epoch milliseconds, when armed.
    pub next_reset_epoch_ms: Option<i64>,
}

/// Gesture timing the UI toolkit should be configured with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GestureTiming {
    pub long_press_ms: u32,
    pub double_tap_ms: u32,
}

/// Creates the process-wide board and arms the daily reset.
///
/// `config_json` is an optional `BoardConfig` object; missing fields keep
/// their defaults.
///
/// # FFI contract
/// - Calling again without a config is a no-op that reports success.
/// - Calling again with a config fails with `ok = false`; the running board
///   keeps its config. Call `board_shutdown` first to apply a new one.
/// - A timer arming failure is reported in `message` with `ok = true`;
///   the board stays usable without the daily reset.
#[flutter_rust_bridge::frb(sync)]
pub fn board_init(config_json: Option<String>) -> BoardActionResponse {
    let config_text = config_json
        .as_deref()
        .map(str::trim)
        .filter(|text| !text.is_empty());
    let config = match config_text.map(BoardConfig::from_json).transpose() {
        Ok(config) => config,
        Err(err) => return BoardActionResponse::failure(format!("board_init failed: {err}")),
    };

    let mut slot = BOARD.lock().unwrap_or_else(PoisonError::into_inner);
    if slot.is_some() {
        if config.is_some() {
            warn!("event=board_init module=ffi status=rejected reason=already_initialized");
            return BoardActionResponse::failure(
                "Board already initialized; shut it down before applying a new config.",
            );
        }
        return BoardActionResponse::success("Board already initialized.");
    }

    let board = Arc::new(Board::new(config.unwrap_or_default()));
    *slot = Some(Arc::clone(&board));
    drop(slot);
    info!("event=board_init module=ffi status=ok");

    let runtime = match timer_runtime() {
        Ok(runtime) => runtime,
        Err(err) => {
            warn!("event=board_init module=ffi status=degraded reason=runtime_unavailable");
            return BoardActionResponse::success(format!(
                "Board ready; daily reset unavailable: {err}"
            ));
        }
    };

    match board.start_daily_reset_on(runtime.handle(), Arc::new(SystemClock)) {
        Ok(()) | Err(ScheduleError::AlreadyArmed) => BoardActionResponse::success("Board ready."),
        Err(err) => BoardActionResponse::success(format!(
            "Board ready; daily reset unavailable: {err}"
        )),
    }
}

/// Commits footer input as a new task.
///
/// Blank input is ignored silently: `ok = true`, no `task_id`.
#[flutter_rust_bridge::frb(sync)]
pub fn board_add_task(text: String) -> BoardActionResponse {
    let Some(board) = board() else {
        return BoardActionResponse::failure(NOT_INITIALIZED);
    };
    match board.add_task(text) {
        Some(id) => BoardActionResponse::success("Task added.").with_task(id),
        None => BoardActionResponse::success("Nothing to add."),
    }
}

/// Row short-press (tap) sink.
#[flutter_rust_bridge::frb(sync)]
pub fn board_row_press(task_id: i64) -> BoardActionResponse {
    with_row(task_id, |board, id| board.on_row_press(id, Instant::now()))
}

/// Row long-press sink.
#[flutter_rust_bridge::frb(sync)]
pub fn board_row_long_press(task_id: i64) -> BoardActionResponse {
    with_row(task_id, |board, id| {
        board.on_row_long_press(id, Instant::now())
    })
}

/// Row press-cancel sink.
#[flutter_rust_bridge::frb(sync)]
pub fn board_row_press_cancel(task_id: i64) -> BoardActionResponse {
    with_row(task_id, |board, id| {
        board.on_row_press_cancel(id, Instant::now());
        None
    })
}

/// Returns the list, count and labels as one consistent frame.
///
/// Before `board_init` (or after `board_shutdown`) this is an empty board
/// with default labels and no reset deadline.
#[flutter_rust_bridge::frb(sync)]
pub fn board_snapshot() -> BoardSnapshotView {
    match board() {
        Some(board) => snapshot_view(&board),
        None => snapshot_view(&Board::default()),
    }
}

/// Long-press delay and double-tap window for the UI toolkit.
///
/// Falls back to the default timing while no board exists.
#[flutter_rust_bridge::frb(sync)]
pub fn board_gesture_timing() -> GestureTiming {
    let gesture = board().map_or_else(GestureConfig::default, |board| board.config().gesture);
    GestureTiming {
        long_press_ms: u32::try_from(gesture.long_press_ms).unwrap_or(u32::MAX),
        double_tap_ms: u32::try_from(gesture.double_tap_window().as_millis()).unwrap_or(u32::MAX),
    }
}

/// Tears down the process-wide board: cancels the daily reset and drops the
/// list and press state. Idempotent.
#[flutter_rust_bridge::frb(sync)]
pub fn board_shutdown() -> BoardActionResponse {
    let taken = BOARD
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .take();
    match taken {
        Some(board) => {
            board.shutdown();
            info!("event=board_shutdown module=ffi status=ok");
            BoardActionResponse::success("Board stopped.")
        }
        None => BoardActionResponse::success("Board not running."),
    }
}

fn board() -> Option<Arc<Board>> {
    BOARD
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .as_ref()
        .map(Arc::clone)
}

fn snapshot_view(board: &Board) -> BoardSnapshotView {
    let snapshot = board.snapshot();
    let config = board.config();
    BoardSnapshotView {
        title: snapshot.title,
        incomplete_count: u32::try_from(snapshot.incomplete_count).unwrap_or(u32::MAX),
        items: snapshot
            .tasks
            .into_iter()
            .map(|task| TaskRowView {
                task_id: task_id_to_ffi(task.id),
                text: task.text,
                completed: task.completed,
            })
            .collect(),
        input_placeholder: config.input_placeholder.clone(),
        commit_label: config.commit_label.clone(),
        next_reset_epoch_ms: snapshot.next_reset_at.map(|at| at.timestamp_millis()),
    }
}

fn timer_runtime() -> Result<&'static Runtime, String> {
    TIMER_RUNTIME.get_or_try_init(|| {
        Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name(TIMER_THREAD_NAME)
            .enable_time()
            .build()
            .map_err(|err| format!("timer runtime start failed: {err}"))
    })
}

fn with_row(
    task_id: i64,
    f: impl FnOnce(&Board, TaskId) -> Option<RowCommand>,
) -> BoardActionResponse {
    let Some(board) = board() else {
        return BoardActionResponse::failure(NOT_INITIALIZED);
    };
    let Some(id) = task_id_from_ffi(task_id) else {
        return BoardActionResponse::success("Unknown task.");
    };
    let command = f(&board, id);
    BoardActionResponse::from_command(command, id)
}

fn task_id_from_ffi(raw: i64) -> Option<TaskId> {
    u64::try_from(raw)
        .ok()
        .filter(|value| *value > 0)
        .map(TaskId::new)
}

fn task_id_to_ffi(id: TaskId) -> i64 {
    i64::try_from(id.get()).unwrap_or(i64::MAX)
}
