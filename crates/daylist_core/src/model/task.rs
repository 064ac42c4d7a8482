//! Task domain model.
//!
//! # Responsibility
//! - Define the single record rendered as one row of the daily list.
//! - Validate the record shape at construction and deserialization time.
//!
//! # Invariants
//! - `id` is never zero; ids are allocated by the store starting at 1.
//! - `text` is never empty or whitespace-only.
//! - `completed` starts as `false`.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Session-scoped task identifier.
///
/// Unique among live tasks until the next daily reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(u64);

impl TaskId {
    /// First id handed out after start and after every reset.
    pub const FIRST: TaskId = TaskId(1);

    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> u64 {
        self.0
    }

    pub(crate) fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl Display for TaskId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for TaskId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// One to-do item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TaskRecord")]
pub struct Task {
    pub id: TaskId,
    /// User text, kept exactly as typed.
    pub text: String,
    pub completed: bool,
}

impl Task {
    /// Creates an incomplete task after validating id and text.
    pub fn new(id: TaskId, text: impl Into<String>) -> Result<Self, TaskValidationError> {
        let task = Self {
            id,
            text: text.into(),
            completed: false,
        };
        task.validate()?;
        Ok(task)
    }

    /// Checks the record invariants.
    ///
    /// # Errors
    /// - `ZeroId` when `id` is 0.
    /// - `EmptyText` when `text` is empty after trimming.
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        if self.id.get() == 0 {
            return Err(TaskValidationError::ZeroId);
        }
        if is_blank(&self.text) {
            return Err(TaskValidationError::EmptyText);
        }
        Ok(())
    }

    /// Flips the completion flag.
    pub fn toggle(&mut self) {
        self.completed = !self.completed;
    }

    pub fn is_incomplete(&self) -> bool {
        !self.completed
    }
}

/// Returns whether user input counts as empty.
///
/// Whitespace-only input is treated as empty.
pub fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

/// Validation errors for task records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskValidationError {
    EmptyText,
    ZeroId,
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyText => write!(f, "task text must not be empty"),
            Self::ZeroId => write!(f, "task id must be >= 1"),
        }
    }
}

impl Error for TaskValidationError {}

#[derive(Deserialize)]
struct TaskRecord {
    id: TaskId,
    text: String,
    #[serde(default)]
    completed: bool,
}

impl TryFrom<TaskRecord> for Task {
    type Error = TaskValidationError;

    fn try_from(value: TaskRecord) -> Result<Self, Self::Error> {
        let task = Task {
            id: value.id,
            text: value.text,
            completed: value.completed,
        };
        task.validate()?;
        Ok(task)
    }
}
