//! In-memory task store.
//!
//! # Responsibility
//! - Own the ordered task list and the id allocator for one session.
//! - Apply add/toggle/delete/reset as total operations.
//!
//! # Invariants
//! - Ids come from a monotonic counter seeded at 1; only `reset` rewinds it.
//! - Tasks stay in insertion order; toggling never reorders.
//! - `incomplete_count` always matches the `completed == false` rows.

use crate::model::task::{is_blank, Task, TaskId};
use log::{debug, info};
use serde::Serialize;

/// Point-in-time copy of the list and its derived count.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct TaskListSnapshot {
    pub tasks: Vec<Task>,
    pub incomplete_count: usize,
}

/// Ordered task collection with a session id allocator.
#[derive(Debug, Clone)]
pub struct TaskStore {
    tasks: Vec<Task>,
    next_id: TaskId,
    incomplete: usize,
}

impl Default for TaskStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskStore {
    pub fn new() -> Self {
        Self {
            tasks: Vec::new(),
            next_id: TaskId::FIRST,
            incomplete: 0,
        }
    }

    /// Appends a new incomplete task.
    ///
    /// Returns `None` without touching state when `text` is blank.
    pub fn add(&mut self, text: impl Into<String>) -> Option<TaskId> {
        let text = text.into();
        if is_blank(&text) {
            debug!("event=task_add module=store status=skipped reason=blank_text");
            return None;
        }

        let id = self.next_id;
        self.next_id = id.next();
        self.tasks.push(Task {
            id,
            text,
            completed: false,
        });
        self.incomplete += 1;

        info!(
            "event=task_add module=store status=ok id={} len={} incomplete={}",
            id,
            self.tasks.len(),
            self.incomplete
        );
        Some(id)
    }

    /// Flips completion on the task with `id`.
    ///
    /// Returns `false` when no such task exists.
    pub fn toggle(&mut self, id: TaskId) -> bool {
        let Some(task) = self.tasks.iter_mut().find(|task| task.id == id) else {
            debug!("event=task_toggle module=store status=skipped reason=unknown_id id={id}");
            return false;
        };

        task.toggle();
        if task.completed {
            self.incomplete -= 1;
        } else {
            self.incomplete += 1;
        }

        info!(
            "event=task_toggle module=store status=ok id={} completed={} incomplete={}",
            id, task.completed, self.incomplete
        );
        true
    }

    /// Removes the task with `id`, keeping survivors in order.
    ///
    /// Returns `false` when no such task exists.
    pub fn delete(&mut self, id: TaskId) -> bool {
        let Some(index) = self.tasks.iter().position(|task| task.id == id) else {
            debug!("event=task_delete module=store status=skipped reason=unknown_id id={id}");
            return false;
        };

        let removed = self.tasks.remove(index);
        if removed.is_incomplete() {
            self.incomplete -= 1;
        }

        info!(
            "event=task_delete module=store status=ok id={} len={} incomplete={}",
            id,
            self.tasks.len(),
            self.incomplete
        );
        true
    }

    /// Empties the list and rewinds the id counter to 1.
    pub fn reset(&mut self) {
        let cleared = self.tasks.len();
        self.tasks.clear();
        self.incomplete = 0;
        self.next_id = TaskId::FIRST;
        info!("event=task_reset module=store status=ok cleared={cleared}");
    }

    pub fn incomplete_count(&self) -> usize {
        self.incomplete
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Id the next successful `add` will return.
    pub fn peek_next_id(&self) -> TaskId {
        self.next_id
    }

    pub fn snapshot(&self) -> TaskListSnapshot {
        TaskListSnapshot {
            tasks: self.tasks.clone(),
            incomplete_count: self.incomplete,
        }
    }
}
