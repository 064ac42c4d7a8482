//! Session task storage.
//!
//! # Responsibility
//! - Hold the daily list in memory for the lifetime of a session.
//!
//! # Invariants
//! - All operations are synchronous and total; invalid input is a no-op.
//! - Nothing is persisted; a new process starts with an empty list.

pub mod task_store;
