//! Domain model for the daily list.
//!
//! # Responsibility
//! - Define the task record and its identifier.
//!
//! # Invariants
//! - Every task is identified by a session-unique `TaskId`.
//! - Deletion is a hard removal; there are no tombstones.

pub mod task;
