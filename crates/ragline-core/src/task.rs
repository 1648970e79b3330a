//! Ingestion task domain model.
//!
//! This module contains the status and progress types for a single
//! server-side document ingestion job tracked by the progress tracker.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents the current status of an ingestion task.
///
/// Tasks progress from `Initializing` through `Running` to one of the
/// terminal states. `NotFound` becomes terminal only after the startup
/// tolerance is exhausted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// The task has been requested but the server has not reported progress yet.
    Initializing,
    /// The task is currently being executed server-side.
    Running,
    /// The task completed successfully.
    Completed,
    /// The task failed during execution, or polling gave up.
    Error,
    /// The task was cancelled by the user.
    Cancelled,
    /// The server does not know the task.
    NotFound,
}

impl TaskStatus {
    /// True for states after which no further transitions occur.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Completed | Self::Error | Self::Cancelled | Self::NotFound
        )
    }
}

/// A point-in-time projection of an ingestion task.
///
/// `message` is human-readable progress text, last-write-wins from poll
/// responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskProgress {
    /// The current status of the task.
    pub status: TaskStatus,
    /// Human-readable progress text.
    #[serde(default)]
    pub message: String,
}

impl TaskProgress {
    /// Creates a progress snapshot.
    pub fn new(status: TaskStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// The initial projection before the first poll response arrives.
    pub fn initializing() -> Self {
        Self::new(TaskStatus::Initializing, "Initializing...")
    }
}

/// Generates a client-side task identifier.
///
/// The id is created before the job exists server-side, so the task can be
/// displayed immediately and the subsequent status polls are idempotent.
pub fn new_task_id() -> String {
    Uuid::new_v4().to_string()
}
