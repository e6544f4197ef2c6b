//! Task data model for `Checked`.
//!
//! Defines the remote-owned [`Task`] entity and the partial-update
//! [`TaskPatch`] used for field-level mutations. Identifiers and both
//! timestamps are assigned by the store; clients never fabricate them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum allowed task name length in characters.
pub const MAX_TASK_NAME_LENGTH: usize = 256;

/// Unique identifier for a task, based on UUID v7 for time-ordering.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TaskId(Uuid);

impl TaskId {
    /// Creates a new time-ordered task identifier (UUID v7).
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Creates a `TaskId` from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner UUID value.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A to-do item owned by the remote store.
///
/// `id` is immutable and unique. `created_at` is set once; `updated_at`
/// advances monotonically on every mutation. Both are epoch milliseconds
/// assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Unique task identifier (UUID v7, time-ordered).
    pub id: TaskId,
    /// Task name. Defaults to empty.
    pub name: String,
    /// Whether the task has been completed.
    pub is_done: bool,
    /// Optional due date.
    pub due_date: Option<NaiveDate>,
    /// When this task was created (milliseconds since epoch).
    pub created_at: u64,
    /// When this task was last mutated (milliseconds since epoch).
    pub updated_at: u64,
    /// Account id of the owning user.
    pub owner: String,
}

/// A partial update to a task, keyed by identifier.
///
/// Only fields that are `Some` change. The nested option on `due_date`
/// distinguishes "leave unchanged" (`None`) from "clear the due date"
/// (`Some(None)`) — the explicit null, never an empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskPatch {
    /// Which task to update.
    pub id: TaskId,
    /// New name, if renaming.
    pub name: Option<String>,
    /// New completion flag, if toggling.
    pub is_done: Option<bool>,
    /// New due date (`Some(None)` clears it), if changing.
    pub due_date: Option<Option<NaiveDate>>,
}

impl TaskPatch {
    /// Creates an empty patch for the given task.
    #[must_use]
    pub const fn new(id: TaskId) -> Self {
        Self {
            id,
            name: None,
            is_done: None,
            due_date: None,
        }
    }

    /// Patch that renames the task.
    #[must_use]
    pub fn rename(id: TaskId, name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::new(id)
        }
    }

    /// Patch that sets the completion flag.
    #[must_use]
    pub const fn set_done(id: TaskId, is_done: bool) -> Self {
        Self {
            id,
            name: None,
            is_done: Some(is_done),
            due_date: None,
        }
    }

    /// Patch that sets or clears the due date.
    #[must_use]
    pub const fn set_due_date(id: TaskId, due_date: Option<NaiveDate>) -> Self {
        Self {
            id,
            name: None,
            is_done: None,
            due_date: Some(due_date),
        }
    }

    /// Returns `true` if the patch changes no fields.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none() && self.is_done.is_none() && self.due_date.is_none()
    }
}
