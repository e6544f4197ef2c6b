//! Authoritative task storage for the sync server.
//!
//! [`TaskCollection`] owns every account's tasks, assigns identifiers and
//! server timestamps, and validates mutations. `updated_at` is guaranteed
//! to advance strictly on every mutation within an account, even when the
//! wall clock stalls.

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use thiserror::Error;
use tokio::sync::RwLock;

use checked_proto::task::{MAX_TASK_NAME_LENGTH, Task, TaskId, TaskPatch};

/// Errors that can occur when mutating the task collection.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TaskError {
    /// Task name cannot be empty at creation.
    #[error("task name cannot be empty")]
    NameEmpty,
    /// Task name exceeds the maximum length.
    #[error("task name too long (max 256 characters)")]
    NameTooLong,
    /// Task with the given id was not found for the owner.
    #[error("task not found: {0}")]
    NotFound(String),
}

/// Per-owner task map plus the monotonic timestamp floor.
#[derive(Debug, Default)]
struct OwnerTasks {
    tasks: HashMap<TaskId, Task>,
    last_ts: u64,
}

impl OwnerTasks {
    /// Returns a timestamp strictly greater than any previously issued
    /// for this owner.
    fn next_ts(&mut self) -> u64 {
        let now = u64::try_from(
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default()
                .as_millis(),
        )
        .unwrap_or(u64::MAX);
        self.last_ts = now.max(self.last_ts.saturating_add(1));
        self.last_ts
    }
}

/// Thread-safe map of account id to that account's tasks.
///
/// All mutations return the affected task so callers can log or inspect
/// the result; snapshot reads return owned clones sorted by creation time
/// for deterministic output.
#[derive(Debug, Default)]
pub struct TaskCollection {
    owners: RwLock<HashMap<String, OwnerTasks>>,
}

impl TaskCollection {
    /// Creates a new, empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new task for the owner with default fields.
    ///
    /// The server assigns the identifier and sets `created_at` and
    /// `updated_at` to the same value.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::NameEmpty`] if the name is empty, or
    /// [`TaskError::NameTooLong`] if it exceeds 256 characters.
    pub async fn create(&self, owner: &str, name: &str) -> Result<Task, TaskError> {
        if name.is_empty() {
            return Err(TaskError::NameEmpty);
        }
        validate_name_length(name)?;

        let mut owners = self.owners.write().await;
        let entry = owners.entry(owner.to_string()).or_default();
        let ts = entry.next_ts();
        let task = Task {
            id: TaskId::new(),
            name: name.to_string(),
            is_done: false,
            due_date: None,
            created_at: ts,
            updated_at: ts,
            owner: owner.to_string(),
        };
        entry.tasks.insert(task.id.clone(), task.clone());
        Ok(task)
    }

    /// Applies a partial update; only fields present in the patch change.
    ///
    /// Renaming to an empty string is allowed (only creation requires a
    /// non-empty name). `updated_at` advances even for a no-op patch.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::NotFound`] if the owner has no task with the
    /// patch's id, or [`TaskError::NameTooLong`] for oversized renames.
    pub async fn apply(&self, owner: &str, patch: &TaskPatch) -> Result<Task, TaskError> {
        if let Some(name) = &patch.name {
            validate_name_length(name)?;
        }

        let mut owners = self.owners.write().await;
        let entry = owners
            .get_mut(owner)
            .ok_or_else(|| TaskError::NotFound(patch.id.to_string()))?;
        let ts = entry.next_ts();
        let task = entry
            .tasks
            .get_mut(&patch.id)
            .ok_or_else(|| TaskError::NotFound(patch.id.to_string()))?;

        if let Some(name) = &patch.name {
            task.name.clone_from(name);
        }
        if let Some(is_done) = patch.is_done {
            task.is_done = is_done;
        }
        if let Some(due_date) = patch.due_date {
            task.due_date = due_date;
        }
        task.updated_at = ts;
        Ok(task.clone())
    }

    /// Deletes a task. Deletion is immediate and final.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::NotFound`] if the owner has no task with the
    /// given id.
    pub async fn delete(&self, owner: &str, id: &TaskId) -> Result<(), TaskError> {
        let mut owners = self.owners.write().await;
        let entry = owners
            .get_mut(owner)
            .ok_or_else(|| TaskError::NotFound(id.to_string()))?;
        entry
            .tasks
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| TaskError::NotFound(id.to_string()))
    }

    /// Returns all of the owner's tasks, sorted by creation time.
    ///
    /// Returns an empty vec for unknown owners.
    pub async fn snapshot(&self, owner: &str) -> Vec<Task> {
        let owners = self.owners.read().await;
        let Some(entry) = owners.get(owner) else {
            return Vec::new();
        };
        let mut tasks: Vec<Task> = entry.tasks.values().cloned().collect();
        tasks.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        tasks
    }
}

/// Rejects names longer than [`MAX_TASK_NAME_LENGTH`] characters.
fn validate_name_length(name: &str) -> Result<(), TaskError> {
    if name.chars().count() > MAX_TASK_NAME_LENGTH {
        return Err(TaskError::NameTooLong);
    }
    Ok(())
}
