//! In-process task store for offline mode and tests.
//!
//! [`LocalStore`] implements the same contract as the remote store —
//! server-assigned ids and timestamps, full-snapshot deliveries, the same
//! validation rules — without a network in between. Used when no store
//! URL is configured, and by tests that need deterministic behavior.

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;
use tokio::sync::mpsc;

use checked_proto::task::{MAX_TASK_NAME_LENGTH, Task, TaskId, TaskPatch};

use super::{StoreError, Subscription, TaskStore};

struct LocalState {
    tasks: HashMap<TaskId, Task>,
    last_ts: u64,
    subscribers: Vec<mpsc::UnboundedSender<Vec<Task>>>,
}

impl LocalState {
    /// Returns a timestamp strictly greater than any previously issued.
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

    fn snapshot(&self) -> Vec<Task> {
        let mut tasks: Vec<Task> = self.tasks.values().cloned().collect();
        tasks.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        tasks
    }

    fn broadcast(&mut self) {
        let snapshot = self.snapshot();
        self.subscribers.retain(|tx| tx.send(snapshot.clone()).is_ok());
    }
}

/// Task store backed by process memory.
pub struct LocalStore {
    owner: String,
    state: Mutex<LocalState>,
}

impl LocalStore {
    /// Creates an empty store for the given account.
    #[must_use]
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            state: Mutex::new(LocalState {
                tasks: HashMap::new(),
                last_ts: 0,
                subscribers: Vec::new(),
            }),
        }
    }

    /// Inserts a task directly, bypassing validation. Intended for
    /// seeding offline sessions and test fixtures.
    pub fn seed_task(&self, name: &str, is_done: bool, due_date: Option<chrono::NaiveDate>) {
        let mut state = self.state.lock();
        let ts = state.next_ts();
        let task = Task {
            id: TaskId::new(),
            name: name.to_string(),
            is_done,
            due_date,
            created_at: ts,
            updated_at: ts,
            owner: self.owner.clone(),
        };
        state.tasks.insert(task.id.clone(), task);
        state.broadcast();
    }
}

fn validate_name_length(name: &str) -> Result<(), StoreError> {
    if name.chars().count() > MAX_TASK_NAME_LENGTH {
        return Err(StoreError::Rejected(
            "task name too long (max 256 characters)".to_string(),
        ));
    }
    Ok(())
}

impl TaskStore for LocalStore {
    fn subscribe(&self) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut state = self.state.lock();
        // Deliver the current state immediately so subscribers always
        // get an initial full snapshot.
        let _ = tx.send(state.snapshot());
        state.subscribers.push(tx);
        Subscription::new(rx)
    }

    async fn create_task(&self, name: &str) -> Result<(), StoreError> {
        if name.is_empty() {
            return Err(StoreError::Rejected("task name cannot be empty".to_string()));
        }
        validate_name_length(name)?;

        let mut state = self.state.lock();
        let ts = state.next_ts();
        let task = Task {
            id: TaskId::new(),
            name: name.to_string(),
            is_done: false,
            due_date: None,
            created_at: ts,
            updated_at: ts,
            owner: self.owner.clone(),
        };
        state.tasks.insert(task.id.clone(), task);
        state.broadcast();
        Ok(())
    }

    async fn update_task(&self, patch: TaskPatch) -> Result<(), StoreError> {
        if let Some(name) = &patch.name {
            validate_name_length(name)?;
        }

        let mut state = self.state.lock();
        if !state.tasks.contains_key(&patch.id) {
            return Err(StoreError::Rejected(format!("task not found: {}", patch.id)));
        }
        let ts = state.next_ts();
        if let Some(task) = state.tasks.get_mut(&patch.id) {
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
        }
        state.broadcast();
        Ok(())
    }

    async fn delete_task(&self, id: &TaskId) -> Result<(), StoreError> {
        let mut state = self.state.lock();
        if state.tasks.remove(id).is_none() {
            return Err(StoreError::Rejected(format!("task not found: {id}")));
        }
        state.broadcast();
        Ok(())
    }
}
