//! Board state machine: edit sessions, the add row, and the mutations
//! they produce.
//!
//! [`TaskBoard`] is a pure state machine. It never talks to the store;
//! instead its commit methods return a [`StoreOp`] that the caller
//! submits. Remote state arrives through [`TaskBoard::apply_snapshot`],
//! which is the only way tasks enter the board.

use std::collections::HashMap;

use chrono::NaiveDate;

use checked_proto::task::{Task, TaskId, TaskPatch};

use super::input::TextInput;
use super::partition::partition_tasks;

/// Whether the first snapshot has arrived yet.
///
/// The board starts in `Loading` and moves to `Loaded` on the first
/// snapshot. It never moves back, even when a later snapshot is empty:
/// an empty loaded list means "nothing to do", not "still loading".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum LoadPhase {
    /// No snapshot received yet.
    #[default]
    Loading,
    /// At least one snapshot has been applied.
    Loaded,
}

/// A store mutation produced by a board commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOp {
    /// Create a task with the given name.
    Create {
        /// Name for the new task.
        name: String,
    },
    /// Apply a partial update.
    Update(TaskPatch),
    /// Delete a task.
    Delete(TaskId),
}

/// UI state for the task board.
///
/// Each row is either displaying or has an active inline edit session,
/// tracked per task id so concurrent edits on different rows never
/// interfere. Completed rows cannot enter an edit session.
#[derive(Debug, Default)]
pub struct TaskBoard {
    phase: LoadPhase,
    tasks: Vec<Task>,
    name_edits: HashMap<TaskId, TextInput>,
    date_edits: HashMap<TaskId, TextInput>,
    adding_new: bool,
    new_task: TextInput,
    pending_folded: bool,
    done_folded: bool,
}

impl TaskBoard {
    /// Creates a board in the loading phase with no tasks.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` until the first snapshot arrives.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self.phase, LoadPhase::Loading)
    }

    /// Replaces the board's task list with a full snapshot.
    ///
    /// Moves the board to `Loaded` and prunes edit sessions whose task
    /// disappeared or was completed remotely.
    pub fn apply_snapshot(&mut self, tasks: Vec<Task>) {
        self.phase = LoadPhase::Loaded;
        self.tasks = tasks;
        let editable: std::collections::HashSet<&TaskId> = self
            .tasks
            .iter()
            .filter(|t| !t.is_done)
            .map(|t| &t.id)
            .collect();
        self.name_edits.retain(|id, _| editable.contains(id));
        self.date_edits.retain(|id, _| editable.contains(id));
    }

    /// All tasks in snapshot order.
    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Splits the board into (pending, done) rows in display order.
    #[must_use]
    pub fn partition(&self) -> (Vec<&Task>, Vec<&Task>) {
        partition_tasks(&self.tasks)
    }

    fn find(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| &t.id == id)
    }

    // --- name editing ---

    /// Opens an inline name edit for the given row, pre-filled with the
    /// current name. No-op for done or unknown tasks.
    pub fn begin_name_edit(&mut self, id: &TaskId) {
        let Some(task) = self.find(id) else { return };
        if task.is_done {
            return;
        }
        let input = TextInput::with_value(task.name.clone());
        self.name_edits.insert(id.clone(), input);
    }

    /// Active name edit buffer for a row, if any.
    #[must_use]
    pub fn name_edit(&self, id: &TaskId) -> Option<&TextInput> {
        self.name_edits.get(id)
    }

    /// Mutable access to a row's name edit buffer for key input.
    pub fn name_edit_mut(&mut self, id: &TaskId) -> Option<&mut TextInput> {
        self.name_edits.get_mut(id)
    }

    /// Discards a name edit without producing a mutation.
    pub fn cancel_name_edit(&mut self, id: &TaskId) {
        self.name_edits.remove(id);
    }

    /// Closes a name edit and returns the rename to submit.
    ///
    /// The edit session ends unconditionally, and the rename is issued
    /// even when the buffer equals the current name (the store bumps
    /// `updated_at` either way).
    pub fn commit_name_edit(&mut self, id: &TaskId) -> Option<StoreOp> {
        let input = self.name_edits.remove(id)?;
        Some(StoreOp::Update(TaskPatch::rename(
            id.clone(),
            input.into_value(),
        )))
    }

    // --- due date editing ---

    /// Opens an inline due-date edit for the given row, pre-filled with
    /// the current date in `YYYY-MM-DD` form. No-op for done or unknown
    /// tasks.
    pub fn begin_date_edit(&mut self, id: &TaskId) {
        let Some(task) = self.find(id) else { return };
        if task.is_done {
            return;
        }
        let current = task
            .due_date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        self.date_edits.insert(id.clone(), TextInput::with_value(current));
    }

    /// Active due-date edit buffer for a row, if any.
    #[must_use]
    pub fn date_edit(&self, id: &TaskId) -> Option<&TextInput> {
        self.date_edits.get(id)
    }

    /// Mutable access to a row's due-date edit buffer for key input.
    pub fn date_edit_mut(&mut self, id: &TaskId) -> Option<&mut TextInput> {
        self.date_edits.get_mut(id)
    }

    /// Discards a due-date edit without producing a mutation.
    pub fn cancel_date_edit(&mut self, id: &TaskId) {
        self.date_edits.remove(id);
    }

    /// Closes a due-date edit and returns the update to submit.
    ///
    /// An empty buffer clears the date (the patch carries an explicit
    /// null, never an empty string). A buffer that does not parse as
    /// `YYYY-MM-DD` produces no mutation.
    pub fn commit_date_edit(&mut self, id: &TaskId) -> Option<StoreOp> {
        let input = self.date_edits.remove(id)?;
        let text = input.into_value();
        let due = if text.is_empty() {
            None
        } else {
            match NaiveDate::parse_from_str(&text, "%Y-%m-%d") {
                Ok(date) => Some(date),
                Err(_) => return None,
            }
        };
        Some(StoreOp::Update(TaskPatch::set_due_date(id.clone(), due)))
    }

    // --- add row ---

    /// Whether the add-task row is active.
    #[must_use]
    pub const fn is_adding(&self) -> bool {
        self.adding_new
    }

    /// Opens the add-task row with an empty buffer.
    pub fn begin_add(&mut self) {
        self.adding_new = true;
        self.new_task = TextInput::new();
    }

    /// The add-task row's buffer.
    #[must_use]
    pub const fn new_task_input(&self) -> &TextInput {
        &self.new_task
    }

    /// Mutable access to the add-task buffer for key input.
    pub const fn new_task_input_mut(&mut self) -> &mut TextInput {
        &mut self.new_task
    }

    /// Closes the add-task row without creating anything.
    pub fn cancel_add(&mut self) {
        self.adding_new = false;
        self.new_task = TextInput::new();
    }

    /// Closes the add-task row and returns the create to submit.
    ///
    /// The row closes and the buffer resets whether or not a mutation
    /// is produced; an empty name produces none.
    pub fn save_new_task(&mut self) -> Option<StoreOp> {
        self.adding_new = false;
        let input = std::mem::take(&mut self.new_task);
        let name = input.into_value();
        if name.is_empty() {
            return None;
        }
        Some(StoreOp::Create { name })
    }

    // --- direct row actions ---

    /// Returns the toggle for a row's completion flag.
    ///
    /// The patch carries only `is_done`, so a toggle can never clobber a
    /// concurrent rename or date change on the same task.
    #[must_use]
    pub fn toggle_done(&self, id: &TaskId) -> Option<StoreOp> {
        let task = self.find(id)?;
        Some(StoreOp::Update(TaskPatch::set_done(
            id.clone(),
            !task.is_done,
        )))
    }

    /// Returns the delete for a row. Done tasks cannot be deleted.
    #[must_use]
    pub fn delete(&self, id: &TaskId) -> Option<StoreOp> {
        let task = self.find(id)?;
        if task.is_done {
            return None;
        }
        Some(StoreOp::Delete(id.clone()))
    }

    // --- section folding ---

    /// Whether the pending section is folded shut.
    #[must_use]
    pub const fn pending_folded(&self) -> bool {
        self.pending_folded
    }

    /// Whether the done section is folded shut.
    #[must_use]
    pub const fn done_folded(&self) -> bool {
        self.done_folded
    }

    /// Toggles the pending section fold.
    pub const fn toggle_pending_fold(&mut self) {
        self.pending_folded = !self.pending_folded;
    }

    /// Toggles the done section fold.
    pub const fn toggle_done_fold(&mut self) {
        self.done_folded = !self.done_folded;
    }
}
