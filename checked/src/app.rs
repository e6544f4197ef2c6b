//! Application state and event handling.
//!
//! [`App`] glues key events to the board state machine. Mutations the
//! board produces are queued and drained by the event loop, which
//! submits them to the store in the background; the app itself never
//! performs I/O.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use checked_proto::task::TaskId;

use crate::board::{StoreOp, TaskBoard};

/// A selectable row on the board, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowTarget {
    /// A pending task, by index into the pending section.
    Pending(usize),
    /// The add-task row at the bottom of the pending section.
    AddRow,
    /// A done task, by index into the done section.
    Done(usize),
}

/// Which text buffer, if any, currently receives typed characters.
#[derive(Debug, Clone, PartialEq, Eq)]
enum InputFocus {
    None,
    Name(TaskId),
    Due(TaskId),
    AddRow,
}

/// Connection indicator for the status bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connection {
    /// Connected to a sync server.
    Online,
    /// Running against the in-process store.
    Offline,
}

impl Connection {
    /// Status bar label for this state.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Online => "online",
            Self::Offline => "offline",
        }
    }
}

/// Main application state.
pub struct App {
    /// Board state machine.
    pub board: TaskBoard,
    /// Display name of the signed-in user.
    pub user: String,
    /// Connection indicator.
    pub connection: Connection,
    /// Index of the selected row in [`App::rows`].
    pub selected: usize,
    /// Whether the sign-out confirmation dialog is open.
    pub sign_out_dialog: bool,
    /// Whether the app should quit.
    pub should_quit: bool,
    focus: InputFocus,
    ops: Vec<StoreOp>,
}

impl App {
    /// Create a new application for the given user.
    #[must_use]
    pub fn new(user: impl Into<String>, connection: Connection) -> Self {
        Self {
            board: TaskBoard::new(),
            user: user.into(),
            connection,
            selected: 0,
            sign_out_dialog: false,
            should_quit: false,
            focus: InputFocus::None,
            ops: Vec::new(),
        }
    }

    /// Selectable rows in display order.
    ///
    /// The add-task row is always present below the pending section.
    /// Folded sections contribute no task rows.
    #[must_use]
    pub fn rows(&self) -> Vec<RowTarget> {
        let (pending, done) = self.board.partition();
        let mut rows = Vec::new();
        if !self.board.pending_folded() {
            rows.extend((0..pending.len()).map(RowTarget::Pending));
        }
        rows.push(RowTarget::AddRow);
        if !self.board.done_folded() {
            rows.extend((0..done.len()).map(RowTarget::Done));
        }
        rows
    }

    /// The currently selected row.
    #[must_use]
    pub fn selected_row(&self) -> RowTarget {
        let rows = self.rows();
        rows.get(self.selected.min(rows.len().saturating_sub(1)))
            .copied()
            .unwrap_or(RowTarget::AddRow)
    }

    fn row_task_id(&self, row: RowTarget) -> Option<TaskId> {
        let (pending, done) = self.board.partition();
        match row {
            RowTarget::Pending(i) => pending.get(i).map(|t| t.id.clone()),
            RowTarget::Done(i) => done.get(i).map(|t| t.id.clone()),
            RowTarget::AddRow => None,
        }
    }

    /// Drains the mutations queued since the last call.
    pub fn take_ops(&mut self) -> Vec<StoreOp> {
        std::mem::take(&mut self.ops)
    }

    fn queue(&mut self, op: Option<StoreOp>) {
        if let Some(op) = op {
            self.ops.push(op);
        }
    }

    /// Handle a key event.
    pub fn handle_key_event(&mut self, key: KeyEvent) {
        // Ctrl-C always quits, dialog or not.
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        if self.sign_out_dialog {
            self.handle_dialog_key(key);
            return;
        }

        if self.focus == InputFocus::None {
            self.handle_navigation_key(key);
        } else {
            self.handle_input_key(key);
        }
    }

    /// Handle key event while the sign-out dialog is open.
    fn handle_dialog_key(&mut self, key: KeyEvent) {
        match key.code {
            // Signing out ends the session.
            KeyCode::Enter | KeyCode::Char('y') => self.should_quit = true,
            KeyCode::Esc | KeyCode::Char('n') => self.sign_out_dialog = false,
            _ => {}
        }
    }

    /// Handle key event while no text buffer is focused.
    fn handle_navigation_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.sign_out_dialog = true,
            KeyCode::Up | KeyCode::Char('k') => self.select_prev(),
            KeyCode::Down | KeyCode::Char('j') => self.select_next(),
            KeyCode::Char('a') => self.open_add_row(),
            KeyCode::Char('e') | KeyCode::Enter => self.open_row_edit(),
            KeyCode::Char('d') => self.open_date_edit(),
            KeyCode::Char(' ') => self.toggle_selected(),
            KeyCode::Char('x') | KeyCode::Delete => self.delete_selected(),
            KeyCode::Char('f') => self.fold_selected_section(),
            _ => {}
        }
    }

    /// Handle key event while a text buffer is focused.
    fn handle_input_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => self.commit_focused(),
            KeyCode::Esc => self.cancel_focused(),
            // Moving off the row commits the edit, like losing focus.
            KeyCode::Up => {
                self.commit_focused();
                self.select_prev();
            }
            KeyCode::Down => {
                self.commit_focused();
                self.select_next();
            }
            code => {
                let focus = self.focus.clone();
                let Some(input) = (match &focus {
                    InputFocus::Name(id) => self.board.name_edit_mut(id),
                    InputFocus::Due(id) => self.board.date_edit_mut(id),
                    InputFocus::AddRow => Some(self.board.new_task_input_mut()),
                    InputFocus::None => None,
                }) else {
                    return;
                };
                match code {
                    KeyCode::Char(c) => input.insert_char(c),
                    KeyCode::Backspace => input.delete_backward(),
                    KeyCode::Delete => input.delete_forward(),
                    KeyCode::Left => input.move_left(),
                    KeyCode::Right => input.move_right(),
                    KeyCode::Home => input.move_home(),
                    KeyCode::End => input.move_end(),
                    _ => {}
                }
            }
        }
    }

    fn select_prev(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
        }
    }

    fn select_next(&mut self) {
        if self.selected < self.rows().len().saturating_sub(1) {
            self.selected += 1;
        }
    }

    fn open_add_row(&mut self) {
        self.board.begin_add();
        self.focus = InputFocus::AddRow;
        // Put the selection on the add row so the cursor renders there.
        if let Some(pos) = self.rows().iter().position(|r| *r == RowTarget::AddRow) {
            self.selected = pos;
        }
    }

    fn open_row_edit(&mut self) {
        match self.selected_row() {
            RowTarget::AddRow => self.open_add_row(),
            row => {
                let Some(id) = self.row_task_id(row) else {
                    return;
                };
                self.board.begin_name_edit(&id);
                // Done rows refuse the edit session; only focus if one
                // actually opened.
                if self.board.name_edit(&id).is_some() {
                    self.focus = InputFocus::Name(id);
                }
            }
        }
    }

    fn open_date_edit(&mut self) {
        let Some(id) = self.row_task_id(self.selected_row()) else {
            return;
        };
        self.board.begin_date_edit(&id);
        if self.board.date_edit(&id).is_some() {
            self.focus = InputFocus::Due(id);
        }
    }

    fn toggle_selected(&mut self) {
        if let Some(id) = self.row_task_id(self.selected_row()) {
            let op = self.board.toggle_done(&id);
            self.queue(op);
        }
    }

    fn delete_selected(&mut self) {
        if let Some(id) = self.row_task_id(self.selected_row()) {
            let op = self.board.delete(&id);
            self.queue(op);
        }
    }

    fn fold_selected_section(&mut self) {
        match self.selected_row() {
            RowTarget::Pending(_) | RowTarget::AddRow => self.board.toggle_pending_fold(),
            RowTarget::Done(_) => self.board.toggle_done_fold(),
        }
        self.selected = self.selected.min(self.rows().len().saturating_sub(1));
    }

    fn commit_focused(&mut self) {
        let focus = std::mem::replace(&mut self.focus, InputFocus::None);
        let op = match focus {
            InputFocus::Name(id) => self.board.commit_name_edit(&id),
            InputFocus::Due(id) => self.board.commit_date_edit(&id),
            InputFocus::AddRow => self.board.save_new_task(),
            InputFocus::None => None,
        };
        self.queue(op);
    }

    fn cancel_focused(&mut self) {
        let focus = std::mem::replace(&mut self.focus, InputFocus::None);
        match focus {
            InputFocus::Name(id) => self.board.cancel_name_edit(&id),
            InputFocus::Due(id) => self.board.cancel_date_edit(&id),
            InputFocus::AddRow => self.board.cancel_add(),
            InputFocus::None => {}
        }
    }

    /// Whether any text buffer currently has focus.
    #[must_use]
    pub fn is_editing(&self) -> bool {
        self.focus != InputFocus::None
    }
}
