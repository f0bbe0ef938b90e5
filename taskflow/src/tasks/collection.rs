//! The task list, selection, and draft behind the tasks screen.

use chrono::NaiveDate;
use taskflow_proto::task::{NewTask, Task, TaskId, TaskPatch, TaskStatus};

use super::draft::{DraftField, TaskDraft};
use super::filter::{StatusFilter, Summary, project, summarize};
use super::{DEFAULT_MAX_TITLE_LEN, TaskError};

/// What the detail pane is doing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    /// Showing the selected task, or the empty state when none is selected.
    #[default]
    View,
    /// Filling in a new task.
    Create,
    /// Editing the selected task.
    Edit,
}

/// Remote work requested by the view-model.
///
/// Every mutation is followed by a full refetch on the network side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskCommand {
    /// Fetch the full list.
    Refresh,
    /// Create a task.
    Create(NewTask),
    /// Replace the editable fields of a task.
    Update {
        /// Task to update.
        id: TaskId,
        /// Full set of editable fields.
        patch: TaskPatch,
    },
    /// Flip a task between done and not done.
    Toggle {
        /// Task to toggle.
        id: TaskId,
        /// Status to store.
        status: TaskStatus,
    },
    /// Delete a task.
    Delete {
        /// Task to delete.
        id: TaskId,
    },
}

/// State of the tasks screen.
#[derive(Debug, Clone)]
pub struct TaskCollection {
    tasks: Vec<Task>,
    selected: Option<TaskId>,
    mode: Mode,
    draft: TaskDraft,
    field: DraftField,
    draft_error: Option<TaskError>,
    /// A create/update has been sent and not yet answered.
    saving: bool,
    filter: StatusFilter,
    query: String,
    cursor: usize,
    max_title_len: usize,
}

impl Default for TaskCollection {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_TITLE_LEN)
    }
}

impl TaskCollection {
    /// Creates an empty collection.
    #[must_use]
    pub fn new(max_title_len: usize) -> Self {
        Self {
            tasks: Vec::new(),
            selected: None,
            mode: Mode::View,
            draft: TaskDraft::blank(NaiveDate::MIN),
            field: DraftField::Title,
            draft_error: None,
            saving: false,
            filter: StatusFilter::All,
            query: String::new(),
            cursor: 0,
            max_title_len,
        }
    }

    /// The authoritative list, in server order.
    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Swaps in a freshly fetched list.
    ///
    /// The selection is kept by id; if the task is gone the detail pane
    /// falls back to its empty state.
    pub fn replace_all(&mut self, tasks: Vec<Task>) {
        tracing::debug!(count = tasks.len(), "task list replaced");
        self.tasks = tasks;
        self.clamp_cursor();
    }

    /// The projected list shown in the list pane.
    #[must_use]
    pub fn visible(&self) -> Vec<&Task> {
        project(&self.tasks, self.filter, &self.query)
    }

    /// Footer counts over the projected list.
    #[must_use]
    pub fn summary(&self) -> Summary {
        summarize(&self.visible())
    }

    /// Current detail mode.
    #[must_use]
    pub const fn mode(&self) -> Mode {
        self.mode
    }

    /// Id of the selected task, if any.
    #[must_use]
    pub const fn selected_id(&self) -> Option<&TaskId> {
        self.selected.as_ref()
    }

    /// The selected task as it appears in the current list.
    #[must_use]
    pub fn selected_task(&self) -> Option<&Task> {
        let id = self.selected.as_ref()?;
        self.tasks.iter().find(|t| &t.id == id)
    }

    /// The working copy for create/edit.
    #[must_use]
    pub const fn draft(&self) -> &TaskDraft {
        &self.draft
    }

    /// Focused form input.
    #[must_use]
    pub const fn field(&self) -> DraftField {
        self.field
    }

    /// Why the last save was refused locally.
    #[must_use]
    pub const fn draft_error(&self) -> Option<&TaskError> {
        self.draft_error.as_ref()
    }

    /// Active status filter.
    #[must_use]
    pub const fn filter(&self) -> StatusFilter {
        self.filter
    }

    /// Current search text.
    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Row of the projected list under the cursor.
    #[must_use]
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    /// Selects a task and shows it in the detail pane.
    ///
    /// Leaves create/edit mode. Returns `false` if `id` is not in the list.
    pub fn select(&mut self, id: &TaskId) -> bool {
        let Some(task) = self.tasks.iter().find(|t| &t.id == id) else {
            return false;
        };
        self.draft = TaskDraft::from_task(task);
        self.selected = Some(id.clone());
        self.mode = Mode::View;
        self.draft_error = None;
        self.saving = false;
        true
    }

    /// Selects the task under the cursor.
    pub fn select_at_cursor(&mut self) -> bool {
        let Some(id) = self.visible().get(self.cursor).map(|t| t.id.clone()) else {
            return false;
        };
        self.select(&id)
    }

    /// Deselects; the detail pane shows its empty state.
    pub fn clear_selection(&mut self) {
        self.selected = None;
        self.mode = Mode::View;
    }

    /// Opens an empty form for a new task due `today`.
    pub fn begin_create(&mut self, today: NaiveDate) {
        self.selected = None;
        self.mode = Mode::Create;
        self.draft = TaskDraft::blank(today);
        self.field = DraftField::Title;
        self.draft_error = None;
        self.saving = false;
    }

    /// Opens the form on the selected task.
    ///
    /// # Errors
    ///
    /// [`TaskError::NoSelection`] when no task is selected or the
    /// selected task is no longer in the list.
    pub fn begin_edit(&mut self) -> Result<(), TaskError> {
        let task = self.selected_task().ok_or(TaskError::NoSelection)?;
        self.draft = TaskDraft::from_task(task);
        self.mode = Mode::Edit;
        self.field = DraftField::Title;
        self.draft_error = None;
        self.saving = false;
        Ok(())
    }

    /// Leaves create/edit mode and discards the draft.
    pub fn cancel(&mut self) {
        match self.mode {
            Mode::Create => self.selected = None,
            Mode::Edit => {
                if let Some(task) = self.selected_task() {
                    self.draft = TaskDraft::from_task(task);
                }
            }
            Mode::View => {}
        }
        self.mode = Mode::View;
        self.draft_error = None;
        self.saving = false;
    }

    /// Builds the request for the current draft.
    ///
    /// Stays in create/edit mode; [`saved`](Self::saved) leaves it once
    /// the server has accepted the change. Until then further saves are
    /// refused. Editing the draft or cancelling re-enables saving, so a
    /// request that failed silently can be retried.
    ///
    /// # Errors
    ///
    /// [`TaskError::SavePending`] while a save is outstanding,
    /// [`TaskError::NotEditing`] in view mode, [`TaskError::NoSelection`]
    /// when editing without a selection, or a draft validation error. The
    /// validation error is also kept for display.
    pub fn save(&mut self) -> Result<TaskCommand, TaskError> {
        if self.saving {
            return Err(TaskError::SavePending);
        }
        let result = match self.mode {
            Mode::View => Err(TaskError::NotEditing),
            Mode::Create => self.draft.to_new_task(self.max_title_len).map(TaskCommand::Create),
            Mode::Edit => match &self.selected {
                Some(id) => self
                    .draft
                    .to_patch(self.max_title_len)
                    .map(|patch| TaskCommand::Update {
                        id: id.clone(),
                        patch,
                    }),
                None => Err(TaskError::NoSelection),
            },
        };
        self.draft_error = result.as_ref().err().cloned();
        self.saving = result.is_ok();
        result
    }

    /// Whether a create/update is waiting for the server.
    #[must_use]
    pub const fn is_saving(&self) -> bool {
        self.saving
    }

    /// Re-enables saving after the request could not be sent.
    pub const fn save_not_sent(&mut self) {
        self.saving = false;
    }

    /// Records that a create (`id = None`) or update was accepted.
    ///
    /// Leaves the matching mode. A completion for a mode the user has
    /// since left is ignored.
    pub fn saved(&mut self, id: Option<&TaskId>) {
        match (self.mode, id) {
            (Mode::Create, None) => {
                self.mode = Mode::View;
                self.selected = None;
                self.saving = false;
            }
            (Mode::Edit, Some(id)) if self.selected.as_ref() == Some(id) => {
                self.mode = Mode::View;
                self.saving = false;
            }
            _ => {}
        }
    }

    /// Request to flip the status of `id`.
    ///
    /// `done` becomes `todo`; anything else becomes `done`. Returns `None`
    /// if the task is not in the list.
    #[must_use]
    pub fn toggle(&self, id: &TaskId) -> Option<TaskCommand> {
        let task = self.tasks.iter().find(|t| &t.id == id)?;
        Some(TaskCommand::Toggle {
            id: id.clone(),
            status: task.status.toggled(),
        })
    }

    /// Toggle request for the task under the cursor.
    #[must_use]
    pub fn toggle_at_cursor(&self) -> Option<TaskCommand> {
        let visible = self.visible();
        let task = visible.get(self.cursor)?;
        self.toggle(&task.id)
    }

    /// Records an accepted toggle; keeps the draft in step when `id` is selected.
    pub fn toggled(&mut self, id: &TaskId, status: TaskStatus) {
        if self.selected.as_ref() == Some(id) {
            self.draft.status = status;
        }
    }

    /// Request to delete `id`.
    #[must_use]
    pub fn delete(&self, id: &TaskId) -> TaskCommand {
        TaskCommand::Delete { id: id.clone() }
    }

    /// Records an accepted delete; clears the selection if it was `id`.
    pub fn deleted(&mut self, id: &TaskId) {
        if self.selected.as_ref() == Some(id) {
            self.selected = None;
            if self.mode == Mode::Edit {
                self.mode = Mode::View;
            }
        }
    }

    /// Moves the form focus forward.
    pub fn next_field(&mut self) {
        self.field = self.field.next();
    }

    /// Moves the form focus back.
    pub fn prev_field(&mut self) {
        self.field = self.field.prev();
    }

    /// Types into the focused form input.
    pub fn push_draft_char(&mut self, c: char) {
        self.draft.push_char(self.field, c);
        self.draft_error = None;
        self.saving = false;
    }

    /// Backspace in the focused form input.
    pub fn pop_draft_char(&mut self) {
        self.draft.pop_char(self.field);
        self.draft_error = None;
        self.saving = false;
    }

    /// Cycles the focused choice input.
    pub const fn cycle_draft_field(&mut self) {
        self.draft.cycle(self.field);
        self.saving = false;
    }

    /// Switches to the next status filter.
    pub fn cycle_filter(&mut self) {
        self.set_filter(self.filter.cycled());
    }

    /// Sets the status filter.
    pub fn set_filter(&mut self, filter: StatusFilter) {
        self.filter = filter;
        self.clamp_cursor();
    }

    /// Appends to the search text.
    pub fn push_query(&mut self, c: char) {
        self.query.push(c);
        self.clamp_cursor();
    }

    /// Removes the last search character.
    pub fn pop_query(&mut self) {
        self.query.pop();
        self.clamp_cursor();
    }

    /// Clears the search text.
    pub fn clear_query(&mut self) {
        self.query.clear();
        self.clamp_cursor();
    }

    /// Moves the cursor down one row.
    pub fn cursor_down(&mut self) {
        let len = self.visible().len();
        if self.cursor + 1 < len {
            self.cursor += 1;
        }
    }

    /// Moves the cursor up one row.
    pub const fn cursor_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    /// Forgets everything; used on sign-out.
    pub fn reset(&mut self) {
        *self = Self::new(self.max_title_len);
    }

    fn clamp_cursor(&mut self) {
        let len = self.visible().len();
        self.cursor = self.cursor.min(len.saturating_sub(1));
    }
}
