//! Working copy of a task while it is being created or edited.
//!
//! A draft is detached from the authoritative list: typing into it, or
//! throwing it away, never touches the tasks fetched from the server.

use chrono::NaiveDate;
use taskflow_proto::task::{NewTask, Priority, Task, TaskPatch, TaskStatus, parse_due_date};

use super::TaskError;

/// Input of the create/edit form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftField {
    /// Free-text title.
    Title,
    /// Cycled with left/right.
    Priority,
    /// `YYYY-MM-DD` text; empty means no due date.
    DueDate,
    /// Free-text description.
    Description,
    /// Cycled with left/right.
    Status,
}

impl DraftField {
    /// Form inputs in tab order.
    pub const ORDER: [Self; 5] = [
        Self::Title,
        Self::Priority,
        Self::DueDate,
        Self::Description,
        Self::Status,
    ];

    /// Label shown next to the input.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Title => "Title",
            Self::Priority => "Priority",
            Self::DueDate => "Due date",
            Self::Description => "Description",
            Self::Status => "Status",
        }
    }

    /// The next input in tab order, wrapping around.
    #[must_use]
    pub fn next(self) -> Self {
        let idx = Self::ORDER.iter().position(|f| *f == self).unwrap_or(0);
        Self::ORDER[(idx + 1) % Self::ORDER.len()]
    }

    /// The previous input in tab order, wrapping around.
    #[must_use]
    pub fn prev(self) -> Self {
        let idx = Self::ORDER.iter().position(|f| *f == self).unwrap_or(0);
        Self::ORDER[(idx + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }

    /// Whether the input takes typed text (as opposed to cycling a choice).
    #[must_use]
    pub const fn is_text(self) -> bool {
        matches!(self, Self::Title | Self::DueDate | Self::Description)
    }
}

/// Editable task fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    /// Title as typed; sent untrimmed.
    pub title: String,
    /// Priority.
    pub priority: Priority,
    /// Due date as typed, parsed only on save.
    pub due_date: String,
    /// Description as typed.
    pub description: String,
    /// Status.
    pub status: TaskStatus,
}

impl TaskDraft {
    /// An empty draft for a new task: medium priority, todo, due `today`.
    #[must_use]
    pub fn blank(today: NaiveDate) -> Self {
        Self {
            title: String::new(),
            priority: Priority::Medium,
            due_date: today.format("%Y-%m-%d").to_string(),
            description: String::new(),
            status: TaskStatus::Todo,
        }
    }

    /// A draft holding the current values of `task`.
    #[must_use]
    pub fn from_task(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            priority: task.priority,
            due_date: task
                .due_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            description: task.description.clone().unwrap_or_default(),
            status: task.status,
        }
    }

    /// Whether the save action is currently available.
    #[must_use]
    pub fn can_save(&self) -> bool {
        !self.title.trim().is_empty()
    }

    fn checked_due_date(&self, max_title_len: usize) -> Result<Option<NaiveDate>, TaskError> {
        if !self.can_save() {
            return Err(TaskError::TitleEmpty);
        }
        if self.title.chars().count() > max_title_len {
            return Err(TaskError::TitleTooLong(max_title_len));
        }
        parse_due_date(&self.due_date).map_err(|_| TaskError::InvalidDueDate(self.due_date.clone()))
    }

    /// Body for `POST /task`.
    ///
    /// # Errors
    ///
    /// [`TaskError::TitleEmpty`] for a blank title, [`TaskError::TitleTooLong`]
    /// past `max_title_len` characters, or [`TaskError::InvalidDueDate`].
    pub fn to_new_task(&self, max_title_len: usize) -> Result<NewTask, TaskError> {
        let due_date = self.checked_due_date(max_title_len)?;
        Ok(NewTask {
            title: self.title.clone(),
            priority: self.priority,
            due_date,
            description: self.description.clone(),
            status: self.status,
        })
    }

    /// Body for `PUT /task/:id` carrying every editable field.
    ///
    /// An empty due date is sent as an explicit `null`.
    ///
    /// # Errors
    ///
    /// Same as [`TaskDraft::to_new_task`].
    pub fn to_patch(&self, max_title_len: usize) -> Result<TaskPatch, TaskError> {
        let due_date = self.checked_due_date(max_title_len)?;
        Ok(TaskPatch {
            title: Some(self.title.clone()),
            priority: Some(self.priority),
            due_date: Some(due_date),
            description: Some(self.description.clone()),
            status: Some(self.status),
        })
    }

    /// Appends a character to a text input. Choice inputs ignore it.
    pub fn push_char(&mut self, field: DraftField, c: char) {
        if let Some(text) = self.text_mut(field) {
            text.push(c);
        }
    }

    /// Removes the last character of a text input.
    pub fn pop_char(&mut self, field: DraftField) {
        if let Some(text) = self.text_mut(field) {
            text.pop();
        }
    }

    /// Advances a choice input to its next value.
    pub const fn cycle(&mut self, field: DraftField) {
        match field {
            DraftField::Priority => self.priority = self.priority.cycled(),
            DraftField::Status => self.status = self.status.cycled(),
            DraftField::Title | DraftField::DueDate | DraftField::Description => {}
        }
    }

    /// Display text of `field`.
    #[must_use]
    pub fn value(&self, field: DraftField) -> String {
        match field {
            DraftField::Title => self.title.clone(),
            DraftField::Priority => self.priority.to_string(),
            DraftField::DueDate => self.due_date.clone(),
            DraftField::Description => self.description.clone(),
            DraftField::Status => self.status.to_string(),
        }
    }

    const fn text_mut(&mut self, field: DraftField) -> Option<&mut String> {
        match field {
            DraftField::Title => Some(&mut self.title),
            DraftField::DueDate => Some(&mut self.due_date),
            DraftField::Description => Some(&mut self.description),
            DraftField::Priority | DraftField::Status => None,
        }
    }
}
