//! Task entity and the request bodies of the `/task` endpoints.
//!
//! Field names follow the remote API's JSON: the identifier travels as
//! `_id` and the due date as `dueDate`. Due dates are calendar dates on
//! the client even when the server stores full timestamps.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Opaque task identifier assigned by the remote store.
///
/// The client never constructs identifiers for new tasks; it only echoes
/// back the ones it received from the API.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// Wraps an identifier string received from the API.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as it appears in URLs and JSON.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Task priority.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Low priority.
    Low,
    /// Medium priority (the default for new tasks).
    #[default]
    Medium,
    /// High priority.
    High,
}

impl Priority {
    /// All priorities, lowest first.
    pub const ALL: [Self; 3] = [Self::Low, Self::Medium, Self::High];

    /// Returns the next priority, wrapping from high back to low.
    #[must_use]
    pub const fn cycled(self) -> Self {
        match self {
            Self::Low => Self::Medium,
            Self::Medium => Self::High,
            Self::High => Self::Low,
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

/// Workflow status of a task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    /// Not started.
    #[default]
    #[serde(rename = "todo")]
    Todo,
    /// Being worked on.
    #[serde(rename = "in-progress")]
    InProgress,
    /// Finished.
    #[serde(rename = "done")]
    Done,
}

impl TaskStatus {
    /// All statuses in workflow order.
    pub const ALL: [Self; 3] = [Self::Todo, Self::InProgress, Self::Done];

    /// Returns `true` for [`TaskStatus::Done`].
    #[must_use]
    pub const fn is_done(self) -> bool {
        matches!(self, Self::Done)
    }

    /// The status a completion toggle moves to.
    ///
    /// `done` goes back to `todo`; every other status becomes `done`. An
    /// `in-progress` task therefore never returns to `in-progress` through
    /// repeated toggling.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Done => Self::Todo,
            Self::Todo | Self::InProgress => Self::Done,
        }
    }

    /// Returns the next status in workflow order, wrapping around.
    #[must_use]
    pub const fn cycled(self) -> Self {
        match self {
            Self::Todo => Self::InProgress,
            Self::InProgress => Self::Done,
            Self::Done => Self::Todo,
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Todo => write!(f, "todo"),
            Self::InProgress => write!(f, "in-progress"),
            Self::Done => write!(f, "done"),
        }
    }
}

/// A task as returned by `GET /task`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Identifier assigned by the remote store.
    #[serde(rename = "_id", alias = "id")]
    pub id: TaskId,
    /// Task title (never empty for tasks created through the client).
    pub title: String,
    /// Priority.
    #[serde(default)]
    pub priority: Priority,
    /// Workflow status.
    #[serde(default)]
    pub status: TaskStatus,
    /// Optional free-text description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Optional due date.
    #[serde(rename = "dueDate", default, with = "due_date")]
    pub due_date: Option<NaiveDate>,
}

impl Task {
    /// Whether the task is past due on `today` and not yet done.
    #[must_use]
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.status.is_done() && self.due_date.is_some_and(|due| due < today)
    }
}

/// Response body of `GET /task`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskList {
    /// Every task owned by the authenticated user.
    pub tasks: Vec<Task>,
}

/// Request body of `POST /task`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTask {
    /// Task title.
    pub title: String,
    /// Priority.
    pub priority: Priority,
    /// Due date, sent as `null` when unset.
    #[serde(rename = "dueDate", default, with = "due_date")]
    pub due_date: Option<NaiveDate>,
    /// Description, empty when unset.
    #[serde(default)]
    pub description: String,
    /// Initial status.
    pub status: TaskStatus,
}

/// Request body of `PUT /task/:id`. Absent fields are left unchanged.
///
/// `due_date` distinguishes "leave alone" (`None`) from "clear"
/// (`Some(None)`), which is sent as an explicit JSON `null`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskPatch {
    /// New title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// New priority.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    /// New due date, or `Some(None)` to clear it.
    #[serde(
        rename = "dueDate",
        default,
        skip_serializing_if = "Option::is_none",
        with = "patch_due_date"
    )]
    pub due_date: Option<Option<NaiveDate>>,
    /// New description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// New status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
}

impl TaskPatch {
    /// A patch that only changes the status.
    #[must_use]
    pub fn status(status: TaskStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// Applies the patch to a task in place.
    pub fn apply_to(&self, task: &mut Task) {
        if let Some(title) = &self.title {
            task.title.clone_from(title);
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(due_date) = self.due_date {
            task.due_date = due_date;
        }
        if let Some(description) = &self.description {
            task.description = if description.is_empty() {
                None
            } else {
                Some(description.clone())
            };
        }
        if let Some(status) = self.status {
            task.status = status;
        }
    }
}

/// Parses a due date from either `YYYY-MM-DD` or an RFC 3339 timestamp.
///
/// Only the calendar part before `T` is used. Empty strings mean "no date".
///
/// # Errors
///
/// Returns the chrono parse error if the date part is malformed.
pub fn parse_due_date(raw: &str) -> Result<Option<NaiveDate>, chrono::ParseError> {
    let date_part = raw.split('T').next().unwrap_or_default().trim();
    if date_part.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").map(Some)
}

mod due_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    #[allow(clippy::ref_option)]
    pub fn serialize<S: Serializer>(date: &Option<NaiveDate>, s: S) -> Result<S::Ok, S::Error> {
        match date {
            Some(d) => s.serialize_str(&d.format("%Y-%m-%d").to_string()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDate>, D::Error> {
        let raw: Option<String> = Option::deserialize(d)?;
        match raw {
            Some(raw) => super::parse_due_date(&raw).map_err(serde::de::Error::custom),
            None => Ok(None),
        }
    }
}

mod patch_due_date {
    use chrono::NaiveDate;
    use serde::{Deserializer, Serializer};

    #[allow(clippy::ref_option)]
    pub fn serialize<S: Serializer>(
        date: &Option<Option<NaiveDate>>,
        s: S,
    ) -> Result<S::Ok, S::Error> {
        match date {
            Some(inner) => super::due_date::serialize(inner, s),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<Option<Option<NaiveDate>>, D::Error> {
        super::due_date::deserialize(d).map(Some)
    }
}
