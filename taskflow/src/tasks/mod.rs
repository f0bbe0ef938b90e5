//! Client-side task view-model.
//!
//! [`TaskCollection`] owns the authoritative list fetched from the API,
//! the selection, and the create/edit draft. It never talks to the
//! network itself: operations return a [`TaskCommand`] for the network
//! layer, and completions come back through the `*ed` methods
//! (`saved`, `toggled`, `deleted`) plus [`TaskCollection::replace_all`].

pub mod collection;
pub mod draft;
pub mod filter;

pub use collection::{Mode, TaskCollection, TaskCommand};
pub use draft::{DraftField, TaskDraft};
pub use filter::{StatusFilter, Summary, project, summarize};

use thiserror::Error;

/// Default upper bound on title length, in characters.
pub const DEFAULT_MAX_TITLE_LEN: usize = 256;

/// Errors raised locally by task operations. None reach the network.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskError {
    /// Task title is blank after trimming.
    #[error("Title is required")]
    TitleEmpty,
    /// Task title exceeds the configured maximum.
    #[error("title too long (max {0} characters)")]
    TitleTooLong(usize),
    /// Due date text is neither empty nor `YYYY-MM-DD`.
    #[error("invalid due date {0:?} (expected YYYY-MM-DD)")]
    InvalidDueDate(String),
    /// Save was requested outside create/edit mode.
    #[error("no task is being created or edited")]
    NotEditing,
    /// The operation needs a selected task.
    #[error("no task selected")]
    NoSelection,
    /// A create/update is already waiting for the server.
    #[error("saving\u{2026}")]
    SavePending,
}
