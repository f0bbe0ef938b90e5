//! Status filter and title search over the authoritative list.
//!
//! The projection is recomputed from scratch for every render. It borrows
//! from the list and never reorders, caches, or mutates it.

use taskflow_proto::task::{Task, TaskStatus};

/// Which statuses the list pane shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    /// Every task.
    #[default]
    All,
    /// Tasks that are not done.
    Active,
    /// Tasks that are done.
    Completed,
}

impl StatusFilter {
    /// All filters in display order.
    pub const ALL: [Self; 3] = [Self::All, Self::Active, Self::Completed];

    /// Whether a task with `status` passes this filter.
    #[must_use]
    pub const fn matches(self, status: TaskStatus) -> bool {
        match self {
            Self::All => true,
            Self::Active => !status.is_done(),
            Self::Completed => status.is_done(),
        }
    }

    /// Returns the next filter, wrapping around.
    #[must_use]
    pub const fn cycled(self) -> Self {
        match self {
            Self::All => Self::Active,
            Self::Active => Self::Completed,
            Self::Completed => Self::All,
        }
    }

    /// Label shown on the filter tab.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Active => "active",
            Self::Completed => "completed",
        }
    }
}

/// Tasks that pass `filter` and whose title contains `query`, ignoring case.
///
/// Order follows `tasks`. An empty query matches every title.
#[must_use]
pub fn project<'a>(tasks: &'a [Task], filter: StatusFilter, query: &str) -> Vec<&'a Task> {
    let needle = query.to_lowercase();
    tasks
        .iter()
        .filter(|task| filter.matches(task.status))
        .filter(|task| task.title.to_lowercase().contains(&needle))
        .collect()
}

/// Counts shown in the list footer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    /// Tasks in the projection.
    pub total: usize,
    /// Of those, how many are done.
    pub completed: usize,
}

impl std::fmt::Display for Summary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} tasks \u{2022} {} completed", self.total, self.completed)
    }
}

/// Footer counts for a projected set.
#[must_use]
pub fn summarize(visible: &[&Task]) -> Summary {
    Summary {
        total: visible.len(),
        completed: visible.iter().filter(|t| t.status.is_done()).count(),
    }
}
