//! In-memory account, session, and task storage for the stub server.
//!
//! Everything lives behind a single [`RwLock`]; the stub serves tests and
//! local demos, so nothing is persisted across restarts.

use std::collections::HashMap;

use taskflow_proto::auth::{LoginRequest, RegisterRequest};
use taskflow_proto::task::{NewTask, Task, TaskId, TaskPatch};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Errors returned by [`StubStore`] operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum StoreError {
    /// A required field was blank.
    #[error("{0} is required")]
    MissingField(&'static str),
    /// Registration with an email that already has an account.
    #[error("User already exists")]
    EmailTaken,
    /// Unknown email or wrong password.
    #[error("Invalid credentials")]
    InvalidCredentials,
    /// No task with this identifier belongs to the caller.
    #[error("Task not found")]
    TaskNotFound,
}

#[derive(Debug, Clone)]
struct Account {
    password: String,
}

#[derive(Debug, Default)]
struct Inner {
    /// Email -> account.
    accounts: HashMap<String, Account>,
    /// Token -> email.
    sessions: HashMap<String, String>,
    /// Email -> tasks in creation order.
    tasks: HashMap<String, Vec<Task>>,
}

/// Thread-safe in-memory store shared by all request handlers.
#[derive(Debug, Default)]
pub struct StubStore {
    inner: RwLock<Inner>,
}

fn require(value: &str, field: &'static str) -> Result<(), StoreError> {
    if value.trim().is_empty() {
        Err(StoreError::MissingField(field))
    } else {
        Ok(())
    }
}

fn new_token() -> String {
    Uuid::new_v4().simple().to_string()
}

impl StubStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an account and opens a session for it, returning the token.
    ///
    /// # Errors
    ///
    /// [`StoreError::MissingField`] for blank fields, or
    /// [`StoreError::EmailTaken`] if the email is already registered.
    pub async fn register(&self, req: &RegisterRequest) -> Result<String, StoreError> {
        require(&req.name, "name")?;
        require(&req.email, "email")?;
        require(&req.password, "password")?;

        let email = req.email.trim().to_lowercase();
        let mut inner = self.inner.write().await;
        if inner.accounts.contains_key(&email) {
            return Err(StoreError::EmailTaken);
        }
        inner.accounts.insert(
            email.clone(),
            Account {
                password: req.password.clone(),
            },
        );
        let token = new_token();
        inner.sessions.insert(token.clone(), email);
        drop(inner);
        Ok(token)
    }

    /// Opens a new session for existing credentials, returning the token.
    ///
    /// # Errors
    ///
    /// [`StoreError::InvalidCredentials`] if the email is unknown or the
    /// password does not match.
    pub async fn login(&self, req: &LoginRequest) -> Result<String, StoreError> {
        let email = req.email.trim().to_lowercase();
        let mut inner = self.inner.write().await;
        let matches = inner
            .accounts
            .get(&email)
            .is_some_and(|account| account.password == req.password);
        if !matches {
            return Err(StoreError::InvalidCredentials);
        }
        let token = new_token();
        inner.sessions.insert(token.clone(), email);
        drop(inner);
        Ok(token)
    }

    /// Resolves a bearer token to the owning account's email.
    pub async fn authenticate(&self, token: &str) -> Option<String> {
        self.inner.read().await.sessions.get(token).cloned()
    }

    /// Returns the caller's tasks in creation order.
    pub async fn list(&self, owner: &str) -> Vec<Task> {
        self.inner
            .read()
            .await
            .tasks
            .get(owner)
            .cloned()
            .unwrap_or_default()
    }

    /// Stores a new task and returns it with its assigned identifier.
    ///
    /// # Errors
    ///
    /// [`StoreError::MissingField`] if the title is blank.
    pub async fn create(&self, owner: &str, new: NewTask) -> Result<Task, StoreError> {
        require(&new.title, "title")?;
        let task = Task {
            id: TaskId::new(Uuid::now_v7().simple().to_string()),
            title: new.title,
            priority: new.priority,
            status: new.status,
            description: Some(new.description).filter(|d| !d.is_empty()),
            due_date: new.due_date,
        };
        self.inner
            .write()
            .await
            .tasks
            .entry(owner.to_string())
            .or_default()
            .push(task.clone());
        Ok(task)
    }

    /// Applies a partial update to one of the caller's tasks.
    ///
    /// # Errors
    ///
    /// [`StoreError::TaskNotFound`] if the caller owns no such task, or
    /// [`StoreError::MissingField`] if the patch blanks the title.
    pub async fn update(
        &self,
        owner: &str,
        id: &TaskId,
        patch: &TaskPatch,
    ) -> Result<Task, StoreError> {
        if let Some(title) = &patch.title {
            require(title, "title")?;
        }
        let mut inner = self.inner.write().await;
        let task = inner
            .tasks
            .get_mut(owner)
            .and_then(|tasks| tasks.iter_mut().find(|t| &t.id == id))
            .ok_or(StoreError::TaskNotFound)?;
        patch.apply_to(task);
        let updated = task.clone();
        drop(inner);
        Ok(updated)
    }

    /// Removes one of the caller's tasks.
    ///
    /// # Errors
    ///
    /// [`StoreError::TaskNotFound`] if the caller owns no such task.
    pub async fn delete(&self, owner: &str, id: &TaskId) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let tasks = inner.tasks.get_mut(owner).ok_or(StoreError::TaskNotFound)?;
        let before = tasks.len();
        tasks.retain(|t| &t.id != id);
        if tasks.len() == before {
            return Err(StoreError::TaskNotFound);
        }
        Ok(())
    }
}
