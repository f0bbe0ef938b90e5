//! In-process [`TaskApi`] for tests.
//!
//! `MemoryApi` keeps accounts and tasks in memory, answers with the same
//! statuses and messages as a real server, and records every call so tests
//! can assert which requests were (or were not) made.

use std::collections::HashMap;

use parking_lot::Mutex;
use taskflow_proto::auth::{LoginRequest, RegisterRequest};
use taskflow_proto::task::{NewTask, Task, TaskId, TaskPatch};

use super::{ApiError, TaskApi};
use crate::session::Session;

/// One recorded API call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    /// `POST /user/login`.
    Login {
        /// Submitted email.
        email: String,
    },
    /// `POST /user/register`.
    Register {
        /// Submitted email.
        email: String,
    },
    /// `GET /task`.
    ListTasks,
    /// `POST /task`.
    CreateTask(NewTask),
    /// `PUT /task/:id`.
    UpdateTask(TaskId, TaskPatch),
    /// `DELETE /task/:id`.
    DeleteTask(TaskId),
}

#[derive(Debug, Default)]
struct State {
    /// Email -> password.
    accounts: HashMap<String, String>,
    /// Token -> email.
    sessions: HashMap<String, String>,
    /// Email -> tasks.
    tasks: HashMap<String, Vec<Task>>,
    next_id: u64,
    calls: Vec<ApiCall>,
    offline: bool,
}

/// In-memory fake of the remote API.
#[derive(Debug, Default)]
pub struct MemoryApi {
    state: Mutex<State>,
}

fn status(status: u16, msg: &str) -> ApiError {
    ApiError::Status {
        status,
        message: Some(msg.to_string()),
    }
}

impl MemoryApi {
    /// Creates an API with no accounts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an account and returns a session for it.
    pub fn seed_account(&self, email: &str, password: &str) -> Session {
        let mut state = self.state.lock();
        state
            .accounts
            .insert(email.to_string(), password.to_string());
        let token = format!("token-{}-{}", email, state.sessions.len());
        state.sessions.insert(token.clone(), email.to_string());
        drop(state);
        Session::new(token)
    }

    /// Replaces the tasks of the account owning `session`.
    pub fn seed_tasks(&self, session: &Session, tasks: Vec<Task>) {
        let mut state = self.state.lock();
        if let Some(email) = state.sessions.get(session.token()).cloned() {
            state.tasks.insert(email, tasks);
        }
    }

    /// Makes every subsequent call fail as if the server were down.
    pub fn set_offline(&self, offline: bool) {
        self.state.lock().offline = offline;
    }

    /// Every call received so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<ApiCall> {
        self.state.lock().calls.clone()
    }

    /// Forgets recorded calls.
    pub fn clear_calls(&self) {
        self.state.lock().calls.clear();
    }

    /// Snapshot of the tasks owned by `session`.
    #[must_use]
    pub fn tasks_of(&self, session: &Session) -> Vec<Task> {
        let state = self.state.lock();
        state
            .sessions
            .get(session.token())
            .and_then(|email| state.tasks.get(email))
            .cloned()
            .unwrap_or_default()
    }

    fn record(&self, call: ApiCall) -> Result<(), ApiError> {
        let mut state = self.state.lock();
        state.calls.push(call);
        if state.offline {
            return Err(ApiError::Unreachable("memory".to_string()));
        }
        Ok(())
    }

    fn owner(state: &State, session: &Session) -> Result<String, ApiError> {
        state
            .sessions
            .get(session.token())
            .cloned()
            .ok_or_else(|| status(401, "Not authorized"))
    }

    fn open_session(state: &mut State, email: &str) -> Session {
        let token = format!("token-{}-{}", email, state.sessions.len());
        state.sessions.insert(token.clone(), email.to_string());
        Session::new(token)
    }
}

impl TaskApi for MemoryApi {
    async fn login(&self, req: &LoginRequest) -> Result<Session, ApiError> {
        self.record(ApiCall::Login {
            email: req.email.clone(),
        })?;
        let mut state = self.state.lock();
        if state.accounts.get(&req.email) != Some(&req.password) {
            return Err(status(401, "Invalid credentials"));
        }
        Ok(Self::open_session(&mut state, &req.email))
    }

    async fn register(&self, req: &RegisterRequest) -> Result<Session, ApiError> {
        self.record(ApiCall::Register {
            email: req.email.clone(),
        })?;
        let mut state = self.state.lock();
        if state.accounts.contains_key(&req.email) {
            return Err(status(409, "User already exists"));
        }
        state
            .accounts
            .insert(req.email.clone(), req.password.clone());
        Ok(Self::open_session(&mut state, &req.email))
    }

    async fn list_tasks(&self, session: &Session) -> Result<Vec<Task>, ApiError> {
        self.record(ApiCall::ListTasks)?;
        let state = self.state.lock();
        let owner = Self::owner(&state, session)?;
        Ok(state.tasks.get(&owner).cloned().unwrap_or_default())
    }

    async fn create_task(&self, session: &Session, task: &NewTask) -> Result<(), ApiError> {
        self.record(ApiCall::CreateTask(task.clone()))?;
        let mut state = self.state.lock();
        let owner = Self::owner(&state, session)?;
        state.next_id += 1;
        let created = Task {
            id: TaskId::new(format!("task-{}", state.next_id)),
            title: task.title.clone(),
            priority: task.priority,
            status: task.status,
            description: Some(task.description.clone()).filter(|d| !d.is_empty()),
            due_date: task.due_date,
        };
        state.tasks.entry(owner).or_default().push(created);
        Ok(())
    }

    async fn update_task(
        &self,
        session: &Session,
        id: &TaskId,
        patch: &TaskPatch,
    ) -> Result<(), ApiError> {
        self.record(ApiCall::UpdateTask(id.clone(), patch.clone()))?;
        let mut state = self.state.lock();
        let owner = Self::owner(&state, session)?;
        let task = state
            .tasks
            .get_mut(&owner)
            .and_then(|tasks| tasks.iter_mut().find(|t| &t.id == id))
            .ok_or_else(|| status(404, "Task not found"))?;
        patch.apply_to(task);
        Ok(())
    }

    async fn delete_task(&self, session: &Session, id: &TaskId) -> Result<(), ApiError> {
        self.record(ApiCall::DeleteTask(id.clone()))?;
        let mut state = self.state.lock();
        let owner = Self::owner(&state, session)?;
        let tasks = state.tasks.entry(owner).or_default();
        let before = tasks.len();
        tasks.retain(|t| &t.id != id);
        if tasks.len() == before {
            return Err(status(404, "Task not found"));
        }
        Ok(())
    }
}
