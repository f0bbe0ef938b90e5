//! Client side of the TaskFlow REST API.
//!
//! Defines the [`TaskApi`] trait that the network layer drives.
//! Implementations:
//! - [`http::HttpApi`]: reqwest client against a real server
//! - [`memory::MemoryApi`]: in-process fake that records every call, for tests

pub mod http;
pub mod memory;

use std::future::Future;

use taskflow_proto::auth::{LoginRequest, RegisterRequest};
use taskflow_proto::task::{NewTask, Task, TaskId, TaskPatch};

use crate::session::Session;

/// Errors from a single API call.
///
/// None of these are fatal; the caller shows or logs them and the user
/// may try again.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The server answered with a non-2xx status.
    #[error("server responded {status}{}", message_suffix(.message.as_deref()))]
    Status {
        /// HTTP status code.
        status: u16,
        /// The `msg` field of the error body, when present.
        message: Option<String>,
    },

    /// The server could not be reached.
    #[error("could not reach {0}")]
    Unreachable(String),

    /// Any other transport-level failure.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// A 2xx response whose body did not match the expected shape.
    #[error("unexpected response body: {0}")]
    Decode(String),

    /// The configured base URL cannot be joined with an endpoint path.
    #[error("invalid API URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

fn message_suffix(message: Option<&str>) -> String {
    message.map(|m| format!(": {m}")).unwrap_or_default()
}

impl ApiError {
    /// The human-readable message supplied by the server, if any.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Status { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// HTTP status code, for errors that carry one.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Async access to the remote task store.
///
/// Every method except `login` and `register` takes the caller's
/// [`Session`]; implementations never keep a token of their own.
/// Mutating calls return `()` because callers refetch the full list
/// after every mutation instead of trusting response bodies.
pub trait TaskApi: Send + Sync {
    /// `POST /user/login`.
    fn login(
        &self,
        req: &LoginRequest,
    ) -> impl Future<Output = Result<Session, ApiError>> + Send;

    /// `POST /user/register`.
    fn register(
        &self,
        req: &RegisterRequest,
    ) -> impl Future<Output = Result<Session, ApiError>> + Send;

    /// `GET /task`.
    fn list_tasks(
        &self,
        session: &Session,
    ) -> impl Future<Output = Result<Vec<Task>, ApiError>> + Send;

    /// `POST /task`.
    fn create_task(
        &self,
        session: &Session,
        task: &NewTask,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// `PUT /task/:id` with only the fields present in `patch`.
    fn update_task(
        &self,
        session: &Session,
        id: &TaskId,
        patch: &TaskPatch,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// `DELETE /task/:id`.
    fn delete_task(
        &self,
        session: &Session,
        id: &TaskId,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;
}
