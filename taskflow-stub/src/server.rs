//! HTTP surface of the stub server: router, bearer-token auth, and the
//! `/user` and `/task` handlers.
//!
//! Error responses carry `{ "msg": "..." }` so clients can show the text
//! directly.

use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{post, put};
use axum::{Json, Router};
use taskflow_proto::auth::{LoginRequest, RegisterRequest, TokenResponse};
use taskflow_proto::error::ErrorBody;
use taskflow_proto::task::{NewTask, Task, TaskId, TaskList, TaskPatch};

use crate::store::{StoreError, StubStore};

/// Default maximum accepted request body size in bytes (64 KB).
const DEFAULT_MAX_BODY_SIZE: usize = 64 * 1024;

/// Shared server state.
pub struct StubState {
    /// Accounts, sessions, and tasks.
    pub store: StubStore,
    max_body_size: usize,
}

impl Default for StubState {
    fn default() -> Self {
        Self::new()
    }
}

impl StubState {
    /// Creates an empty state with the default body size limit.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(DEFAULT_MAX_BODY_SIZE)
    }

    /// Creates an empty state with a custom body size limit.
    #[must_use]
    pub fn with_config(max_body_size: usize) -> Self {
        Self {
            store: StubStore::new(),
            max_body_size,
        }
    }
}

/// An error response with a JSON `msg` body.
#[derive(Debug)]
pub struct ApiFailure {
    status: StatusCode,
    msg: String,
}

impl ApiFailure {
    fn unauthorized() -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            msg: "Not authorized".to_string(),
        }
    }
}

impl From<StoreError> for ApiFailure {
    fn from(err: StoreError) -> Self {
        let status = match err {
            StoreError::MissingField(_) => StatusCode::BAD_REQUEST,
            StoreError::EmailTaken => StatusCode::CONFLICT,
            StoreError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            StoreError::TaskNotFound => StatusCode::NOT_FOUND,
        };
        Self {
            status,
            msg: err.to_string(),
        }
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody::new(self.msg))).into_response()
    }
}

/// Builds the API router over the given state.
pub fn router(state: Arc<StubState>) -> Router {
    let limit = state.max_body_size;
    Router::new()
        .route("/user/register", post(register))
        .route("/user/login", post(login))
        .route("/task", post(create_task).get(list_tasks))
        .route("/task/{id}", put(update_task).delete(delete_task))
        .layer(DefaultBodyLimit::max(limit))
        .with_state(state)
}

/// Resolves the `Authorization: Bearer` header to the owning account.
async fn owner(state: &StubState, headers: &HeaderMap) -> Result<String, ApiFailure> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(ApiFailure::unauthorized)?;
    state
        .store
        .authenticate(token.trim())
        .await
        .ok_or_else(ApiFailure::unauthorized)
}

async fn register(
    State(state): State<Arc<StubState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<TokenResponse>), ApiFailure> {
    let token = state.store.register(&req).await?;
    tracing::info!(email = %req.email, "account registered");
    Ok((StatusCode::CREATED, Json(TokenResponse { token })))
}

async fn login(
    State(state): State<Arc<StubState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiFailure> {
    match state.store.login(&req).await {
        Ok(token) => {
            tracing::info!(email = %req.email, "login succeeded");
            Ok(Json(TokenResponse { token }))
        }
        Err(e) => {
            tracing::info!(email = %req.email, "login rejected");
            Err(e.into())
        }
    }
}

async fn list_tasks(
    State(state): State<Arc<StubState>>,
    headers: HeaderMap,
) -> Result<Json<TaskList>, ApiFailure> {
    let owner = owner(&state, &headers).await?;
    let tasks = state.store.list(&owner).await;
    Ok(Json(TaskList { tasks }))
}

async fn create_task(
    State(state): State<Arc<StubState>>,
    headers: HeaderMap,
    Json(new): Json<NewTask>,
) -> Result<(StatusCode, Json<Task>), ApiFailure> {
    let owner = owner(&state, &headers).await?;
    let task = state.store.create(&owner, new).await?;
    tracing::debug!(task_id = %task.id, "task created");
    Ok((StatusCode::CREATED, Json(task)))
}

async fn update_task(
    State(state): State<Arc<StubState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(patch): Json<TaskPatch>,
) -> Result<Json<Task>, ApiFailure> {
    let owner = owner(&state, &headers).await?;
    let task = state.store.update(&owner, &TaskId::new(id), &patch).await?;
    tracing::debug!(task_id = %task.id, "task updated");
    Ok(Json(task))
}

async fn delete_task(
    State(state): State<Arc<StubState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiFailure> {
    let owner = owner(&state, &headers).await?;
    state.store.delete(&owner, &TaskId::new(id)).await?;
    tracing::debug!("task deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Starts the stub server on `addr` with default state.
///
/// # Errors
///
/// Returns an error if the TCP listener cannot bind to the given address.
pub async fn start_server(
    addr: &str,
) -> Result<
    (std::net::SocketAddr, tokio::task::JoinHandle<()>),
    Box<dyn std::error::Error + Send + Sync>,
> {
    start_server_with_state(addr, Arc::new(StubState::new())).await
}

/// Starts the stub server with a pre-configured [`StubState`].
///
/// Pass `127.0.0.1:0` to let the OS pick a port; the bound address is
/// returned alongside the server task's handle.
///
/// # Errors
///
/// Returns an error if the TCP listener cannot bind to the given address.
pub async fn start_server_with_state(
    addr: &str,
    state: Arc<StubState>,
) -> Result<
    (std::net::SocketAddr, tokio::task::JoinHandle<()>),
    Box<dyn std::error::Error + Send + Sync>,
> {
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let bound_addr = listener.local_addr()?;

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!(error = %e, "stub server error");
        }
    });

    Ok((bound_addr, handle))
}
