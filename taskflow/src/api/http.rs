//! reqwest-backed [`TaskApi`] implementation.
//!
//! Authenticated calls send `Authorization: Bearer <token>`. Non-2xx
//! responses become [`ApiError::Status`] carrying the body's `msg` field
//! when there is one.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use taskflow_proto::auth::{LoginRequest, RegisterRequest, TokenResponse};
use taskflow_proto::error::ErrorBody;
use taskflow_proto::task::{NewTask, Task, TaskId, TaskList, TaskPatch};
use url::Url;

use super::{ApiError, TaskApi};
use crate::session::Session;

/// HTTP client for a TaskFlow server rooted at a base URL.
#[derive(Debug, Clone)]
pub struct HttpApi {
    client: Client,
    base: Url,
}

impl HttpApi {
    /// Creates a client for `base_url`.
    ///
    /// `timeout` bounds each whole request; `None` keeps reqwest's default
    /// of no timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidUrl`] if `base_url` does not parse, or
    /// [`ApiError::Transport`] if the underlying client cannot be built.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, ApiError> {
        let mut base = Url::parse(base_url)?;
        // Without a trailing slash `join` would replace the last segment.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base,
        })
    }

    /// The normalized base URL (always ends in `/`).
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.base.join(path)?)
    }

    fn task_url(&self, id: &TaskId) -> Result<Url, ApiError> {
        let mut url = self.endpoint("task")?;
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .push(id.as_str());
        Ok(url)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let response = request.send().await.map_err(|e| {
            if e.is_connect() {
                ApiError::Unreachable(self.base.to_string())
            } else {
                ApiError::Transport(e)
            }
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ApiError::Status {
            status: status.as_u16(),
            message: ErrorBody::message_from(&body),
        })
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let body = self.send(request).await?.text().await?;
        serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

impl TaskApi for HttpApi {
    async fn login(&self, req: &LoginRequest) -> Result<Session, ApiError> {
        tracing::debug!(request = %req.redacted(), "login");
        let url = self.endpoint("user/login")?;
        let resp: TokenResponse = self.send_json(self.client.post(url).json(req)).await?;
        Ok(Session::new(resp.token))
    }

    async fn register(&self, req: &RegisterRequest) -> Result<Session, ApiError> {
        tracing::debug!(request = %req.redacted(), "register");
        let url = self.endpoint("user/register")?;
        let resp: TokenResponse = self.send_json(self.client.post(url).json(req)).await?;
        Ok(Session::new(resp.token))
    }

    async fn list_tasks(&self, session: &Session) -> Result<Vec<Task>, ApiError> {
        let url = self.endpoint("task")?;
        let list: TaskList = self
            .send_json(self.client.get(url).bearer_auth(session.token()))
            .await?;
        tracing::debug!(count = list.tasks.len(), "fetched tasks");
        Ok(list.tasks)
    }

    async fn create_task(&self, session: &Session, task: &NewTask) -> Result<(), ApiError> {
        let url = self.endpoint("task")?;
        self.send(self.client.post(url).bearer_auth(session.token()).json(task))
            .await?;
        Ok(())
    }

    async fn update_task(
        &self,
        session: &Session,
        id: &TaskId,
        patch: &TaskPatch,
    ) -> Result<(), ApiError> {
        let url = self.task_url(id)?;
        self.send(self.client.put(url).bearer_auth(session.token()).json(patch))
            .await?;
        Ok(())
    }

    async fn delete_task(&self, session: &Session, id: &TaskId) -> Result<(), ApiError> {
        let url = self.task_url(id)?;
        self.send(self.client.delete(url).bearer_auth(session.token()))
            .await?;
        Ok(())
    }
}
