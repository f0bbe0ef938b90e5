//! Request and response bodies of the `/user` endpoints.

use serde::{Deserialize, Serialize};

/// Body of `POST /user/login`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    /// Account email.
    pub email: String,
    /// Account password.
    pub password: String,
}

/// Body of `POST /user/register`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterRequest {
    /// Display name.
    pub name: String,
    /// Account email.
    pub email: String,
    /// Account password.
    pub password: String,
}

/// Successful response of both `/user` endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    /// Opaque session token for the `Authorization` header.
    pub token: String,
}

// Passwords stay out of logs.
impl LoginRequest {
    /// Returns a copy of the request safe to log.
    #[must_use]
    pub fn redacted(&self) -> String {
        format!("LoginRequest {{ email: {:?}, password: <redacted> }}", self.email)
    }
}

impl RegisterRequest {
    /// Returns a copy of the request safe to log.
    #[must_use]
    pub fn redacted(&self) -> String {
        format!(
            "RegisterRequest {{ name: {:?}, email: {:?}, password: <redacted> }}",
            self.name, self.email
        )
    }
}
