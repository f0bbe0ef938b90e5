//! Error body returned by the API on non-2xx responses.

use serde::{Deserialize, Serialize};

/// JSON error body. The human-readable text lives in `msg`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Message intended for display to the user.
    #[serde(default, alias = "message", skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
}

impl ErrorBody {
    /// Builds an error body carrying `msg`.
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            msg: Some(msg.into()),
        }
    }

    /// Extracts the message from a raw response body, if it carries one.
    ///
    /// Bodies that are not JSON, or JSON without a non-blank `msg`, yield
    /// `None` so callers can fall back to their own generic text.
    #[must_use]
    pub fn message_from(raw: &str) -> Option<String> {
        serde_json::from_str::<Self>(raw)
            .ok()
            .and_then(|body| body.msg)
            .filter(|msg| !msg.trim().is_empty())
    }
}
