//! Credential forms and their client-side validation.
//!
//! Values are normalized before validation: every field is trimmed and the
//! email is lower-cased. A form that fails validation never produces a
//! request body, so no network call can follow from it.

use std::sync::LazyLock;

use regex::Regex;
use taskflow_proto::auth::{LoginRequest, RegisterRequest};

/// Accepts `something@domain.tld` with no whitespace anywhere.
static EMAIL_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^\S+@\S+\.\S+$").ok());

/// Why a credential form was rejected before submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// A required field was empty after trimming.
    #[error("All fields are required")]
    MissingField(&'static str),
    /// The email does not look like `name@domain.tld`.
    #[error("Please enter a valid email address")]
    InvalidEmail,
}

/// Returns `true` if `email` has a local part, an `@`, and a dotted domain.
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN
        .as_ref()
        .is_some_and(|pattern| pattern.is_match(email))
}

fn required(value: &str, field: &'static str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ValidationError::MissingField(field))
    } else {
        Ok(trimmed.to_string())
    }
}

fn normalized_email(raw: &str) -> Result<String, ValidationError> {
    let email = required(raw, "email")?.to_lowercase();
    if is_valid_email(&email) {
        Ok(email)
    } else {
        Err(ValidationError::InvalidEmail)
    }
}

/// Raw contents of the login form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    /// Email as typed.
    pub email: String,
    /// Password as typed.
    pub password: String,
}

impl LoginForm {
    /// Normalizes and validates the form into a request body.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] for a blank field or malformed email.
    pub fn validate(&self) -> Result<LoginRequest, ValidationError> {
        let email = normalized_email(&self.email)?;
        let password = required(&self.password, "password")?;
        Ok(LoginRequest { email, password })
    }
}

/// Raw contents of the registration form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisterForm {
    /// Display name as typed.
    pub name: String,
    /// Email as typed.
    pub email: String,
    /// Password as typed.
    pub password: String,
}

impl RegisterForm {
    /// Normalizes and validates the form into a request body.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] for a blank field or malformed email.
    pub fn validate(&self) -> Result<RegisterRequest, ValidationError> {
        let name = required(&self.name, "name")?;
        let email = normalized_email(&self.email)?;
        let password = required(&self.password, "password")?;
        Ok(RegisterRequest {
            name,
            email,
            password,
        })
    }
}
