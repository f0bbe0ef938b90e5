//! Login/register form state machine.
//!
//! ```text
//! Idle ─submit─▶ Validating ─invalid─▶ Rejected ─edit─▶ Idle
//!                     │
//!                   valid
//!                     ▼
//!                Submitting ─ok──▶ Succeeded
//!                     │
//!                    err
//!                     ▼
//!                  Failed ─edit─▶ Idle
//! ```
//!
//! `Validating` is transient: [`SessionGateway::begin_submit`] passes
//! through it and lands in `Rejected` or `Submitting` before returning.
//! While `Submitting`, further submits are refused, so one form submission
//! dispatches exactly one request.

use taskflow_proto::auth::{LoginRequest, RegisterRequest};

use super::Session;
use super::credentials::{LoginForm, RegisterForm, ValidationError};
use crate::api::ApiError;

/// Which form the gateway is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    /// Existing account.
    Login,
    /// New account.
    Register,
}

impl AuthMode {
    /// Message shown when the server gives no reason for a failure.
    #[must_use]
    pub const fn fallback_error(self) -> &'static str {
        match self {
            Self::Login => "Login failed",
            Self::Register => "Registration failed",
        }
    }

    /// Form title.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Login => "Login",
            Self::Register => "Register",
        }
    }
}

/// A single input of the credential form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthField {
    /// Display name (register only).
    Name,
    /// Email address.
    Email,
    /// Password.
    Password,
}

/// Where the gateway is in its submit cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayPhase {
    /// Accepting input.
    Idle,
    /// Checking the form locally.
    Validating,
    /// Local validation failed; carries the inline message.
    Rejected(String),
    /// A request is in flight.
    Submitting,
    /// The server accepted the credentials.
    Succeeded,
    /// The request failed; carries the message to show.
    Failed(String),
}

/// A validated request ready to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthRequest {
    /// `POST /user/login`.
    Login(LoginRequest),
    /// `POST /user/register`.
    Register(RegisterRequest),
}

/// Why a submit did not produce a request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    /// The form failed local validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// A request from an earlier submit is still outstanding.
    #[error("a request is already in flight")]
    InFlight,
}

/// What the caller should do once a request completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayOutcome {
    /// Store the session and open the task view.
    Navigate(Session),
    /// Stay on the form; the message is shown inline.
    Stay(String),
}

/// State of the login or register screen.
#[derive(Debug, Clone)]
pub struct SessionGateway {
    mode: AuthMode,
    /// Display name input (register only).
    pub name: String,
    /// Email input.
    pub email: String,
    /// Password input.
    pub password: String,
    focus: AuthField,
    phase: GatewayPhase,
}

impl SessionGateway {
    /// Creates an empty form in the given mode.
    #[must_use]
    pub const fn new(mode: AuthMode) -> Self {
        Self {
            mode,
            name: String::new(),
            email: String::new(),
            password: String::new(),
            focus: match mode {
                AuthMode::Login => AuthField::Email,
                AuthMode::Register => AuthField::Name,
            },
            phase: GatewayPhase::Idle,
        }
    }

    /// Current form mode.
    #[must_use]
    pub const fn mode(&self) -> AuthMode {
        self.mode
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> &GatewayPhase {
        &self.phase
    }

    /// Focused input.
    #[must_use]
    pub const fn focus(&self) -> AuthField {
        self.focus
    }

    /// Whether a request is outstanding (submit disabled, spinner shown).
    #[must_use]
    pub const fn is_submitting(&self) -> bool {
        matches!(self.phase, GatewayPhase::Submitting)
    }

    /// The inline error message, if the last attempt failed.
    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        match &self.phase {
            GatewayPhase::Rejected(msg) | GatewayPhase::Failed(msg) => Some(msg),
            _ => None,
        }
    }

    /// Inputs shown for the current mode, in tab order.
    #[must_use]
    pub const fn fields(&self) -> &'static [AuthField] {
        match self.mode {
            AuthMode::Login => &[AuthField::Email, AuthField::Password],
            AuthMode::Register => &[AuthField::Name, AuthField::Email, AuthField::Password],
        }
    }

    /// Current text of `field`.
    #[must_use]
    pub fn value(&self, field: AuthField) -> &str {
        match field {
            AuthField::Name => &self.name,
            AuthField::Email => &self.email,
            AuthField::Password => &self.password,
        }
    }

    /// Validates the form and, if valid, moves to `Submitting`.
    ///
    /// # Errors
    ///
    /// [`GatewayError::InFlight`] while a request is outstanding, or
    /// [`GatewayError::Validation`] if the form is invalid (the phase then
    /// becomes `Rejected` with the inline message).
    pub fn begin_submit(&mut self) -> Result<AuthRequest, GatewayError> {
        if self.is_submitting() {
            return Err(GatewayError::InFlight);
        }
        self.phase = GatewayPhase::Validating;

        let validated = match self.mode {
            AuthMode::Login => LoginForm {
                email: self.email.clone(),
                password: self.password.clone(),
            }
            .validate()
            .map(AuthRequest::Login),
            AuthMode::Register => RegisterForm {
                name: self.name.clone(),
                email: self.email.clone(),
                password: self.password.clone(),
            }
            .validate()
            .map(AuthRequest::Register),
        };

        match validated {
            Ok(request) => {
                self.phase = GatewayPhase::Submitting;
                Ok(request)
            }
            Err(e) => {
                tracing::debug!(mode = ?self.mode, error = %e, "credential form rejected");
                self.phase = GatewayPhase::Rejected(e.to_string());
                Err(e.into())
            }
        }
    }

    /// Records the result of the outstanding request.
    ///
    /// On failure the server's message is shown, or the mode's generic
    /// fallback when the server gave none.
    pub fn complete(&mut self, result: Result<Session, ApiError>) -> GatewayOutcome {
        match result {
            Ok(session) => {
                self.phase = GatewayPhase::Succeeded;
                self.password.clear();
                GatewayOutcome::Navigate(session)
            }
            Err(e) => {
                let msg = e
                    .server_message()
                    .unwrap_or_else(|| self.mode.fallback_error())
                    .to_string();
                tracing::info!(mode = ?self.mode, error = %e, "authentication failed");
                self.phase = GatewayPhase::Failed(msg.clone());
                GatewayOutcome::Stay(msg)
            }
        }
    }

    /// Gives up on the outstanding request without a server answer, e.g.
    /// when it could not be handed to the network layer.
    ///
    /// No-op unless `Submitting`.
    pub fn abort(&mut self, message: &str) {
        if self.is_submitting() {
            tracing::warn!(mode = ?self.mode, message, "submit aborted");
            self.phase = GatewayPhase::Failed(message.to_string());
        }
    }

    /// Appends a character to the focused input.
    pub fn push_char(&mut self, c: char) {
        if self.is_submitting() {
            return;
        }
        self.edited();
        self.focused_value_mut().push(c);
    }

    /// Removes the last character of the focused input.
    pub fn pop_char(&mut self) {
        if self.is_submitting() {
            return;
        }
        self.edited();
        self.focused_value_mut().pop();
    }

    /// Moves focus to the next input, wrapping around.
    pub fn focus_next(&mut self) {
        let fields = self.fields();
        let idx = fields.iter().position(|f| *f == self.focus).unwrap_or(0);
        self.focus = fields[(idx + 1) % fields.len()];
    }

    /// Moves focus to the previous input, wrapping around.
    pub fn focus_prev(&mut self) {
        let fields = self.fields();
        let idx = fields.iter().position(|f| *f == self.focus).unwrap_or(0);
        self.focus = fields[(idx + fields.len() - 1) % fields.len()];
    }

    fn edited(&mut self) {
        if matches!(
            self.phase,
            GatewayPhase::Rejected(_) | GatewayPhase::Failed(_) | GatewayPhase::Succeeded
        ) {
            self.phase = GatewayPhase::Idle;
        }
    }

    fn focused_value_mut(&mut self) -> &mut String {
        match self.focus {
            AuthField::Name => &mut self.name,
            AuthField::Email => &mut self.email,
            AuthField::Password => &mut self.password,
        }
    }
}
