//! Session handling: credentials, the login/register gateway, and the
//! persisted session token.
//!
//! The token is carried in an explicit [`Session`] value that callers pass
//! to every authenticated API call. Only [`TokenStore`] implementations
//! touch durable storage.

pub mod credentials;
pub mod gateway;

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;

pub use credentials::{LoginForm, RegisterForm, ValidationError};
pub use gateway::{
    AuthField, AuthMode, AuthRequest, GatewayError, GatewayOutcome, GatewayPhase,
    SessionGateway,
};

/// File name of the persisted token inside the token directory.
pub const TOKEN_FILE_NAME: &str = "session.token";

/// An authenticated session: the opaque token issued by the API.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    token: String,
}

impl Session {
    /// Wraps a token returned by `/user/login` or `/user/register`.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    /// The raw token.
    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session").field("token", &"<redacted>").finish()
    }
}

/// Errors from reading or writing the persisted token.
#[derive(Debug, thiserror::Error)]
pub enum TokenStoreError {
    /// The token file or its directory could not be accessed.
    #[error("token file {path}: {source}")]
    Io {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Durable storage for the single session token.
pub trait TokenStore: Send {
    /// Returns the stored session, if any.
    ///
    /// # Errors
    ///
    /// Returns [`TokenStoreError`] if storage exists but cannot be read.
    fn load(&self) -> Result<Option<Session>, TokenStoreError>;

    /// Replaces the stored session.
    ///
    /// # Errors
    ///
    /// Returns [`TokenStoreError`] if storage cannot be written.
    fn save(&self, session: &Session) -> Result<(), TokenStoreError>;

    /// Removes the stored session. Clearing an empty store is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`TokenStoreError`] if storage exists but cannot be removed.
    fn clear(&self) -> Result<(), TokenStoreError>;
}

impl<T: TokenStore + Sync + ?Sized> TokenStore for Arc<T> {
    fn load(&self) -> Result<Option<Session>, TokenStoreError> {
        (**self).load()
    }

    fn save(&self, session: &Session) -> Result<(), TokenStoreError> {
        (**self).save(session)
    }

    fn clear(&self) -> Result<(), TokenStoreError> {
        (**self).clear()
    }
}

/// Token stored as a single file named [`TOKEN_FILE_NAME`].
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    /// Stores the token in `dir/session.token`.
    #[must_use]
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            path: dir.join(TOKEN_FILE_NAME),
        }
    }

    /// Path of the token file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> TokenStoreError {
        TokenStoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<Session>, TokenStoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => {
                let token = contents.trim();
                Ok((!token.is_empty()).then(|| Session::new(token)))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(self.io_error(e)),
        }
    }

    fn save(&self, session: &Session) -> Result<(), TokenStoreError> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir).map_err(|e| self.io_error(e))?;
        }
        std::fs::write(&self.path, session.token()).map_err(|e| self.io_error(e))
    }

    fn clear(&self) -> Result<(), TokenStoreError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error(e)),
        }
    }
}

/// In-process token storage for tests and `--no-persist` runs.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    slot: Mutex<Option<Session>>,
}

impl MemoryTokenStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that already holds `session`.
    #[must_use]
    pub fn with_session(session: Session) -> Self {
        Self {
            slot: Mutex::new(Some(session)),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<Session>, TokenStoreError> {
        Ok(self.slot.lock().clone())
    }

    fn save(&self, session: &Session) -> Result<(), TokenStoreError> {
        *self.slot.lock() = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), TokenStoreError> {
        *self.slot.lock() = None;
        Ok(())
    }
}
