//! Auth error taxonomy
//!
//! Every failure coming out of the identity backend is turned into an
//! [`AuthError`] at the HTTP boundary. Views never show those messages raw;
//! they go through [`AuthError::user_message`], which maps each error onto a
//! small fixed set of user-facing texts.

use serde::{Deserialize, Serialize};

/// Used when the backend rejects a request without saying why
pub const DEFAULT_BACKEND_MESSAGE: &str = "Authentication failed";

/// Auth operation error types
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// The backend answered with an error body
    #[error("{message}")]
    Backend {
        message: String,
        code: Option<String>,
        status: Option<u16>,
    },

    /// The request never got a usable answer
    #[error("{0}")]
    Network(String),

    #[error("Unsupported provider: {0}")]
    UnsupportedProvider(String),

    #[error("No active session")]
    NoActiveSession,

    #[error("Cannot update profile: No user is currently logged in")]
    NotSignedIn,

    /// Rejected locally before reaching the backend
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unexpected(String),
}

impl AuthError {
    /// Backend rejection; an empty message becomes [`DEFAULT_BACKEND_MESSAGE`]
    pub fn backend(message: impl Into<String>, code: Option<String>, status: Option<u16>) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() {
            DEFAULT_BACKEND_MESSAGE.to_string()
        } else {
            message
        };
        AuthError::Backend {
            message,
            code,
            status,
        }
    }

    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Backend error code, when the backend sent one
    pub fn code(&self) -> Option<&str> {
        match self {
            AuthError::Backend { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            AuthError::Backend { status, .. } => *status,
            _ => None,
        }
    }

    pub fn kind(&self) -> AuthErrorKind {
        match self {
            AuthError::Backend {
                message, status, ..
            } => {
                if message.contains("Invalid login credentials") {
                    AuthErrorKind::InvalidCredentials
                } else if message.contains("Email not confirmed") {
                    AuthErrorKind::EmailNotConfirmed
                } else if *status == Some(429) {
                    AuthErrorKind::RateLimited
                } else {
                    AuthErrorKind::Generic
                }
            }
            AuthError::Network(_) => AuthErrorKind::Network,
            other => {
                let message = other.to_string();
                if ["fetch", "network", "connection"]
                    .iter()
                    .any(|needle| message.contains(needle))
                {
                    AuthErrorKind::Network
                } else {
                    AuthErrorKind::Generic
                }
            }
        }
    }

    /// Text suitable for showing to the user
    pub fn user_message(&self) -> String {
        match self.kind() {
            AuthErrorKind::Generic => {
                let message = self.to_string();
                if message.trim().is_empty() {
                    AuthErrorKind::Generic.default_message().to_string()
                } else {
                    message
                }
            }
            kind => kind.default_message().to_string(),
        }
    }
}

/// Coarse classification of an [`AuthError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthErrorKind {
    InvalidCredentials,
    EmailNotConfirmed,
    RateLimited,
    Network,
    Generic,
}

impl AuthErrorKind {
    pub fn default_message(self) -> &'static str {
        match self {
            AuthErrorKind::InvalidCredentials => "Invalid email or password",
            AuthErrorKind::EmailNotConfirmed => {
                "Please confirm your email address before logging in"
            }
            AuthErrorKind::RateLimited => "Too many attempts. Please try again later",
            AuthErrorKind::Network => "Network error. Please check your connection",
            AuthErrorKind::Generic => "Authentication failed. Please try again",
        }
    }
}

pub type AuthResult<T> = Result<T, AuthError>;
