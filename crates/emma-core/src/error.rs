//! Error types for the Emma add-on
//!
//! This module defines all error types used throughout the crate.

use thiserror::Error;

/// Result type alias for add-on operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the Emma add-on
#[derive(Error, Debug)]
pub enum Error {
    /// The remote service answered with a non-success HTTP status
    #[error("Emma API error ({status}): {message}")]
    Api {
        /// HTTP status code returned by the service
        status: u16,
        /// Error message
        message: String,
    },

    /// The request never produced an HTTP status (DNS, connect, timeout)
    #[error("Transport error: {0}")]
    Transport(String),

    /// The service answered with a body we could not interpret
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    /// Resolved email address is empty or malformed
    #[error("Invalid email address: '{0}'")]
    InvalidEmail(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Settings store errors
    #[error("Settings store error: {0}")]
    SettingsStore(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a remote API error carrying an HTTP status
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create an unexpected-response error
    pub fn unexpected_response(msg: impl Into<String>) -> Self {
        Self::UnexpectedResponse(msg.into())
    }

    /// Create an invalid email error
    pub fn invalid_email(email: impl Into<String>) -> Self {
        Self::InvalidEmail(email.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a settings store error
    pub fn settings_store(msg: impl Into<String>) -> Self {
        Self::SettingsStore(msg.into())
    }

    /// HTTP status carried by a remote fault, if any
    pub fn http_status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Remote rejected the credentials (HTTP 401)
    pub fn is_unauthorized(&self) -> bool {
        self.http_status() == Some(401)
    }

    /// Credentials authenticate but the account is not accessible (HTTP 403)
    pub fn is_forbidden(&self) -> bool {
        self.http_status() == Some(403)
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
