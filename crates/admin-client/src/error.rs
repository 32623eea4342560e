//! Error types for building the HTTP transport.

use admin_core::ConsoleError;
use thiserror::Error;

/// Errors raised while configuring the HTTP client.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ClientError {
    /// The configured base URL cannot be parsed.
    #[error("invalid base URL {url}: {message}")]
    InvalidBaseUrl {
        /// The rejected URL.
        url: String,
        /// Parser message.
        message: String,
    },

    /// A request path cannot be resolved against the base URL.
    #[error("invalid request path {path}: {message}")]
    InvalidPath {
        /// The rejected path.
        path: String,
        /// Parser message.
        message: String,
    },

    /// The underlying HTTP client could not be created.
    #[error("failed to create HTTP client: {0}")]
    Build(String),
}

impl ClientError {
    /// Returns a user-friendly error message.
    #[must_use]
    pub fn user_message(&self) -> &str {
        match self {
            Self::InvalidBaseUrl { .. } => "The admin server address is not a valid URL.",
            Self::InvalidPath { .. } => "The admin server published an invalid path.",
            Self::Build(_) => "Could not set up the HTTP client.",
        }
    }
}

impl From<ClientError> for ConsoleError {
    fn from(err: ClientError) -> Self {
        Self::Transport(err.to_string())
    }
}

/// Result type alias for client setup.
pub type Result<T> = std::result::Result<T, ClientError>;
