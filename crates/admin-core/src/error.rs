//! Error types for console operations.

use admin_model::ModelError;
use thiserror::Error;

/// Errors raised while talking to the admin backend or driving the console.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConsoleError {
    /// The request never produced a response.
    #[error("network error: {0}")]
    Transport(String),

    /// The backend answered with a non-200 status.
    #[error("request failed ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Message from the `error` field, the body text or the status text.
        message: String,
    },

    /// A value was withheld by client-side coercion.
    #[error("invalid value for {field}")]
    Rejected { field: String },

    /// Field metadata or value conversion failed.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// A sequential action stopped at its first failure.
    #[error("{action} fail : {message} ({remaining} not processed)")]
    BatchAborted {
        action: String,
        message: String,
        /// Keys processed successfully before the failure.
        completed: usize,
        /// Keys never attempted, including the failing one.
        remaining: usize,
    },

    #[error("unknown object: {0}")]
    UnknownObject(String),

    #[error("unknown action: {0}")]
    UnknownAction(String),

    #[error("no object is active")]
    NoActiveObject,

    #[error("no row at index {0}")]
    RowOutOfRange(usize),

    #[error("no edit form is open")]
    NoEditSession,

    #[error("field {0} is not part of the form")]
    UnknownField(String),

    #[error("no action is waiting for confirmation")]
    NoPendingAction,

    #[error("no rows are selected")]
    NothingSelected,

    /// The response body could not be decoded.
    #[error("invalid response: {0}")]
    Decode(String),
}

impl ConsoleError {
    /// Returns a short message suitable for a notice.
    #[must_use]
    pub fn user_message(&self) -> &str {
        match self {
            Self::Transport(_) => "Could not reach the admin server. Please check the connection.",
            Self::Api { message, .. } | Self::BatchAborted { message, .. } => message,
            Self::Rejected { .. } | Self::Model(_) => "Some values are not valid.",
            Self::UnknownObject(_) | Self::NoActiveObject => "Select an object first.",
            Self::NoEditSession | Self::UnknownField(_) => "Open a form first.",
            Self::UnknownAction(_) | Self::NoPendingAction => "Nothing to confirm.",
            Self::NothingSelected | Self::RowOutOfRange(_) => "Select at least one row.",
            Self::Decode(_) => "The server sent an unexpected response.",
        }
    }

    /// Returns whether this error is potentially recoverable with a retry.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Api { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

impl From<serde_json::Error> for ConsoleError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

/// Result type alias for console operations.
pub type Result<T> = std::result::Result<T, ConsoleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_messages() {
        let err = ConsoleError::Api {
            status: 400,
            message: "email is required".to_string(),
        };
        assert_eq!(err.user_message(), "email is required");
        assert!(
            ConsoleError::Transport("refused".to_string())
                .user_message()
                .contains("connection")
        );
    }

    #[test]
    fn test_retryable() {
        assert!(ConsoleError::Transport("timeout".to_string()).is_retryable());
        assert!(
            ConsoleError::Api {
                status: 502,
                message: String::new()
            }
            .is_retryable()
        );
        assert!(
            !ConsoleError::Api {
                status: 403,
                message: String::new()
            }
            .is_retryable()
        );
        assert!(!ConsoleError::NoEditSession.is_retryable());
    }

    #[test]
    fn test_batch_abort_counts_unprocessed() {
        let err = ConsoleError::BatchAborted {
            action: "Export".to_string(),
            message: "boom".to_string(),
            completed: 1,
            remaining: 3,
        };
        assert_eq!(err.to_string(), "Export fail : boom (3 not processed)");
        assert_eq!(err.user_message(), "boom");
    }
}
