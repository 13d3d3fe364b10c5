//! Error types for backend calls

use http::StatusCode;
use thiserror::Error;

/// Result type alias for client operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur while talking to the backend
#[derive(Error, Debug)]
pub enum ClientError {
    /// The request never got a response
    #[error("Network error: {0}")]
    Transport(#[source] reqwest::Error),

    /// The backend answered with a non-2xx status
    #[error("{}", .message.as_deref().unwrap_or_else(|| status_text(*.status)))]
    Api {
        /// HTTP status
        status: StatusCode,
        /// `message` from the JSON body, when there was one
        message: Option<String>,
    },

    /// The backend answered 2xx but reported `success: false`
    #[error("{}", .message.as_deref().unwrap_or("Request was rejected"))]
    Rejected {
        /// Backend message, when present
        message: Option<String>,
    },

    /// The session is gone; the caller should route to login
    #[error("{}", .message.as_deref().unwrap_or("Session expired, please log in again"))]
    Unauthorized {
        /// Backend message, when present
        message: Option<String>,
    },

    /// A 2xx body did not have the expected shape
    #[error("Unexpected response from server: {0}")]
    Decode(String),

    /// The request could not be built
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Local file access failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Client-side validation failed; nothing was sent
    #[error(transparent)]
    Validation(#[from] storedesk_core::Error),
}

fn status_text(status: StatusCode) -> &'static str {
    status.canonical_reason().unwrap_or("Request failed")
}

impl ClientError {
    /// Backend-provided message, if the backend sent one
    #[must_use]
    pub fn backend_message(&self) -> Option<&str> {
        match self {
            Self::Api { message, .. }
            | Self::Rejected { message }
            | Self::Unauthorized { message } => message.as_deref().filter(|m| !m.trim().is_empty()),
            _ => None,
        }
    }

    /// Message to show an admin: the backend's own words, else `fallback`
    ///
    /// Validation failures always show their own text since nothing was sent.
    #[must_use]
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Validation(err) => err.to_string(),
            _ => self
                .backend_message()
                .map_or_else(|| fallback.to_string(), ToString::to_string),
        }
    }

    /// Backend message or the HTTP status text, for views that show either
    #[must_use]
    pub fn message_or_status_text(&self) -> String {
        match self {
            Self::Api { status, message } => message
                .as_deref()
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| status_text(*status))
                .to_string(),
            other => other.to_string(),
        }
    }

    /// HTTP status, when the backend answered
    #[must_use]
    pub const fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Unauthorized { .. } => Some(StatusCode::UNAUTHORIZED),
            _ => None,
        }
    }

    /// Whether the caller should send the admin back to login
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }
}
