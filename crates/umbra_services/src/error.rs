//! Backend errors

use thiserror::Error;

/// Backend interface errors
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),

    #[error("{message}")]
    Http { status: u16, message: String },

    #[error("Not authenticated")]
    Unauthenticated,

    #[error("Invalid response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Transport error: {0}")]
    Transport(String),
}

/// Result type for backend operations
pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    /// Build an error from a non-success response.
    ///
    /// Uses the body's `message` field when there is one.
    pub fn from_response(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|value| value.get("message")?.as_str().map(str::to_string))
            .filter(|message| !message.is_empty())
            .unwrap_or_else(|| format!("HTTP error! status: {}", status));

        Self::Http { status, message }
    }

    /// HTTP status, if the server answered
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The request was rejected for missing or bad credentials
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::Unauthenticated) || matches!(self.status(), Some(401 | 403))
    }
}
