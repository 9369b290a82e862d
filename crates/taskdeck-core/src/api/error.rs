use thiserror::Error;

use super::in_flight::Operation;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid login credentials")]
    InvalidCredentials,

    #[error("Sign-up failed: {0}")]
    SignupFailed(String),

    #[error("Unauthenticated - profile request rejected")]
    Unauthenticated,

    #[error("Unauthorized - token may be stale")]
    Unauthorized,

    #[error("No access token stored - log in first")]
    MissingToken,

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Server rejected logout (status {status}); local session was cleared")]
    LogoutRejected { status: u16 },

    #[error("A {0} request is already in flight")]
    RequestInFlight(Operation),

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Rate limited - please wait before retrying")]
    RateLimited,

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Unexpected status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    pub(crate) fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            return body.to_string();
        }
        let mut end = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
    }

    /// Generic mapping for endpoints without an operation-specific failure.
    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let truncated = Self::truncate_body(body);
        match status.as_u16() {
            401 => ApiError::Unauthorized,
            403 => ApiError::AccessDenied(truncated),
            404 => ApiError::NotFound(truncated),
            429 => ApiError::RateLimited,
            500..=599 => ApiError::ServerError(truncated),
            code => ApiError::UnexpectedStatus {
                status: code,
                body: truncated,
            },
        }
    }

    /// True for failures caused by the server refusing the bearer token.
    pub fn is_auth_rejection(&self) -> bool {
        matches!(self, ApiError::Unauthorized | ApiError::Unauthenticated)
    }
}
