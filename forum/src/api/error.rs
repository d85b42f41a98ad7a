//! Error taxonomy for backend calls.

use thiserror::Error;

/// Failure of a single backend request.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response (connection refused, timeout, ...).
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },

    /// The stored session token is no longer valid.
    #[error("session timed out")]
    SessionExpired,

    /// The response body did not match the expected schema.
    #[error("invalid response from {endpoint}: {reason}")]
    Decode { endpoint: String, reason: String },

    /// Rejected on the client before any request was made.
    #[error("{0}")]
    Validation(String),
}

impl ApiError {
    pub const fn is_session_expired(&self) -> bool {
        matches!(self, Self::SessionExpired)
    }

    /// Status code carried by the error, if the backend answered at all.
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Legacy backends answer an expired session with this literal body.
const SESSION_TIMEOUT_BODY: &str = "session timedout";

/// Whether a response body is the legacy "session timed out" marker.
///
/// The body may arrive as bare text or as a JSON string literal.
pub(crate) fn is_session_timeout_body(body: &str) -> bool {
    let trimmed = body.trim();
    let unquoted = serde_json::from_str::<String>(trimmed).unwrap_or_else(|_| trimmed.to_string());
    unquoted.trim().eq_ignore_ascii_case(SESSION_TIMEOUT_BODY)
}
