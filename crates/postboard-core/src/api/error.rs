use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

use crate::auth::StorageError;
use crate::validation::ValidationError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Unauthorized - token may be missing or expired")]
    Unauthorized,

    #[error("Request rejected ({status}): {}", message.as_deref().unwrap_or("no message"))]
    Rejected {
        status: StatusCode,
        message: Option<String>,
    },

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Request timed out")]
    Timeout,

    #[error("Request cancelled")]
    Cancelled,

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

pub const NETWORK_ERROR_MESSAGE: &str = "A network error occurred. Please try again.";
pub const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired. Please log in again.";
pub const GENERIC_FAILURE_MESSAGE: &str = "The request failed. Please try again.";

/// Error body shape used by the backend: `{ "status": 400, "message": "..." }`
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
        }
    }

    /// The server's `message` field, if the body carries one
    pub fn server_message(body: &str) -> Option<String> {
        serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.message)
            .filter(|m| !m.trim().is_empty())
            .map(|m| Self::truncate_body(&m))
    }

    pub fn from_status(status: StatusCode, body: &str) -> Self {
        match status.as_u16() {
            401 => ApiError::Unauthorized,
            _ => ApiError::Rejected {
                status,
                message: Self::server_message(body),
            },
        }
    }

    /// Map a transport failure from reqwest
    pub fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout
        } else {
            ApiError::NetworkError(err)
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ApiError::NetworkError(_) | ApiError::Timeout | ApiError::Cancelled
        )
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Unauthorized | ApiError::InvalidCredentials => Some(StatusCode::UNAUTHORIZED),
            ApiError::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Message to show the user for a failed action
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Validation(e) => e.to_string(),
            ApiError::InvalidCredentials => self.to_string(),
            ApiError::Unauthorized => SESSION_EXPIRED_MESSAGE.to_string(),
            ApiError::Rejected { message, .. } => message
                .clone()
                .unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string()),
            ApiError::NetworkError(_) | ApiError::Timeout | ApiError::Cancelled => {
                NETWORK_ERROR_MESSAGE.to_string()
            }
            ApiError::InvalidResponse(_) | ApiError::InvalidRequest(_) | ApiError::Storage(_) => {
                GENERIC_FAILURE_MESSAGE.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_unauthorized() {
        let err = ApiError::from_status(StatusCode::UNAUTHORIZED, "");
        assert!(matches!(err, ApiError::Unauthorized));
        assert_eq!(err.user_message(), SESSION_EXPIRED_MESSAGE);
    }

    #[test]
    fn test_server_message_shown_verbatim() {
        let err = ApiError::from_status(
            StatusCode::BAD_REQUEST,
            r#"{"status": 400, "message": "Email already registered"}"#,
        );
        assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));
        assert_eq!(err.user_message(), "Email already registered");
    }

    #[test]
    fn test_missing_message_falls_back() {
        let err = ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, "<html>oops</html>");
        assert_eq!(err.user_message(), GENERIC_FAILURE_MESSAGE);

        let err = ApiError::from_status(StatusCode::FORBIDDEN, r#"{"message": "  "}"#);
        assert_eq!(err.user_message(), GENERIC_FAILURE_MESSAGE);
    }

    #[test]
    fn test_invalid_credentials_distinct_from_generic() {
        let err = ApiError::InvalidCredentials;
        assert_ne!(err.user_message(), GENERIC_FAILURE_MESSAGE);
        assert_ne!(err.user_message(), SESSION_EXPIRED_MESSAGE);
    }

    #[test]
    fn test_transport_errors_share_connectivity_message() {
        assert!(ApiError::Timeout.is_transport());
        assert!(ApiError::Cancelled.is_transport());
        assert_eq!(ApiError::Timeout.user_message(), NETWORK_ERROR_MESSAGE);
        assert!(!ApiError::Unauthorized.is_transport());
    }

    #[test]
    fn test_truncate_long_message() {
        let long = "é".repeat(400);
        let body = format!(r#"{{"message": "{}"}}"#, long);
        let message = ApiError::server_message(&body).unwrap();
        assert!(message.contains("truncated"));
    }
}
