use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use keyfind::ConfigLoadError;
use search::SearchError;
use serde::{Deserialize, Serialize};
use serde_json::json;

pub type ServerResult<T> = Result<T, ServerError>;

/// Server error types
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("{0}")]
    Search(#[from] SearchError),

    /// The path tail could not be read as a pattern at all (not UTF-8)
    #[error("invalid pattern: {0}")]
    MalformedPattern(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found")]
    NotFound,
}

/// API error response structure
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl ServerError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServerError::Search(err) if err.is_client_error() => StatusCode::BAD_REQUEST,
            ServerError::MalformedPattern(_) => StatusCode::BAD_REQUEST,
            ServerError::NotFound => StatusCode::NOT_FOUND,
            ServerError::Search(_) | ServerError::Internal(_) | ServerError::Config(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get error code string
    pub fn error_code(&self) -> &'static str {
        match self {
            ServerError::Search(SearchError::InvalidPattern { .. })
            | ServerError::MalformedPattern(_) => "INVALID_PATTERN",
            ServerError::Search(SearchError::ReferenceConstructionFailed { .. }) => {
                "KEY_REFERENCE_FAILED"
            }
            ServerError::Search(SearchError::StoreFetchFailed { .. }) => "STORE_FETCH_FAILED",
            ServerError::Internal(_) => "INTERNAL_ERROR",
            ServerError::Config(_) => "CONFIG_ERROR",
            ServerError::NotFound => "NOT_FOUND",
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code().to_string();
        let message = self.to_string();

        if status.is_server_error() {
            tracing::error!(code = %error_code, error = %message, "request_failed");
        }

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

impl From<ConfigLoadError> for ServerError {
    fn from(err: ConfigLoadError) -> Self {
        ServerError::Config(err.to_string())
    }
}

impl From<tokio::task::JoinError> for ServerError {
    fn from(err: tokio::task::JoinError) -> Self {
        ServerError::Internal(format!("search task failed: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use search::KeyPattern;

    fn invalid_pattern() -> ServerError {
        ServerError::Search(KeyPattern::compile("(").unwrap_err())
    }

    #[test]
    fn invalid_pattern_is_bad_request() {
        let err = invalid_pattern();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.error_code(), "INVALID_PATTERN");
    }

    #[test]
    fn store_failures_are_server_errors() {
        let fetch = ServerError::Search(SearchError::StoreFetchFailed {
            root: "/".into(),
            source: "offline".into(),
        });
        assert_eq!(fetch.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(fetch.error_code(), "STORE_FETCH_FAILED");

        let reference = ServerError::Search(SearchError::ReferenceConstructionFailed {
            path: "user:/bad".into(),
            source: "bad".into(),
        });
        assert_eq!(reference.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(reference.error_code(), "KEY_REFERENCE_FAILED");
    }

    #[test]
    fn malformed_pattern_shares_the_invalid_pattern_code() {
        let err = ServerError::MalformedPattern("not UTF-8".into());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.error_code(), "INVALID_PATTERN");
    }

    #[test]
    fn not_found_maps_to_404() {
        assert_eq!(ServerError::NotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ServerError::NotFound.error_code(), "NOT_FOUND");
    }
}
