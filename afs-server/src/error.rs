//! Error types for afs-server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// afs-common error that is not a caller mistake (database, io, config)
    #[error("Common error: {0}")]
    Common(afs_common::Error),
}

impl From<afs_common::Error> for ApiError {
    fn from(err: afs_common::Error) -> Self {
        match err {
            afs_common::Error::NotFound(msg) => ApiError::NotFound(msg),
            afs_common::Error::InvalidInput(msg) => ApiError::BadRequest(msg),
            other => ApiError::Common(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::Common(ref err) => {
                let code = match err {
                    afs_common::Error::Database(_) => "DATABASE_ERROR",
                    _ => "COMMON_ERROR",
                };
                (StatusCode::INTERNAL_SERVER_ERROR, code, err.to_string())
            }
        };

        if status.is_server_error() {
            tracing::error!("{}: {}", error_code, message);
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

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_errors_map_to_status() {
        let cases = [
            (afs_common::Error::NotFound("x".into()), StatusCode::NOT_FOUND),
            (afs_common::Error::InvalidInput("x".into()), StatusCode::BAD_REQUEST),
            (afs_common::Error::Internal("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (
                afs_common::Error::Database(sqlx::Error::PoolTimedOut),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(ApiError::from(err).into_response().status(), status);
        }
    }
}
