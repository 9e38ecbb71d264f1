/// Error types for the post service
///
/// This module defines the closed set of failures the service can surface.
/// Errors are converted to appropriate HTTP responses for API clients.
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use thiserror::Error;

/// Result type for post-service operations
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error types
#[derive(Debug, Error)]
pub enum AppError {
    /// Post ID does not exist in the store
    #[error("no post with this id")]
    NoSuchPost,

    /// Store I/O failed or a store operation timed out
    #[error("post store unavailable: {0}")]
    StoreUnavailable(String),

    /// Requester is not allowed to perform the operation
    #[error("no permission to modify this post")]
    PermissionDenied,

    /// Request arrived without a resolved user identity
    #[error("unauthorized")]
    Unauthorized,

    /// Malformed request body
    #[error("{0}")]
    InvalidInput(String),

    /// Insert collided with an existing post ID
    #[error("post with this id already exists")]
    DuplicateId,
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NoSuchPost => StatusCode::NOT_FOUND,
            AppError::StoreUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::PermissionDenied => StatusCode::FORBIDDEN,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::DuplicateId => StatusCode::CONFLICT,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "message": self.to_string(),
        }))
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => AppError::NoSuchPost,
            sqlx::Error::Database(db) if db.is_unique_violation() => AppError::DuplicateId,
            _ => AppError::StoreUnavailable(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_the_taxonomy() {
        assert_eq!(AppError::NoSuchPost.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::StoreUnavailable("down".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::PermissionDenied.status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(AppError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AppError::InvalidInput("bad".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AppError::DuplicateId.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn row_not_found_maps_to_no_such_post() {
        let err: AppError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, AppError::NoSuchPost));
    }
}
