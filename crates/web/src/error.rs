//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. Route handlers return `Result<T, AppError>` for
//! page-load failures; action handlers usually redirect with a flash message
//! instead, so the form stays usable.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::api::ApiError;
use crate::storage::AvatarError;

/// Application-level error type for the web frontend.
#[derive(Debug, Error)]
pub enum AppError {
    /// Backend API call failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Session read/write failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Avatar store operation failed.
    #[error("Storage error: {0}")]
    Storage(#[from] AvatarError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Whether this error is the frontend's fault rather than bad input or
    /// an upstream rejection. These are the ones worth waking someone up
    /// for, so they are the ones captured to Sentry.
    const fn is_server_fault(&self) -> bool {
        match self {
            Self::Session(_) | Self::Storage(_) | Self::Internal(_) => true,
            Self::Api(api) => matches!(
                api,
                ApiError::Transport(_) | ApiError::Parse(_) | ApiError::EmptyBody
            ),
            _ => false,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.is_server_fault() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = match &self {
            Self::Api(api) => match api.status() {
                Some(404) => StatusCode::NOT_FOUND,
                Some(401) => StatusCode::UNAUTHORIZED,
                Some(s) if s < 500 => StatusCode::BAD_REQUEST,
                _ => StatusCode::BAD_GATEWAY,
            },
            Self::Session(_) | Self::Storage(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        };

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Api(api) => match api {
                ApiError::Status { message, .. } => message.clone(),
                _ => "Upstream service error".to_string(),
            },
            Self::Session(_) | Self::Storage(_) | Self::Internal(_) => {
                "Internal server error".to_string()
            }
            _ => self.to_string(),
        };

        (status, message).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("trip 123".to_string());
        assert_eq!(err.to_string(), "Not found: trip 123");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Unauthorized("test".to_string())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_backend_statuses_map_through() {
        let not_found = AppError::Api(ApiError::Status {
            status: 404,
            message: "Trip not found".to_string(),
        });
        assert_eq!(get_status(not_found), StatusCode::NOT_FOUND);

        let unauthorized = AppError::Api(ApiError::Status {
            status: 401,
            message: "Invalid or expired token".to_string(),
        });
        assert_eq!(get_status(unauthorized), StatusCode::UNAUTHORIZED);

        let rejected = AppError::Api(ApiError::Status {
            status: 400,
            message: "No seats left".to_string(),
        });
        assert_eq!(get_status(rejected), StatusCode::BAD_REQUEST);

        let upstream_down = AppError::Api(ApiError::Status {
            status: 500,
            message: "HTTP 500".to_string(),
        });
        assert_eq!(get_status(upstream_down), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_backend_message_is_surfaced() {
        let err = AppError::Api(ApiError::Status {
            status: 400,
            message: "Review already exists".to_string(),
        });
        assert_eq!(err.to_string(), "API error: Review already exists");
    }
}
