//! Hermes REST backend client.
//!
//! # Architecture
//!
//! - The backend is the source of truth - NO local sync, direct API calls
//! - One client method per backend endpoint under `/api/v1`
//! - Bearer token attached per call when the caller's session holds one
//! - In-memory caching via `moka` for the profile record only (60 second
//!   TTL, invalidated after every successful profile mutation)
//! - No retries, no backoff: a failed call surfaces immediately and the
//!   page the user came from reports it
//!
//! # Example
//!
//! ```rust,ignore
//! use hermes_web::api::ApiClient;
//!
//! let api = ApiClient::new("http://localhost:8080");
//!
//! // Sign in and use the returned token for protected calls
//! let session = api.login(&credentials).await?;
//! let trips = api.my_trips(&session.token).await?;
//! ```

mod client;
mod types;

pub use client::ApiClient;
pub use types::*;

use thiserror::Error;

/// Errors that can occur when calling the Hermes backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response (DNS, connect, I/O).
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered with a non-success status. The message is
    /// whatever the backend put in the body's `error` (or `message`) field,
    /// falling back to the bare status code.
    #[error("{message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Message extracted from the response body.
        message: String,
    },

    /// The response body was not the JSON we expected.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The backend answered 2xx with no body where one was expected.
    #[error("empty response where a body was expected")]
    EmptyBody,
}

impl ApiError {
    /// The HTTP status of a [`ApiError::Status`] response, if that's what
    /// this error is.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the backend rejected the bearer token.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Status { status: 401, .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_displays_backend_message() {
        let err = ApiError::Status {
            status: 400,
            message: "Seats already taken".to_string(),
        };
        assert_eq!(err.to_string(), "Seats already taken");
        assert_eq!(err.status(), Some(400));
    }

    #[test]
    fn test_is_unauthorized() {
        let err = ApiError::Status {
            status: 401,
            message: "Invalid or expired token".to_string(),
        };
        assert!(err.is_unauthorized());

        let err = ApiError::Status {
            status: 404,
            message: "not found".to_string(),
        };
        assert!(!err.is_unauthorized());
    }
}
