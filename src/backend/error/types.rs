/**
 * Backend Error Types
 *
 * This module defines the error type returned by every HTTP handler.
 * Each variant corresponds to one class of failure that the client can act on.
 *
 * # Error Categories
 *
 * - `Validation` (400) - missing or empty required fields, missing file
 * - `Unauthenticated` (401) - missing, malformed, expired or superseded token; wrong password
 * - `NotFound` (404) - referenced user or channel does not exist
 * - `Conflict` (409) - username or email already in use
 * - `PayloadTooLarge` (413) - request body over the configured limit
 * - `Internal` (500) - persistence failure, token issuance failure
 * - `ServiceUnavailable` (503) - optional service (media host) not configured
 *
 * Internal causes are logged where they occur; only the message is returned.
 */

use axum::http::StatusCode;
use thiserror::Error;

/// Error returned by HTTP handlers
///
/// Converted to a `{ statusCode, message, success: false, errors: [] }` JSON
/// response by the `IntoResponse` implementation in `conversion`.
///
/// # Usage
///
/// ```rust
/// use streamhub::backend::error::ApiError;
///
/// let err = ApiError::validation("All fields are required");
/// assert_eq!(err.status_code().as_u16(), 400);
/// ```
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Request input is missing or malformed
    #[error("{message}")]
    Validation {
        /// Human-readable error message
        message: String,
    },

    /// Request is not backed by a valid credential
    #[error("{message}")]
    Unauthenticated {
        /// Human-readable error message
        message: String,
    },

    /// Referenced resource does not exist
    #[error("{message}")]
    NotFound {
        /// Human-readable error message
        message: String,
    },

    /// Unique field already taken
    #[error("{message}")]
    Conflict {
        /// Human-readable error message
        message: String,
    },

    /// Request body exceeds the body limit
    #[error("{message}")]
    PayloadTooLarge {
        /// Human-readable error message
        message: String,
    },

    /// Unexpected server-side failure
    #[error("{message}")]
    Internal {
        /// Human-readable error message
        message: String,
    },

    /// An optional collaborator is not configured
    #[error("{message}")]
    ServiceUnavailable {
        /// Human-readable error message
        message: String,
    },
}

impl ApiError {
    /// Create a new validation error (400)
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new authentication error (401)
    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::Unauthenticated {
            message: message.into(),
        }
    }

    /// Create a new not-found error (404)
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create a new conflict error (409)
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Create a new payload-too-large error (413)
    pub fn payload_too_large(message: impl Into<String>) -> Self {
        Self::PayloadTooLarge {
            message: message.into(),
        }
    }

    /// Create a new internal error (500)
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Create a new service-unavailable error (503)
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::ServiceUnavailable {
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::Unauthenticated { .. } => StatusCode::UNAUTHORIZED,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        match self {
            Self::Validation { message }
            | Self::Unauthenticated { message }
            | Self::NotFound { message }
            | Self::Conflict { message }
            | Self::PayloadTooLarge { message }
            | Self::Internal { message }
            | Self::ServiceUnavailable { message } => message,
        }
    }
}
