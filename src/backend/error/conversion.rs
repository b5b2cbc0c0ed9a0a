/**
 * Error Conversion
 *
 * This module turns `ApiError` into HTTP responses and lifts the errors of
 * the lower layers (user store, token manager, media host, password hashing)
 * into `ApiError`.
 *
 * Axum's own body rejections (JSON, multipart, raw bytes) are lifted too, so
 * a malformed or oversized body gets the same JSON shape as any other error.
 *
 * # Response Format
 *
 * ```json
 * {
 *   "statusCode": 401,
 *   "message": "invalid access token",
 *   "success": false,
 *   "errors": []
 * }
 * ```
 */

use axum::{
    extract::multipart::{MultipartError, MultipartRejection},
    extract::rejection::{BytesRejection, JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};

use crate::backend::auth::sessions::AuthError;
use crate::backend::auth::users::StoreError;
use crate::backend::error::types::ApiError;
use crate::backend::media::MediaError;

/// Message returned when the token pair cannot be minted or persisted
pub const TOKEN_ISSUANCE_FAILED: &str =
    "something went wrong while generating access and refresh token";

/// Message for a body that cannot be parsed
pub const INVALID_REQUEST_BODY: &str = "invalid request body";

/// Message for a body over the size limit
pub const REQUEST_BODY_TOO_LARGE: &str = "request body is too large";

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), "Request failed: {}", self.message());
        } else {
            tracing::debug!(status = status.as_u16(), "Request rejected: {}", self.message());
        }

        let body = serde_json::json!({
            "statusCode": status.as_u16(),
            "message": self.message(),
            "success": false,
            "errors": [],
        });

        (status, Json(body)).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => ApiError::not_found("user not found"),
            StoreError::Duplicate(field) => ApiError::conflict(format!("{} is already taken", field)),
            StoreError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                ApiError::internal("internal server error")
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Unauthenticated(message) => ApiError::unauthenticated(message),
            // By the time a pair is issued the user is known to exist, so a
            // missing record here is a server fault.
            AuthError::UserNotFound | AuthError::TokenIssuance => {
                ApiError::internal(TOKEN_ISSUANCE_FAILED)
            }
            AuthError::Store(e) => e.into(),
        }
    }
}

impl From<MediaError> for ApiError {
    fn from(err: MediaError) -> Self {
        match err {
            MediaError::NotConfigured => ApiError::unavailable("media host not configured"),
            other => {
                tracing::error!("Media host error: {:?}", other);
                ApiError::internal("error while talking to the media host")
            }
        }
    }
}

impl From<bcrypt::BcryptError> for ApiError {
    fn from(err: bcrypt::BcryptError) -> Self {
        tracing::error!("Password hashing error: {:?}", err);
        ApiError::internal("internal server error")
    }
}

/// Keep a 413 from axum, everything else is the client's malformed body
fn body_rejection(status: StatusCode, detail: String) -> ApiError {
    tracing::debug!(status = status.as_u16(), "Rejected request body: {}", detail);
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::payload_too_large(REQUEST_BODY_TOO_LARGE)
    } else {
        ApiError::validation(INVALID_REQUEST_BODY)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        body_rejection(rejection.status(), rejection.body_text())
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        body_rejection(rejection.status(), rejection.body_text())
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        body_rejection(err.status(), err.body_text())
    }
}

impl From<BytesRejection> for ApiError {
    fn from(rejection: BytesRejection) -> Self {
        body_rejection(rejection.status(), rejection.body_text())
    }
}
