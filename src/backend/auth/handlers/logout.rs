/**
 * Logout Handler
 *
 * POST /api/v1/users/logout. Revokes the caller's refresh token and clears
 * both session cookies. Access tokens already handed out stay valid until
 * they expire.
 */

use std::sync::Arc;

use axum::extract::State;
use serde_json::{json, Value};

use crate::backend::auth::cookies::{cleared_cookies, SessionCookies};
use crate::backend::auth::handlers::types::ApiResponse;
use crate::backend::auth::sessions::TokenManager;
use crate::backend::error::ApiError;
use crate::backend::middleware::AuthUser;

/// Logout handler
pub async fn logout(
    State(tokens): State<Arc<TokenManager>>,
    AuthUser(user): AuthUser,
) -> Result<(SessionCookies, ApiResponse<Value>), ApiError> {
    tokens.invalidate(user.id).await?;

    tracing::info!("User logged out: {}", user.username);

    Ok((cleared_cookies(), ApiResponse::ok(json!({}), "user logged out")))
}
