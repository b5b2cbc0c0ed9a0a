/**
 * Change Password Handler
 *
 * POST /api/v1/users/change-password. Verifies the old password and stores
 * a hash of the new one. Only the password hash is written; the rest of the
 * user record is left as it is.
 */

use axum::extract::State;
use serde_json::{json, Value};

use crate::backend::auth::handlers::types::{ApiResponse, ChangePasswordRequest};
use crate::backend::auth::users::UserUpdate;
use crate::backend::error::ApiError;
use crate::backend::middleware::{AuthUser, JsonBody};
use crate::backend::server::state::AppState;

/// Change password handler
///
/// # Errors
///
/// * `400 Bad Request` - blank old or new password
/// * `401 Unauthorized` - old password does not match
pub async fn change_password(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    JsonBody(request): JsonBody<ChangePasswordRequest>,
) -> Result<ApiResponse<Value>, ApiError> {
    if request.old_password.is_empty() || request.new_password.is_empty() {
        return Err(ApiError::validation("old and new password are required"));
    }

    let user = state
        .users
        .find_by_id(caller.id)
        .await?
        .ok_or_else(|| ApiError::not_found("user not found"))?;

    if !bcrypt::verify(&request.old_password, &user.password_hash)? {
        tracing::warn!("Wrong old password for user: {}", user.username);
        return Err(ApiError::unauthenticated("invalid old password"));
    }

    let password_hash = bcrypt::hash(&request.new_password, state.bcrypt_cost)?;
    state
        .users
        .update_partial(user.id, UserUpdate::password_hash(password_hash))
        .await?;

    tracing::info!("Password changed for user: {}", user.username);

    Ok(ApiResponse::ok(json!({}), "password changed successfully"))
}
