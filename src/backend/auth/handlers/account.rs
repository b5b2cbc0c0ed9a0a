/**
 * Update Account Handler
 *
 * PATCH /api/v1/users/update-account. Updates `fullName` and/or `email`.
 * Absent or blank fields are left untouched; at least one must be given.
 */

use std::sync::Arc;

use axum::extract::State;

use crate::backend::auth::handlers::types::{non_blank, ApiResponse, UpdateAccountRequest};
use crate::backend::auth::users::{PublicUser, UserStore, UserUpdate};
use crate::backend::error::ApiError;
use crate::backend::middleware::{AuthUser, JsonBody};

/// Update account handler
///
/// # Errors
///
/// * `400 Bad Request` - nothing to update, or an invalid email
/// * `409 Conflict` - email already used by another account
pub async fn update_account(
    State(users): State<Arc<dyn UserStore>>,
    AuthUser(caller): AuthUser,
    JsonBody(request): JsonBody<UpdateAccountRequest>,
) -> Result<ApiResponse<PublicUser>, ApiError> {
    let update = UserUpdate {
        full_name: non_blank(request.full_name.as_deref()),
        email: non_blank(request.email.as_deref()).map(|e| e.to_lowercase()),
        ..Default::default()
    };

    if update.is_empty() {
        return Err(ApiError::validation("fullName or email is required"));
    }
    if update.email.as_deref().is_some_and(|email| !email.contains('@')) {
        return Err(ApiError::validation("invalid email format"));
    }

    let user = users.update_partial(caller.id, update).await?;

    tracing::info!("Account details updated for user: {}", user.username);

    Ok(ApiResponse::ok(
        PublicUser::from(user),
        "account details updated successfully",
    ))
}
