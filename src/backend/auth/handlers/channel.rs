/**
 * Channel Profile Handler
 *
 * GET /api/v1/users/c/{username}. Public view of a user as a channel, with
 * subscriber counts and whether the caller is subscribed.
 */

use std::sync::Arc;

use axum::extract::{Path, State};

use crate::backend::auth::handlers::types::ApiResponse;
use crate::backend::auth::users::{ChannelProfile, UserStore};
use crate::backend::error::ApiError;
use crate::backend::middleware::AuthUser;

/// Channel profile handler
///
/// # Errors
///
/// * `400 Bad Request` - blank username
/// * `404 Not Found` - no such channel
pub async fn channel_profile(
    State(users): State<Arc<dyn UserStore>>,
    AuthUser(viewer): AuthUser,
    Path(username): Path<String>,
) -> Result<ApiResponse<ChannelProfile>, ApiError> {
    let username = username.trim().to_lowercase();
    if username.is_empty() {
        return Err(ApiError::validation("username is missing"));
    }

    let profile = users
        .channel_profile(&username, viewer.id)
        .await?
        .ok_or_else(|| ApiError::not_found("channel does not exist"))?;

    Ok(ApiResponse::ok(profile, "user channel fetched successfully"))
}
