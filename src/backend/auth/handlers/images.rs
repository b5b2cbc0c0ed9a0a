/**
 * Profile Image Handlers
 *
 * PATCH /api/v1/users/avatar and PATCH /api/v1/users/cover-image.
 *
 * Both follow the same sequence:
 * 1. Stage the multipart file part (`avatar` or `coverImage`)
 * 2. Upload it to the media host
 * 3. Point the user record at the new URL and reference
 * 4. Delete the previous file from the media host, best effort
 *
 * The old file is only removed once the record no longer refers to it, so a
 * failed upload or store write never leaves the user with a dangling image.
 */

use axum::extract::{Multipart, State};

use crate::backend::auth::handlers::types::ApiResponse;
use crate::backend::auth::users::{PublicUser, UserUpdate};
use crate::backend::error::ApiError;
use crate::backend::media::{discard_remote, upload_and_discard, UploadForm};
use crate::backend::middleware::{AuthUser, MultipartBody};
use crate::backend::server::state::AppState;

/// Which profile image a request replaces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSlot {
    Avatar,
    CoverImage,
}

impl ImageSlot {
    /// Multipart field carrying the file
    pub fn field(self) -> &'static str {
        match self {
            Self::Avatar => "avatar",
            Self::CoverImage => "coverImage",
        }
    }

    fn missing_message(self) -> &'static str {
        match self {
            Self::Avatar => "avatar file is missing",
            Self::CoverImage => "cover image file is missing",
        }
    }

    fn success_message(self) -> &'static str {
        match self {
            Self::Avatar => "avatar image updated successfully",
            Self::CoverImage => "cover image updated successfully",
        }
    }
}

/// Update avatar handler
pub async fn update_avatar(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    MultipartBody(multipart): MultipartBody,
) -> Result<ApiResponse<PublicUser>, ApiError> {
    replace_image(&state, &caller, multipart, ImageSlot::Avatar).await
}

/// Update cover image handler
pub async fn update_cover_image(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    MultipartBody(multipart): MultipartBody,
) -> Result<ApiResponse<PublicUser>, ApiError> {
    replace_image(&state, &caller, multipart, ImageSlot::CoverImage).await
}

async fn replace_image(
    state: &AppState,
    caller: &PublicUser,
    multipart: Multipart,
    slot: ImageSlot,
) -> Result<ApiResponse<PublicUser>, ApiError> {
    let mut form = UploadForm::read(multipart, &state.upload_dir).await?;
    let file = form
        .take_file(slot.field())
        .ok_or_else(|| ApiError::validation(slot.missing_message()))?;

    let media = state.media()?;

    let current = state
        .users
        .find_by_id(caller.id)
        .await?
        .ok_or_else(|| ApiError::not_found("user not found"))?;
    let previous = match slot {
        ImageSlot::Avatar => current.avatar_public_id,
        ImageSlot::CoverImage => current.cover_image_public_id,
    };

    let uploaded = upload_and_discard(media.as_ref(), file).await?;
    let new_public_id = uploaded.public_id.clone();

    let update = match slot {
        ImageSlot::Avatar => UserUpdate {
            avatar: Some(uploaded),
            ..Default::default()
        },
        ImageSlot::CoverImage => UserUpdate {
            cover_image: Some(uploaded),
            ..Default::default()
        },
    };

    let user = match state.users.update_partial(caller.id, update).await {
        Ok(user) => user,
        Err(e) => {
            discard_remote(media.as_ref(), Some(&new_public_id)).await;
            return Err(e.into());
        }
    };

    discard_remote(media.as_ref(), previous.as_deref()).await;

    tracing::info!("Updated {} for user: {}", slot.field(), user.username);

    Ok(ApiResponse::ok(PublicUser::from(user), slot.success_message()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_fields() {
        assert_eq!(ImageSlot::Avatar.field(), "avatar");
        assert_eq!(ImageSlot::CoverImage.field(), "coverImage");
    }
}
