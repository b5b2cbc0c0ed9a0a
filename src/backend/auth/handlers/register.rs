/**
 * Register Handler
 *
 * This module implements the user registration handler for
 * POST /api/v1/users/register.
 *
 * # Registration Process
 *
 * 1. Read the multipart form (text fields, `avatar`, optional `coverImage`)
 * 2. Validate required fields, username format and email
 *    (username and email are stored lowercase)
 * 3. Reject an already used username or email
 * 4. Upload the avatar, then the cover image, to the media host
 * 5. Hash the password and create the user
 * 6. Return the stored user through the public projection
 *
 * # Media Cleanup
 *
 * Staged files are removed locally in every case. If a later step fails
 * after an upload succeeded, the uploaded files are deleted from the media
 * host on a best-effort basis.
 */

use axum::{extract::State, http::StatusCode};

use crate::backend::auth::handlers::types::{non_blank, ApiResponse};
use crate::backend::auth::users::{NewUser, PublicUser, User};
use crate::backend::error::ApiError;
use crate::backend::media::{discard_remote, upload_and_discard, UploadForm, UploadedMedia};
use crate::backend::middleware::MultipartBody;
use crate::backend::server::state::AppState;

/// Validate username format
///
/// Usernames must be:
/// - 3-30 characters long
/// - Contain only alphanumeric characters and underscores
/// - Start with a letter
pub fn is_valid_username(username: &str) -> bool {
    if username.len() < 3 || username.len() > 30 {
        return false;
    }

    let mut chars = username.chars();

    // First character must be a letter
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }

    // Rest can be alphanumeric or underscore
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Register handler
///
/// # Errors
///
/// * `400 Bad Request` - blank field, bad username or email, missing avatar
/// * `409 Conflict` - username or email already in use
/// * `503 Service Unavailable` - no media host configured
/// * `500 Internal Server Error` - upload, hashing or store failure
///
/// # Example Response
///
/// ```json
/// {
///   "statusCode": 201,
///   "data": { "id": "...", "username": "ab1", "email": "ab1@x.com", "fullName": "A B", ... },
///   "message": "user registered successfully",
///   "success": true
/// }
/// ```
pub async fn register(
    State(state): State<AppState>,
    MultipartBody(multipart): MultipartBody,
) -> Result<ApiResponse<PublicUser>, ApiError> {
    let mut form = UploadForm::read(multipart, &state.upload_dir).await?;

    let (Some(full_name), Some(username), Some(email), Some(password)) = (
        non_blank(form.text("fullName")),
        non_blank(form.text("username")),
        non_blank(form.text("email")),
        non_blank(form.text("password")),
    ) else {
        return Err(ApiError::validation("All fields are required"));
    };

    let username = username.to_lowercase();
    let email = email.to_lowercase();
    tracing::info!("Register request for username: {}, email: {}", username, email);

    if !is_valid_username(&username) {
        tracing::warn!("Invalid username format: {}", username);
        return Err(ApiError::validation(
            "username must be 3-30 chars, start with a letter, and contain only letters, numbers, and underscores",
        ));
    }

    if !email.contains('@') {
        tracing::warn!("Invalid email format: {}", email);
        return Err(ApiError::validation("invalid email format"));
    }

    if state
        .users
        .find_by_username_or_email(Some(&username), Some(&email))
        .await?
        .is_some()
    {
        tracing::warn!("Username or email already exists: {} / {}", username, email);
        return Err(ApiError::conflict("user with email or username already exists"));
    }

    let avatar_file = form
        .take_file("avatar")
        .ok_or_else(|| ApiError::validation("avatar file is required"))?;
    let cover_file = form.take_file("coverImage");

    let media = state.media()?;

    let avatar = upload_and_discard(media.as_ref(), avatar_file).await?;

    let cover_image = match cover_file {
        Some(file) => match upload_and_discard(media.as_ref(), file).await {
            Ok(cover) => Some(cover),
            Err(e) => {
                discard_remote(media.as_ref(), Some(&avatar.public_id)).await;
                return Err(e.into());
            }
        },
        None => None,
    };

    let uploaded: Vec<UploadedMedia> = std::iter::once(avatar.clone())
        .chain(cover_image.clone())
        .collect();

    let new_user = NewUser {
        username,
        email,
        full_name,
        password_hash: String::new(),
        avatar,
        cover_image,
    };

    let created = create_user(&state, new_user, &password).await;

    let user = match created {
        Ok(user) => user,
        Err(e) => {
            for media_file in &uploaded {
                discard_remote(media.as_ref(), Some(&media_file.public_id)).await;
            }
            return Err(e);
        }
    };

    tracing::info!("User registered successfully: {} ({})", user.username, user.email);

    Ok(ApiResponse::new(
        StatusCode::CREATED,
        PublicUser::from(user),
        "user registered successfully",
    ))
}

/// Hash the password, insert the user and read the stored record back
async fn create_user(
    state: &AppState,
    mut new_user: NewUser,
    password: &str,
) -> Result<User, ApiError> {
    new_user.password_hash = bcrypt::hash(password, state.bcrypt_cost)?;
    let user = state.users.insert(new_user).await?;

    state
        .users
        .find_by_id(user.id)
        .await?
        .ok_or_else(|| ApiError::internal("something went wrong while registering the user"))
}
