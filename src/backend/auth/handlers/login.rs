/**
 * Login Handler
 *
 * This module implements the user authentication handler for
 * POST /api/v1/users/login.
 *
 * # Authentication Process
 *
 * 1. Look up the user by username or email (whichever is given, both
 *    matched case-insensitively)
 * 2. Verify the password using bcrypt
 * 3. Issue an access/refresh pair (the refresh token is stored on the user)
 * 4. Set both session cookies and return the pair with the user
 *
 * # Security
 *
 * - Passwords are verified using bcrypt
 * - A wrong password sets no cookies
 * - User passwords and refresh tokens are never returned in the user object
 */

use std::sync::Arc;

use axum::extract::State;
use bcrypt::verify;

use crate::backend::auth::cookies::{token_cookies, SessionCookies};
use crate::backend::auth::handlers::types::{non_blank, ApiResponse, LoginRequest, LoginResponse};
use crate::backend::auth::sessions::TokenManager;
use crate::backend::auth::users::{PublicUser, UserStore};
use crate::backend::error::ApiError;
use crate::backend::middleware::JsonBody;

/// Login handler
///
/// # Errors
///
/// * `400 Bad Request` - neither username nor email given, or blank password
/// * `404 Not Found` - no matching user
/// * `401 Unauthorized` - wrong password
/// * `500 Internal Server Error` - store or token issuance failure
///
/// # Example Request
///
/// ```http
/// POST /api/v1/users/login HTTP/1.1
/// Content-Type: application/json
///
/// { "email": "ab1@x.com", "password": "secret" }
/// ```
pub async fn login(
    State(users): State<Arc<dyn UserStore>>,
    State(tokens): State<Arc<TokenManager>>,
    JsonBody(request): JsonBody<LoginRequest>,
) -> Result<(SessionCookies, ApiResponse<LoginResponse>), ApiError> {
    let username = non_blank(request.username.as_deref()).map(|u| u.to_lowercase());
    let email = non_blank(request.email.as_deref()).map(|e| e.to_lowercase());

    if username.is_none() && email.is_none() {
        return Err(ApiError::validation("username or email is required"));
    }
    if request.password.is_empty() {
        return Err(ApiError::validation("password is required"));
    }

    let identifier = username.as_deref().or(email.as_deref()).unwrap_or_default();
    tracing::info!("Login request for: {}", identifier);

    let user = users
        .find_by_username_or_email(username.as_deref(), email.as_deref())
        .await?
        .ok_or_else(|| {
            tracing::warn!("User not found: {}", identifier);
            ApiError::not_found("user does not exist")
        })?;

    let valid = verify(&request.password, &user.password_hash)?;
    if !valid {
        tracing::warn!("Invalid password for user: {}", user.username);
        return Err(ApiError::unauthenticated("invalid password"));
    }

    let pair = tokens.issue(user.id).await?;

    tracing::info!("User logged in successfully: {} ({})", user.username, user.email);

    let cookies = token_cookies(&pair);
    let data = LoginResponse {
        user: PublicUser::from(user),
        access_token: pair.access_token,
        refresh_token: pair.refresh_token,
    };

    Ok((cookies, ApiResponse::ok(data, "user logged in successfully")))
}
