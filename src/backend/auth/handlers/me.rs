/**
 * Get Current User Handler
 *
 * GET /api/v1/users/current-user. Returns the user the access token was
 * resolved to by `auth_middleware`, without password or refresh token.
 */

use crate::backend::auth::handlers::types::ApiResponse;
use crate::backend::auth::users::PublicUser;
use crate::backend::middleware::AuthUser;

/// Get current user handler
pub async fn current_user(AuthUser(user): AuthUser) -> ApiResponse<PublicUser> {
    ApiResponse::ok(user, "current user fetched successfully")
}
