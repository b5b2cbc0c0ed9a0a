/**
 * API Routes
 *
 * Account endpoints, all nested under `/api/v1/users`.
 *
 * # Public
 * - `POST /register` - multipart registration with avatar
 * - `POST /login` - credentials for a token pair
 * - `POST /refresh-token` - rotate the refresh token
 *
 * # Protected (access token required)
 * - `POST /logout`
 * - `POST /change-password`
 * - `GET /current-user`
 * - `PATCH /update-account`
 * - `PATCH /avatar`
 * - `PATCH /cover-image`
 * - `GET /c/{username}` - channel profile
 */

use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};

use crate::backend::auth::handlers::{
    change_password, channel_profile, current_user, login, logout, refresh_token, register,
    update_account, update_avatar, update_cover_image,
};
use crate::backend::middleware::auth_middleware;
use crate::backend::server::state::AppState;

/// Prefix every account route is mounted under
pub const USERS_PREFIX: &str = "/api/v1/users";

/// Configure API routes
///
/// Protected routes get `auth_middleware` through `route_layer`, so an
/// unknown path under the prefix is still a 404 rather than a 401.
pub fn configure_api_routes(router: Router<AppState>, state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/refresh-token", post(refresh_token));

    let protected = Router::new()
        .route("/logout", post(logout))
        .route("/change-password", post(change_password))
        .route("/current-user", get(current_user))
        .route("/update-account", patch(update_account))
        .route("/avatar", patch(update_avatar))
        .route("/cover-image", patch(update_cover_image))
        .route("/c/{username}", get(channel_profile))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    router.nest(USERS_PREFIX, public.merge(protected))
}
