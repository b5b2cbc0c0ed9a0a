/**
 * Refresh Token Handler
 *
 * POST /api/v1/users/refresh-token. Exchanges the refresh token of record
 * for a new pair.
 *
 * The token is read from the `refreshToken` cookie, or else from a JSON
 * body `{ "refreshToken": "..." }`. The body is optional and parsed by hand,
 * so a cookie-only request with no body or content type still works.
 */

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::HeaderMap,
};

use crate::backend::auth::cookies::{read_cookie, token_cookies, SessionCookies, REFRESH_TOKEN_COOKIE};
use crate::backend::auth::handlers::types::{ApiResponse, RefreshRequest};
use crate::backend::auth::sessions::{TokenManager, TokenPair};
use crate::backend::error::ApiError;

/// Refresh token presented with the request, cookie first
fn presented_refresh_token(headers: &HeaderMap, body: &[u8]) -> Option<String> {
    read_cookie(headers, REFRESH_TOKEN_COOKIE).or_else(|| {
        if body.is_empty() {
            return None;
        }
        serde_json::from_slice::<RefreshRequest>(body)
            .map_err(|e| tracing::debug!("Ignoring unparsable refresh body: {}", e))
            .ok()
            .and_then(|request| request.refresh_token)
            .filter(|token| !token.is_empty())
    })
}

/// Refresh token handler
///
/// # Errors
///
/// * `401 Unauthorized` - no token, invalid token, or a token that is not the
///   one on record (already rotated or revoked)
/// * `413 Payload Too Large` - body over the request body limit
/// * `500 Internal Server Error` - the new pair could not be issued
pub async fn refresh_token(
    State(tokens): State<Arc<TokenManager>>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<(SessionCookies, ApiResponse<TokenPair>), ApiError> {
    let body = body?;
    let presented = presented_refresh_token(&headers, &body);

    let pair = tokens.rotate(presented.as_deref()).await?;

    tracing::debug!("Refresh token rotated");

    Ok((token_cookies(&pair), ApiResponse::ok(pair, "access token refreshed")))
}
