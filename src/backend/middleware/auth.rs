/**
 * Authentication Middleware
 *
 * This module provides middleware for protecting routes that require
 * user authentication. It reads the access token from the `accessToken`
 * cookie or, failing that, the `Authorization: Bearer` header, resolves it
 * to the current user and attaches that user to the request.
 */

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::backend::auth::cookies::{read_cookie, ACCESS_TOKEN_COOKIE};
use crate::backend::auth::users::PublicUser;
use crate::backend::error::ApiError;
use crate::backend::server::state::AppState;

/// User resolved from the request's access token
#[derive(Clone, Debug)]
pub struct AuthenticatedUser(pub PublicUser);

/// Access token presented with the request
///
/// The cookie wins over the header when both are present.
pub fn extract_access_token(headers: &HeaderMap) -> Option<String> {
    read_cookie(headers, ACCESS_TOKEN_COOKIE).or_else(|| {
        headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(str::to_string)
    })
}

/// Authentication middleware
///
/// This middleware:
/// 1. Extracts the access token (cookie, then Bearer header)
/// 2. Verifies it and loads the user it belongs to
/// 3. Attaches the user to request extensions for use in handlers
///
/// Returns 401 if the token is missing, invalid, expired, or its user is gone
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_access_token(request.headers());

    let user = state.tokens.verify_access(token.as_deref()).await.map_err(|e| {
        tracing::warn!("Rejected request to {}: {}", request.uri().path(), e);
        ApiError::from(e)
    })?;

    request.extensions_mut().insert(AuthenticatedUser(user));

    Ok(next.run(request).await)
}

/// Axum extractor for authenticated user
///
/// This can be used as a parameter in handlers behind `auth_middleware` to
/// get the user the middleware resolved.
#[derive(Clone, Debug)]
pub struct AuthUser(pub PublicUser);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let AuthenticatedUser(user) = parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| {
                tracing::warn!("AuthenticatedUser not found in request extensions");
                ApiError::unauthenticated("unauthorized request")
            })?;

        Ok(AuthUser(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::auth::users::{MemoryUserStore, NewUser, UserStore};
    use crate::backend::media::UploadedMedia;
    use crate::shared::AppConfig;
    use axum::{http::HeaderValue, middleware, routing::get, Json, Router};
    use axum_test::TestServer;
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn test_extract_access_token_prefers_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer from-header"));
        assert_eq!(extract_access_token(&headers).as_deref(), Some("from-header"));

        headers.insert(
            axum::http::header::COOKIE,
            HeaderValue::from_static("accessToken=from-cookie"),
        );
        assert_eq!(extract_access_token(&headers).as_deref(), Some("from-cookie"));
    }

    #[test]
    fn test_extract_access_token_rejects_other_schemes() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic dXNlcjpwdw=="));
        assert_eq!(extract_access_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(extract_access_token(&headers), None);
    }

    async fn whoami(AuthUser(user): AuthUser) -> Json<PublicUser> {
        Json(user)
    }

    async fn server() -> (TestServer, AppState, uuid::Uuid) {
        let config = AppConfig::builder()
            .access_token("access", Duration::from_secs(60))
            .refresh_token("refresh", Duration::from_secs(600))
            .bcrypt_cost(4)
            .build()
            .unwrap();
        let store = MemoryUserStore::new();
        let user = store
            .insert(NewUser {
                username: "mw".to_string(),
                email: "mw@example.com".to_string(),
                full_name: "Middle Ware".to_string(),
                password_hash: "hash".to_string(),
                avatar: UploadedMedia {
                    url: "https://media.test/mw.png".to_string(),
                    public_id: "mw".to_string(),
                },
                cover_image: None,
            })
            .await
            .unwrap();

        let state = AppState::new(&config, Arc::new(store), None);
        let app = Router::new()
            .route("/whoami", get(whoami))
            .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
            .with_state(state.clone());

        (TestServer::new(app).unwrap(), state, user.id)
    }

    #[tokio::test]
    async fn test_missing_token_is_unauthorized() {
        let (server, _, _) = server().await;
        let response = server.get("/whoami").await;
        response.assert_status_unauthorized();
        let body: serde_json::Value = response.json();
        assert_eq!(body["message"], "unauthorized request");
    }

    #[tokio::test]
    async fn test_bearer_token_resolves_user() {
        let (server, state, user_id) = server().await;
        let pair = state.tokens.issue(user_id).await.unwrap();

        let response = server
            .get("/whoami")
            .authorization_bearer(&pair.access_token)
            .await;
        response.assert_status_ok();
        let user: PublicUser = response.json();
        assert_eq!(user.id, user_id);
    }

    #[tokio::test]
    async fn test_garbage_token_is_unauthorized() {
        let (server, _, _) = server().await;
        let response = server.get("/whoami").authorization_bearer("garbage").await;
        response.assert_status_unauthorized();
        let body: serde_json::Value = response.json();
        assert_eq!(body["message"], "invalid access token");
    }
}
