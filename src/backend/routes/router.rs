/**
 * Router Configuration
 *
 * This module provides the main router creation function that combines
 * all route configurations into a single Axum router.
 *
 * # Route Order
 *
 * 1. Health check
 * 2. API routes under `/api/v1/users`
 * 3. Fallback handler (JSON 404)
 *
 * # Layers
 *
 * - Request body limit (multipart uploads included)
 * - `TraceLayer` request/response spans
 * - CORS, driven by `CORS_ORIGIN`
 */

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    response::Json,
    routing::get,
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::backend::error::ApiError;
use crate::backend::routes::api_routes::configure_api_routes;
use crate::backend::server::state::AppState;

/// Largest accepted request body (covers avatar and cover image together)
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Create the Axum router with all routes configured
///
/// # Arguments
///
/// * `app_state` - Shared application state
/// * `cors_origin` - Allowed browser origin; `"*"` allows any origin without
///   credentials, `None` disables cross-origin access
pub fn create_router(app_state: AppState, cors_origin: Option<&str>) -> Router<()> {
    let router = Router::new().route("/health", get(health));

    let router = configure_api_routes(router, app_state.clone());

    router
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(cors_origin))
        .with_state(app_state)
}

/// Liveness probe
async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn not_found() -> ApiError {
    ApiError::not_found("route not found")
}

/// CORS policy for the configured origin
fn cors_layer(origin: Option<&str>) -> CorsLayer {
    let methods = [
        Method::GET,
        Method::POST,
        Method::PATCH,
        Method::OPTIONS,
    ];

    match origin {
        None => CorsLayer::new(),
        Some("*") => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any),
        Some(origin) => match HeaderValue::from_str(origin) {
            // Cookies only travel cross-origin with credentials allowed
            Ok(value) => CorsLayer::new()
                .allow_origin(value)
                .allow_methods(methods)
                .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
                .allow_credentials(true),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS_ORIGIN {:?}", origin);
                CorsLayer::new()
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::auth::users::MemoryUserStore;
    use crate::shared::AppConfig;
    use axum_test::TestServer;
    use std::sync::Arc;
    use std::time::Duration;

    fn server(cors_origin: Option<&str>) -> TestServer {
        let config = AppConfig::builder()
            .access_token("a", Duration::from_secs(60))
            .refresh_token("r", Duration::from_secs(60))
            .build()
            .unwrap();
        let state = AppState::new(&config, Arc::new(MemoryUserStore::new()), None);
        TestServer::new(create_router(state, cors_origin)).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = server(None).get("/health").await;
        response.assert_status_ok();
        response.assert_json(&serde_json::json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn test_unknown_route_is_json_404() {
        let response = server(None).get("/nope").await;
        response.assert_status_not_found();
        let body: serde_json::Value = response.json();
        assert_eq!(body["success"], false);
        assert_eq!(body["statusCode"], 404);
    }

    #[tokio::test]
    async fn test_cors_origin_allows_credentials() {
        let response = server(Some("http://localhost:5173"))
            .get("/health")
            .add_header(header::ORIGIN, HeaderValue::from_static("http://localhost:5173"))
            .await;
        assert_eq!(
            response.header(header::ACCESS_CONTROL_ALLOW_ORIGIN),
            "http://localhost:5173"
        );
        assert_eq!(response.header(header::ACCESS_CONTROL_ALLOW_CREDENTIALS), "true");
    }

    #[tokio::test]
    async fn test_oversized_body_rejected() {
        use axum::body::Body;
        use axum::http::{Request, StatusCode};
        use tower::ServiceExt;

        let config = AppConfig::builder()
            .access_token("a", Duration::from_secs(60))
            .refresh_token("r", Duration::from_secs(60))
            .build()
            .unwrap();
        let state = AppState::new(&config, Arc::new(MemoryUserStore::new()), None);

        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/v1/users/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(vec![b' '; MAX_BODY_BYTES + 1]))
            .unwrap();
        let response = create_router(state, None).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["statusCode"], 413);
        assert_eq!(body["message"], "request body is too large");
        assert_eq!(body["success"], false);
    }
}
