//! Middleware Module
//!
//! This module contains the HTTP middleware for the backend server.
//!
//! # Architecture
//!
//! - **`auth`** - resolves the access token to a user and guards protected routes
//! - **`body`** - JSON and multipart extractors that reject with `ApiError`
//!
//! # Example
//!
//! ```rust,ignore
//! use streamhub::backend::middleware::auth_middleware;
//!
//! let protected = Router::new()
//!     .route("/current-user", get(current_user))
//!     .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware));
//! ```

pub mod auth;

pub mod body;

pub use auth::{auth_middleware, extract_access_token, AuthUser, AuthenticatedUser};
pub use body::{JsonBody, MultipartBody};
