//! Backend Module
//!
//! This module contains all server-side code for StreamHub: an Axum HTTP
//! server exposing the account API under `/api/v1/users`.
//!
//! # Architecture
//!
//! The backend is organized into focused submodules:
//!
//! - **`server`** - Server initialization, application state, service loading
//! - **`routes`** - HTTP route configuration and router assembly
//! - **`auth`** - Users, token lifecycle, cookies, and account handlers
//! - **`media`** - Upload staging and the media host client
//! - **`middleware`** - Access token verification for protected routes
//! - **`error`** - `ApiError` and its HTTP mapping
//!
//! # Module Structure
//!
//! ```text
//! backend/
//! ├── mod.rs          - Module exports and documentation
//! ├── main.rs         - Binary entry point
//! ├── server/         - Server initialization and state
//! ├── routes/         - Route configuration
//! ├── auth/           - Users, sessions, handlers
//! ├── media/          - Staging and Cloudinary
//! ├── middleware/     - Request middleware
//! └── error/          - Error types
//! ```
//!
//! # State Management
//!
//! Handlers share an `AppState` holding the user store, the token manager
//! and the optional media host, each behind an `Arc`. There is no other
//! in-process mutable state; the refresh token of record lives in the store.
//!
//! # Error Handling
//!
//! Every handler returns `Result<_, ApiError>`. Errors are rendered as
//! `{ statusCode, message, success: false, errors: [] }`.

/// Server setup and configuration
pub mod server;

/// Route configuration
pub mod routes;

/// Backend error types
pub mod error;

/// Authentication and user management
pub mod auth;

/// Upload staging and media host
pub mod media;

/// Middleware for request processing
pub mod middleware;

/// Re-export commonly used types
pub use error::ApiError;
pub use server::create_app;
