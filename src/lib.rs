//! StreamHub - Account Backend
//!
//! StreamHub is the account service of a video-sharing platform: registration,
//! login/logout, access/refresh token rotation, password changes, profile
//! updates, avatar and cover image uploads, and channel profiles.
//!
//! # Module Structure
//!
//! - **`shared`** - Types independent of the HTTP layer
//!   - Application configuration (`AppConfig`, `TokenConfig`)
//!
//! - **`backend`** - Server-side code
//!   - Axum HTTP server, routes and middleware
//!   - Token lifecycle (issue, verify, rotate, invalidate)
//!   - User store (PostgreSQL or in-memory)
//!   - Media host client (Cloudinary)
//!
//! # Usage
//!
//! ```rust,no_run
//! use streamhub::backend::server::init::create_app;
//! use streamhub::shared::AppConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::from_env()?;
//! let app = create_app(&config).await?;
//! // Serve `app` with axum::serve
//! # Ok(())
//! # }
//! ```
//!
//! # Error Handling
//!
//! - `Result<T, E>` for fallible operations
//! - One `thiserror` enum per layer (`ConfigError`, `StoreError`, `MediaError`,
//!   `AuthError`) converging on `backend::error::ApiError` at the HTTP boundary

/// Shared types and data structures
pub mod shared;

/// Backend server-side code
pub mod backend;
