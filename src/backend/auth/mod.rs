//! Authentication Module
//!
//! This module handles users, their session tokens, and the HTTP handlers
//! of the account API.
//!
//! # Architecture
//!
//! - **`users`** - User model and the `UserStore` trait (PostgreSQL, in-memory)
//! - **`sessions`** - `TokenManager`: issue, verify, rotate, invalidate
//! - **`cookies`** - `accessToken` / `refreshToken` cookie helpers
//! - **`handlers`** - HTTP handlers for the account endpoints
//!
//! # Module Structure
//!
//! ```text
//! auth/
//! ├── mod.rs          - Module exports and documentation
//! ├── users/          - User model and stores
//! ├── sessions.rs     - Token lifecycle
//! ├── cookies.rs      - Session cookies
//! └── handlers/       - HTTP handlers
//! ```
//!
//! # Security
//!
//! - Passwords are hashed using bcrypt before storage
//! - Access tokens are short-lived and verified on every protected request
//! - Only the refresh token stored on the user can be exchanged, once
//! - Neither the password hash nor the refresh token is ever serialized

/// User data model and stores
pub mod users;

/// Token lifecycle
pub mod sessions;

/// Session cookies
pub mod cookies;

/// HTTP handlers for account endpoints
pub mod handlers;

// Re-export commonly used types
pub use sessions::{AuthError, TokenManager, TokenPair};
pub use users::{PublicUser, User, UserStore};
