//! Account Handlers Module
//!
//! This module contains all HTTP handlers for the account API.
//!
//! # Module Structure
//!
//! ```text
//! handlers/
//! ├── mod.rs       - Module exports and documentation
//! ├── types.rs     - Request types and the success envelope
//! ├── register.rs  - Multipart registration
//! ├── login.rs     - Credentials to token pair
//! ├── logout.rs    - Revoke refresh token, clear cookies
//! ├── refresh.rs   - Refresh token rotation
//! ├── password.rs  - Change password
//! ├── me.rs        - Current user
//! ├── account.rs   - Update full name / email
//! ├── images.rs    - Avatar and cover image replacement
//! └── channel.rs   - Channel profile
//! ```
//!
//! # Authentication Flow
//!
//! 1. **Register**: form + avatar → user created (no tokens issued)
//! 2. **Login**: credentials verified → token pair in cookies and body
//! 3. **Refresh**: refresh token of record → new pair, old one unusable
//! 4. **Logout**: refresh token cleared → cookies cleared

/// Request and response types
pub mod types;

/// Register handler
pub mod register;

/// Login handler
pub mod login;

/// Logout handler
pub mod logout;

/// Refresh token handler
pub mod refresh;

/// Change password handler
pub mod password;

/// Get current user handler
pub mod me;

/// Update account handler
pub mod account;

/// Avatar and cover image handlers
pub mod images;

/// Channel profile handler
pub mod channel;

// Re-export commonly used types
pub use types::{ApiResponse, ChangePasswordRequest, LoginRequest, LoginResponse, UpdateAccountRequest};

// Re-export handlers
pub use account::update_account;
pub use channel::channel_profile;
pub use images::{update_avatar, update_cover_image};
pub use login::login;
pub use logout::logout;
pub use me::current_user;
pub use password::change_password;
pub use refresh::refresh_token;
pub use register::register;
