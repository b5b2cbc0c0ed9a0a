//! Backend Error Module
//!
//! This module defines the error type used by HTTP handlers and its
//! conversion into HTTP responses.
//!
//! # Module Structure
//!
//! ```text
//! error/
//! ├── mod.rs        - Module exports and documentation
//! ├── types.rs      - ApiError definition and constructors
//! └── conversion.rs - IntoResponse and From conversions from lower layers
//! ```
//!
//! # HTTP Response Conversion
//!
//! `ApiError` implements `IntoResponse`, so handlers return it directly.
//! Errors from the store, the token manager and the media host convert into
//! `ApiError` through `From`, which lets handlers use `?` throughout.

/// Error type definitions
pub mod types;

/// Error conversion implementations
pub mod conversion;

// Re-export commonly used types
pub use types::ApiError;
