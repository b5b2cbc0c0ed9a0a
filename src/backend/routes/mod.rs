//! Route Configuration Module
//!
//! This module configures all HTTP routes for the backend server.
//!
//! # Module Structure
//!
//! ```text
//! routes/
//! ├── mod.rs          - Module exports and documentation
//! ├── router.rs       - Main router creation, layers, fallback
//! └── api_routes.rs   - Account endpoints under /api/v1/users
//! ```
//!
//! # Route Types
//!
//! - `GET /health` - Liveness probe
//! - `/api/v1/users/*` - Account API (see `api_routes`)
//! - anything else - JSON 404

/// Main router creation
pub mod router;

/// API endpoint routes
pub mod api_routes;

// Re-export commonly used functions
pub use router::create_router;
