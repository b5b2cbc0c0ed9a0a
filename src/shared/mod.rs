//! Shared Module
//!
//! Types that do not depend on the HTTP layer. Currently this is the
//! application configuration, which is loaded once at startup and passed
//! explicitly into the backend components.

/// Application configuration
pub mod config;

/// Re-export commonly used types for convenience
pub use config::{AppConfig, AppConfigBuilder, CloudinaryConfig, ConfigError, TokenConfig};
