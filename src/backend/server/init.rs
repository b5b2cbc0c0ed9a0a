/**
 * Server Initialization
 *
 * This module handles the initialization and setup of the Axum HTTP server,
 * including collaborator loading, state creation, and route configuration.
 *
 * # Initialization Process
 *
 * 1. Load the user store (PostgreSQL or in-memory)
 * 2. Load the optional media host
 * 3. Create the shared `AppState`
 * 4. Create and configure the router
 */

use axum::Router;
use thiserror::Error;

use crate::backend::routes::router::create_router;
use crate::backend::server::config::{load_media_host, load_user_store};
use crate::backend::server::state::AppState;
use crate::shared::AppConfig;

/// Failures that stop the server from starting
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("database connection failed: {0}")]
    Database(#[from] sqlx::Error),

    #[error("database migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Create and configure the Axum application
///
/// # Errors
///
/// A configured database that cannot be reached or migrated.
pub async fn create_app(config: &AppConfig) -> Result<Router, StartupError> {
    tracing::info!("Initializing StreamHub backend server");

    let users = load_user_store(config).await?;
    let media = load_media_host(config);

    let state = AppState::new(config, users, media);
    let app = create_router(state, config.cors_origin.as_deref());

    tracing::info!("Router configured");

    Ok(app)
}
