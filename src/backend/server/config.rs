/**
 * Server Collaborators
 *
 * This module turns `AppConfig` into the collaborators the server runs with:
 * the user store and the optional media host.
 *
 * # Fallbacks
 *
 * - No `DATABASE_URL`: users are kept in memory and lost on restart.
 *   A configured database that cannot be reached or migrated is a startup
 *   error, never a silent fallback.
 * - No Cloudinary credentials: the server starts, upload routes answer 503.
 */

use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;

use crate::backend::auth::users::{MemoryUserStore, PgUserStore, UserStore};
use crate::backend::media::{CloudinaryClient, MediaHost};
use crate::backend::server::init::StartupError;
use crate::shared::AppConfig;

/// Connect the user store selected by configuration
///
/// With `DATABASE_URL` set this:
/// 1. Creates a PostgreSQL connection pool
/// 2. Runs the embedded migrations
///
/// # Errors
///
/// Connection or migration failure.
pub async fn load_user_store(config: &AppConfig) -> Result<Arc<dyn UserStore>, StartupError> {
    let Some(database_url) = config.database_url.as_deref() else {
        tracing::warn!("DATABASE_URL not set. Users are kept in memory and lost on restart.");
        return Ok(Arc::new(MemoryUserStore::new()));
    };

    tracing::info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url)
        .await?;
    tracing::info!("Database connection pool created successfully");

    tracing::info!("Running database migrations...");
    sqlx::migrate!().run(&pool).await?;
    tracing::info!("Database migrations completed successfully");

    Ok(Arc::new(PgUserStore::new(pool)))
}

/// Build the media host if credentials are configured
pub fn load_media_host(config: &AppConfig) -> Option<Arc<dyn MediaHost>> {
    match &config.cloudinary {
        Some(cloudinary) => {
            tracing::info!("Media host: Cloudinary cloud '{}'", cloudinary.cloud_name);
            Some(Arc::new(CloudinaryClient::new(cloudinary.clone())))
        }
        None => {
            tracing::warn!("Cloudinary not configured. Image uploads will be unavailable.");
            None
        }
    }
}
