/**
 * Application State Management
 *
 * This module defines the application state structure and implements
 * the necessary `FromRef` traits for Axum state extraction.
 *
 * # Architecture
 *
 * The `AppState` struct serves as the central state container for the
 * application, holding:
 * - The user store
 * - The token manager (which shares the same store)
 * - The optional media host
 * - Upload and password-hashing settings
 *
 * Nothing in it is mutable after startup; every handler works through the
 * store handle.
 *
 * # Example
 *
 * ```rust,ignore
 * use streamhub::backend::server::state::AppState;
 * use axum::extract::State;
 *
 * async fn handler(State(state): State<AppState>) {
 *     let user = state.users.find_by_id(id).await?;
 * }
 * ```
 */

use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::FromRef;

use crate::backend::auth::sessions::TokenManager;
use crate::backend::auth::users::UserStore;
use crate::backend::error::ApiError;
use crate::backend::media::MediaHost;
use crate::shared::AppConfig;

/// Application state shared by every handler
///
/// # Fields
///
/// * `users` - User persistence
/// * `tokens` - Access/refresh token lifecycle
/// * `media` - Media host, `None` when not configured
/// * `upload_dir` - Where multipart file parts are staged
/// * `bcrypt_cost` - Cost factor for new password hashes
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub tokens: Arc<TokenManager>,
    pub media: Option<Arc<dyn MediaHost>>,
    pub upload_dir: PathBuf,
    pub bcrypt_cost: u32,
}

impl AppState {
    /// Assemble state from configuration and already-built collaborators
    pub fn new(
        config: &AppConfig,
        users: Arc<dyn UserStore>,
        media: Option<Arc<dyn MediaHost>>,
    ) -> Self {
        let tokens = Arc::new(TokenManager::new(&config.tokens, users.clone()));
        Self {
            users,
            tokens,
            media,
            upload_dir: config.upload_dir.clone(),
            bcrypt_cost: config.bcrypt_cost,
        }
    }

    /// The media host, or 503 when none is configured
    pub fn media(&self) -> Result<Arc<dyn MediaHost>, ApiError> {
        self.media.clone().ok_or_else(|| {
            tracing::warn!("Media upload requested but no media host is configured");
            ApiError::unavailable("media host not configured")
        })
    }
}

/// Implement FromRef for the user store
///
/// This allows handlers that only read users to extract
/// `State<Arc<dyn UserStore>>` directly.
impl FromRef<AppState> for Arc<dyn UserStore> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.users.clone()
    }
}

/// Implement FromRef for the token manager
impl FromRef<AppState> for Arc<TokenManager> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.tokens.clone()
    }
}
