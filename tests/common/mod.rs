//! Common test utilities and helpers
//!
//! This module provides shared utilities for the HTTP integration tests:
//! - A test application on the in-memory user store
//! - A fake media host
//! - Authentication helpers (registration forms, seeded users, login)
//! - PostgreSQL fixtures, used only when `DATABASE_URL` is set

#![allow(dead_code)]

pub mod auth_helpers;
pub mod database;
pub mod media;

use std::sync::Arc;
use std::time::Duration;

use axum_test::TestServer;
use tempfile::TempDir;

use streamhub::backend::auth::users::MemoryUserStore;
use streamhub::backend::media::MediaHost;
use streamhub::backend::routes::create_router;
use streamhub::backend::server::AppState;
use streamhub::shared::AppConfig;

pub use auth_helpers::*;
pub use media::FakeMediaHost;

/// Access token secret used by every test app
pub const ACCESS_SECRET: &str = "test-access-secret";
/// Refresh token secret used by every test app
pub const REFRESH_SECRET: &str = "test-refresh-secret";

/// A running test application
pub struct TestApp {
    pub server: TestServer,
    pub state: AppState,
    pub users: MemoryUserStore,
    pub media: Option<Arc<FakeMediaHost>>,
    pub upload_dir: TempDir,
}

impl TestApp {
    /// The fake media host (panics if the app was built without one)
    pub fn media(&self) -> &FakeMediaHost {
        self.media.as_deref().expect("test app has no media host")
    }

    /// Files left behind in the upload directory
    pub fn staged_files(&self) -> usize {
        std::fs::read_dir(self.upload_dir.path())
            .map(|entries| entries.count())
            .unwrap_or(0)
    }
}

/// Configuration with fast bcrypt and a private upload directory
pub fn test_config(upload_dir: &TempDir) -> AppConfig {
    AppConfig::builder()
        .access_token(ACCESS_SECRET, Duration::from_secs(900))
        .refresh_token(REFRESH_SECRET, Duration::from_secs(864_000))
        .bcrypt_cost(4)
        .upload_dir(upload_dir.path())
        .build()
        .expect("valid test config")
}

fn build_app(media: Option<Arc<FakeMediaHost>>) -> TestApp {
    let upload_dir = tempfile::tempdir().expect("temp upload dir");
    let config = test_config(&upload_dir);
    let users = MemoryUserStore::new();

    let host = media.clone().map(|m| m as Arc<dyn MediaHost>);
    let state = AppState::new(&config, Arc::new(users.clone()), host);
    let server = TestServer::new(create_router(state.clone(), None)).expect("test server");

    TestApp {
        server,
        state,
        users,
        media,
        upload_dir,
    }
}

/// Test app with a working fake media host
pub fn spawn_app() -> TestApp {
    build_app(Some(Arc::new(FakeMediaHost::new())))
}

/// Test app with the given media host
pub fn spawn_app_with_media(media: FakeMediaHost) -> TestApp {
    build_app(Some(Arc::new(media)))
}

/// Test app without any media host configured
pub fn spawn_app_without_media() -> TestApp {
    build_app(None)
}
