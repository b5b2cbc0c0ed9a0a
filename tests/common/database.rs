//! Database test fixtures
//!
//! PostgreSQL tests run against `DATABASE_URL` and are skipped when it is
//! not set. Every fixture user gets a unique suffix, so tests can share one
//! database without truncating tables.

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use streamhub::backend::auth::users::{NewUser, PgUserStore, User, UserStore};
use streamhub::backend::media::UploadedMedia;

/// Connect to `DATABASE_URL` and run migrations, or `None` when unset
pub async fn create_test_pool() -> Option<PgPool> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set, skipping PostgreSQL test");
        return None;
    };

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("Failed to create test database pool");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");
    Some(pool)
}

/// Store on the test database
pub async fn test_store() -> Option<PgUserStore> {
    create_test_pool().await.map(PgUserStore::new)
}

/// Short random suffix for unique usernames and emails
pub fn unique_suffix() -> String {
    Uuid::new_v4().simple().to_string()[..12].to_string()
}

/// Insert a user named `{prefix}_{suffix}`
pub async fn insert_user(store: &PgUserStore, prefix: &str) -> User {
    let username = format!("{}_{}", prefix, unique_suffix());
    store
        .insert(NewUser {
            email: format!("{}@example.com", username),
            username,
            full_name: "Database User".to_string(),
            password_hash: "hash".to_string(),
            avatar: UploadedMedia {
                url: format!("https://media.test/{}.png", prefix),
                public_id: format!("{}-avatar", prefix),
            },
            cover_image: None,
        })
        .await
        .expect("Failed to insert test user")
}

/// Record `subscriber` as subscribed to `channel`
pub async fn subscribe(store: &PgUserStore, subscriber: Uuid, channel: Uuid) {
    sqlx::query("INSERT INTO subscriptions (id, subscriber_id, channel_id) VALUES ($1, $2, $3)")
        .bind(Uuid::new_v4())
        .bind(subscriber)
        .bind(channel)
        .execute(store.pool())
        .await
        .expect("Failed to insert subscription");
}
