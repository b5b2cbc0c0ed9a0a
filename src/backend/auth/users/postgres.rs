/**
 * PostgreSQL User Store
 *
 * `UserStore` backed by a sqlx `PgPool`. Schema lives in `migrations/`.
 * Unique violations on `username`/`email` surface as `StoreError::Duplicate`.
 */

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use super::{ChannelProfile, NewUser, StoreError, User, UserStore, UserUpdate};

/// PostgreSQL-backed user store
#[derive(Debug, Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Underlying connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Map unique violations to `Duplicate`, everything else to `Database`
fn map_write_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            let field = match db.constraint() {
                Some(name) if name.contains("username") => "username",
                _ => "email",
            };
            return StoreError::Duplicate(field);
        }
    }
    StoreError::Database(err)
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, full_name, avatar, avatar_public_id, cover_image,
                   cover_image_public_id, password_hash, refresh_token, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_username_or_email(
        &self,
        username: Option<&str>,
        email: Option<&str>,
    ) -> Result<Option<User>, StoreError> {
        if username.is_none() && email.is_none() {
            return Ok(None);
        }

        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, full_name, avatar, avatar_public_id, cover_image,
                   cover_image_public_id, password_hash, refresh_token, created_at, updated_at
            FROM users
            WHERE ($1::text IS NOT NULL AND username = $1)
               OR ($2::text IS NOT NULL AND email = $2)
            ORDER BY created_at
            LIMIT 1
            "#,
        )
        .bind(username)
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn insert(&self, user: NewUser) -> Result<User, StoreError> {
        let id = Uuid::new_v4();
        let now = Utc::now();
        let (cover_image, cover_image_public_id) = match user.cover_image {
            Some(media) => (Some(media.url), Some(media.public_id)),
            None => (None, None),
        };

        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, username, email, full_name, avatar, avatar_public_id,
                               cover_image, cover_image_public_id, password_hash, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $10)
            RETURNING id, username, email, full_name, avatar, avatar_public_id, cover_image,
                      cover_image_public_id, password_hash, refresh_token, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.full_name)
        .bind(&user.avatar.url)
        .bind(&user.avatar.public_id)
        .bind(cover_image)
        .bind(cover_image_public_id)
        .bind(&user.password_hash)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)
    }

    async fn update_partial(&self, id: Uuid, update: UserUpdate) -> Result<User, StoreError> {
        let (avatar, avatar_public_id) = match update.avatar {
            Some(media) => (Some(media.url), Some(media.public_id)),
            None => (None, None),
        };
        let (cover_image, cover_image_public_id) = match update.cover_image {
            Some(media) => (Some(media.url), Some(media.public_id)),
            None => (None, None),
        };
        let touch_refresh_token = update.refresh_token.is_some();
        let refresh_token = update.refresh_token.flatten();

        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET full_name = COALESCE($2, full_name),
                email = COALESCE($3, email),
                password_hash = COALESCE($4, password_hash),
                avatar = COALESCE($5, avatar),
                avatar_public_id = CASE WHEN $5::text IS NULL THEN avatar_public_id ELSE $6 END,
                cover_image = COALESCE($7, cover_image),
                cover_image_public_id = CASE WHEN $7::text IS NULL THEN cover_image_public_id ELSE $8 END,
                refresh_token = CASE WHEN $9 THEN $10 ELSE refresh_token END,
                updated_at = $11
            WHERE id = $1
            RETURNING id, username, email, full_name, avatar, avatar_public_id, cover_image,
                      cover_image_public_id, password_hash, refresh_token, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(update.full_name)
        .bind(update.email)
        .bind(update.password_hash)
        .bind(avatar)
        .bind(avatar_public_id)
        .bind(cover_image)
        .bind(cover_image_public_id)
        .bind(touch_refresh_token)
        .bind(refresh_token)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_write_error)?;

        user.ok_or(StoreError::NotFound)
    }

    async fn channel_profile(
        &self,
        username: &str,
        viewer: Uuid,
    ) -> Result<Option<ChannelProfile>, StoreError> {
        let profile = sqlx::query_as::<_, ChannelProfile>(
            r#"
            SELECT u.id, u.full_name, u.username, u.email, u.avatar, u.cover_image,
                   (SELECT COUNT(*) FROM subscriptions s WHERE s.channel_id = u.id) AS subscribers_count,
                   (SELECT COUNT(*) FROM subscriptions s WHERE s.subscriber_id = u.id) AS channels_subscribed_to_count,
                   EXISTS (
                       SELECT 1 FROM subscriptions s
                       WHERE s.channel_id = u.id AND s.subscriber_id = $2
                   ) AS is_subscribed
            FROM users u
            WHERE u.username = $1
            "#,
        )
        .bind(username)
        .bind(viewer)
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile)
    }
}
