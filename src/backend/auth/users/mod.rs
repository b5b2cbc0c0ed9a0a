/**
 * User Model and Store
 *
 * This module defines the user record, the projections returned to clients,
 * and the `UserStore` trait the rest of the backend talks to.
 *
 * # Store contract
 *
 * Every operation is a single-record operation that the backing store is
 * expected to apply atomically:
 *
 * - find by id
 * - find by username or email
 * - insert (unique username and email)
 * - partial update of an explicit set of fields (`UserUpdate`)
 *
 * Partial updates carry only the fields being changed; rotating a refresh
 * token or a password never re-validates the rest of the record.
 *
 * # Implementations
 *
 * - `PgUserStore` - PostgreSQL via sqlx
 * - `MemoryUserStore` - process-local map, used without `DATABASE_URL` and in tests
 */

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::backend::media::UploadedMedia;

/// PostgreSQL store
pub mod postgres;

/// In-memory store
pub mod memory;

pub use memory::MemoryUserStore;
pub use postgres::PgUserStore;

/// User struct representing a user record
///
/// Deliberately not `Serialize`: clients only ever see [`PublicUser`].
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    /// Unique user ID (UUID)
    pub id: Uuid,
    /// Username (unique, stored lowercase)
    pub username: String,
    /// User email address (unique)
    pub email: String,
    /// Display name
    pub full_name: String,
    /// Avatar URL on the media host
    pub avatar: String,
    /// Media host reference for the avatar
    pub avatar_public_id: Option<String>,
    /// Cover image URL on the media host
    pub cover_image: Option<String>,
    /// Media host reference for the cover image
    pub cover_image_public_id: Option<String>,
    /// Hashed password (bcrypt)
    pub password_hash: String,
    /// The single refresh token currently honoured for this user
    pub refresh_token: Option<String>,
    /// Created at timestamp
    pub created_at: DateTime<Utc>,
    /// Updated at timestamp
    pub updated_at: DateTime<Utc>,
}

/// User as returned to clients, without password or refresh token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub avatar: String,
    pub cover_image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            full_name: user.full_name,
            avatar: user.avatar,
            cover_image: user.cover_image,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Fields required to create a user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub password_hash: String,
    pub avatar: UploadedMedia,
    pub cover_image: Option<UploadedMedia>,
}

/// Sparse set of fields for a partial update
///
/// `None` leaves a field untouched. `refresh_token` has one more level:
/// `Some(None)` clears the stored token.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub avatar: Option<UploadedMedia>,
    pub cover_image: Option<UploadedMedia>,
    pub refresh_token: Option<Option<String>>,
}

impl UserUpdate {
    /// Store `token` as the user's refresh token of record
    pub fn refresh_token(token: impl Into<String>) -> Self {
        Self {
            refresh_token: Some(Some(token.into())),
            ..Default::default()
        }
    }

    /// Clear the user's refresh token
    pub fn clear_refresh_token() -> Self {
        Self {
            refresh_token: Some(None),
            ..Default::default()
        }
    }

    /// Replace the password hash
    pub fn password_hash(hash: impl Into<String>) -> Self {
        Self {
            password_hash: Some(hash.into()),
            ..Default::default()
        }
    }

    /// True when the update changes nothing
    pub fn is_empty(&self) -> bool {
        self.full_name.is_none()
            && self.email.is_none()
            && self.password_hash.is_none()
            && self.avatar.is_none()
            && self.cover_image.is_none()
            && self.refresh_token.is_none()
    }
}

/// Channel view of a user, relative to the viewer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ChannelProfile {
    pub id: Uuid,
    pub full_name: String,
    pub username: String,
    pub email: String,
    pub avatar: String,
    pub cover_image: Option<String>,
    /// Users subscribed to this channel
    pub subscribers_count: i64,
    /// Channels this user is subscribed to
    pub channels_subscribed_to_count: i64,
    /// Whether the viewer is subscribed to this channel
    pub is_subscribed: bool,
}

/// User store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// No user with the given id
    #[error("user not found")]
    NotFound,

    /// A unique field (`username` or `email`) is already in use
    #[error("{0} is already taken")]
    Duplicate(&'static str),

    /// Backing database failure
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// User persistence
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Get user by ID
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    /// Get the first user whose username or email matches
    ///
    /// Either argument may be `None`; with both `None` nothing matches.
    async fn find_by_username_or_email(
        &self,
        username: Option<&str>,
        email: Option<&str>,
    ) -> Result<Option<User>, StoreError>;

    /// Create a new user
    async fn insert(&self, user: NewUser) -> Result<User, StoreError>;

    /// Apply a partial update and return the updated record
    ///
    /// Returns `StoreError::NotFound` when no user has this id.
    async fn update_partial(&self, id: Uuid, update: UserUpdate) -> Result<User, StoreError>;

    /// Channel profile of `username` as seen by `viewer`
    async fn channel_profile(
        &self,
        username: &str,
        viewer: Uuid,
    ) -> Result<Option<ChannelProfile>, StoreError>;
}
