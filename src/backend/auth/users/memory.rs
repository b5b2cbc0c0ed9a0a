/**
 * In-Memory User Store
 *
 * `UserStore` kept in a process-local map. Used when `DATABASE_URL` is not
 * set (data is lost on restart) and as the store in tests. Every operation
 * takes the lock once, so each call is atomic like a single-row statement.
 */

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{ChannelProfile, NewUser, StoreError, User, UserStore, UserUpdate};

#[derive(Debug, Default)]
struct Inner {
    users: HashMap<Uuid, User>,
    /// (subscriber, channel)
    subscriptions: HashSet<(Uuid, Uuid)>,
}

/// In-memory user store; clones share the same data
#[derive(Debug, Clone, Default)]
pub struct MemoryUserStore {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `subscriber` follows `channel`
    pub async fn subscribe(&self, subscriber: Uuid, channel: Uuid) {
        self.inner.write().await.subscriptions.insert((subscriber, channel));
    }

    /// Number of stored users
    pub async fn len(&self) -> usize {
        self.inner.read().await.users.len()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.inner.read().await.users.get(&id).cloned())
    }

    async fn find_by_username_or_email(
        &self,
        username: Option<&str>,
        email: Option<&str>,
    ) -> Result<Option<User>, StoreError> {
        let inner = self.inner.read().await;
        let mut matches: Vec<&User> = inner
            .users
            .values()
            .filter(|u| {
                username.is_some_and(|name| u.username == name)
                    || email.is_some_and(|mail| u.email == mail)
            })
            .collect();
        matches.sort_by_key(|u| u.created_at);
        Ok(matches.first().map(|u| (*u).clone()))
    }

    async fn insert(&self, user: NewUser) -> Result<User, StoreError> {
        let mut inner = self.inner.write().await;
        if inner.users.values().any(|u| u.username == user.username) {
            return Err(StoreError::Duplicate("username"));
        }
        if inner.users.values().any(|u| u.email == user.email) {
            return Err(StoreError::Duplicate("email"));
        }

        let now = Utc::now();
        let (cover_image, cover_image_public_id) = match user.cover_image {
            Some(media) => (Some(media.url), Some(media.public_id)),
            None => (None, None),
        };
        let record = User {
            id: Uuid::new_v4(),
            username: user.username,
            email: user.email,
            full_name: user.full_name,
            avatar: user.avatar.url,
            avatar_public_id: Some(user.avatar.public_id),
            cover_image,
            cover_image_public_id,
            password_hash: user.password_hash,
            refresh_token: None,
            created_at: now,
            updated_at: now,
        };
        inner.users.insert(record.id, record.clone());
        Ok(record)
    }

    async fn update_partial(&self, id: Uuid, update: UserUpdate) -> Result<User, StoreError> {
        let mut inner = self.inner.write().await;

        if let Some(email) = &update.email {
            if inner.users.values().any(|u| u.id != id && &u.email == email) {
                return Err(StoreError::Duplicate("email"));
            }
        }

        let user = inner.users.get_mut(&id).ok_or(StoreError::NotFound)?;
        if let Some(full_name) = update.full_name {
            user.full_name = full_name;
        }
        if let Some(email) = update.email {
            user.email = email;
        }
        if let Some(hash) = update.password_hash {
            user.password_hash = hash;
        }
        if let Some(avatar) = update.avatar {
            user.avatar = avatar.url;
            user.avatar_public_id = Some(avatar.public_id);
        }
        if let Some(cover) = update.cover_image {
            user.cover_image = Some(cover.url);
            user.cover_image_public_id = Some(cover.public_id);
        }
        if let Some(token) = update.refresh_token {
            user.refresh_token = token;
        }
        user.updated_at = Utc::now();

        Ok(user.clone())
    }

    async fn channel_profile(
        &self,
        username: &str,
        viewer: Uuid,
    ) -> Result<Option<ChannelProfile>, StoreError> {
        let inner = self.inner.read().await;
        let Some(user) = inner.users.values().find(|u| u.username == username) else {
            return Ok(None);
        };

        let subscribers_count = inner
            .subscriptions
            .iter()
            .filter(|(_, channel)| *channel == user.id)
            .count() as i64;
        let channels_subscribed_to_count = inner
            .subscriptions
            .iter()
            .filter(|(subscriber, _)| *subscriber == user.id)
            .count() as i64;

        Ok(Some(ChannelProfile {
            id: user.id,
            full_name: user.full_name.clone(),
            username: user.username.clone(),
            email: user.email.clone(),
            avatar: user.avatar.clone(),
            cover_image: user.cover_image.clone(),
            subscribers_count,
            channels_subscribed_to_count,
            is_subscribed: inner.subscriptions.contains(&(viewer, user.id)),
        }))
    }
}
