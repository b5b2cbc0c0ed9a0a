/**
 * Session Tokens
 *
 * This module owns the access/refresh token pair: minting it, verifying the
 * access half on every protected request, rotating the refresh half, and
 * revoking it at logout.
 *
 * # Token Pair
 *
 * - **Access token** - short-lived, self-contained. Carries the user id and
 *   identity fields, signed with the access secret. Verified without touching
 *   the store, then resolved to the current user record.
 * - **Refresh token** - long-lived, carries only the user id and a random
 *   `jti`, signed with a distinct refresh secret. Valid only while it equals
 *   the value stored on the user record, so each rotation supersedes the
 *   previous token and logout revokes it.
 *
 * Issuing a pair overwrites the stored refresh token: one active refresh
 * session per user. A second device logging in signs the first one out at
 * its next rotation.
 *
 * Both tokens are HS256 JWTs validated with zero clock leeway.
 */

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::backend::auth::users::{PublicUser, StoreError, User, UserStore, UserUpdate};
use crate::shared::TokenConfig;

/// No token was presented at all
pub const MISSING_TOKEN: &str = "unauthorized request";
/// Access token failed verification or its user is gone
pub const INVALID_ACCESS_TOKEN: &str = "invalid access token";
/// Refresh token failed verification or its user is gone
pub const INVALID_REFRESH_TOKEN: &str = "invalid refresh token";
/// Refresh token verified but is not the one on record
pub const STALE_REFRESH_TOKEN: &str = "refresh token is expired or used";

/// Access token claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// User ID
    pub sub: String,
    /// Email
    pub email: String,
    /// Username
    pub username: String,
    /// Display name
    #[serde(rename = "fullName")]
    pub full_name: String,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
    /// Issued at time (Unix timestamp)
    pub iat: u64,
}

/// Refresh token claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshClaims {
    /// User ID
    pub sub: String,
    /// Unique token id; keeps two tokens minted in the same second distinct
    pub jti: String,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
    /// Issued at time (Unix timestamp)
    pub iat: u64,
}

/// Freshly issued access/refresh pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Token lifecycle errors
#[derive(Debug, Error)]
pub enum AuthError {
    /// Missing, malformed, expired, forged or superseded token
    #[error("{0}")]
    Unauthenticated(&'static str),

    /// Tokens were requested for a user that does not exist
    #[error("user not found")]
    UserNotFound,

    /// Signing or persisting the pair failed
    #[error("failed to issue tokens")]
    TokenIssuance,

    /// User store failure outside of issuance
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Issues, verifies, rotates and revokes token pairs
pub struct TokenManager {
    store: Arc<dyn UserStore>,
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    access_ttl: Duration,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
    refresh_ttl: Duration,
    validation: Validation,
}

impl TokenManager {
    /// Build a manager from token settings and the user store it persists to
    pub fn new(config: &TokenConfig, store: Arc<dyn UserStore>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            store,
            access_encoding: EncodingKey::from_secret(config.access_secret.as_bytes()),
            access_decoding: DecodingKey::from_secret(config.access_secret.as_bytes()),
            access_ttl: config.access_expiry,
            refresh_encoding: EncodingKey::from_secret(config.refresh_secret.as_bytes()),
            refresh_decoding: DecodingKey::from_secret(config.refresh_secret.as_bytes()),
            refresh_ttl: config.refresh_expiry,
            validation,
        }
    }

    /// Mint a new pair for `user_id` and store the refresh half on the user
    ///
    /// # Errors
    ///
    /// - `UserNotFound` if no such user exists
    /// - `TokenIssuance` if signing or the store write fails
    pub async fn issue(&self, user_id: Uuid) -> Result<TokenPair, AuthError> {
        let user = self
            .store
            .find_by_id(user_id)
            .await
            .map_err(|e| {
                tracing::error!("Failed to load user {} for token issuance: {}", user_id, e);
                AuthError::TokenIssuance
            })?
            .ok_or(AuthError::UserNotFound)?;

        self.issue_for(&user).await
    }

    async fn issue_for(&self, user: &User) -> Result<TokenPair, AuthError> {
        let now = Utc::now().timestamp().max(0) as u64;

        let access = AccessClaims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            username: user.username.clone(),
            full_name: user.full_name.clone(),
            exp: expires_at(now, self.access_ttl)?,
            iat: now,
        };
        let refresh = RefreshClaims {
            sub: user.id.to_string(),
            jti: Uuid::new_v4().to_string(),
            exp: expires_at(now, self.refresh_ttl)?,
            iat: now,
        };

        let header = Header::new(Algorithm::HS256);
        let access_token = encode(&header, &access, &self.access_encoding).map_err(|e| {
            tracing::error!("Failed to sign access token: {}", e);
            AuthError::TokenIssuance
        })?;
        let refresh_token = encode(&header, &refresh, &self.refresh_encoding).map_err(|e| {
            tracing::error!("Failed to sign refresh token: {}", e);
            AuthError::TokenIssuance
        })?;

        self.store
            .update_partial(user.id, UserUpdate::refresh_token(refresh_token.clone()))
            .await
            .map_err(|e| {
                tracing::error!("Failed to store refresh token for {}: {}", user.id, e);
                AuthError::TokenIssuance
            })?;

        tracing::debug!("Issued token pair for user {}", user.id);

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    /// Resolve an access token to the user it was issued for
    ///
    /// `None` or an empty string means no token was presented.
    pub async fn verify_access(&self, token: Option<&str>) -> Result<PublicUser, AuthError> {
        let token = token
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::Unauthenticated(MISSING_TOKEN))?;

        let claims = decode::<AccessClaims>(token, &self.access_decoding, &self.validation)
            .map_err(|e| {
                tracing::debug!("Access token rejected: {}", e);
                AuthError::Unauthenticated(INVALID_ACCESS_TOKEN)
            })?
            .claims;

        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AuthError::Unauthenticated(INVALID_ACCESS_TOKEN))?;

        let user = self
            .store
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::Unauthenticated(INVALID_ACCESS_TOKEN))?;

        Ok(user.into())
    }

    /// Exchange the refresh token on record for a new pair
    ///
    /// The presented token must verify against the refresh secret and equal
    /// the stored value exactly; on success the stored value is replaced, so
    /// the presented token can never be used again.
    pub async fn rotate(&self, token: Option<&str>) -> Result<TokenPair, AuthError> {
        let token = token
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::Unauthenticated(MISSING_TOKEN))?;

        let claims = decode::<RefreshClaims>(token, &self.refresh_decoding, &self.validation)
            .map_err(|e| {
                tracing::debug!("Refresh token rejected: {}", e);
                AuthError::Unauthenticated(INVALID_REFRESH_TOKEN)
            })?
            .claims;

        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AuthError::Unauthenticated(INVALID_REFRESH_TOKEN))?;

        let user = self
            .store
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::Unauthenticated(INVALID_REFRESH_TOKEN))?;

        if user.refresh_token.as_deref() != Some(token) {
            tracing::info!("Stale refresh token presented for user {}", user.id);
            return Err(AuthError::Unauthenticated(STALE_REFRESH_TOKEN));
        }

        self.issue_for(&user).await
    }

    /// Clear the stored refresh token; issued access tokens stay valid until expiry
    pub async fn invalidate(&self, user_id: Uuid) -> Result<(), AuthError> {
        self.store
            .update_partial(user_id, UserUpdate::clear_refresh_token())
            .await?;
        tracing::debug!("Revoked refresh token for user {}", user_id);
        Ok(())
    }
}

/// `now + ttl` as a Unix timestamp
fn expires_at(now: u64, ttl: Duration) -> Result<u64, AuthError> {
    now.checked_add(ttl.as_secs()).ok_or_else(|| {
        tracing::error!("Token lifetime {:?} overflows the expiry timestamp", ttl);
        AuthError::TokenIssuance
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::auth::users::{MemoryUserStore, NewUser};
    use crate::backend::media::UploadedMedia;
    use assert_matches::assert_matches;

    fn token_config() -> TokenConfig {
        TokenConfig {
            access_secret: "access-secret".to_string(),
            access_expiry: Duration::from_secs(900),
            refresh_secret: "refresh-secret".to_string(),
            refresh_expiry: Duration::from_secs(864_000),
        }
    }

    async fn setup() -> (TokenManager, MemoryUserStore, User) {
        let store = MemoryUserStore::new();
        let user = store
            .insert(NewUser {
                username: "ab1".to_string(),
                email: "ab1@x.com".to_string(),
                full_name: "A B".to_string(),
                password_hash: "hash".to_string(),
                avatar: UploadedMedia {
                    url: "https://media.test/avatar.png".to_string(),
                    public_id: "avatar".to_string(),
                },
                cover_image: None,
            })
            .await
            .unwrap();
        let manager = TokenManager::new(&token_config(), Arc::new(store.clone()));
        (manager, store, user)
    }

    #[tokio::test]
    async fn test_issue_stores_refresh_token() {
        let (manager, store, user) = setup().await;
        let pair = manager.issue(user.id).await.unwrap();

        let stored = store.find_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(stored.refresh_token.as_deref(), Some(pair.refresh_token.as_str()));
        assert_ne!(pair.access_token, pair.refresh_token);
    }

    #[tokio::test]
    async fn test_issue_unknown_user() {
        let (manager, _, _) = setup().await;
        assert_matches!(manager.issue(Uuid::new_v4()).await, Err(AuthError::UserNotFound));
    }

    #[tokio::test]
    async fn test_verify_access_resolves_user() {
        let (manager, _, user) = setup().await;
        let pair = manager.issue(user.id).await.unwrap();

        let resolved = manager.verify_access(Some(&pair.access_token)).await.unwrap();
        assert_eq!(resolved.id, user.id);
        assert_eq!(resolved.username, "ab1");
    }

    #[tokio::test]
    async fn test_verify_access_rejections() {
        let (manager, _, user) = setup().await;
        let pair = manager.issue(user.id).await.unwrap();

        assert_matches!(
            manager.verify_access(None).await,
            Err(AuthError::Unauthenticated(MISSING_TOKEN))
        );
        assert_matches!(
            manager.verify_access(Some("not.a.jwt")).await,
            Err(AuthError::Unauthenticated(INVALID_ACCESS_TOKEN))
        );
        // A refresh token is signed with the other secret
        assert_matches!(
            manager.verify_access(Some(&pair.refresh_token)).await,
            Err(AuthError::Unauthenticated(INVALID_ACCESS_TOKEN))
        );
    }

    #[tokio::test]
    async fn test_expired_access_token_rejected() {
        let (manager, _, user) = setup().await;
        let now = Utc::now().timestamp() as u64;
        let claims = AccessClaims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            username: user.username.clone(),
            full_name: user.full_name.clone(),
            exp: now - 10,
            iat: now - 100,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"access-secret"),
        )
        .unwrap();

        assert_matches!(
            manager.verify_access(Some(&token)).await,
            Err(AuthError::Unauthenticated(INVALID_ACCESS_TOKEN))
        );
    }

    #[tokio::test]
    async fn test_rotation_supersedes_previous_token() {
        let (manager, _, user) = setup().await;
        let t1 = manager.issue(user.id).await.unwrap();
        let t2 = manager.rotate(Some(&t1.refresh_token)).await.unwrap();
        let t3 = manager.rotate(Some(&t2.refresh_token)).await.unwrap();
        assert_ne!(t2.refresh_token, t3.refresh_token);

        assert_matches!(
            manager.rotate(Some(&t1.refresh_token)).await,
            Err(AuthError::Unauthenticated(STALE_REFRESH_TOKEN))
        );
        assert_matches!(
            manager.rotate(Some(&t2.refresh_token)).await,
            Err(AuthError::Unauthenticated(STALE_REFRESH_TOKEN))
        );
        manager.rotate(Some(&t3.refresh_token)).await.unwrap();
    }

    #[tokio::test]
    async fn test_rotate_without_token() {
        let (manager, _, _) = setup().await;
        assert_matches!(
            manager.rotate(None).await,
            Err(AuthError::Unauthenticated(MISSING_TOKEN))
        );
        assert_matches!(
            manager.rotate(Some("")).await,
            Err(AuthError::Unauthenticated(MISSING_TOKEN))
        );
    }

    #[tokio::test]
    async fn test_rotate_rejects_access_token() {
        let (manager, _, user) = setup().await;
        let pair = manager.issue(user.id).await.unwrap();
        assert_matches!(
            manager.rotate(Some(&pair.access_token)).await,
            Err(AuthError::Unauthenticated(INVALID_REFRESH_TOKEN))
        );
    }

    #[tokio::test]
    async fn test_invalidate_revokes_refresh_token() {
        let (manager, store, user) = setup().await;
        let pair = manager.issue(user.id).await.unwrap();

        manager.invalidate(user.id).await.unwrap();
        let stored = store.find_by_id(user.id).await.unwrap().unwrap();
        assert!(stored.refresh_token.is_none());

        assert_matches!(
            manager.rotate(Some(&pair.refresh_token)).await,
            Err(AuthError::Unauthenticated(STALE_REFRESH_TOKEN))
        );
        // Access tokens stay valid until they expire
        manager.verify_access(Some(&pair.access_token)).await.unwrap();
    }

    #[tokio::test]
    async fn test_overflowing_lifetime_fails_issuance() {
        let (_, store, user) = setup().await;
        let config = TokenConfig {
            refresh_expiry: Duration::from_secs(u64::MAX),
            ..token_config()
        };
        let manager = TokenManager::new(&config, Arc::new(store.clone()));

        assert_matches!(manager.issue(user.id).await, Err(AuthError::TokenIssuance));
        let stored = store.find_by_id(user.id).await.unwrap().unwrap();
        assert!(stored.refresh_token.is_none());
    }
}
