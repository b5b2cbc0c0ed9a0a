//! Application configuration module
//!
//! Provides the configuration types for the server. Everything is read once at
//! startup, either from the process environment ([`AppConfig::from_env`]) or
//! assembled programmatically through [`AppConfigBuilder`], and then handed to
//! the components that need it. Nothing reads the environment after startup.
//!
//! # Required variables
//!
//! - `ACCESS_TOKEN_SECRET` / `ACCESS_TOKEN_EXPIRY`
//! - `REFRESH_TOKEN_SECRET` / `REFRESH_TOKEN_EXPIRY`
//!
//! Expiries accept plain seconds (`900`) or a number with a unit suffix
//! (`15m`, `1h`, `10d`, `2w`).
//!
//! # Optional variables
//!
//! `SERVER_PORT`, `DATABASE_URL`, `CORS_ORIGIN`, `UPLOAD_DIR`, `BCRYPT_COST`,
//! `CLOUDINARY_CLOUD_NAME`, `CLOUDINARY_API_KEY`, `CLOUDINARY_API_SECRET`.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Port used when `SERVER_PORT` is not set
pub const DEFAULT_PORT: u16 = 8000;

/// Directory multipart uploads are staged in before they go to the media host
pub const DEFAULT_UPLOAD_DIR: &str = "./public/temp";

/// Longest accepted token lifetime (100 years)
pub const MAX_TOKEN_EXPIRY: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

/// Same as `bcrypt::DEFAULT_COST`
pub const DEFAULT_BCRYPT_COST: u32 = 12;

/// Secrets and lifetimes for the access/refresh token pair
#[derive(Clone)]
pub struct TokenConfig {
    /// HMAC secret for access tokens
    pub access_secret: String,
    /// Access token lifetime
    pub access_expiry: Duration,
    /// HMAC secret for refresh tokens, never equal to `access_secret`
    pub refresh_secret: String,
    /// Refresh token lifetime
    pub refresh_expiry: Duration,
}

impl fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenConfig")
            .field("access_secret", &"<redacted>")
            .field("access_expiry", &self.access_expiry)
            .field("refresh_secret", &"<redacted>")
            .field("refresh_expiry", &self.refresh_expiry)
            .finish()
    }
}

/// Cloudinary credentials
#[derive(Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
}

impl fmt::Debug for CloudinaryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloudinaryConfig")
            .field("cloud_name", &self.cloud_name)
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .finish()
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Port the HTTP server binds to
    pub port: u16,
    /// PostgreSQL connection string; the in-memory store is used when absent
    pub database_url: Option<String>,
    /// Allowed browser origin for credentialed CORS requests
    pub cors_origin: Option<String>,
    /// Staging directory for uploaded files
    pub upload_dir: PathBuf,
    /// bcrypt work factor for password hashes
    pub bcrypt_cost: u32,
    /// Token secrets and lifetimes
    pub tokens: TokenConfig,
    /// Media host credentials; upload routes are unavailable when absent
    pub cloudinary: Option<CloudinaryConfig>,
}

impl AppConfig {
    /// Create a new AppConfigBuilder
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }

    /// Load the configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load the configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let mut builder = Self::builder()
            .access_token(
                get("ACCESS_TOKEN_SECRET").ok_or(ConfigError::MissingValue("ACCESS_TOKEN_SECRET"))?,
                expiry_var(&get, "ACCESS_TOKEN_EXPIRY")?,
            )
            .refresh_token(
                get("REFRESH_TOKEN_SECRET").ok_or(ConfigError::MissingValue("REFRESH_TOKEN_SECRET"))?,
                expiry_var(&get, "REFRESH_TOKEN_EXPIRY")?,
            );

        if let Some(port) = get("SERVER_PORT") {
            let port = port.trim().parse::<u16>().map_err(|_| ConfigError::InvalidValue {
                key: "SERVER_PORT",
                value: port.clone(),
            })?;
            builder = builder.port(port);
        }
        if let Some(url) = get("DATABASE_URL") {
            builder = builder.database_url(url);
        }
        if let Some(origin) = get("CORS_ORIGIN") {
            builder = builder.cors_origin(origin);
        }
        if let Some(dir) = get("UPLOAD_DIR") {
            builder = builder.upload_dir(dir);
        }
        if let Some(cost) = get("BCRYPT_COST") {
            let cost = cost.trim().parse::<u32>().map_err(|_| ConfigError::InvalidValue {
                key: "BCRYPT_COST",
                value: cost.clone(),
            })?;
            builder = builder.bcrypt_cost(cost);
        }

        match (
            get("CLOUDINARY_CLOUD_NAME"),
            get("CLOUDINARY_API_KEY"),
            get("CLOUDINARY_API_SECRET"),
        ) {
            (Some(cloud_name), Some(api_key), Some(api_secret)) => {
                builder = builder.cloudinary(CloudinaryConfig {
                    cloud_name,
                    api_key,
                    api_secret,
                });
            }
            (None, None, None) => {}
            _ => return Err(ConfigError::PartialCloudinary),
        }

        builder.build()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tokens.access_secret == self.tokens.refresh_secret {
            return Err(ConfigError::SharedSecret);
        }
        check_expiry("ACCESS_TOKEN_EXPIRY", self.tokens.access_expiry)?;
        check_expiry("REFRESH_TOKEN_EXPIRY", self.tokens.refresh_expiry)?;
        if !(4..=31).contains(&self.bcrypt_cost) {
            return Err(ConfigError::InvalidValue {
                key: "BCRYPT_COST",
                value: self.bcrypt_cost.to_string(),
            });
        }
        Ok(())
    }
}

/// Non-zero and no longer than `MAX_TOKEN_EXPIRY`
fn check_expiry(key: &'static str, expiry: Duration) -> Result<(), ConfigError> {
    if expiry.is_zero() || expiry > MAX_TOKEN_EXPIRY {
        return Err(ConfigError::InvalidValue {
            key,
            value: expiry.as_secs().to_string(),
        });
    }
    Ok(())
}

fn expiry_var<F>(get: &F, key: &'static str) -> Result<Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = get(key).ok_or(ConfigError::MissingValue(key))?;
    parse_expiry(&raw).ok_or(ConfigError::InvalidValue { key, value: raw })
}

/// Parse an expiry such as `900`, `15m`, `12h`, `10d` or `2w`
pub fn parse_expiry(value: &str) -> Option<Duration> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(seconds) = value.parse::<u64>() {
        return Some(Duration::from_secs(seconds));
    }

    let (split, unit) = value.char_indices().last()?;
    let amount: u64 = value[..split].trim().parse().ok()?;
    let multiplier = match unit {
        's' => 1,
        'm' => 60,
        'h' => 60 * 60,
        'd' => 24 * 60 * 60,
        'w' => 7 * 24 * 60 * 60,
        _ => return None,
    };
    amount.checked_mul(multiplier).map(Duration::from_secs)
}

/// Builder for AppConfig
#[derive(Debug, Default)]
pub struct AppConfigBuilder {
    port: Option<u16>,
    database_url: Option<String>,
    cors_origin: Option<String>,
    upload_dir: Option<PathBuf>,
    bcrypt_cost: Option<u32>,
    access: Option<(String, Duration)>,
    refresh: Option<(String, Duration)>,
    cloudinary: Option<CloudinaryConfig>,
}

impl AppConfigBuilder {
    /// Set the listen port
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Set the database URL
    pub fn database_url(mut self, url: impl Into<String>) -> Self {
        self.database_url = Some(url.into());
        self
    }

    /// Set the allowed CORS origin
    pub fn cors_origin(mut self, origin: impl Into<String>) -> Self {
        self.cors_origin = Some(origin.into());
        self
    }

    /// Set the upload staging directory
    pub fn upload_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.upload_dir = Some(dir.into());
        self
    }

    /// Set the bcrypt cost
    pub fn bcrypt_cost(mut self, cost: u32) -> Self {
        self.bcrypt_cost = Some(cost);
        self
    }

    /// Set the access token secret and lifetime
    pub fn access_token(mut self, secret: impl Into<String>, expiry: Duration) -> Self {
        self.access = Some((secret.into(), expiry));
        self
    }

    /// Set the refresh token secret and lifetime
    pub fn refresh_token(mut self, secret: impl Into<String>, expiry: Duration) -> Self {
        self.refresh = Some((secret.into(), expiry));
        self
    }

    /// Set the Cloudinary credentials
    pub fn cloudinary(mut self, cloudinary: CloudinaryConfig) -> Self {
        self.cloudinary = Some(cloudinary);
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<AppConfig, ConfigError> {
        let (access_secret, access_expiry) = self
            .access
            .ok_or(ConfigError::MissingValue("ACCESS_TOKEN_SECRET"))?;
        let (refresh_secret, refresh_expiry) = self
            .refresh
            .ok_or(ConfigError::MissingValue("REFRESH_TOKEN_SECRET"))?;

        let config = AppConfig {
            port: self.port.unwrap_or(DEFAULT_PORT),
            database_url: self.database_url,
            cors_origin: self.cors_origin,
            upload_dir: self
                .upload_dir
                .unwrap_or_else(|| PathBuf::from(DEFAULT_UPLOAD_DIR)),
            bcrypt_cost: self.bcrypt_cost.unwrap_or(DEFAULT_BCRYPT_COST),
            tokens: TokenConfig {
                access_secret,
                access_expiry,
                refresh_secret,
                refresh_expiry,
            },
            cloudinary: self.cloudinary,
        };
        config.validate()?;
        Ok(config)
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing value: {0}")]
    MissingValue(&'static str),
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
    #[error("ACCESS_TOKEN_SECRET and REFRESH_TOKEN_SECRET must differ")]
    SharedSecret,
    #[error("CLOUDINARY_CLOUD_NAME, CLOUDINARY_API_KEY and CLOUDINARY_API_SECRET must be set together")]
    PartialCloudinary,
}
