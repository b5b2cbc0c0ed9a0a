//! Media Host Module
//!
//! Avatar and cover images are not stored by this service. Multipart file
//! parts are spooled to the upload directory, pushed to a third-party media
//! host, and only the returned URL and public id are kept on the user record.
//!
//! # Module Structure
//!
//! ```text
//! media/
//! ├── mod.rs        - MediaHost trait, UploadedMedia, MediaError
//! ├── staging.rs    - Multipart parsing and temporary files
//! └── cloudinary.rs - Cloudinary implementation of MediaHost
//! ```
//!
//! # Upload Contract
//!
//! The local temporary file is removed whether the upload succeeds or fails,
//! and a failed upload never yields an `UploadedMedia`.

use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Cloudinary client
pub mod cloudinary;

/// Multipart staging
pub mod staging;

pub use cloudinary::CloudinaryClient;
pub use staging::{StagedFile, UploadForm};

/// A file stored on the media host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedMedia {
    /// Public URL of the stored file
    pub url: String,
    /// Host-side reference used to delete the file later
    pub public_id: String,
}

/// Media host errors
#[derive(Debug, Error)]
pub enum MediaError {
    /// No media host is configured
    #[error("media host not configured")]
    NotConfigured,

    /// Reading the staged file failed
    #[error("failed to read staged file: {0}")]
    Io(#[from] std::io::Error),

    /// The request to the media host failed
    #[error("media host request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The media host answered with an error
    #[error("media host rejected the request ({status}): {body}")]
    Rejected { status: u16, body: String },
}

/// Remote media storage
#[async_trait]
pub trait MediaHost: Send + Sync {
    /// Upload the file at `path`
    async fn upload(&self, path: &Path) -> Result<UploadedMedia, MediaError>;

    /// Delete a previously uploaded file
    async fn delete(&self, public_id: &str) -> Result<(), MediaError>;
}

/// Upload a staged file and remove it locally, regardless of the outcome
pub async fn upload_and_discard(
    host: &dyn MediaHost,
    file: StagedFile,
) -> Result<UploadedMedia, MediaError> {
    let result = host.upload(file.path()).await;
    drop(file);

    match &result {
        Ok(media) => tracing::debug!("Uploaded media {}", media.public_id),
        Err(e) => tracing::warn!("Media upload failed: {}", e),
    }
    result
}

/// Best-effort removal of a file on the media host
///
/// Failures are logged and otherwise ignored.
pub async fn discard_remote(host: &dyn MediaHost, public_id: Option<&str>) {
    let Some(public_id) = public_id else {
        return;
    };
    if let Err(e) = host.delete(public_id).await {
        tracing::warn!("Failed to delete media {}: {}", public_id, e);
    }
}
