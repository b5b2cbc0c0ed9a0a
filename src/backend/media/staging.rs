/**
 * Upload Staging
 *
 * Multipart requests are read fully into an `UploadForm`: text parts become
 * plain fields, file parts are written to the upload directory under a random
 * name. A `StagedFile` deletes its file when dropped, so every early return in
 * a handler cleans up after itself.
 */

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use axum::extract::Multipart;
use uuid::Uuid;

use crate::backend::error::ApiError;

/// A file part spooled to local disk
#[derive(Debug)]
pub struct StagedFile {
    path: PathBuf,
}

impl StagedFile {
    /// Write `data` into `dir` under a random name keeping the extension
    pub async fn write(dir: &Path, original_name: &str, data: &[u8]) -> std::io::Result<Self> {
        tokio::fs::create_dir_all(dir).await?;

        let extension = Path::new(original_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .filter(|ext| ext.chars().all(|c| c.is_ascii_alphanumeric()))
            .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
            .unwrap_or_default();
        let path = dir.join(format!("{}{}", Uuid::new_v4(), extension));

        tokio::fs::write(&path, data).await?;

        Ok(Self { path })
    }

    /// Location of the staged file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!("Failed to remove staged file {}: {}", self.path.display(), e);
            }
        }
    }
}

/// A fully read multipart request
#[derive(Debug, Default)]
pub struct UploadForm {
    fields: HashMap<String, String>,
    files: HashMap<String, StagedFile>,
}

impl UploadForm {
    /// Read every part of `multipart`, staging file parts into `upload_dir`
    ///
    /// Empty file parts are treated as absent. A body cut off by the body
    /// limit is a 413, any other malformed part a 400.
    pub async fn read(mut multipart: Multipart, upload_dir: &Path) -> Result<Self, ApiError> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            match field.file_name().map(str::to_string) {
                Some(file_name) => {
                    let data = field.bytes().await?;
                    if data.is_empty() {
                        continue;
                    }
                    let staged = StagedFile::write(upload_dir, &file_name, &data)
                        .await
                        .map_err(|e| {
                            tracing::error!("Failed to stage upload: {}", e);
                            ApiError::internal("failed to store uploaded file")
                        })?;
                    form.files.insert(name, staged);
                }
                None => {
                    let value = field.text().await?;
                    form.fields.insert(name, value);
                }
            }
        }

        Ok(form)
    }

    /// Text field value, if sent
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Take ownership of a staged file part
    pub fn take_file(&mut self, name: &str) -> Option<StagedFile> {
        self.files.remove(name)
    }
}
