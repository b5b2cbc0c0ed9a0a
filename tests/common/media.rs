//! Fake media host
//!
//! Records every upload and deletion instead of talking to a real service.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use streamhub::backend::media::{MediaError, MediaHost, UploadedMedia};

/// In-process `MediaHost` for tests
#[derive(Debug, Default)]
pub struct FakeMediaHost {
    uploads: AtomicUsize,
    /// Uploads with an index at or above this fail
    fail_from: Option<usize>,
    deleted: Mutex<Vec<String>>,
}

impl FakeMediaHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Host whose uploads succeed `n` times and then fail
    pub fn failing_after(n: usize) -> Self {
        Self {
            fail_from: Some(n),
            ..Default::default()
        }
    }

    /// Number of upload attempts so far
    pub fn upload_count(&self) -> usize {
        self.uploads.load(Ordering::SeqCst)
    }

    /// Public ids deleted so far, in order
    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }
}

#[async_trait]
impl MediaHost for FakeMediaHost {
    async fn upload(&self, path: &Path) -> Result<UploadedMedia, MediaError> {
        let index = self.uploads.fetch_add(1, Ordering::SeqCst);
        // The staged file must exist while it is being uploaded
        assert!(path.exists(), "staged file missing during upload");

        if self.fail_from.is_some_and(|n| index >= n) {
            return Err(MediaError::Rejected {
                status: 500,
                body: "upload failed".to_string(),
            });
        }

        Ok(UploadedMedia {
            url: format!("https://media.test/media-{}.png", index),
            public_id: format!("media-{}", index),
        })
    }

    async fn delete(&self, public_id: &str) -> Result<(), MediaError> {
        self.deleted.lock().unwrap().push(public_id.to_string());
        Ok(())
    }
}
