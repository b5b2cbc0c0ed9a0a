/**
 * Cloudinary Client
 *
 * `MediaHost` implementation over the Cloudinary upload API.
 *
 * # Request Signing
 *
 * Every call carries `api_key`, `timestamp` and a `signature`: the SHA-256
 * hex digest of the signed parameters, sorted by name and joined as
 * `a=1&b=2`, immediately followed by the API secret.
 * `signature_algorithm=sha256` tells the host which digest was used and is
 * not itself signed.
 */

use std::path::Path;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha2::{Digest, Sha256};

use super::{MediaError, MediaHost, UploadedMedia};
use crate::shared::CloudinaryConfig;

/// Public API endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.cloudinary.com/v1_1";

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
    public_id: String,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

/// Cloudinary API client
#[derive(Debug, Clone)]
pub struct CloudinaryClient {
    http: reqwest::Client,
    base_url: String,
    config: CloudinaryConfig,
}

impl CloudinaryClient {
    pub fn new(config: CloudinaryConfig) -> Self {
        Self::with_base_url(config, DEFAULT_BASE_URL)
    }

    /// Client talking to a different endpoint (used against mock servers)
    pub fn with_base_url(config: CloudinaryConfig, base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            config,
        }
    }

    /// Signature over `params` with the configured secret
    pub fn sign(&self, params: &[(&str, &str)]) -> String {
        sign_params(params, &self.config.api_secret)
    }

    fn endpoint(&self, resource: &str, action: &str) -> String {
        format!("{}/{}/{}/{}", self.base_url, self.config.cloud_name, resource, action)
    }
}

fn sign_params(params: &[(&str, &str)], secret: &str) -> String {
    let mut sorted = params.to_vec();
    sorted.sort_by(|a, b| a.0.cmp(b.0));

    let joined = sorted
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(joined.as_bytes());
    hasher.update(secret.as_bytes());
    hex::encode(hasher.finalize())
}

/// Turn a non-2xx response into `MediaError::Rejected`
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, MediaError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(MediaError::Rejected {
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl MediaHost for CloudinaryClient {
    async fn upload(&self, path: &Path) -> Result<UploadedMedia, MediaError> {
        let data = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("upload")
            .to_string();

        let timestamp = Utc::now().timestamp().to_string();
        let signature = self.sign(&[("timestamp", timestamp.as_str())]);

        let form = Form::new()
            .part("file", Part::bytes(data).file_name(file_name))
            .text("api_key", self.config.api_key.clone())
            .text("timestamp", timestamp)
            .text("signature", signature)
            .text("signature_algorithm", "sha256");

        let response = self
            .http
            .post(self.endpoint("auto", "upload"))
            .multipart(form)
            .send()
            .await?;
        let uploaded: UploadResponse = check_status(response).await?.json().await?;

        tracing::info!("Uploaded {} to media host as {}", path.display(), uploaded.public_id);

        Ok(UploadedMedia {
            url: uploaded.secure_url,
            public_id: uploaded.public_id,
        })
    }

    async fn delete(&self, public_id: &str) -> Result<(), MediaError> {
        let timestamp = Utc::now().timestamp().to_string();
        let signature = self.sign(&[("public_id", public_id), ("timestamp", timestamp.as_str())]);

        let params = [
            ("public_id", public_id),
            ("api_key", self.config.api_key.as_str()),
            ("timestamp", timestamp.as_str()),
            ("signature", signature.as_str()),
            ("signature_algorithm", "sha256"),
        ];

        let response = self
            .http
            .post(self.endpoint("image", "destroy"))
            .form(&params)
            .send()
            .await?;
        let destroyed: DestroyResponse = check_status(response).await?.json().await?;

        match destroyed.result.as_str() {
            "ok" | "not found" => {
                tracing::debug!("Deleted media {} ({})", public_id, destroyed.result);
                Ok(())
            }
            other => Err(MediaError::Rejected {
                status: 200,
                body: other.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config() -> CloudinaryConfig {
        CloudinaryConfig {
            cloud_name: "demo".to_string(),
            api_key: "key123".to_string(),
            api_secret: "abcd".to_string(),
        }
    }

    #[test]
    fn test_signature_sorts_parameters() {
        let client = CloudinaryClient::new(config());
        let expected = "0d4fe14b2b4a3f68a97ccc5097c43908b623d24293c296826a9390c14d891509";

        assert_eq!(
            client.sign(&[("public_id", "sample"), ("timestamp", "1315060510")]),
            expected
        );
        assert_eq!(
            client.sign(&[("timestamp", "1315060510"), ("public_id", "sample")]),
            expected
        );
    }

    #[tokio::test]
    async fn test_upload_returns_url_and_public_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/demo/auto/upload"))
            .and(body_string_contains("key123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "secure_url": "https://res.cloudinary.com/demo/image/upload/v1/abc.png",
                "public_id": "abc",
            })))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("avatar.png");
        std::fs::write(&file, b"png-bytes").unwrap();

        let client = CloudinaryClient::with_base_url(config(), server.uri());
        let media = client.upload(&file).await.unwrap();

        assert_eq!(media.public_id, "abc");
        assert_eq!(media.url, "https://res.cloudinary.com/demo/image/upload/v1/abc.png");
    }

    #[tokio::test]
    async fn test_upload_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/demo/auto/upload"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Invalid Signature"))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("avatar.png");
        std::fs::write(&file, b"png-bytes").unwrap();

        let client = CloudinaryClient::with_base_url(config(), server.uri());
        let result = client.upload(&file).await;
        assert_matches!(result, Err(MediaError::Rejected { status: 401, .. }));
    }

    #[tokio::test]
    async fn test_upload_missing_file() {
        let client = CloudinaryClient::with_base_url(config(), "http://127.0.0.1:9");
        let result = client.upload(Path::new("/nonexistent/file.png")).await;
        assert_matches!(result, Err(MediaError::Io(_)));
    }

    #[tokio::test]
    async fn test_delete_accepts_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/demo/image/destroy"))
            .and(body_string_contains("public_id=old"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "result": "not found" })),
            )
            .mount(&server)
            .await;

        let client = CloudinaryClient::with_base_url(config(), server.uri());
        client.delete("old").await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_unexpected_result() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/demo/image/destroy"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "result": "error" })),
            )
            .mount(&server)
            .await;

        let client = CloudinaryClient::with_base_url(config(), server.uri());
        assert_matches!(client.delete("old").await, Err(MediaError::Rejected { .. }));
    }
}
