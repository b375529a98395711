use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use serde::Deserialize;
use thiserror::Error;

use crate::config::MediaConfig;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("media host unreachable: {0}")]
    Unavailable(String),
    #[error("media host rejected upload with status {0}")]
    Rejected(u16),
    #[error("media host returned a malformed response")]
    MalformedResponse,
}

#[derive(Debug, Clone)]
pub struct UploadedMedia {
    pub url: String,
}

/// External media host collaborator: bytes in, hosted URL out. A failure here
/// surfaces as an error on the enclosing request but never touches its
/// authentication or authorization state.
#[async_trait]
pub trait MediaHost: Send + Sync {
    async fn upload(&self, filename: &str, bytes: Bytes) -> Result<UploadedMedia, MediaError>;
}

#[derive(Deserialize)]
struct UploadResponse {
    url: String,
}

/// HTTP media host: multipart POST to the configured upload endpoint, with a
/// bounded client timeout so a slow host cannot stall request handling
/// indefinitely.
pub struct HttpMediaHost {
    client: reqwest::Client,
    upload_url: String,
    api_key: String,
}

impl HttpMediaHost {
    pub fn from_config(config: &MediaConfig) -> Result<Self, MediaError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| MediaError::Unavailable(e.to_string()))?;

        Ok(Self {
            client,
            upload_url: config.upload_url.clone(),
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl MediaHost for HttpMediaHost {
    async fn upload(&self, filename: &str, bytes: Bytes) -> Result<UploadedMedia, MediaError> {
        tracing::info!("uploading image '{}' ({} bytes)", filename, bytes.len());

        let part = reqwest::multipart::Part::bytes(bytes.to_vec()).file_name(filename.to_string());
        let form = reqwest::multipart::Form::new()
            .text("api_key", self.api_key.clone())
            .part("file", part);

        let response = self
            .client
            .post(&self.upload_url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| MediaError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(MediaError::Rejected(response.status().as_u16()));
        }

        let body: UploadResponse = response.json().await.map_err(|_| MediaError::MalformedResponse)?;

        tracing::info!("image uploaded: {}", body.url);
        Ok(UploadedMedia { url: body.url })
    }
}

/// Test double that "hosts" every upload at a fixed URL prefix.
pub struct FixedMediaHost {
    pub base_url: String,
}

impl FixedMediaHost {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into() }
    }
}

#[async_trait]
impl MediaHost for FixedMediaHost {
    async fn upload(&self, filename: &str, _bytes: Bytes) -> Result<UploadedMedia, MediaError> {
        Ok(UploadedMedia {
            url: format!("{}/{}", self.base_url.trim_end_matches('/'), filename),
        })
    }
}

/// Test double for an unreachable media host.
pub struct FailingMediaHost;

#[async_trait]
impl MediaHost for FailingMediaHost {
    async fn upload(&self, _filename: &str, _bytes: Bytes) -> Result<UploadedMedia, MediaError> {
        Err(MediaError::Unavailable("connection refused".to_string()))
    }
}
