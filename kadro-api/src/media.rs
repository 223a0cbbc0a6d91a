/// Media store port
///
/// Company logos and user avatars are hosted by an external media service;
/// the workflow uploads a file and persists the returned URL. Storage
/// mechanics are out of scope, so handlers only see this trait.
///
/// Implementations: [`HttpMediaStore`] posts the file as multipart to the
/// configured upload endpoint and reads the URL out of the JSON reply;
/// [`StaticMediaStore`] is the test double returning a canned URL.

use async_trait::async_trait;
use bytes::Bytes;
use serde::Deserialize;

/// Media store error type
#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    /// Uploads are disabled (no endpoint configured)
    #[error("Media uploads are not configured")]
    NotConfigured,

    /// The media host rejected or failed the upload
    #[error("Media upload failed: {0}")]
    UploadFailed(String),
}

/// Media store contract
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Uploads a file and returns its public URL
    async fn upload(&self, filename: &str, content: Bytes) -> Result<String, MediaError>;
}

/// Reply shape of the media host's upload endpoint
#[derive(Debug, Deserialize)]
struct UploadReply {
    url: String,
}

/// Media store backed by an HTTP upload endpoint
pub struct HttpMediaStore {
    client: reqwest::Client,
    upload_url: Option<String>,
}

impl HttpMediaStore {
    /// Creates a media store for the given upload endpoint
    ///
    /// `None` produces a store that fails every upload with
    /// `MediaError::NotConfigured`.
    pub fn new(upload_url: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            upload_url,
        }
    }
}

#[async_trait]
impl MediaStore for HttpMediaStore {
    async fn upload(&self, filename: &str, content: Bytes) -> Result<String, MediaError> {
        let upload_url = self.upload_url.as_ref().ok_or(MediaError::NotConfigured)?;

        let part = reqwest::multipart::Part::bytes(content.to_vec())
            .file_name(filename.to_string());
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(upload_url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| MediaError::UploadFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(MediaError::UploadFailed(format!(
                "media host returned {}",
                response.status()
            )));
        }

        let reply: UploadReply = response
            .json()
            .await
            .map_err(|e| MediaError::UploadFailed(e.to_string()))?;

        Ok(reply.url)
    }
}

/// Media store returning a canned URL
///
/// Test double for upload handlers.
pub struct StaticMediaStore {
    url: String,
}

impl StaticMediaStore {
    /// Creates a store that answers every upload with `url`
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

#[async_trait]
impl MediaStore for StaticMediaStore {
    async fn upload(&self, _filename: &str, _content: Bytes) -> Result<String, MediaError> {
        Ok(self.url.clone())
    }
}
