//! Object storage client for product images.
//!
//! Images are uploaded to `{base}/storage/v1/object/{bucket}/{name}` with the
//! service key and served from `{base}/storage/v1/object/public/{bucket}/{name}`.
//! Object names are `{uuid}.{ext}`.

use std::sync::Arc;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use thiserror::Error;
use url::Url;
use uuid::Uuid;

use crate::config::StorageConfig;

/// Largest image accepted for upload (5 MiB).
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Errors that can occur when talking to object storage.
#[derive(Debug, Error)]
pub enum StorageError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Storage answered with a non-success status.
    #[error("upload rejected: {status} - {body}")]
    Rejected { status: u16, body: String },

    /// The configured base URL could not be joined with the object path.
    #[error("invalid storage URL: {0}")]
    Url(#[from] url::ParseError),

    /// Invalid header value (service key with control characters).
    #[error("invalid service key: {0}")]
    InvalidKey(String),

    /// The file is not an image or is too large.
    #[error("{0}")]
    InvalidFile(String),
}

/// Object storage client.
#[derive(Clone)]
pub struct StorageClient {
    inner: Arc<StorageClientInner>,
}

struct StorageClientInner {
    client: reqwest::Client,
    base_url: Url,
    bucket: String,
}

impl StorageClient {
    /// Create a new storage client.
    ///
    /// # Errors
    ///
    /// Returns error if the service key is not a valid header value or the
    /// HTTP client fails to build.
    pub fn new(config: &StorageConfig) -> Result<Self, StorageError> {
        let key = config.service_key.expose_secret();
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {key}"))
                .map_err(|e| StorageError::InvalidKey(e.to_string()))?,
        );
        headers.insert(
            "apikey",
            HeaderValue::from_str(key).map_err(|e| StorageError::InvalidKey(e.to_string()))?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            inner: Arc::new(StorageClientInner {
                client,
                base_url: config.base_url.clone(),
                bucket: config.bucket.clone(),
            }),
        })
    }

    /// Upload an image and return its public URL.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidFile` for empty, oversized or non-image
    /// files, and `StorageError::Rejected` when the upload is refused.
    #[tracing::instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn upload_image(
        &self,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, StorageError> {
        validate_image(content_type, bytes.len())?;

        let object = object_name(file_name, content_type);
        let upload_url = self.inner.base_url.join(&format!(
            "storage/v1/object/{}/{object}",
            self.inner.bucket
        ))?;

        let response = self
            .inner
            .client
            .post(upload_url)
            .header(CONTENT_TYPE, content_type)
            .header("x-upsert", "false")
            .body(bytes)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let public = public_url(&self.inner.base_url, &self.inner.bucket, &object)?;
        tracing::info!(object = %object, "Product image uploaded");
        Ok(public)
    }
}

fn validate_image(content_type: &str, len: usize) -> Result<(), StorageError> {
    if len == 0 {
        return Err(StorageError::InvalidFile("Image file is empty".to_string()));
    }
    if len > MAX_UPLOAD_BYTES {
        return Err(StorageError::InvalidFile(
            "Image must be 5 MB or smaller".to_string(),
        ));
    }
    if !content_type.starts_with("image/") {
        return Err(StorageError::InvalidFile(
            "Only image files can be uploaded".to_string(),
        ));
    }
    Ok(())
}

/// `{uuid}.{ext}`, taking the extension from the file name or the MIME type.
fn object_name(file_name: &str, content_type: &str) -> String {
    let from_name = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty() && ext.len() <= 5 && ext.chars().all(|c| c.is_ascii_alphanumeric()));

    let ext = from_name.unwrap_or_else(|| {
        match content_type {
            "image/png" => "png",
            "image/webp" => "webp",
            "image/gif" => "gif",
            _ => "jpg",
        }
        .to_string()
    });

    format!("{}.{ext}", Uuid::new_v4())
}

fn public_url(base: &Url, bucket: &str, object: &str) -> Result<String, StorageError> {
    Ok(base
        .join(&format!("storage/v1/object/public/{bucket}/{object}"))?
        .to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_object_name_keeps_extension() {
        let name = object_name("Air Max.PNG", "image/png");
        assert!(name.ends_with(".png"));
        assert_eq!(name.len(), 36 + 4);
    }

    #[test]
    fn test_object_name_falls_back_to_mime_type() {
        assert!(object_name("photo", "image/webp").ends_with(".webp"));
        assert!(object_name("weird.ex$e", "image/jpeg").ends_with(".jpg"));
    }

    #[test]
    fn test_public_url() {
        let base = Url::parse("https://abc.backend.io/").unwrap();
        assert_eq!(
            public_url(&base, "products", "x.jpg").unwrap(),
            "https://abc.backend.io/storage/v1/object/public/products/x.jpg"
        );
    }

    #[test]
    fn test_validate_image() {
        assert!(validate_image("image/jpeg", 10).is_ok());
        assert!(validate_image("image/jpeg", 0).is_err());
        assert!(validate_image("application/pdf", 10).is_err());
        assert!(validate_image("image/png", MAX_UPLOAD_BYTES + 1).is_err());
    }
}
