//! Cloud Storage client.
//!
//! Implements the [`ObjectStorage`] contract over the Cloud Storage JSON API.
//! Uploads are simple media uploads; objects are served back through the
//! public `storage.googleapis.com/{bucket}/{object}` form.

use patitas_common::services::{BoxFuture, ObjectStorage, StoredObject};
use patitas_config::FirebaseConfig;
use reqwest::{header, Client};
use thiserror::Error;
use tracing::debug;

use crate::auth::{get_google_auth_token, STORAGE_SCOPE};
use patitas_common::http::client::HTTP_CLIENT;

/// Errors that can occur when interacting with Cloud Storage.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Error during authentication with Google
    #[error("Authentication error: {0}")]
    AuthError(String),

    /// Error during HTTP request to the storage API
    #[error("HTTP request error: {0}")]
    RequestError(#[from] reqwest::Error),

    /// Missing required configuration
    #[error("Missing configuration: {0}")]
    ConfigError(String),

    /// Error returned by the storage API
    #[error("Storage API error: {0}")]
    ApiError(String),
}

/// Client for Cloud Storage object uploads.
pub struct StorageClient {
    client: Client,
    config: FirebaseConfig,
    bucket: String,
}

impl StorageClient {
    /// Creates a new storage client for the given bucket.
    pub fn new(config: FirebaseConfig, bucket: impl Into<String>) -> Self {
        Self {
            client: HTTP_CLIENT.clone(),
            config,
            bucket: bucket.into(),
        }
    }

    async fn token(&self) -> Result<String, StorageError> {
        get_google_auth_token(&self.config, STORAGE_SCOPE)
            .await
            .map_err(|e| StorageError::AuthError(e.to_string()))
    }
}

/// Percent-encode an object path for use in a query parameter.
fn encode_object_name(path: &str) -> String {
    let mut encoded = String::with_capacity(path.len());
    for byte in path.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                encoded.push(byte as char)
            }
            other => encoded.push_str(&format!("%{:02X}", other)),
        }
    }
    encoded
}

impl ObjectStorage for StorageClient {
    type Error = StorageError;

    fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> BoxFuture<'_, StoredObject, Self::Error> {
        let path = path.to_string();
        let content_type = content_type.to_string();
        Box::pin(async move {
            let url = format!(
                "https://storage.googleapis.com/upload/storage/v1/b/{}/o?uploadType=media&name={}",
                self.bucket,
                encode_object_name(&path)
            );
            let token = self.token().await?;

            debug!("Uploading {} bytes to {}", bytes.len(), path);
            let response = self
                .client
                .post(&url)
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .header(header::CONTENT_TYPE, content_type)
                .body(bytes)
                .send()
                .await?;

            if !response.status().is_success() {
                return Err(StorageError::ApiError(response.text().await?));
            }

            let public_url = self.public_url(&path);
            Ok(StoredObject { path, public_url })
        })
    }

    fn public_url(&self, path: &str) -> String {
        format!("https://storage.googleapis.com/{}/{}", self.bucket, path)
    }
}
