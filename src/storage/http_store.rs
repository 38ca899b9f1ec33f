//! Bucket REST API client.
//!
//! Speaks the hosted-bucket convention: `POST <endpoint>/object/<bucket>/<path>`
//! with an upsert header for overwrite-on-conflict, and
//! `<endpoint>/object/public/<bucket>/<path>` as the public URL of an
//! uploaded object.

use super::{ObjectStorage, StorageError};
use crate::config::StorageConfig;
use crate::logging::log_storage_operation;
use async_trait::async_trait;

pub struct HttpObjectStore {
    client: reqwest::Client,
    endpoint: String,
    bucket: String,
    api_key: String,
}

impl HttpObjectStore {
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            bucket: config.bucket.clone(),
            api_key: config.api_key.clone(),
        }
    }
}

#[async_trait]
impl ObjectStorage for HttpObjectStore {
    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, StorageError> {
        let url = format!("{}/object/{}/{}", self.endpoint, self.bucket, path);
        let byte_count = bytes.len();

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .header("x-upsert", "true")
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            log_storage_operation("upload", path, "rejected", Some(byte_count), Some(&message));
            return Err(StorageError::Rejected {
                path: path.to_string(),
                status,
                message,
            });
        }

        log_storage_operation("upload", path, "stored", Some(byte_count), None);
        Ok(self.public_url(path))
    }

    fn public_url(&self, path: &str) -> String {
        format!("{}/object/public/{}/{}", self.endpoint, self.bucket, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_url_shape() {
        let store = HttpObjectStore::new(&StorageConfig {
            endpoint: "http://localhost:54321/storage/v1/".to_string(),
            bucket: "cards".to_string(),
            api_key: "secret".to_string(),
        });

        assert_eq!(
            store.public_url("photos/E100.png"),
            "http://localhost:54321/storage/v1/object/public/cards/photos/E100.png"
        );
    }
}
