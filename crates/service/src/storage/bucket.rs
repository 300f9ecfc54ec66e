use async_trait::async_trait;
use tracing::debug;

use super::image::ImageFile;
use crate::errors::ServiceError;
use crate::http;

/// Object storage holding uploaded images.
#[async_trait]
pub trait ImageStorage: Send + Sync {
    /// Store `file` under `key`. Existing objects are never overwritten.
    async fn upload(&self, key: &str, file: &ImageFile) -> Result<(), ServiceError>;
    /// Public URL for `key`; deterministic, no round trip.
    fn public_url(&self, key: &str) -> String;
}

/// One bucket of the hosted storage API.
pub struct BucketStorage {
    client: reqwest::Client,
    object_url: String,
    public_url: String,
    key: String,
}

impl BucketStorage {
    pub fn new(client: reqwest::Client, endpoint: &str, key: &str, bucket: &str) -> Self {
        let base = format!("{}/storage/v1/object", endpoint.trim_end_matches('/'));
        Self {
            client,
            object_url: format!("{base}/{bucket}"),
            public_url: format!("{base}/public/{bucket}"),
            key: key.to_string(),
        }
    }
}

#[async_trait]
impl ImageStorage for BucketStorage {
    async fn upload(&self, key: &str, file: &ImageFile) -> Result<(), ServiceError> {
        let req = self
            .client
            .post(format!("{}/{}", self.object_url, key))
            .header(reqwest::header::CONTENT_TYPE, &file.content_type)
            .header(reqwest::header::CACHE_CONTROL, "max-age=3600")
            .header("x-upsert", "false")
            .body(file.bytes.clone());
        http::send(http::authorize(req, &self.key)).await?;
        debug!(%key, bytes = file.bytes.len(), "image_stored");
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_url, key)
    }
}

/// In-memory storage for tests and doc examples.
pub mod mock {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MockImageStorage {
        uploads: Mutex<Vec<(String, ImageFile)>>,
        failure: Mutex<Option<String>>,
    }

    impl MockImageStorage {
        pub fn fail_with(&self, message: &str) {
            *self.failure.lock().unwrap() = Some(message.to_string());
        }

        /// Keys uploaded so far, in order.
        pub fn keys(&self) -> Vec<String> {
            self.uploads.lock().unwrap().iter().map(|(k, _)| k.clone()).collect()
        }
    }

    #[async_trait]
    impl ImageStorage for MockImageStorage {
        async fn upload(&self, key: &str, file: &ImageFile) -> Result<(), ServiceError> {
            if let Some(m) = self.failure.lock().unwrap().as_ref() {
                return Err(ServiceError::Remote { status: 400, message: m.clone() });
            }
            let mut uploads = self.uploads.lock().unwrap();
            if uploads.iter().any(|(k, _)| k == key) {
                return Err(ServiceError::Remote { status: 409, message: "The resource already exists".into() });
            }
            uploads.push((key.to_string(), file.clone()));
            Ok(())
        }

        fn public_url(&self, key: &str) -> String {
            format!("https://storage.test/public/schools/{key}")
        }
    }
}
