use std::sync::Arc;

use futures::future::BoxFuture;
use reqwest::{Client, header::CONTENT_TYPE};
use tracing::debug;
use uuid::Uuid;

use super::{PhotoError, PhotoStore, PhotoUpload};
use crate::dao::models::StoredPhoto;

/// Uploads photos to an HTTP object store (pre-authorized bucket endpoint)
/// and records the public URL of the object.
#[derive(Clone)]
pub struct ObjectPhotoStore {
    client: Client,
    bucket_url: Arc<str>,
    public_url: Arc<str>,
}

impl ObjectPhotoStore {
    /// Upload to `bucket_url`, publish under `public_url`.
    pub fn new(bucket_url: impl AsRef<str>, public_url: impl AsRef<str>) -> Self {
        Self {
            client: Client::new(),
            bucket_url: Arc::from(bucket_url.as_ref().trim_end_matches('/')),
            public_url: Arc::from(public_url.as_ref().trim_end_matches('/')),
        }
    }
}

impl PhotoStore for ObjectPhotoStore {
    fn store(&self, upload: PhotoUpload) -> BoxFuture<'static, Result<StoredPhoto, PhotoError>> {
        let store = self.clone();
        Box::pin(async move {
            let key = format!("attempts/{}.{}", Uuid::now_v7(), upload.extension());
            let url = format!("{}/{}", store.bucket_url, key);
            let size = upload.bytes.len();

            let response = store
                .client
                .put(&url)
                .header(CONTENT_TYPE, upload.content_type)
                .body(upload.bytes)
                .send()
                .await
                .map_err(|source| PhotoError::Upload {
                    url: url.clone(),
                    source,
                })?;

            if !response.status().is_success() {
                return Err(PhotoError::UploadStatus {
                    url,
                    status: response.status(),
                });
            }

            debug!(%url, bytes = size, "uploaded photo to object store");
            Ok(StoredPhoto::url(format!("{}/{}", store.public_url, key)))
        })
    }
}
