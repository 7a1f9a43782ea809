use std::{path::PathBuf, sync::Arc};

use futures::future::BoxFuture;
use tracing::debug;
use uuid::Uuid;

use super::{PhotoError, PhotoStore, PhotoUpload};
use crate::dao::models::StoredPhoto;

/// URL prefix under which the upload directory is served.
pub const UPLOADS_ROUTE: &str = "uploads";

/// Writes photos to a directory served by this process and records the relative path.
#[derive(Debug, Clone)]
pub struct LocalPhotoStore {
    upload_dir: Arc<PathBuf>,
}

impl LocalPhotoStore {
    /// Store files in `upload_dir`, created on first write.
    pub fn new(upload_dir: PathBuf) -> Self {
        Self {
            upload_dir: Arc::new(upload_dir),
        }
    }
}

impl PhotoStore for LocalPhotoStore {
    fn store(&self, upload: PhotoUpload) -> BoxFuture<'static, Result<StoredPhoto, PhotoError>> {
        let upload_dir = self.upload_dir.clone();
        Box::pin(async move {
            tokio::fs::create_dir_all(upload_dir.as_path())
                .await
                .map_err(|source| PhotoError::Write {
                    path: upload_dir.to_path_buf(),
                    source,
                })?;

            let file_name = format!("{}.{}", Uuid::now_v7(), upload.extension());
            let path = upload_dir.join(&file_name);
            tokio::fs::write(&path, &upload.bytes)
                .await
                .map_err(|source| PhotoError::Write {
                    path: path.clone(),
                    source,
                })?;

            debug!(path = %path.display(), bytes = upload.bytes.len(), "stored photo on disk");
            Ok(StoredPhoto::path(format!("{UPLOADS_ROUTE}/{file_name}")))
        })
    }
}
