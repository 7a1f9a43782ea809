//! Photo blob backends and the resolver presenting their output as one URL.

pub mod inline;
pub mod local;
#[cfg(feature = "object-photos")]
pub mod object;
pub mod resolver;

use std::{path::PathBuf, sync::Arc};

use futures::future::BoxFuture;
use thiserror::Error;

use crate::{
    config::{PhotoBackend, PhotoConfig},
    dao::models::StoredPhoto,
};

pub use resolver::{PhotoResolver, resolve_photo_url};

/// Binary payload submitted alongside an attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoUpload {
    /// Raw image bytes.
    pub bytes: Vec<u8>,
    /// MIME type reported by the client.
    pub content_type: String,
}

impl PhotoUpload {
    /// File extension matching the declared MIME type.
    pub fn extension(&self) -> &'static str {
        match self.content_type.as_str() {
            "image/jpeg" | "image/jpg" => "jpg",
            "image/png" => "png",
            "image/webp" => "webp",
            "image/gif" => "gif",
            "image/heic" => "heic",
            "image/avif" => "avif",
            _ => "bin",
        }
    }
}

/// Failures of a photo backend. Callers treat these as warnings: the attempt is
/// still created, only without a photo.
#[derive(Debug, Error)]
pub enum PhotoError {
    /// Writing the file into the upload directory failed.
    #[error("failed to write photo to `{path}`")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The object store request could not be sent.
    #[cfg(feature = "object-photos")]
    #[error("failed to upload photo to `{url}`")]
    Upload {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    /// The object store answered with a non-success status.
    #[cfg(feature = "object-photos")]
    #[error("photo upload to `{url}` returned status {status}")]
    UploadStatus {
        url: String,
        status: reqwest::StatusCode,
    },
    /// The backend cannot run with the given configuration.
    #[error("photo backend misconfigured: {0}")]
    Misconfigured(String),
}

/// Stores uploaded photos and reports which representation it produced.
pub trait PhotoStore: Send + Sync {
    fn store(&self, upload: PhotoUpload) -> BoxFuture<'static, Result<StoredPhoto, PhotoError>>;
}

/// Build the photo backend selected by configuration.
pub fn build_photo_store(config: &PhotoConfig) -> Result<Arc<dyn PhotoStore>, PhotoError> {
    match config.backend {
        PhotoBackend::Inline => Ok(Arc::new(inline::InlinePhotoStore)),
        PhotoBackend::Local => Ok(Arc::new(local::LocalPhotoStore::new(
            config.upload_dir.clone(),
        ))),
        PhotoBackend::Object => build_object_store(config),
    }
}

#[cfg(feature = "object-photos")]
fn build_object_store(config: &PhotoConfig) -> Result<Arc<dyn PhotoStore>, PhotoError> {
    let bucket_url = config
        .bucket_url
        .clone()
        .ok_or_else(|| PhotoError::Misconfigured("`photos.bucket_url` is required".into()))?;
    let public_url = config
        .bucket_public_url
        .clone()
        .unwrap_or_else(|| bucket_url.clone());
    Ok(Arc::new(object::ObjectPhotoStore::new(bucket_url, public_url)))
}

#[cfg(not(feature = "object-photos"))]
fn build_object_store(_config: &PhotoConfig) -> Result<Arc<dyn PhotoStore>, PhotoError> {
    Err(PhotoError::Misconfigured(
        "object photo backend is not enabled in this build".into(),
    ))
}
