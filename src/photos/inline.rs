use base64::{Engine as _, engine::general_purpose::STANDARD};
use futures::future::BoxFuture;

use super::{PhotoError, PhotoStore, PhotoUpload};
use crate::dao::models::StoredPhoto;

/// Embeds the photo into the attempt record as a base64 data URI.
#[derive(Debug, Clone, Copy, Default)]
pub struct InlinePhotoStore;

/// Encode an upload as `data:<mime>;base64,<payload>`.
pub fn to_data_uri(upload: &PhotoUpload) -> String {
    format!(
        "data:{};base64,{}",
        upload.content_type,
        STANDARD.encode(&upload.bytes)
    )
}

impl PhotoStore for InlinePhotoStore {
    fn store(&self, upload: PhotoUpload) -> BoxFuture<'static, Result<StoredPhoto, PhotoError>> {
        Box::pin(async move { Ok(StoredPhoto::inline(to_data_uri(&upload))) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stores_a_data_uri_in_the_inline_slot() {
        let upload = PhotoUpload {
            bytes: b"hello".to_vec(),
            content_type: "image/png".into(),
        };

        let photo = InlinePhotoStore.store(upload).await.unwrap();

        assert_eq!(
            photo.image_base64.as_deref(),
            Some("data:image/png;base64,aGVsbG8=")
        );
        assert!(photo.image_url.is_none());
        assert!(photo.image_path.is_none());
    }
}
