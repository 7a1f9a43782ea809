//! Attempt submission, listing and deletion.

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    dao::models::{AttemptEntity, StoredPhoto},
    dto::attempt::{AttemptForm, CreateAttemptResponse, RankedAttempt},
    error::ServiceError,
    photos::{PhotoResolver, PhotoUpload},
    ranking,
    state::SharedState,
};

/// Rank a board snapshot for display.
///
/// Ordinals are computed over the whole snapshot so they do not depend on rank.
pub(crate) fn present(mut attempts: Vec<AttemptEntity>, resolver: &PhotoResolver) -> Vec<RankedAttempt> {
    let ordinals = ranking::participant_ordinals(&attempts);
    ranking::order_by_insertion(&mut attempts);
    ranking::rank(attempts)
        .iter()
        .enumerate()
        .map(|(index, attempt)| {
            let number = ordinals.get(&attempt.id).copied().unwrap_or(1);
            RankedAttempt::new(attempt, index + 1, number, resolver)
        })
        .collect()
}

/// Reject uploads that are not images or exceed the configured size.
pub(crate) fn validate_photo(upload: &PhotoUpload, max_bytes: usize) -> Result<(), ServiceError> {
    if !upload.content_type.starts_with("image/") {
        return Err(ServiceError::InvalidInput(format!(
            "photo must be an image (got `{}`)",
            upload.content_type
        )));
    }
    if upload.bytes.len() > max_bytes {
        return Err(ServiceError::InvalidInput(format!(
            "photo exceeds the {max_bytes} byte limit ({} bytes)",
            upload.bytes.len()
        )));
    }
    Ok(())
}

/// Ranked attempts of one party, or of every attempt when `party_id` is absent.
pub async fn list_attempts(
    state: &SharedState,
    party_id: Option<Uuid>,
) -> Result<Vec<RankedAttempt>, ServiceError> {
    let store = state.store()?;
    let attempts = store.list_attempts(party_id).await?;
    Ok(present(attempts, state.resolver()))
}

/// Validate and persist a submitted attempt.
///
/// A photo that cannot be stored does not fail the submission; the attempt is
/// saved without it and the failure is reported in `warnings`.
pub async fn create_attempt(
    state: &SharedState,
    form: AttemptForm,
) -> Result<CreateAttemptResponse, ServiceError> {
    let store = state.store()?;
    let (draft, image) = form.into_draft()?;
    let image = image.filter(|upload| !upload.bytes.is_empty());
    if let Some(upload) = &image {
        validate_photo(upload, state.config().photos.max_bytes)?;
    }

    if let Some(party_id) = draft.party_id {
        if store.find_party(party_id).await?.is_none() {
            return Err(ServiceError::NotFound(format!("party {party_id} not found")));
        }
    }

    let mut board = store.list_attempts(draft.party_id).await?;

    let mut warnings = Vec::new();
    let photo = match image {
        None => StoredPhoto::default(),
        Some(upload) => match state.photos().store(upload).await {
            Ok(photo) => photo,
            Err(err) => {
                warn!(error = %err, name = %draft.name, "failed to store attempt photo; saving attempt without it");
                warnings.push(format!("photo was not saved: {err}"));
                StoredPhoto::default()
            }
        },
    };

    let created = store.create_attempt(draft.into_new_attempt(photo)).await?;
    info!(
        attempt_id = %created.id,
        name = %created.name,
        time = created.time,
        party_id = ?created.party_id,
        "attempt recorded"
    );

    let created_id = created.id.to_string();
    board.retain(|attempt| attempt.id != created.id);
    board.push(created);
    let attempt = present(board, state.resolver())
        .into_iter()
        .find(|attempt| attempt.id == created_id)
        .ok_or_else(|| ServiceError::NotFound(format!("attempt {created_id} not found")))?;

    Ok(CreateAttemptResponse { attempt, warnings })
}

/// Delete an attempt. Deleting an unknown id is not an error.
pub async fn delete_attempt(state: &SharedState, id: Uuid) -> Result<(), ServiceError> {
    let store = state.store()?;
    if store.delete_attempt(id).await? {
        info!(attempt_id = %id, "attempt deleted");
    } else {
        debug!(attempt_id = %id, "attempt already absent");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use futures::future::BoxFuture;

    use super::*;
    use crate::{
        config::AppConfig,
        dao::chug_store::{AttemptStore, PartyStore, memory::MemoryStore},
        dao::models::DrinkMethod,
        photos::{PhotoError, PhotoStore, inline::InlinePhotoStore},
        state::AppState,
    };

    struct FailingPhotos;

    impl PhotoStore for FailingPhotos {
        fn store(&self, _upload: PhotoUpload) -> BoxFuture<'static, Result<StoredPhoto, PhotoError>> {
            Box::pin(async { Err(PhotoError::Misconfigured("bucket offline".into())) })
        }
    }

    fn state_with(photos: Arc<dyn PhotoStore>) -> (MemoryStore, SharedState) {
        let store = MemoryStore::new();
        let state = AppState::new(AppConfig::default(), Arc::new(store.clone()), photos);
        (store, state)
    }

    fn form(name: &str, time: &str, method: &str) -> AttemptForm {
        AttemptForm {
            name: name.into(),
            time: Some(time.into()),
            method: Some(method.into()),
            ..AttemptForm::default()
        }
    }

    fn png(len: usize) -> PhotoUpload {
        PhotoUpload {
            bytes: vec![7; len],
            content_type: "image/png".into(),
        }
    }

    #[tokio::test]
    async fn tied_times_keep_submission_order_and_are_sub_three() {
        let (_, state) = state_with(Arc::new(InlinePhotoStore));
        create_attempt(&state, form("Alice", "2.50", "Glass")).await.unwrap();
        create_attempt(&state, form("Bob", "2.50", "Can")).await.unwrap();

        let board = list_attempts(&state, None).await.unwrap();

        assert_eq!(
            board.iter().map(|a| a.name.as_str()).collect::<Vec<_>>(),
            vec!["Alice", "Bob"]
        );
        assert!(board.iter().all(|a| a.sub_three));
        assert_eq!(board[0].rank, 1);
        assert_eq!(board[1].rank, 2);
        assert_eq!(board[1].method, DrinkMethod::Can);
    }

    #[tokio::test]
    async fn attempt_numbers_are_chronological_not_by_rank() {
        let (_, state) = state_with(Arc::new(InlinePhotoStore));
        create_attempt(&state, form("Alice", "4.00", "")).await.unwrap();
        let second = create_attempt(&state, form("Alice", "2.00", "")).await.unwrap();

        assert_eq!(second.attempt.rank, 1);
        assert_eq!(second.attempt.attempt_number, 2);

        let board = list_attempts(&state, None).await.unwrap();
        assert_eq!(board[1].attempt_number, 1);
    }

    #[tokio::test]
    async fn photo_failure_degrades_to_a_warning() {
        let (store, state) = state_with(Arc::new(FailingPhotos));
        let mut submission = form("Alice", "3.10", "Glass");
        submission.image = Some(png(16));

        let response = create_attempt(&state, submission).await.unwrap();

        assert_eq!(response.warnings.len(), 1);
        assert!(response.attempt.photo_url.is_none());
        assert_eq!(store.list_attempts(None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn inline_photo_is_resolved_to_a_data_uri() {
        let (_, state) = state_with(Arc::new(InlinePhotoStore));
        let mut submission = form("Alice", "3.10", "Glass");
        submission.image = Some(png(4));

        let response = create_attempt(&state, submission).await.unwrap();

        assert!(response.warnings.is_empty());
        assert!(
            response
                .attempt
                .photo_url
                .unwrap()
                .starts_with("data:image/png;base64,")
        );
    }

    #[tokio::test]
    async fn invalid_submissions_write_nothing() {
        let (store, state) = state_with(Arc::new(InlinePhotoStore));

        let err = create_attempt(&state, form("", "2.0", "Glass")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));

        let mut oversized = form("Alice", "2.0", "Glass");
        oversized.image = Some(png(state.config().photos.max_bytes + 1));
        let err = create_attempt(&state, oversized).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));

        let mut not_an_image = form("Alice", "2.0", "Glass");
        not_an_image.image = Some(PhotoUpload {
            bytes: b"hello".to_vec(),
            content_type: "text/plain".into(),
        });
        let err = create_attempt(&state, not_an_image).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));

        assert!(store.list_attempts(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_party_is_rejected() {
        let (_, state) = state_with(Arc::new(InlinePhotoStore));
        let mut submission = form("Alice", "2.0", "Glass");
        submission.party_id = Some(Uuid::now_v7().to_string());

        let err = create_attempt(&state, submission).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn party_boards_are_separate() {
        let (store, state) = state_with(Arc::new(InlinePhotoStore));
        let party = store.create_party("Friday".into()).await.unwrap();
        let mut in_party = form("Alice", "5.0", "Glass");
        in_party.party_id = Some(party.id.to_string());
        create_attempt(&state, in_party).await.unwrap();
        create_attempt(&state, form("Bob", "1.0", "Glass")).await.unwrap();

        let board = list_attempts(&state, Some(party.id)).await.unwrap();
        assert_eq!(board.len(), 1);
        assert_eq!(board[0].name, "Alice");
        assert_eq!(board[0].rank, 1);
        assert_eq!(board[0].medal, Some(ranking::Medal::Gold));
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let (_, state) = state_with(Arc::new(InlinePhotoStore));
        let created = create_attempt(&state, form("Alice", "2.0", "Glass")).await.unwrap();
        let id = Uuid::parse_str(&created.attempt.id).unwrap();

        delete_attempt(&state, id).await.unwrap();
        delete_attempt(&state, id).await.unwrap();
        assert!(list_attempts(&state, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn degraded_mode_refuses_requests() {
        let (_, state) = state_with(Arc::new(InlinePhotoStore));
        state.update_degraded(true);

        let err = list_attempts(&state, None).await.unwrap_err();
        assert!(matches!(err, ServiceError::Degraded));
    }
}
