use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, Path, Query, State, multipart::Field},
    http::StatusCode,
    routing::{delete, get},
};
use uuid::Uuid;

use crate::{
    dto::attempt::{AttemptForm, AttemptListQuery, CreateAttemptResponse, RankedAttempt},
    error::AppError,
    photos::PhotoUpload,
    services::attempt_service,
    state::SharedState,
};

/// Slack on top of the photo limit for the text parts and multipart framing.
const FORM_OVERHEAD_BYTES: usize = 64 * 1024;

/// Attempt endpoints. `max_photo_bytes` sizes the request body limit.
pub fn router(max_photo_bytes: usize) -> Router<SharedState> {
    Router::new()
        .route("/api/attempts", get(list_attempts).post(create_attempt))
        .route("/api/attempts/{id}", delete(delete_attempt))
        .layer(DefaultBodyLimit::max(max_photo_bytes + FORM_OVERHEAD_BYTES))
}

/// Leaderboard of a party, or of every attempt when no party is given.
#[utoipa::path(
    get,
    path = "/api/attempts",
    tag = "attempts",
    params(AttemptListQuery),
    responses(
        (status = 200, description = "Attempts ranked fastest first", body = [RankedAttempt]),
        (status = 503, description = "Storage unavailable")
    )
)]
pub async fn list_attempts(
    State(state): State<SharedState>,
    Query(query): Query<AttemptListQuery>,
) -> Result<Json<Vec<RankedAttempt>>, AppError> {
    Ok(Json(
        attempt_service::list_attempts(&state, query.party_id).await?,
    ))
}

/// Record an attempt, optionally with a photo.
#[utoipa::path(
    post,
    path = "/api/attempts",
    tag = "attempts",
    request_body(content = AttemptForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Attempt recorded", body = CreateAttemptResponse),
        (status = 400, description = "Invalid submission"),
        (status = 404, description = "Unknown party"),
        (status = 503, description = "Storage unavailable")
    )
)]
pub async fn create_attempt(
    State(state): State<SharedState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<CreateAttemptResponse>), AppError> {
    let form = read_form(multipart).await?;
    let response = attempt_service::create_attempt(&state, form).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Delete an attempt. Unknown ids succeed as well.
#[utoipa::path(
    delete,
    path = "/api/attempts/{id}",
    tag = "attempts",
    params(("id" = Uuid, Path, description = "Attempt identifier")),
    responses(
        (status = 204, description = "Attempt removed"),
        (status = 503, description = "Storage unavailable")
    )
)]
pub async fn delete_attempt(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    attempt_service::delete_attempt(&state, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn multipart_error(err: impl std::fmt::Display) -> AppError {
    AppError::BadRequest(format!("invalid multipart body: {err}"))
}

async fn text(field: Field<'_>) -> Result<String, AppError> {
    field.text().await.map_err(multipart_error)
}

/// Collect the known parts of the submission; unknown parts are ignored.
async fn read_form(mut multipart: Multipart) -> Result<AttemptForm, AppError> {
    let mut form = AttemptForm::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };
        match name.as_str() {
            "name" => form.name = text(field).await?,
            "time" => form.time = Some(text(field).await?),
            "beer_type" | "beerType" => form.beer_type = Some(text(field).await?),
            "method" => form.method = Some(text(field).await?),
            "partyId" | "party_id" => form.party_id = Some(text(field).await?),
            "image" => {
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_owned();
                let bytes = field.bytes().await.map_err(multipart_error)?;
                form.image = Some(PhotoUpload {
                    bytes: bytes.to_vec(),
                    content_type,
                });
            }
            _ => {}
        }
    }

    Ok(form)
}
