use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use axum_valid::Valid;
use uuid::Uuid;

use crate::{
    dto::party::{CreatePartyRequest, LeaderboardResponse, PartyResponse},
    error::AppError,
    services::party_service,
    state::SharedState,
};

/// Party CRUD and leaderboard endpoints.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/api/parties", get(list_parties).post(create_party))
        .route("/api/parties/{id}", get(get_party))
        .route("/api/parties/{id}/leaderboard", get(get_leaderboard))
}

/// List parties, newest first.
#[utoipa::path(
    get,
    path = "/api/parties",
    tag = "parties",
    responses((status = 200, description = "Known parties", body = [PartyResponse]))
)]
pub async fn list_parties(
    State(state): State<SharedState>,
) -> Result<Json<Vec<PartyResponse>>, AppError> {
    Ok(Json(party_service::list_parties(&state).await?))
}

/// Create a party.
#[utoipa::path(
    post,
    path = "/api/parties",
    tag = "parties",
    request_body = CreatePartyRequest,
    responses(
        (status = 201, description = "Party created", body = PartyResponse),
        (status = 400, description = "Invalid party name")
    )
)]
pub async fn create_party(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<CreatePartyRequest>>,
) -> Result<(StatusCode, Json<PartyResponse>), AppError> {
    let party = party_service::create_party(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(party)))
}

/// Retrieve a party by its ID.
#[utoipa::path(
    get,
    path = "/api/parties/{id}",
    tag = "parties",
    params(("id" = Uuid, Path, description = "Party identifier")),
    responses(
        (status = 200, description = "Party found", body = PartyResponse),
        (status = 404, description = "Party not found")
    )
)]
pub async fn get_party(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PartyResponse>, AppError> {
    Ok(Json(party_service::get_party(&state, id).await?))
}

/// Ranked attempts, podium and participants of a party.
#[utoipa::path(
    get,
    path = "/api/parties/{id}/leaderboard",
    tag = "parties",
    params(("id" = Uuid, Path, description = "Party identifier")),
    responses(
        (status = 200, description = "Party leaderboard", body = LeaderboardResponse),
        (status = 404, description = "Party not found")
    )
)]
pub async fn get_leaderboard(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<LeaderboardResponse>, AppError> {
    Ok(Json(party_service::leaderboard(&state, id).await?))
}
