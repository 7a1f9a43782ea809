use axum::{Json, Router, extract::State, routing::get};

use crate::{
    dto::hall_of_fame::HallOfFameEntry, error::AppError, services::hall_of_fame_service,
    state::SharedState,
};

/// `GET /api/halloffame`.
pub fn router() -> Router<SharedState> {
    Router::new().route("/api/halloffame", get(hall_of_fame))
}

/// The ten fastest attempts of all time, across parties.
#[utoipa::path(
    get,
    path = "/api/halloffame",
    tag = "attempts",
    responses(
        (status = 200, description = "Top ten attempts", body = [HallOfFameEntry]),
        (status = 503, description = "Storage unavailable")
    )
)]
pub async fn hall_of_fame(
    State(state): State<SharedState>,
) -> Result<Json<Vec<HallOfFameEntry>>, AppError> {
    Ok(Json(hall_of_fame_service::hall_of_fame(&state).await?))
}
