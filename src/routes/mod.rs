use axum::Router;
use tower_http::services::ServeDir;

use crate::{config::PhotoBackend, photos::local::UPLOADS_ROUTE, state::SharedState};

pub mod attempts;
pub mod docs;
pub mod hall_of_fame;
pub mod health;
pub mod parties;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let photos = &state.config().photos;
    let mut api_router = health::router()
        .merge(attempts::router(photos.max_bytes))
        .merge(parties::router())
        .merge(hall_of_fame::router());

    if photos.backend == PhotoBackend::Local {
        api_router = api_router.nest_service(
            &format!("/{UPLOADS_ROUTE}"),
            ServeDir::new(photos.upload_dir.clone()),
        );
    }

    api_router.merge(docs::router()).with_state(state)
}
