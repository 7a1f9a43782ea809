use tracing::warn;

use crate::{
    dto::health::{HealthResponse, HealthStatus},
    state::SharedState,
};

/// Report the degraded flag, probing the store so failures show up in the logs.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    let storage = state.config().storage.backend.label();
    match state.store() {
        Ok(store) => {
            if let Err(err) = store.health_check().await {
                warn!(storage, error = %err, "storage health check failed");
            }
        }
        Err(_) => warn!(storage, "storage unavailable (degraded mode)"),
    }

    let status = if state.is_degraded() {
        HealthStatus::Degraded
    } else {
        HealthStatus::Ok
    };
    HealthResponse { status, storage }
}
