use serde::Serialize;
use utoipa::ToSchema;

/// Whether storage-backed requests are currently served.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Ok,
    /// The supervisor lost the storage backend; API calls answer 503.
    Degraded,
}

/// Payload of `GET /healthcheck`.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: HealthStatus,
    /// Configured storage backend (`memory`, `mongo` or `couch`).
    pub storage: &'static str,
}
