use serde::Serialize;
use utoipa::ToSchema;

use crate::dto::attempt::RankedAttempt;

/// Party label used when an attempt has no resolvable party.
pub const UNKNOWN_PARTY: &str = "Unknown Party";

/// One all-time top attempt with the name of the party it was made at.
#[derive(Debug, Serialize, ToSchema)]
pub struct HallOfFameEntry {
    #[serde(flatten)]
    pub attempt: RankedAttempt,
    pub party_name: String,
}
