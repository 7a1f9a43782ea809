//! Pure ordering of attempts: leaderboards, podiums, per-participant numbering.
//!
//! Nothing here performs I/O; every function works on the snapshot it is given.

/// Per-participant ordinals and summaries.
pub mod participants;
/// Top-three presentation.
pub mod podium;

use serde::Serialize;
use utoipa::ToSchema;

use crate::dao::models::AttemptEntity;

pub use participants::{ParticipantSummary, ordinal_for_participant, participant_ordinals, participants};
pub use podium::{Podium, podium};

/// Times strictly below this many seconds are highlighted as "sub-3".
pub const SUB_THREE_THRESHOLD: f64 = 3.0;
/// Size of the all-time Hall of Fame.
pub const HALL_OF_FAME_SIZE: usize = 10;

/// Medal tier for the first three ranks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Medal {
    /// Rank 1.
    Gold,
    /// Rank 2.
    Silver,
    /// Rank 3.
    Bronze,
}

/// Order attempts as received from a store: by creation time, then by id.
///
/// Stores are not required to return a stable order, so callers normalize here
/// before ranking to get deterministic tie-breaks.
pub fn order_by_insertion(attempts: &mut [AttemptEntity]) {
    attempts.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
}

/// Sort ascending by time (lower is better).
///
/// The sort is stable: equal times keep their input order and still occupy
/// consecutive positions, so the 1-based index in the output is the rank.
pub fn rank(mut attempts: Vec<AttemptEntity>) -> Vec<AttemptEntity> {
    attempts.sort_by(|a, b| a.time.total_cmp(&b.time));
    attempts
}

/// First `n` entries of a ranking.
pub fn top(mut ranked: Vec<AttemptEntity>, n: usize) -> Vec<AttemptEntity> {
    ranked.truncate(n);
    ranked
}

/// Whether a time earns the sub-3 highlight (strictly below 3.00 s).
pub fn threshold(time: f64) -> bool {
    time < SUB_THREE_THRESHOLD
}

/// Medal for a 1-based rank.
pub fn medal(rank: usize) -> Option<Medal> {
    match rank {
        1 => Some(Medal::Gold),
        2 => Some(Medal::Silver),
        3 => Some(Medal::Bronze),
        _ => None,
    }
}

/// Two-decimal display form of a time in seconds.
pub fn format_time(time: f64) -> String {
    format!("{time:.2}")
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::time::{Duration, SystemTime};

    use uuid::Uuid;

    use crate::dao::models::{AttemptEntity, DrinkMethod, StoredPhoto};

    /// Attempt created `seq` seconds after a fixed epoch.
    pub fn attempt(name: &str, time: f64, seq: u64) -> AttemptEntity {
        AttemptEntity {
            id: Uuid::now_v7(),
            name: name.into(),
            time,
            beer_type: "pilsner".into(),
            method: DrinkMethod::Glass,
            party_id: None,
            photo: StoredPhoto::default(),
            created_at: SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000 + seq),
        }
    }
}
