use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    dao::models::{DrinkMethod, PartyEntity},
    dto::{attempt::RankedAttempt, format_system_time, validation::validate_party_name},
    ranking::{self, ParticipantSummary, Podium},
};

/// Payload used to create a party.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreatePartyRequest {
    #[validate(custom(function = "validate_party_name"))]
    pub name: String,
}

/// Party metadata returned by the API.
#[derive(Debug, Serialize, ToSchema, Clone)]
pub struct PartyResponse {
    pub id: String,
    pub name: String,
    pub created_at: String,
}

impl From<PartyEntity> for PartyResponse {
    fn from(party: PartyEntity) -> Self {
        Self {
            id: party.id.to_string(),
            name: party.name,
            created_at: format_system_time(party.created_at),
        }
    }
}

/// Podium slots in display order: left = 2nd, center = 1st, right = 3rd.
#[derive(Debug, Serialize, ToSchema, Clone, Default)]
pub struct PodiumResponse {
    pub left: Option<RankedAttempt>,
    pub center: Option<RankedAttempt>,
    pub right: Option<RankedAttempt>,
}

impl From<Podium<RankedAttempt>> for PodiumResponse {
    fn from(podium: Podium<RankedAttempt>) -> Self {
        Self {
            left: podium.second,
            center: podium.first,
            right: podium.third,
        }
    }
}

/// Participant aggregate used by clients to prefill a repeat submission.
#[derive(Debug, Serialize, ToSchema, Clone)]
pub struct ParticipantResponse {
    pub name: String,
    pub attempts: usize,
    pub best_time: f64,
    pub display_best_time: String,
    pub latest_beer_type: String,
    #[schema(value_type = String, example = "Glass")]
    pub latest_method: DrinkMethod,
}

impl From<ParticipantSummary> for ParticipantResponse {
    fn from(summary: ParticipantSummary) -> Self {
        Self {
            display_best_time: ranking::format_time(summary.best_time),
            name: summary.name,
            attempts: summary.attempts,
            best_time: summary.best_time,
            latest_beer_type: summary.latest_beer_type,
            latest_method: summary.latest_method,
        }
    }
}

/// Everything a party page renders.
#[derive(Debug, Serialize, ToSchema)]
pub struct LeaderboardResponse {
    pub party: PartyResponse,
    /// Attempts ranked by time, fastest first.
    pub attempts: Vec<RankedAttempt>,
    pub podium: PodiumResponse,
    pub participants: Vec<ParticipantResponse>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{photos::PhotoResolver, ranking::test_support::attempt};

    #[test]
    fn party_name_must_not_be_blank() {
        assert!(CreatePartyRequest { name: "  ".into() }.validate().is_err());
        assert!(CreatePartyRequest { name: "Fredagsbar".into() }.validate().is_ok());
    }

    #[test]
    fn podium_response_uses_display_slots() {
        let resolver = PhotoResolver::new("http://localhost:8080");
        let ranked: Vec<RankedAttempt> = [("A", 2.0), ("B", 2.5), ("C", 4.0)]
            .into_iter()
            .enumerate()
            .map(|(i, (name, time))| {
                RankedAttempt::new(&attempt(name, time, i as u64), i + 1, 1, &resolver)
            })
            .collect();

        let response = PodiumResponse::from(ranking::podium(&ranked));

        assert_eq!(response.center.map(|a| a.name).as_deref(), Some("A"));
        assert_eq!(response.left.map(|a| a.name).as_deref(), Some("B"));
        assert_eq!(response.right.map(|a| a.name).as_deref(), Some("C"));
    }
}
