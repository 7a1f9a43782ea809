//! Party management and per-party leaderboards.

use tracing::info;
use uuid::Uuid;

use crate::{
    dto::party::{CreatePartyRequest, LeaderboardResponse, PartyResponse, PodiumResponse},
    error::ServiceError,
    ranking,
    services::attempt_service::present,
    state::SharedState,
};

/// All parties, newest first.
pub async fn list_parties(state: &SharedState) -> Result<Vec<PartyResponse>, ServiceError> {
    let store = state.store()?;
    let mut parties = store.list_parties().await?;
    parties.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
    Ok(parties.into_iter().map(PartyResponse::from).collect())
}

pub async fn create_party(
    state: &SharedState,
    request: CreatePartyRequest,
) -> Result<PartyResponse, ServiceError> {
    let store = state.store()?;
    let party = store.create_party(request.name.trim().to_owned()).await?;
    info!(party_id = %party.id, name = %party.name, "party created");
    Ok(party.into())
}

pub async fn get_party(state: &SharedState, id: Uuid) -> Result<PartyResponse, ServiceError> {
    let store = state.store()?;
    store
        .find_party(id)
        .await?
        .map(PartyResponse::from)
        .ok_or_else(|| ServiceError::NotFound(format!("party {id} not found")))
}

/// Ranked attempts, podium and participant list of one party.
pub async fn leaderboard(state: &SharedState, id: Uuid) -> Result<LeaderboardResponse, ServiceError> {
    let store = state.store()?;
    let party = store
        .find_party(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("party {id} not found")))?;

    let attempts = store.list_attempts(Some(id)).await?;
    let participants = ranking::participants(&attempts)
        .into_iter()
        .map(Into::into)
        .collect();
    let ranked = present(attempts, state.resolver());
    let podium = PodiumResponse::from(ranking::podium(&ranked));

    Ok(LeaderboardResponse {
        party: party.into(),
        attempts: ranked,
        podium,
        participants,
    })
}
