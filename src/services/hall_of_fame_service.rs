//! All-time top attempts across every party.

use futures::future::join_all;
use tracing::warn;
use uuid::Uuid;

use crate::{
    dao::{
        chug_store::{AttemptStore, PartyStore},
        storage::StorageResult,
    },
    dto::{
        attempt::RankedAttempt,
        hall_of_fame::{HallOfFameEntry, UNKNOWN_PARTY},
    },
    error::ServiceError,
    photos::PhotoResolver,
    ranking::{self, HALL_OF_FAME_SIZE},
    state::SharedState,
};

pub async fn hall_of_fame(state: &SharedState) -> Result<Vec<HallOfFameEntry>, ServiceError> {
    let store = state.store()?;
    Ok(aggregate(store.as_ref(), state.resolver()).await?)
}

/// Rank every attempt, keep the top entries and join each with its party name.
///
/// Party lookups run concurrently. A missing party or a failed lookup yields
/// [`UNKNOWN_PARTY`] rather than an error.
pub async fn aggregate<S>(store: &S, resolver: &PhotoResolver) -> StorageResult<Vec<HallOfFameEntry>>
where
    S: AttemptStore + PartyStore + ?Sized,
{
    let mut attempts = store.list_attempts(None).await?;
    let ordinals = ranking::participant_ordinals(&attempts);
    ranking::order_by_insertion(&mut attempts);
    let best = ranking::top(ranking::rank(attempts), HALL_OF_FAME_SIZE);

    let names = join_all(best.iter().map(|attempt| party_name(store, attempt.party_id))).await;

    Ok(best
        .iter()
        .zip(names)
        .enumerate()
        .map(|(index, (attempt, party_name))| HallOfFameEntry {
            attempt: RankedAttempt::new(
                attempt,
                index + 1,
                ordinals.get(&attempt.id).copied().unwrap_or(1),
                resolver,
            ),
            party_name,
        })
        .collect())
}

async fn party_name<S>(store: &S, party_id: Option<Uuid>) -> String
where
    S: PartyStore + ?Sized,
{
    let Some(party_id) = party_id else {
        return UNKNOWN_PARTY.to_owned();
    };
    match store.find_party(party_id).await {
        Ok(Some(party)) => party.name,
        Ok(None) => UNKNOWN_PARTY.to_owned(),
        Err(err) => {
            warn!(%party_id, error = %err, "party lookup failed for hall of fame entry");
            UNKNOWN_PARTY.to_owned()
        }
    }
}
