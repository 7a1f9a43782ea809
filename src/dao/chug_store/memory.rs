//! Process-local store used for development deployments and tests.

use std::{sync::Arc, time::SystemTime};

use futures::future::BoxFuture;
use indexmap::IndexMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::dao::{
    chug_store::{AttemptStore, ChugStore, PartyStore},
    models::{AttemptEntity, NewAttempt, PartyEntity},
    storage::StorageResult,
};

/// Attempts and parties held in insertion-ordered maps.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<MemoryState>>,
}

#[derive(Default)]
struct MemoryState {
    attempts: IndexMap<Uuid, AttemptEntity>,
    parties: IndexMap<Uuid, PartyEntity>,
    last_created_at: Option<SystemTime>,
}

impl MemoryState {
    /// Wall clock reading clamped so timestamps never go backwards.
    fn next_timestamp(&mut self) -> SystemTime {
        let now = SystemTime::now();
        let stamp = match self.last_created_at {
            Some(last) if last > now => last,
            _ => now,
        };
        self.last_created_at = Some(stamp);
        stamp
    }
}

impl MemoryStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl AttemptStore for MemoryStore {
    fn list_attempts(
        &self,
        party_id: Option<Uuid>,
    ) -> BoxFuture<'static, StorageResult<Vec<AttemptEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let guard = store.inner.read().await;
            Ok(guard
                .attempts
                .values()
                .filter(|attempt| party_id.is_none() || attempt.party_id == party_id)
                .cloned()
                .collect())
        })
    }

    fn create_attempt(&self, attempt: NewAttempt) -> BoxFuture<'static, StorageResult<AttemptEntity>> {
        let store = self.clone();
        Box::pin(async move {
            let mut guard = store.inner.write().await;
            let created_at = guard.next_timestamp();
            let entity = attempt.into_entity(Uuid::now_v7(), created_at);
            guard.attempts.insert(entity.id, entity.clone());
            Ok(entity)
        })
    }

    fn delete_attempt(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move {
            let mut guard = store.inner.write().await;
            Ok(guard.attempts.shift_remove(&id).is_some())
        })
    }
}

impl PartyStore for MemoryStore {
    fn list_parties(&self) -> BoxFuture<'static, StorageResult<Vec<PartyEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let guard = store.inner.read().await;
            Ok(guard.parties.values().cloned().collect())
        })
    }

    fn create_party(&self, name: String) -> BoxFuture<'static, StorageResult<PartyEntity>> {
        let store = self.clone();
        Box::pin(async move {
            let mut guard = store.inner.write().await;
            let party = PartyEntity {
                id: Uuid::now_v7(),
                name,
                created_at: guard.next_timestamp(),
            };
            guard.parties.insert(party.id, party.clone());
            Ok(party)
        })
    }

    fn find_party(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<PartyEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let guard = store.inner.read().await;
            Ok(guard.parties.get(&id).cloned())
        })
    }
}

impl ChugStore for MemoryStore {
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::models::{DrinkMethod, StoredPhoto};

    fn new_attempt(name: &str, time: f64, party_id: Option<Uuid>) -> NewAttempt {
        NewAttempt {
            name: name.into(),
            time,
            beer_type: "pilsner".into(),
            method: DrinkMethod::Glass,
            party_id,
            photo: StoredPhoto::default(),
        }
    }

    #[tokio::test]
    async fn list_filters_by_party_and_keeps_insertion_order() {
        let store = MemoryStore::new();
        let party = store.create_party("Friday".into()).await.unwrap();

        let first = store
            .create_attempt(new_attempt("Alice", 4.0, Some(party.id)))
            .await
            .unwrap();
        store
            .create_attempt(new_attempt("Bob", 2.0, None))
            .await
            .unwrap();
        let third = store
            .create_attempt(new_attempt("Carol", 3.0, Some(party.id)))
            .await
            .unwrap();

        let in_party = store.list_attempts(Some(party.id)).await.unwrap();
        assert_eq!(
            in_party.iter().map(|a| a.id).collect::<Vec<_>>(),
            vec![first.id, third.id]
        );
        assert_eq!(store.list_attempts(None).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn created_at_never_decreases() {
        let store = MemoryStore::new();
        let mut previous = None;
        for i in 0..20 {
            let attempt = store
                .create_attempt(new_attempt("Alice", 1.0 + i as f64, None))
                .await
                .unwrap();
            if let Some(prev) = previous {
                assert!(attempt.created_at >= prev);
            }
            previous = Some(attempt.created_at);
        }
    }

    #[tokio::test]
    async fn delete_reports_whether_anything_was_removed() {
        let store = MemoryStore::new();
        let attempt = store
            .create_attempt(new_attempt("Alice", 2.5, None))
            .await
            .unwrap();

        assert!(store.delete_attempt(attempt.id).await.unwrap());
        assert!(!store.delete_attempt(attempt.id).await.unwrap());
        assert!(store.list_attempts(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn find_party_returns_none_for_unknown_id() {
        let store = MemoryStore::new();
        assert!(store.find_party(Uuid::new_v4()).await.unwrap().is_none());
    }
}
