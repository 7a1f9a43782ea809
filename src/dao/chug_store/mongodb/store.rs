use std::{sync::Arc, time::SystemTime};

use futures::{TryStreamExt, future::BoxFuture};
use mongodb::{Client, Collection, Database, IndexModel, bson::doc, options::IndexOptions};
use tokio::sync::RwLock;
use tracing::warn;
use uuid::Uuid;

use super::{
    config::MongoConfig,
    connection::establish_connection,
    error::{MongoOp, MongoResult, failed},
    models::{MongoAttemptDocument, MongoPartyDocument, doc_id, party_filter},
};
use crate::dao::{
    chug_store::{AttemptStore, ChugStore, PartyStore},
    models::{AttemptEntity, NewAttempt, PartyEntity},
    storage::StorageResult,
};

const ATTEMPT_COLLECTION_NAME: &str = "attempts";
const PARTY_COLLECTION_NAME: &str = "parties";
const ATTEMPT_INDEX_NAME: &str = "attempt_party_created_idx";

/// Attempts and parties in the `attempts` / `parties` collections.
#[derive(Clone)]
pub struct MongoChugStore {
    inner: Arc<MongoInner>,
}

struct MongoInner {
    state: RwLock<MongoState>,
    config: MongoConfig,
}

struct MongoState {
    // Kept so the connection pool lives as long as the database handle.
    #[allow(dead_code)]
    client: Client,
    database: Database,
}

impl MongoInner {
    async fn ping(&self) -> MongoResult<()> {
        let database = {
            let guard = self.state.read().await;
            guard.database.clone()
        };

        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(failed(MongoOp::Ping))?;
        Ok(())
    }

    async fn reconnect(&self) -> MongoResult<()> {
        let (client, database) = establish_connection(&self.config).await?;
        let mut guard = self.state.write().await;
        guard.client = client;
        guard.database = database;
        Ok(())
    }
}

impl MongoChugStore {
    /// Establish a connection to MongoDB and ensure indexes are present.
    pub async fn connect(config: MongoConfig) -> MongoResult<Self> {
        let (client, database) = establish_connection(&config).await?;

        let inner = Arc::new(MongoInner {
            state: RwLock::new(MongoState { client, database }),
            config,
        });

        let store = Self { inner };
        store.ensure_indexes().await?;
        Ok(store)
    }

    async fn ensure_indexes(&self) -> MongoResult<()> {
        let collection = self.attempt_collection().await;
        let index = IndexModel::builder()
            .keys(doc! {"party_id": 1, "created_at": 1})
            .options(
                IndexOptions::builder()
                    .name(Some(ATTEMPT_INDEX_NAME.to_owned()))
                    .build(),
            )
            .build();

        collection
            .create_index(index)
            .await
            .map_err(failed(MongoOp::EnsureIndex(ATTEMPT_INDEX_NAME)))?;

        Ok(())
    }

    async fn attempt_collection(&self) -> Collection<MongoAttemptDocument> {
        let guard = self.inner.state.read().await;
        guard
            .database
            .collection::<MongoAttemptDocument>(ATTEMPT_COLLECTION_NAME)
    }

    async fn party_collection(&self) -> Collection<MongoPartyDocument> {
        let guard = self.inner.state.read().await;
        guard
            .database
            .collection::<MongoPartyDocument>(PARTY_COLLECTION_NAME)
    }

    async fn list_attempts(&self, party_id: Option<Uuid>) -> MongoResult<Vec<AttemptEntity>> {
        let collection = self.attempt_collection().await;

        let documents: Vec<MongoAttemptDocument> = collection
            .find(party_filter(party_id))
            .sort(doc! {"created_at": 1, "_id": 1})
            .await
            .map_err(failed(MongoOp::ListAttempts))?
            .try_collect()
            .await
            .map_err(failed(MongoOp::ListAttempts))?;

        Ok(documents
            .into_iter()
            .filter_map(|doc| match AttemptEntity::try_from(doc) {
                Ok(entity) => Some(entity),
                Err(err) => {
                    warn!(error = %err, "skipping unreadable attempt document");
                    None
                }
            })
            .collect())
    }

    async fn create_attempt(&self, attempt: NewAttempt) -> MongoResult<AttemptEntity> {
        let entity = attempt.into_entity(Uuid::now_v7(), SystemTime::now());
        let id = entity.id;
        let document: MongoAttemptDocument = entity.clone().into();

        self.attempt_collection()
            .await
            .insert_one(&document)
            .await
            .map_err(failed(MongoOp::InsertAttempt(id)))?;

        Ok(entity)
    }

    async fn delete_attempt(&self, id: Uuid) -> MongoResult<bool> {
        let result = self
            .attempt_collection()
            .await
            .delete_one(doc_id(id))
            .await
            .map_err(failed(MongoOp::DeleteAttempt(id)))?;
        Ok(result.deleted_count > 0)
    }

    async fn list_parties(&self) -> MongoResult<Vec<PartyEntity>> {
        let documents: Vec<MongoPartyDocument> = self
            .party_collection()
            .await
            .find(doc! {})
            .sort(doc! {"created_at": 1})
            .await
            .map_err(failed(MongoOp::ListParties))?
            .try_collect()
            .await
            .map_err(failed(MongoOp::ListParties))?;

        documents.into_iter().map(PartyEntity::try_from).collect()
    }

    async fn create_party(&self, name: String) -> MongoResult<PartyEntity> {
        let party = PartyEntity {
            id: Uuid::now_v7(),
            name,
            created_at: SystemTime::now(),
        };
        let id = party.id;
        let document: MongoPartyDocument = party.clone().into();

        self.party_collection()
            .await
            .insert_one(&document)
            .await
            .map_err(failed(MongoOp::InsertParty(id)))?;

        Ok(party)
    }

    async fn find_party(&self, id: Uuid) -> MongoResult<Option<PartyEntity>> {
        let document = self
            .party_collection()
            .await
            .find_one(doc_id(id))
            .await
            .map_err(failed(MongoOp::FindParty(id)))?;

        document.map(PartyEntity::try_from).transpose()
    }
}

impl AttemptStore for MongoChugStore {
    fn list_attempts(
        &self,
        party_id: Option<Uuid>,
    ) -> BoxFuture<'static, StorageResult<Vec<AttemptEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_attempts(party_id).await.map_err(Into::into) })
    }

    fn create_attempt(&self, attempt: NewAttempt) -> BoxFuture<'static, StorageResult<AttemptEntity>> {
        let store = self.clone();
        Box::pin(async move { store.create_attempt(attempt).await.map_err(Into::into) })
    }

    fn delete_attempt(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { store.delete_attempt(id).await.map_err(Into::into) })
    }
}

impl PartyStore for MongoChugStore {
    fn list_parties(&self) -> BoxFuture<'static, StorageResult<Vec<PartyEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_parties().await.map_err(Into::into) })
    }

    fn create_party(&self, name: String) -> BoxFuture<'static, StorageResult<PartyEntity>> {
        let store = self.clone();
        Box::pin(async move { store.create_party(name).await.map_err(Into::into) })
    }

    fn find_party(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<PartyEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_party(id).await.map_err(Into::into) })
    }
}

impl ChugStore for MongoChugStore {
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.ping().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.reconnect().await.map_err(Into::into) })
    }
}
