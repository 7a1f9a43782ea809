/// CouchDB backend.
#[cfg(feature = "couch-store")]
pub mod couchdb;
/// Process-local backend.
pub mod memory;
/// MongoDB backend.
#[cfg(feature = "mongo-store")]
pub mod mongodb;

use std::sync::Arc;

use futures::future::BoxFuture;
use tracing::info;
use uuid::Uuid;

use crate::{
    config::{StorageBackend, StorageConfig},
    dao::{
        models::{AttemptEntity, NewAttempt, PartyEntity},
        storage::StorageResult,
    },
};

/// Persistence of attempt records.
///
/// Listing returns the whole materialized collection; callers apply ordering.
pub trait AttemptStore: Send + Sync {
    /// All attempts, or only those of `party_id` when given.
    fn list_attempts(
        &self,
        party_id: Option<Uuid>,
    ) -> BoxFuture<'static, StorageResult<Vec<AttemptEntity>>>;
    /// Persist a validated attempt; the store assigns id and `created_at`.
    fn create_attempt(&self, attempt: NewAttempt) -> BoxFuture<'static, StorageResult<AttemptEntity>>;
    /// Hard delete; resolves to `false` when nothing was stored under `id`.
    fn delete_attempt(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>>;
}

/// Persistence of party records.
pub trait PartyStore: Send + Sync {
    /// Every party, in no particular order.
    fn list_parties(&self) -> BoxFuture<'static, StorageResult<Vec<PartyEntity>>>;
    /// Persist a party under an already trimmed name.
    fn create_party(&self, name: String) -> BoxFuture<'static, StorageResult<PartyEntity>>;
    /// `None` when no party is stored under `id`.
    fn find_party(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<PartyEntity>>>;
}

/// A complete storage backend as installed in the application state.
pub trait ChugStore: AttemptStore + PartyStore {
    /// Cheap round-trip proving the backend still answers.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    /// Re-establish the backend connection after a failed health check.
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}

/// Connect to the backend selected by configuration.
///
/// Failing here is fatal for the process: the server never starts without a store.
pub async fn connect(config: &StorageConfig) -> StorageResult<Arc<dyn ChugStore>> {
    match config.backend {
        StorageBackend::Memory => {
            info!("using in-memory storage; data will not survive a restart");
            Ok(Arc::new(memory::MemoryStore::new()))
        }
        StorageBackend::Mongo => connect_mongo().await,
        StorageBackend::Couch => connect_couch().await,
    }
}

#[cfg(feature = "mongo-store")]
async fn connect_mongo() -> StorageResult<Arc<dyn ChugStore>> {
    let config = mongodb::MongoConfig::from_env().await?;
    let store = mongodb::MongoChugStore::connect(config).await?;
    info!("connected to MongoDB");
    Ok(Arc::new(store))
}

#[cfg(not(feature = "mongo-store"))]
async fn connect_mongo() -> StorageResult<Arc<dyn ChugStore>> {
    Err(crate::dao::storage::StorageError::BackendDisabled {
        backend: StorageBackend::Mongo.label(),
    })
}

#[cfg(feature = "couch-store")]
async fn connect_couch() -> StorageResult<Arc<dyn ChugStore>> {
    let config = couchdb::CouchConfig::from_env()?;
    let store = couchdb::CouchChugStore::connect(config).await?;
    info!("connected to CouchDB");
    Ok(Arc::new(store))
}

#[cfg(not(feature = "couch-store"))]
async fn connect_couch() -> StorageResult<Arc<dyn ChugStore>> {
    Err(crate::dao::storage::StorageError::BackendDisabled {
        backend: StorageBackend::Couch.label(),
    })
}
