use std::{sync::Arc, time::SystemTime};

use futures::future::BoxFuture;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::dao::{
    chug_store::{AttemptStore, ChugStore, PartyStore},
    models::{AttemptEntity, NewAttempt, PartyEntity},
    storage::StorageResult,
};

use super::{
    config::CouchConfig,
    error::{CouchDaoError, CouchResult},
    models::{
        ATTEMPT_PREFIX, AllDocsResponse, CouchAttemptDocument, CouchPartyDocument, END_SUFFIX,
        PARTY_PREFIX, RevisionOnly, attempt_doc_id, party_doc_id,
    },
};

const ALL_DOCS: &str = "_all_docs";

/// Attempts and parties kept as prefixed documents in a single CouchDB database.
#[derive(Clone)]
pub struct CouchChugStore {
    client: Client,
    config: Arc<CouchConfig>,
}

impl CouchChugStore {
    /// Build the HTTP client and make sure the database exists.
    pub async fn connect(config: CouchConfig) -> CouchResult<Self> {
        let client = Client::builder().build().map_err(CouchDaoError::Client)?;
        let store = Self {
            client,
            config: Arc::new(config),
        };
        store.ensure_database().await?;
        Ok(store)
    }

    /// Request against the database, or against a document when `doc` is set.
    fn request(&self, method: Method, doc: Option<&str>) -> RequestBuilder {
        let url = match doc {
            Some(doc) => format!("{}/{doc}", self.config.database_url()),
            None => self.config.database_url(),
        };
        let builder = self.client.request(method, url);
        match &self.config.credentials {
            Some(creds) => builder.basic_auth(&creds.username, Some(&creds.password)),
            None => builder,
        }
    }

    /// Send the request, failing on transport errors only; statuses are left to the caller.
    async fn exchange(&self, builder: RequestBuilder, target: &str) -> CouchResult<Response> {
        builder
            .send()
            .await
            .map_err(|source| CouchDaoError::Transport {
                target: target.to_string(),
                source,
            })
    }

    async fn decode<T: DeserializeOwned>(response: Response, target: &str) -> CouchResult<T> {
        response.json::<T>().await.map_err(|err| CouchDaoError::Decode {
            target: target.to_string(),
            reason: err.to_string(),
        })
    }

    fn unexpected(target: &str, status: StatusCode) -> CouchDaoError {
        CouchDaoError::Status {
            target: target.to_string(),
            status,
        }
    }

    async fn ensure_database(&self) -> CouchResult<()> {
        let target = self.config.database.clone();
        let probe = self
            .exchange(self.request(Method::GET, None), &target)
            .await?;
        match probe.status() {
            StatusCode::OK => Ok(()),
            StatusCode::NOT_FOUND => {
                debug!(database = %target, "creating CouchDB database");
                let created = self
                    .exchange(self.request(Method::PUT, None), &target)
                    .await?;
                match created.status() {
                    // 412: created concurrently by another instance.
                    status if status.is_success() || status == StatusCode::PRECONDITION_FAILED => {
                        Ok(())
                    }
                    status => Err(Self::unexpected(&target, status)),
                }
            }
            status => Err(Self::unexpected(&target, status)),
        }
    }

    async fn fetch<T: DeserializeOwned>(&self, doc_id: &str) -> CouchResult<Option<T>> {
        let response = self
            .exchange(self.request(Method::GET, Some(doc_id)), doc_id)
            .await?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => Self::decode(response, doc_id).await.map(Some),
            status => Err(Self::unexpected(doc_id, status)),
        }
    }

    async fn store<T: Serialize + ?Sized>(&self, doc_id: &str, document: &T) -> CouchResult<()> {
        let response = self
            .exchange(self.request(Method::PUT, Some(doc_id)).json(document), doc_id)
            .await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(Self::unexpected(doc_id, status))
        }
    }

    /// `false` when the document was already gone.
    async fn remove(&self, doc_id: &str) -> CouchResult<bool> {
        let Some(current) = self.fetch::<RevisionOnly>(doc_id).await? else {
            return Ok(false);
        };
        let request = self
            .request(Method::DELETE, Some(doc_id))
            .query(&[("rev", current.rev.as_str())]);
        let response = self.exchange(request, doc_id).await?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(false),
            status if status.is_success() => Ok(true),
            status => Err(Self::unexpected(doc_id, status)),
        }
    }

    /// Every document whose id starts with `prefix`, in key order.
    async fn scan<T: DeserializeOwned>(&self, prefix: &str) -> CouchResult<Vec<T>> {
        let request = self.request(Method::GET, Some(ALL_DOCS)).query(&[
            ("include_docs", "true".to_string()),
            ("startkey", format!("\"{prefix}\"")),
            ("endkey", format!("\"{prefix}{END_SUFFIX}\"")),
        ]);
        let response = self.exchange(request, ALL_DOCS).await?;
        if !response.status().is_success() {
            return Err(Self::unexpected(ALL_DOCS, response.status()));
        }

        let page: AllDocsResponse = Self::decode(response, ALL_DOCS).await?;
        page.rows
            .into_iter()
            .filter_map(|row| row.doc)
            .map(|doc| {
                serde_json::from_value(doc).map_err(|err| CouchDaoError::Decode {
                    target: ALL_DOCS.to_string(),
                    reason: err.to_string(),
                })
            })
            .collect()
    }

    async fn attempts(&self, party_id: Option<Uuid>) -> CouchResult<Vec<AttemptEntity>> {
        let docs: Vec<CouchAttemptDocument> = self.scan(ATTEMPT_PREFIX).await?;
        Ok(docs
            .into_iter()
            .filter(|doc| party_id.is_none() || doc.attempt.party_id == party_id)
            .filter_map(|doc| match AttemptEntity::try_from(doc) {
                Ok(entity) => Some(entity),
                Err(err) => {
                    warn!(error = %err, "skipping unreadable attempt document");
                    None
                }
            })
            .collect())
    }

    async fn parties(&self) -> CouchResult<Vec<PartyEntity>> {
        let docs: Vec<CouchPartyDocument> = self.scan(PARTY_PREFIX).await?;
        docs.into_iter().map(PartyEntity::try_from).collect()
    }
}

impl AttemptStore for CouchChugStore {
    fn list_attempts(
        &self,
        party_id: Option<Uuid>,
    ) -> BoxFuture<'static, StorageResult<Vec<AttemptEntity>>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.attempts(party_id).await?) })
    }

    fn create_attempt(&self, attempt: NewAttempt) -> BoxFuture<'static, StorageResult<AttemptEntity>> {
        let store = self.clone();
        Box::pin(async move {
            let entity = attempt.into_entity(Uuid::now_v7(), SystemTime::now());
            let doc = CouchAttemptDocument::from(entity.clone());
            store.store(&doc.id, &doc).await?;
            Ok(entity)
        })
    }

    fn delete_attempt(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.remove(&attempt_doc_id(id)).await?) })
    }
}

impl PartyStore for CouchChugStore {
    fn list_parties(&self) -> BoxFuture<'static, StorageResult<Vec<PartyEntity>>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.parties().await?) })
    }

    fn create_party(&self, name: String) -> BoxFuture<'static, StorageResult<PartyEntity>> {
        let store = self.clone();
        Box::pin(async move {
            let party = PartyEntity {
                id: Uuid::now_v7(),
                name,
                created_at: SystemTime::now(),
            };
            let doc = CouchPartyDocument::from(party.clone());
            store.store(&doc.id, &doc).await?;
            Ok(party)
        })
    }

    fn find_party(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<PartyEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let doc: Option<CouchPartyDocument> = store.fetch(&party_doc_id(id)).await?;
            Ok(doc.map(PartyEntity::try_from).transpose()?)
        })
    }
}

impl ChugStore for CouchChugStore {
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let target = store.config.database.clone();
            let response = store
                .exchange(store.request(Method::HEAD, None), &target)
                .await?;
            if response.status().is_success() {
                Ok(())
            } else {
                Err(Self::unexpected(&target, response.status()).into())
            }
        })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.ensure_database().await?) })
    }
}
