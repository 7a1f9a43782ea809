use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::dao::{
    chug_store::couchdb::error::CouchDaoError,
    models::{AttemptEntity, DrinkMethod, PartyEntity, StoredPhoto},
};

pub const ATTEMPT_PREFIX: &str = "attempt::";
pub const PARTY_PREFIX: &str = "party::";
pub const END_SUFFIX: &str = "\u{ffff}";

#[derive(Debug, Deserialize)]
pub struct AllDocsResponse {
    pub rows: Vec<AllDocsRow>,
}

#[derive(Debug, Deserialize)]
pub struct AllDocsRow {
    #[allow(dead_code)]
    pub id: String,
    #[serde(default)]
    pub doc: Option<Value>,
}

/// Minimal projection used to read the current revision before a delete.
#[derive(Debug, Deserialize)]
pub struct RevisionOnly {
    #[serde(rename = "_rev")]
    pub rev: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouchAttemptDocument {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_rev", skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    #[serde(flatten)]
    pub attempt: AttemptBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptBody {
    pub name: String,
    pub time: f64,
    pub beer_type: String,
    #[serde(default)]
    pub method: DrinkMethod,
    #[serde(default)]
    pub party_id: Option<Uuid>,
    #[serde(flatten)]
    pub photo: StoredPhoto,
    pub created_at: SystemTime,
}

impl From<AttemptEntity> for CouchAttemptDocument {
    fn from(value: AttemptEntity) -> Self {
        Self {
            id: attempt_doc_id(value.id),
            rev: None,
            attempt: AttemptBody {
                name: value.name,
                time: value.time,
                beer_type: value.beer_type,
                method: value.method,
                party_id: value.party_id,
                photo: value.photo,
                created_at: value.created_at,
            },
        }
    }
}

impl TryFrom<CouchAttemptDocument> for AttemptEntity {
    type Error = CouchDaoError;

    fn try_from(doc: CouchAttemptDocument) -> Result<Self, Self::Error> {
        Ok(Self {
            id: extract_uuid(&doc.id)?,
            name: doc.attempt.name,
            time: doc.attempt.time,
            beer_type: doc.attempt.beer_type,
            method: doc.attempt.method,
            party_id: doc.attempt.party_id,
            photo: doc.attempt.photo,
            created_at: doc.attempt.created_at,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouchPartyDocument {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_rev", skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    pub name: String,
    pub created_at: SystemTime,
}

impl From<PartyEntity> for CouchPartyDocument {
    fn from(value: PartyEntity) -> Self {
        Self {
            id: party_doc_id(value.id),
            rev: None,
            name: value.name,
            created_at: value.created_at,
        }
    }
}

impl TryFrom<CouchPartyDocument> for PartyEntity {
    type Error = CouchDaoError;

    fn try_from(doc: CouchPartyDocument) -> Result<Self, Self::Error> {
        Ok(Self {
            id: extract_uuid(&doc.id)?,
            name: doc.name,
            created_at: doc.created_at,
        })
    }
}

pub fn attempt_doc_id(id: Uuid) -> String {
    format!("{}{}", ATTEMPT_PREFIX, id)
}

pub fn party_doc_id(id: Uuid) -> String {
    format!("{}{}", PARTY_PREFIX, id)
}

pub fn extract_uuid(doc_id: &str) -> Result<Uuid, CouchDaoError> {
    let (_, id) = doc_id
        .split_once("::")
        .ok_or_else(|| CouchDaoError::DocumentId {
            doc_id: doc_id.to_string(),
            reason: "missing separator",
        })?;

    Uuid::parse_str(id).map_err(|_| CouchDaoError::DocumentId {
        doc_id: doc_id.to_string(),
        reason: "invalid UUID",
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doc_ids_round_trip_through_prefix() {
        let id = Uuid::now_v7();
        assert_eq!(extract_uuid(&attempt_doc_id(id)).unwrap(), id);
        assert_eq!(extract_uuid(&party_doc_id(id)).unwrap(), id);
    }

    #[test]
    fn malformed_doc_ids_are_rejected() {
        assert!(matches!(
            extract_uuid("attempt-123"),
            Err(CouchDaoError::DocumentId { reason: "missing separator", .. })
        ));
        assert!(matches!(
            extract_uuid("attempt::not-a-uuid"),
            Err(CouchDaoError::DocumentId { reason: "invalid UUID", .. })
        ));
    }

    #[test]
    fn legacy_document_without_party_or_photo_decodes() {
        let raw = serde_json::json!({
            "_id": format!("attempt::{}", Uuid::nil()),
            "_rev": "1-abc",
            "name": "Alice",
            "time": 2.5,
            "beer_type": "Ukendt",
            "method": "Glas",
            "created_at": { "secs_since_epoch": 1_700_000_000u64, "nanos_since_epoch": 0u32 }
        });

        let doc: CouchAttemptDocument = serde_json::from_value(raw).unwrap();
        let entity = AttemptEntity::try_from(doc).unwrap();

        assert_eq!(entity.method, DrinkMethod::Glass);
        assert_eq!(entity.party_id, None);
        assert!(entity.photo.is_empty());
    }
}
