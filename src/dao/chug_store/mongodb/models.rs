use mongodb::bson::{DateTime, Document, doc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::MongoDaoError;
use crate::dao::models::{AttemptEntity, DrinkMethod, PartyEntity, StoredPhoto};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoAttemptDocument {
    #[serde(rename = "_id")]
    id: String,
    name: String,
    time: f64,
    #[serde(default)]
    beer_type: Option<String>,
    #[serde(default)]
    method: DrinkMethod,
    #[serde(default)]
    party_id: Option<String>,
    #[serde(flatten)]
    photo: StoredPhoto,
    created_at: DateTime,
}

impl From<AttemptEntity> for MongoAttemptDocument {
    fn from(value: AttemptEntity) -> Self {
        Self {
            id: value.id.to_string(),
            name: value.name,
            time: value.time,
            beer_type: Some(value.beer_type),
            method: value.method,
            party_id: value.party_id.map(|id| id.to_string()),
            photo: value.photo,
            created_at: DateTime::from_system_time(value.created_at),
        }
    }
}

impl TryFrom<MongoAttemptDocument> for AttemptEntity {
    type Error = MongoDaoError;

    fn try_from(value: MongoAttemptDocument) -> Result<Self, Self::Error> {
        // Attempts written before parties existed have no party id; a malformed
        // one is treated the same way rather than hiding the whole record.
        let party_id = value
            .party_id
            .as_deref()
            .and_then(|raw| Uuid::parse_str(raw).ok());

        Ok(Self {
            id: parse_id(&value.id)?,
            name: value.name,
            time: value.time,
            beer_type: value
                .beer_type
                .unwrap_or_else(|| crate::dao::models::UNKNOWN_BEER_TYPE.to_owned()),
            method: value.method,
            party_id,
            photo: value.photo,
            created_at: value.created_at.to_system_time(),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoPartyDocument {
    #[serde(rename = "_id")]
    id: String,
    name: String,
    created_at: DateTime,
}

impl From<PartyEntity> for MongoPartyDocument {
    fn from(value: PartyEntity) -> Self {
        Self {
            id: value.id.to_string(),
            name: value.name,
            created_at: DateTime::from_system_time(value.created_at),
        }
    }
}

impl TryFrom<MongoPartyDocument> for PartyEntity {
    type Error = MongoDaoError;

    fn try_from(value: MongoPartyDocument) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_id(&value.id)?,
            name: value.name,
            created_at: value.created_at.to_system_time(),
        })
    }
}

fn parse_id(raw: &str) -> Result<Uuid, MongoDaoError> {
    Uuid::parse_str(raw).map_err(|_| MongoDaoError::InvalidDocumentId(raw.to_owned()))
}

pub fn doc_id(id: Uuid) -> Document {
    doc! {"_id": id.to_string()}
}

pub fn party_filter(party_id: Option<Uuid>) -> Document {
    match party_id {
        Some(id) => doc! {"party_id": id.to_string()},
        None => doc! {},
    }
}
