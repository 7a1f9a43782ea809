use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use std::time::SystemTime;
use uuid::Uuid;

/// Sentinel stored when an attempt is submitted without a beer type.
pub const UNKNOWN_BEER_TYPE: &str = "unknown";

/// How the beer was served when it was chugged.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum DrinkMethod {
    /// Poured into a glass.
    #[default]
    #[serde(alias = "Glas")]
    Glass,
    /// Straight from the can.
    #[serde(alias = "Dåse")]
    Can,
}

/// Photo reference persisted alongside an attempt.
///
/// Historically the same record shape has carried an inline data URI, an
/// externally hosted URL, or a path relative to the local upload directory.
/// Any combination of the three may be present on legacy records.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct StoredPhoto {
    /// `data:<mime>;base64,<payload>` URI embedded in the record.
    pub image_base64: Option<String>,
    /// Absolute URL of an object hosted by an external store.
    pub image_url: Option<String>,
    /// Path relative to the photo serving base URL.
    pub image_path: Option<String>,
}

impl StoredPhoto {
    /// Photo record carrying an inline data URI.
    pub fn inline(data_uri: impl Into<String>) -> Self {
        Self {
            image_base64: Some(data_uri.into()),
            ..Self::default()
        }
    }

    /// Photo record carrying an absolute object URL.
    pub fn url(url: impl Into<String>) -> Self {
        Self {
            image_url: Some(url.into()),
            ..Self::default()
        }
    }

    /// Photo record carrying a locally served relative path.
    pub fn path(path: impl Into<String>) -> Self {
        Self {
            image_path: Some(path.into()),
            ..Self::default()
        }
    }

    /// True when no representation is stored at all.
    pub fn is_empty(&self) -> bool {
        self.image_base64.is_none() && self.image_url.is_none() && self.image_path.is_none()
    }
}

/// One recorded chug, as persisted by the attempt store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AttemptEntity {
    /// Store-assigned identifier (UUID v7, sortable by creation).
    pub id: Uuid,
    /// Participant display name.
    pub name: String,
    /// Elapsed seconds.
    pub time: f64,
    /// Free-text beer label.
    pub beer_type: String,
    /// Glass or can.
    pub method: DrinkMethod,
    /// Party the attempt belongs to, if any.
    pub party_id: Option<Uuid>,
    /// Photo representations, possibly empty.
    #[serde(default)]
    pub photo: StoredPhoto,
    /// Store-assigned creation timestamp.
    pub created_at: SystemTime,
}

/// Validated attempt waiting to be persisted; the store assigns id and timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAttempt {
    /// Trimmed participant name.
    pub name: String,
    /// Positive elapsed seconds.
    pub time: f64,
    /// Beer label, or [`UNKNOWN_BEER_TYPE`].
    pub beer_type: String,
    /// Glass or can.
    pub method: DrinkMethod,
    /// Existing party, if any.
    pub party_id: Option<Uuid>,
    /// Stored photo, empty when none was uploaded or storing it failed.
    pub photo: StoredPhoto,
}

impl NewAttempt {
    /// Materialize the attempt with the identity assigned by a store.
    pub fn into_entity(self, id: Uuid, created_at: SystemTime) -> AttemptEntity {
        AttemptEntity {
            id,
            name: self.name,
            time: self.time,
            beer_type: self.beer_type,
            method: self.method,
            party_id: self.party_id,
            photo: self.photo,
            created_at,
        }
    }
}

/// Named event grouping attempts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PartyEntity {
    /// Stable identifier for the party.
    pub id: Uuid,
    /// Human readable party name.
    pub name: String,
    /// Creation timestamp.
    pub created_at: SystemTime,
}
