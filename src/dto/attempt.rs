use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{ValidationError, ValidationErrors};

use crate::{
    dao::models::{AttemptEntity, DrinkMethod, NewAttempt, StoredPhoto, UNKNOWN_BEER_TYPE},
    dto::{
        format_system_time,
        validation::{validate_beer_type, validate_chug_time, validate_participant_name},
    },
    photos::{PhotoResolver, PhotoUpload},
    ranking::{self, Medal},
};

/// Query string accepted by `GET /api/attempts`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AttemptListQuery {
    /// Restrict the leaderboard to one party; omit for the global board.
    #[serde(default, rename = "partyId", alias = "party_id")]
    pub party_id: Option<Uuid>,
}

/// Multipart form submitted to `POST /api/attempts`.
///
/// Text parts arrive unparsed; [`AttemptForm::into_draft`] validates them.
#[derive(Debug, Default, ToSchema)]
pub struct AttemptForm {
    pub name: String,
    /// Seconds, `.` or `,` as decimal separator.
    pub time: Option<String>,
    pub beer_type: Option<String>,
    /// `Glass` (default) or `Can`.
    pub method: Option<String>,
    #[schema(rename = "partyId")]
    pub party_id: Option<String>,
    /// Optional image file.
    #[schema(value_type = Option<String>, format = Binary)]
    pub image: Option<PhotoUpload>,
}

/// Validated attempt fields, ready to be paired with a stored photo.
#[derive(Debug, Clone, PartialEq)]
pub struct AttemptDraft {
    pub name: String,
    pub time: f64,
    pub beer_type: String,
    pub method: DrinkMethod,
    pub party_id: Option<Uuid>,
}

impl AttemptDraft {
    pub fn into_new_attempt(self, photo: StoredPhoto) -> NewAttempt {
        NewAttempt {
            name: self.name,
            time: self.time,
            beer_type: self.beer_type,
            method: self.method,
            party_id: self.party_id,
            photo,
        }
    }
}

fn field_error(code: &'static str, message: String) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

/// Parse a drink method, accepting the legacy spellings case-insensitively.
pub fn parse_method(raw: &str) -> Option<DrinkMethod> {
    match raw.trim().to_lowercase().as_str() {
        "glass" | "glas" => Some(DrinkMethod::Glass),
        "can" | "dåse" | "daase" => Some(DrinkMethod::Can),
        _ => None,
    }
}

fn parse_time(raw: &str) -> Option<f64> {
    raw.trim().replace(',', ".").parse::<f64>().ok()
}

impl AttemptForm {
    /// Validate the text fields and split off the photo upload.
    pub fn into_draft(self) -> Result<(AttemptDraft, Option<PhotoUpload>), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let name = self.name.trim().to_owned();
        if let Err(e) = validate_participant_name(&name) {
            errors.add("name", e);
        }

        let time = match non_blank(self.time) {
            None => {
                errors.add("time", field_error("chug_time", "Time is required".into()));
                0.0
            }
            Some(raw) => match parse_time(&raw) {
                Some(time) => {
                    if let Err(e) = validate_chug_time(time) {
                        errors.add("time", e);
                    }
                    time
                }
                None => {
                    errors.add(
                        "time",
                        field_error("chug_time", format!("Time `{raw}` is not a number")),
                    );
                    0.0
                }
            },
        };

        let beer_type = match non_blank(self.beer_type) {
            Some(beer_type) => {
                if let Err(e) = validate_beer_type(&beer_type) {
                    errors.add("beer_type", e);
                }
                beer_type
            }
            None => UNKNOWN_BEER_TYPE.to_owned(),
        };

        let method = match non_blank(self.method) {
            None => DrinkMethod::default(),
            Some(raw) => parse_method(&raw).unwrap_or_else(|| {
                errors.add(
                    "method",
                    field_error("method", format!("Unknown method `{raw}`")),
                );
                DrinkMethod::default()
            }),
        };

        let party_id = match non_blank(self.party_id) {
            None => None,
            Some(raw) => match Uuid::parse_str(&raw) {
                Ok(id) => Some(id),
                Err(_) => {
                    errors.add(
                        "partyId",
                        field_error("party_id", format!("`{raw}` is not a valid party id")),
                    );
                    None
                }
            },
        };

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok((
            AttemptDraft {
                name,
                time,
                beer_type,
                method,
                party_id,
            },
            self.image,
        ))
    }
}

/// Attempt as displayed on a leaderboard.
#[derive(Debug, Serialize, ToSchema, Clone)]
pub struct RankedAttempt {
    pub id: String,
    pub name: String,
    pub time: f64,
    /// Time with two decimals.
    pub display_time: String,
    pub beer_type: String,
    #[schema(value_type = String, example = "Glass")]
    pub method: DrinkMethod,
    pub party_id: Option<String>,
    /// Displayable photo reference; absent renders a placeholder.
    pub photo_url: Option<String>,
    /// 1-based position in the leaderboard it was listed in.
    pub rank: usize,
    /// 1-based chronological number among the participant's attempts.
    pub attempt_number: usize,
    pub sub_three: bool,
    pub medal: Option<Medal>,
    pub created_at: String,
}

impl RankedAttempt {
    pub fn new(
        attempt: &AttemptEntity,
        rank: usize,
        attempt_number: usize,
        resolver: &PhotoResolver,
    ) -> Self {
        Self {
            id: attempt.id.to_string(),
            name: attempt.name.clone(),
            time: attempt.time,
            display_time: ranking::format_time(attempt.time),
            beer_type: attempt.beer_type.clone(),
            method: attempt.method,
            party_id: attempt.party_id.map(|id| id.to_string()),
            photo_url: resolver.resolve(&attempt.photo),
            rank,
            attempt_number,
            sub_three: ranking::threshold(attempt.time),
            medal: ranking::medal(rank),
            created_at: format_system_time(attempt.created_at),
        }
    }
}

/// Response of `POST /api/attempts`.
#[derive(Debug, Serialize, ToSchema)]
pub struct CreateAttemptResponse {
    pub attempt: RankedAttempt,
    /// Non-fatal problems, e.g. a photo that could not be stored.
    pub warnings: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(name: &str, time: &str) -> AttemptForm {
        AttemptForm {
            name: name.into(),
            time: Some(time.into()),
            ..AttemptForm::default()
        }
    }

    #[test]
    fn blank_optional_fields_get_defaults() {
        let mut form = form("  Alice ", "2.50");
        form.beer_type = Some("   ".into());
        form.party_id = Some(String::new());

        let (draft, image) = form.into_draft().unwrap();

        assert_eq!(draft.name, "Alice");
        assert_eq!(draft.time, 2.5);
        assert_eq!(draft.beer_type, UNKNOWN_BEER_TYPE);
        assert_eq!(draft.method, DrinkMethod::Glass);
        assert_eq!(draft.party_id, None);
        assert!(image.is_none());
    }

    #[test]
    fn comma_decimal_separator_is_accepted() {
        let (draft, _) = form("Bob", "3,07").into_draft().unwrap();
        assert_eq!(draft.time, 3.07);
    }

    #[test]
    fn legacy_method_spellings_parse() {
        assert_eq!(parse_method("Glas"), Some(DrinkMethod::Glass));
        assert_eq!(parse_method("dåse"), Some(DrinkMethod::Can));
        assert_eq!(parse_method("CAN"), Some(DrinkMethod::Can));
        assert_eq!(parse_method("bottle"), None);
    }

    #[test]
    fn invalid_fields_are_all_reported() {
        let mut form = form(" ", "-1");
        form.method = Some("bottle".into());
        form.party_id = Some("not-a-uuid".into());

        let errors = form.into_draft().unwrap_err();
        let fields = errors.field_errors();

        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("time"));
        assert!(fields.contains_key("method"));
        assert!(fields.contains_key("partyId"));
    }

    #[test]
    fn missing_or_non_numeric_time_is_rejected() {
        let missing = AttemptForm {
            name: "Alice".into(),
            ..AttemptForm::default()
        };
        assert!(missing.into_draft().is_err());
        assert!(form("Alice", "fast").into_draft().is_err());
        assert!(form("Alice", "NaN").into_draft().is_err());
    }
}
