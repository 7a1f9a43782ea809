//! Validation helpers for DTOs.

use validator::ValidationError;

/// Longest accepted participant name, in characters.
pub const MAX_NAME_LEN: usize = 64;
/// Longest accepted beer type label, in characters.
pub const MAX_BEER_TYPE_LEN: usize = 64;
/// Longest accepted party name, in characters.
pub const MAX_PARTY_NAME_LEN: usize = 100;

fn validate_label(value: &str, max: usize, code: &'static str, what: &str) -> Result<(), ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        let mut err = ValidationError::new(code);
        err.message = Some(format!("{what} must not be empty").into());
        return Err(err);
    }
    let len = trimmed.chars().count();
    if len > max {
        let mut err = ValidationError::new(code);
        err.message = Some(format!("{what} must be at most {max} characters (got {len})").into());
        return Err(err);
    }
    Ok(())
}

/// Participant names must contain something besides whitespace.
pub fn validate_participant_name(name: &str) -> Result<(), ValidationError> {
    validate_label(name, MAX_NAME_LEN, "participant_name", "Name")
}

/// Party names follow the same rules as participant names with a larger limit.
pub fn validate_party_name(name: &str) -> Result<(), ValidationError> {
    validate_label(name, MAX_PARTY_NAME_LEN, "party_name", "Party name")
}

/// Beer types are optional; when present they are bounded in length.
pub fn validate_beer_type(beer_type: &str) -> Result<(), ValidationError> {
    let len = beer_type.trim().chars().count();
    if len > MAX_BEER_TYPE_LEN {
        let mut err = ValidationError::new("beer_type_length");
        err.message = Some(
            format!("Beer type must be at most {MAX_BEER_TYPE_LEN} characters (got {len})").into(),
        );
        return Err(err);
    }
    Ok(())
}

/// A chug time is a positive, finite number of seconds.
///
/// ```ignore
/// validate_chug_time(2.5)       // Ok
/// validate_chug_time(0.0)       // Err
/// validate_chug_time(f64::NAN)  // Err
/// ```
pub fn validate_chug_time(time: f64) -> Result<(), ValidationError> {
    if !time.is_finite() || time <= 0.0 {
        let mut err = ValidationError::new("chug_time");
        err.message = Some(format!("Time must be a positive number of seconds (got {time})").into());
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_participant_name() {
        assert!(validate_participant_name("Alice").is_ok());
        assert!(validate_participant_name("  Bo  ").is_ok());
        assert!(validate_participant_name("").is_err());
        assert!(validate_participant_name("   ").is_err());
        assert!(validate_participant_name(&"x".repeat(MAX_NAME_LEN + 1)).is_err());
    }

    #[test]
    fn test_validate_chug_time() {
        assert!(validate_chug_time(2.5).is_ok());
        assert!(validate_chug_time(0.01).is_ok());
        assert!(validate_chug_time(0.0).is_err());
        assert!(validate_chug_time(-1.0).is_err());
        assert!(validate_chug_time(f64::NAN).is_err());
        assert!(validate_chug_time(f64::INFINITY).is_err());
    }

    #[test]
    fn test_validate_beer_type() {
        assert!(validate_beer_type("").is_ok());
        assert!(validate_beer_type("Classic").is_ok());
        assert!(validate_beer_type(&"x".repeat(MAX_BEER_TYPE_LEN + 1)).is_err());
    }
}
