//! Validation helpers for DTOs.

use validator::ValidationError;

/// Upper bound on stored player names, counted in characters.
pub const MAX_PLAYER_NAME_CHARS: usize = 64;

/// Validates that a player name is non-blank and fits the length cap.
///
/// Surrounding whitespace is ignored because services trim the name before
/// storing it, so a whitespace-only submission counts as blank.
///
/// # Examples
///
/// ```ignore
/// validate_player_name("alice")   // Ok
/// validate_player_name("  bob ")  // Ok - stored as "bob"
/// validate_player_name("   ")     // Err - blank
/// ```
pub fn validate_player_name(name: &str) -> Result<(), ValidationError> {
    let trimmed = name.trim();

    if trimmed.is_empty() {
        let mut err = ValidationError::new("player_name_blank");
        err.message = Some("Player name must not be blank".into());
        return Err(err);
    }

    if trimmed.chars().count() > MAX_PLAYER_NAME_CHARS {
        let mut err = ValidationError::new("player_name_length");
        err.message =
            Some(format!("Player name must be at most {MAX_PLAYER_NAME_CHARS} characters").into());
        return Err(err);
    }

    Ok(())
}
