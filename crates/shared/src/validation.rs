//! Field validators shared by request DTOs.

use validator::ValidationError;

/// Rejects strings that are empty once surrounding whitespace is removed.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("Must not be blank".into());
        Err(err)
    } else {
        Ok(())
    }
}

/// Accepts only the 64-character lowercase hex form of a reset token.
pub fn validate_reset_token(token: &str) -> Result<(), ValidationError> {
    let well_formed = token.len() == 64
        && token
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c));

    if well_formed {
        Ok(())
    } else {
        let mut err = ValidationError::new("token_format");
        err.message = Some("Malformed reset token".into());
        Err(err)
    }
}

/// Accepts a non-empty password without control characters.
pub fn validate_password_chars(password: &str) -> Result<(), ValidationError> {
    if password.chars().any(char::is_control) {
        let mut err = ValidationError::new("password_chars");
        err.message = Some("Password must not contain control characters".into());
        return Err(err);
    }
    Ok(())
}
