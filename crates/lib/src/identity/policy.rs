//! Format rules for pN names and passcodes
//!
//! Violations are validation errors: surfaced to the user, never retried.

use super::errors::IdentityError;
use crate::constants::{MAX_PN_NAME_LEN, MIN_PASSCODE_LEN, MIN_PN_NAME_LEN, RESERVED_PN_NAMES};

/// Validate a pN name.
///
/// Rules: 3-30 characters, lowercase ASCII alphanumerics and `-`, must not
/// start or end with `-`, and must not be a reserved word.
pub fn validate_pn_name(pn_name: &str) -> Result<(), IdentityError> {
    let len = pn_name.chars().count();
    if len < MIN_PN_NAME_LEN || len > MAX_PN_NAME_LEN {
        return Err(IdentityError::InvalidPnName {
            reason: format!("must be {MIN_PN_NAME_LEN}-{MAX_PN_NAME_LEN} characters, got {len}"),
        });
    }

    if !pn_name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(IdentityError::InvalidPnName {
            reason: "only lowercase letters, digits, and '-' are allowed".to_string(),
        });
    }

    if pn_name.starts_with('-') || pn_name.ends_with('-') {
        return Err(IdentityError::InvalidPnName {
            reason: "must not start or end with '-'".to_string(),
        });
    }

    if RESERVED_PN_NAMES.contains(&pn_name) {
        return Err(IdentityError::InvalidPnName {
            reason: format!("'{pn_name}' is a reserved word"),
        });
    }

    Ok(())
}

/// Validate a passcode.
///
/// Rules: at least 12 characters containing uppercase, lowercase, digit, and
/// symbol character classes.
pub fn validate_passcode(passcode: &str) -> Result<(), IdentityError> {
    if passcode.chars().count() < MIN_PASSCODE_LEN {
        return Err(IdentityError::InvalidPasscode {
            reason: format!("must be at least {MIN_PASSCODE_LEN} characters"),
        });
    }

    let has_upper = passcode.chars().any(|c| c.is_uppercase());
    let has_lower = passcode.chars().any(|c| c.is_lowercase());
    let has_digit = passcode.chars().any(|c| c.is_ascii_digit());
    let has_symbol = passcode.chars().any(|c| !c.is_alphanumeric());

    if !(has_upper && has_lower && has_digit && has_symbol) {
        return Err(IdentityError::InvalidPasscode {
            reason: "must contain uppercase, lowercase, digit, and symbol characters".to_string(),
        });
    }

    Ok(())
}

/// Validate a nickname (display name). Non-empty, at most 50 characters.
pub fn validate_nickname(nickname: &str) -> Result<(), IdentityError> {
    let len = nickname.chars().count();
    if len == 0 || len > 50 {
        return Err(IdentityError::InvalidNickname {
            reason: format!("must be 1-50 characters, got {len}"),
        });
    }
    Ok(())
}
