//! Error types for identity creation and authentication
use thiserror::Error;

/// Errors from identity validation, unlock, and the identity file format.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IdentityError {
    /// pN name failed format rules (length, character class, reserved words).
    #[error("Invalid pN name: {reason}")]
    InvalidPnName { reason: String },

    /// Passcode failed format rules (length, character classes).
    #[error("Invalid passcode: {reason}")]
    InvalidPasscode { reason: String },

    /// Nickname failed format rules.
    #[error("Invalid nickname: {reason}")]
    InvalidNickname { reason: String },

    /// Wrong passcode, wrong pN name, or corrupted ciphertext.
    ///
    /// Deliberately a single variant: the caller cannot distinguish which
    /// credential was wrong.
    #[error("Authentication failed")]
    AuthenticationFailed,

    /// Identity file could not be parsed.
    #[error("Malformed identity file: {reason}")]
    MalformedIdentityFile { reason: String },

    /// A single-identity file must contain exactly one entry.
    #[error("Identity file must contain exactly one identity, found {count}")]
    WrongIdentityCount { count: usize },

    /// File extension is not one of the accepted identity file extensions.
    #[error("Unsupported identity file extension: {extension}")]
    UnsupportedExtension { extension: String },
}

impl IdentityError {
    /// Check if this error is a malformed-input validation failure.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            IdentityError::InvalidPnName { .. }
                | IdentityError::InvalidPasscode { .. }
                | IdentityError::InvalidNickname { .. }
                | IdentityError::MalformedIdentityFile { .. }
                | IdentityError::WrongIdentityCount { .. }
                | IdentityError::UnsupportedExtension { .. }
        )
    }

    /// Check if this error is an authentication failure.
    pub fn is_authentication(&self) -> bool {
        matches!(self, IdentityError::AuthenticationFailed)
    }
}
