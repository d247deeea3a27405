//!
//! pnvault: a self-custodied cryptographic identity ("pN") protected by a
//! name+passcode pair and recoverable without a central authority through a
//! quorum of trusted custodians.
//!
//! ## Core Concepts
//!
//! * **Identities (`identity::EncryptedIdentity`)**: The persisted unit. A public key
//!   identifies the identity; the payload is sealed with a passcode-derived key.
//! * **Stores (`store::IdentityStore`)**: A pluggable blob store for encrypted
//!   identity records, keyed by public key.
//! * **Custodians & Recovery (`recovery`)**: Custodian lifecycle, invitations, and
//!   the threshold-based recovery request protocol.
//! * **Metadata Sync (`sync`)**: An append-only per-identity update log merged
//!   field-by-field with last-write-wins semantics, plus the synced-device registry.
//! * **Sessions (`session`)**: Ephemeral access tokens issued after a successful
//!   unlock or recovery completion.
//! * **Vault (`vault::Vault`)**: The explicit context object tying the pieces
//!   together. There are no ambient globals; every operation goes through a `Vault`.

pub mod clock;
pub mod constants;
pub mod crypto;
pub mod identity;
pub mod recovery;
pub mod session;
pub mod store;
pub mod sync;
pub mod transfer;
pub mod vault;

pub use clock::{Clock, SystemClock};
pub use vault::Vault;

#[cfg(any(test, feature = "testing"))]
pub use clock::FixedClock;

/// Result type used throughout the pnvault library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the pnvault library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Structured cryptographic errors from the crypto module
    #[error(transparent)]
    Crypto(crypto::CryptoError),

    /// Structured identity errors from the identity module
    #[error(transparent)]
    Identity(identity::IdentityError),

    /// Structured storage errors from the store module
    #[error(transparent)]
    Store(store::StoreError),

    /// Structured protocol errors from the recovery module
    #[error(transparent)]
    Recovery(recovery::RecoveryError),

    /// Structured sync errors from the sync module
    #[error(transparent)]
    Sync(sync::SyncError),

    /// Structured session errors from the session module
    #[error(transparent)]
    Session(session::SessionError),

    /// Structured transfer errors from the transfer module
    #[error(transparent)]
    Transfer(transfer::TransferError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Crypto(_) => "crypto",
            Error::Identity(_) => "identity",
            Error::Store(_) => "store",
            Error::Recovery(_) => "recovery",
            Error::Sync(_) => "sync",
            Error::Session(_) => "session",
            Error::Transfer(_) => "transfer",
            Error::Io(_) => "io",
            Error::Serialize(_) => "serialize",
        }
    }

    /// Check if this error is a malformed-input validation failure.
    ///
    /// Validation failures are surfaced to the user and never retried.
    pub fn is_validation_error(&self) -> bool {
        match self {
            Error::Identity(err) => err.is_validation(),
            Error::Crypto(err) => err.is_validation(),
            _ => false,
        }
    }

    /// Check if this error is an authentication failure (wrong passcode or
    /// name, corrupted ciphertext). Terminal for the attempt.
    pub fn is_authentication_error(&self) -> bool {
        match self {
            Error::Identity(err) => err.is_authentication(),
            Error::Crypto(err) => err.is_decryption_failure(),
            _ => false,
        }
    }

    /// Check if this error is a recovery/custodian protocol violation.
    ///
    /// Protocol errors never corrupt request state; the operation is rejected
    /// and the previous state is preserved.
    pub fn is_protocol_error(&self) -> bool {
        matches!(self, Error::Recovery(_))
    }

    /// Check if this error is storage-related.
    pub fn is_storage_error(&self) -> bool {
        matches!(self, Error::Store(_) | Error::Io(_))
    }

    /// Check if this error indicates a resource was not found.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Store(err) => err.is_not_found(),
            Error::Recovery(err) => err.is_not_found(),
            Error::Sync(err) => err.is_not_found(),
            Error::Session(err) => err.is_not_found(),
            _ => false,
        }
    }

    /// Check if this error indicates an expired artifact (invitation,
    /// recovery request, transfer ticket, or session).
    pub fn is_expired(&self) -> bool {
        match self {
            Error::Recovery(err) => err.is_expired(),
            Error::Session(err) => err.is_expired(),
            Error::Transfer(err) => err.is_expired(),
            _ => false,
        }
    }

    /// Check if this error indicates the caller was rate limited.
    pub fn is_rate_limited(&self) -> bool {
        match self {
            Error::Session(err) => err.is_rate_limited(),
            _ => false,
        }
    }
}

impl From<crypto::CryptoError> for Error {
    fn from(err: crypto::CryptoError) -> Self {
        Error::Crypto(err)
    }
}

impl From<identity::IdentityError> for Error {
    fn from(err: identity::IdentityError) -> Self {
        Error::Identity(err)
    }
}

impl From<store::StoreError> for Error {
    fn from(err: store::StoreError) -> Self {
        Error::Store(err)
    }
}

impl From<recovery::RecoveryError> for Error {
    fn from(err: recovery::RecoveryError) -> Self {
        Error::Recovery(err)
    }
}

impl From<sync::SyncError> for Error {
    fn from(err: sync::SyncError) -> Self {
        Error::Sync(err)
    }
}

impl From<session::SessionError> for Error {
    fn from(err: session::SessionError) -> Self {
        Error::Session(err)
    }
}

impl From<transfer::TransferError> for Error {
    fn from(err: transfer::TransferError) -> Self {
        Error::Transfer(err)
    }
}
