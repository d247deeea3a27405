//! Error types for identity storage
use thiserror::Error;

/// Errors from the identity blob store.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StoreError {
    /// No record stored under the given public key.
    #[error("No identity stored under public key: {public_key}")]
    NotFound { public_key: String },

    /// Underlying storage I/O failed.
    #[error("Storage I/O failed: {reason}")]
    Io { reason: String },

    /// Stored data could not be decoded.
    #[error("Stored data is corrupted: {reason}")]
    Corrupted { reason: String },
}

impl StoreError {
    /// Check if this error indicates a resource was not found.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }

    /// Check if this error is an I/O failure, eligible for one local retry.
    pub fn is_io(&self) -> bool {
        matches!(self, StoreError::Io { .. })
    }
}
