//! Error types for metadata sync and device pairing

use thiserror::Error;

/// Errors from the metadata sync engine and device registry.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SyncError {
    #[error("Device not found: {device_id}")]
    DeviceNotFound { device_id: String },

    /// Revoked devices may not push updates.
    #[error("Device is revoked: {device_id}")]
    DeviceRevoked { device_id: String },

    /// A sink rejected a pushed record; the record stays queued.
    #[error("Sync sink failure: {reason}")]
    SinkFailure { reason: String },
}

impl SyncError {
    /// Check if this error indicates a resource was not found.
    pub fn is_not_found(&self) -> bool {
        matches!(self, SyncError::DeviceNotFound { .. })
    }
}
