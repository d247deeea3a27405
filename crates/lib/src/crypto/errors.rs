//! Error types for cryptographic operations
use thiserror::Error;

/// Errors from key derivation, sealing, and signature operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CryptoError {
    #[error("Key derivation failed: {reason}")]
    KeyDerivationFailed { reason: String },

    #[error("Encryption failed: {reason}")]
    EncryptionFailed { reason: String },

    #[error("Decryption failed: {reason}")]
    DecryptionFailed { reason: String },

    #[error("Invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    #[error("Invalid nonce length: expected {expected}, got {actual}")]
    InvalidNonceLength { expected: usize, actual: usize },

    #[error("Invalid salt format: {reason}")]
    InvalidSalt { reason: String },

    #[error("Invalid key format: {reason}")]
    InvalidKeyFormat { reason: String },

    #[error("Invalid signature")]
    InvalidSignature,
}

impl CryptoError {
    /// Check if this error is a malformed-input problem rather than a
    /// cryptographic failure.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            CryptoError::InvalidKeyLength { .. }
                | CryptoError::InvalidNonceLength { .. }
                | CryptoError::InvalidSalt { .. }
                | CryptoError::InvalidKeyFormat { .. }
        )
    }

    /// Check if this error indicates an AEAD open failure (wrong key or
    /// corrupted ciphertext).
    pub fn is_decryption_failure(&self) -> bool {
        matches!(self, CryptoError::DecryptionFailed { .. })
    }
}
