//! Core data types for identities

use base64ct::{Base64, Encoding};
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A persisted, passcode-sealed identity record.
///
/// `public_key` is the stable, non-secret identifier (prefixed string,
/// `"ed25519:<base64>"`). `encrypted_data`, `iv`, and `salt` together are
/// opaque ciphertext, decryptable only with the correct (pN name, passcode)
/// pair. Immutable except for full re-encryption on passcode change;
/// destroyed on explicit deletion.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct EncryptedIdentity {
    /// Stable public identifier, derived from a freshly generated keypair
    pub public_key: String,

    /// AES-256-GCM ciphertext of the serialized payload (base64)
    pub encrypted_data: String,

    /// AEAD nonce (base64, 12 bytes)
    pub iv: String,

    /// Argon2 salt string (base64, 22 chars)
    pub salt: String,

    /// PHC-format Argon2id hash of the passcode, for the lightweight
    /// passcode check that skips the full AEAD open
    pub passcode_hash: String,

    /// Creation timestamp (milliseconds since Unix epoch)
    pub created_at: u64,
}

impl EncryptedIdentity {
    /// Decode the ciphertext from its base64 form.
    pub fn ciphertext_bytes(&self) -> Result<Vec<u8>, base64ct::Error> {
        Base64::decode_vec(&self.encrypted_data)
    }

    /// Decode the nonce from its base64 form.
    pub fn iv_bytes(&self) -> Result<Vec<u8>, base64ct::Error> {
        Base64::decode_vec(&self.iv)
    }
}

/// The plaintext sealed inside an [`EncryptedIdentity`].
///
/// Held in memory only during an unlocked session; zeroized on drop.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct IdentityPayload {
    /// The pN name (login identifier)
    pub pn_name: String,

    /// Display name
    pub nickname: String,

    /// Recovery contact email, if configured
    pub recovery_email: Option<String>,

    /// Recovery contact phone, if configured
    pub recovery_phone: Option<String>,

    /// Creation timestamp (milliseconds since Unix epoch)
    pub created_at: u64,
}

impl IdentityPayload {
    /// Check whether a supplied contact value matches either recovery
    /// contact (email or phone).
    pub fn matches_recovery_contact(&self, contact: &str) -> bool {
        self.recovery_email.as_deref() == Some(contact)
            || self.recovery_phone.as_deref() == Some(contact)
    }
}
