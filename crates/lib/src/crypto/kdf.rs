//! Passcode hashing and key derivation
//!
//! Argon2id in both roles: PHC-format passcode hashes for the lightweight
//! recovery-initiation check, and raw 32-byte key derivation for sealing the
//! identity payload. The salt travels with the [`EncryptedIdentity`] record
//! so the same key can be re-derived at unlock time.
//!
//! [`EncryptedIdentity`]: crate::identity::EncryptedIdentity

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core},
};

use super::errors::CryptoError;
use crate::Result;

/// Salt string length for Argon2 (base64 encoded, 22 chars)
pub const SALT_LENGTH: usize = 22;

/// Derived key length for AES-256 (32 bytes)
pub const KEY_LENGTH: usize = 32;

/// Generate a fresh random salt for key derivation.
///
/// Returns the base64-encoded salt string (22 chars).
pub fn generate_salt() -> String {
    SaltString::generate(&mut rand_core::OsRng)
        .as_str()
        .to_string()
}

/// Hash a passcode using Argon2id.
///
/// Returns the PHC-format hash string; the fresh salt is embedded in it.
pub fn hash_passcode(passcode: impl AsRef<str>) -> Result<String> {
    let salt = SaltString::generate(&mut rand_core::OsRng);

    let passcode_hash = Argon2::default()
        .hash_password(passcode.as_ref().as_bytes(), &salt)
        .map_err(|e| CryptoError::KeyDerivationFailed {
            reason: format!("Passcode hashing failed: {e}"),
        })?
        .to_string();

    Ok(passcode_hash)
}

/// Verify a passcode against its stored PHC-format hash.
///
/// Returns `Ok(true)` on a match and `Ok(false)` on a mismatch; `Err` only
/// for a malformed stored hash.
pub fn verify_passcode_hash(
    passcode: impl AsRef<str>,
    passcode_hash: impl AsRef<str>,
) -> Result<bool> {
    let parsed_hash =
        PasswordHash::new(passcode_hash.as_ref()).map_err(|e| CryptoError::InvalidSalt {
            reason: format!("Malformed passcode hash: {e}"),
        })?;

    Ok(Argon2::default()
        .verify_password(passcode.as_ref().as_bytes(), &parsed_hash)
        .is_ok())
}

/// Derive a 32-byte encryption key from a passcode and salt using Argon2id.
///
/// # Arguments
/// * `passcode` - The identity passcode
/// * `salt` - The salt string (base64 encoded, from `generate_salt`)
pub fn derive_encryption_key(passcode: impl AsRef<str>, salt: impl AsRef<str>) -> Result<Vec<u8>> {
    let salt_str = salt.as_ref();
    if salt_str.len() != SALT_LENGTH {
        return Err(CryptoError::InvalidSalt {
            reason: format!(
                "Invalid salt length: expected {SALT_LENGTH}, got {}",
                salt_str.len()
            ),
        }
        .into());
    }

    let salt = SaltString::from_b64(salt_str).map_err(|e| CryptoError::InvalidSalt {
        reason: format!("Invalid salt format: {e}"),
    })?;

    let argon2 = Argon2::default();

    let mut key = vec![0u8; KEY_LENGTH];
    argon2
        .hash_password_into(
            passcode.as_ref().as_bytes(),
            salt.as_str().as_bytes(),
            &mut key,
        )
        .map_err(|e| CryptoError::KeyDerivationFailed {
            reason: format!("Key derivation failed: {e}"),
        })?;

    Ok(key)
}
