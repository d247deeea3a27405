//! AEAD sealing of identity payloads
//!
//! AES-256-GCM with a fresh 12-byte nonce per seal. The ciphertext carries
//! its authentication tag, so a wrong key or a flipped bit surfaces as a
//! `DecryptionFailed` error rather than garbage plaintext.

use aes_gcm::{
    Aes256Gcm, KeyInit, Nonce,
    aead::{Aead, AeadCore, OsRng},
};

use super::errors::CryptoError;
use super::kdf::KEY_LENGTH;
use crate::Result;

/// Nonce length for AES-GCM (12 bytes standard)
pub const NONCE_LENGTH: usize = 12;

/// Encrypt a plaintext payload with a derived encryption key.
///
/// # Returns
/// A tuple of (ciphertext, nonce) where the nonce is freshly generated for
/// this seal and must be stored alongside the ciphertext.
pub fn seal(plaintext: impl AsRef<[u8]>, encryption_key: impl AsRef<[u8]>) -> Result<(Vec<u8>, Vec<u8>)> {
    let encryption_key = encryption_key.as_ref();
    if encryption_key.len() != KEY_LENGTH {
        return Err(CryptoError::InvalidKeyLength {
            expected: KEY_LENGTH,
            actual: encryption_key.len(),
        }
        .into());
    }

    let cipher =
        Aes256Gcm::new_from_slice(encryption_key).map_err(|e| CryptoError::EncryptionFailed {
            reason: format!("Failed to create cipher: {e}"),
        })?;

    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

    let ciphertext =
        cipher
            .encrypt(&nonce, plaintext.as_ref())
            .map_err(|e| CryptoError::EncryptionFailed {
                reason: format!("Encryption failed: {e}"),
            })?;

    Ok((ciphertext, nonce.to_vec()))
}

/// Decrypt a sealed payload.
///
/// Fails with `DecryptionFailed` if the key is wrong or the ciphertext has
/// been tampered with (GCM tag mismatch).
pub fn open(
    ciphertext: impl AsRef<[u8]>,
    nonce: impl AsRef<[u8]>,
    encryption_key: impl AsRef<[u8]>,
) -> Result<Vec<u8>> {
    let encryption_key = encryption_key.as_ref();
    let nonce_bytes = nonce.as_ref();

    if encryption_key.len() != KEY_LENGTH {
        return Err(CryptoError::InvalidKeyLength {
            expected: KEY_LENGTH,
            actual: encryption_key.len(),
        }
        .into());
    }

    if nonce_bytes.len() != NONCE_LENGTH {
        return Err(CryptoError::InvalidNonceLength {
            expected: NONCE_LENGTH,
            actual: nonce_bytes.len(),
        }
        .into());
    }

    let cipher =
        Aes256Gcm::new_from_slice(encryption_key).map_err(|e| CryptoError::DecryptionFailed {
            reason: format!("Failed to create cipher: {e}"),
        })?;

    let nonce = Nonce::from_slice(nonce_bytes);

    let plaintext =
        cipher
            .decrypt(nonce, ciphertext.as_ref())
            .map_err(|_| CryptoError::DecryptionFailed {
                reason: "AEAD open failed (wrong key or corrupted ciphertext)".to_string(),
            })?;

    Ok(plaintext)
}
