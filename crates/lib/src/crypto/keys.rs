//! Keypairs, signatures, and random secrets
//!
//! Public keys are exchanged as prefixed strings (`"ed25519:<base64>"`) so
//! the algorithm travels with the key. Approval signatures are plain Ed25519
//! over canonical message bytes; the caller decides what those bytes are.

use base64ct::{Base64, Encoding};
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::Rng;
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};

use super::errors::CryptoError;
use crate::constants::INVITATION_CODE_LEN;

/// Size of Ed25519 public keys in bytes
pub const ED25519_PUBLIC_KEY_SIZE: usize = 32;

/// Size of Ed25519 signatures in bytes
pub const ED25519_SIGNATURE_SIZE: usize = 64;

/// Size of recovery secrets and access tokens in bytes
pub const SECRET_SIZE: usize = 32;

/// Generate an Ed25519 key pair.
///
/// Uses cryptographically secure random number generation.
pub fn generate_keypair() -> (SigningKey, VerifyingKey) {
    let signing_key = SigningKey::generate(&mut OsRng);
    let verifying_key = signing_key.verifying_key();
    (signing_key, verifying_key)
}

/// Format a public key as a prefixed string (e.g. `"ed25519:base64..."`).
pub fn format_public_key(key: &VerifyingKey) -> String {
    let encoded = Base64::encode_string(&key.to_bytes());
    format!("ed25519:{encoded}")
}

/// Parse a public key from a prefixed string (e.g. `"ed25519:base64..."`).
pub fn parse_public_key(s: &str) -> Result<VerifyingKey, CryptoError> {
    let (prefix, key_data) = s.split_once(':').ok_or_else(|| CryptoError::InvalidKeyFormat {
        reason: "Expected 'algorithm:key' format".to_string(),
    })?;
    match prefix {
        "ed25519" => {
            let key_bytes =
                Base64::decode_vec(key_data).map_err(|e| CryptoError::InvalidKeyFormat {
                    reason: format!("Invalid base64 for key: {e}"),
                })?;
            let key_array: [u8; ED25519_PUBLIC_KEY_SIZE] =
                key_bytes
                    .try_into()
                    .map_err(|v: Vec<u8>| CryptoError::InvalidKeyFormat {
                        reason: format!(
                            "Ed25519 public key must be {ED25519_PUBLIC_KEY_SIZE} bytes, got {}",
                            v.len()
                        ),
                    })?;
            VerifyingKey::from_bytes(&key_array).map_err(|e| CryptoError::InvalidKeyFormat {
                reason: e.to_string(),
            })
        }
        _ => Err(CryptoError::InvalidKeyFormat {
            reason: format!("Unknown key algorithm prefix: '{prefix}'"),
        }),
    }
}

/// Sign arbitrary data with an Ed25519 private key.
///
/// Returns base64-encoded signature string.
pub fn sign_data(data: impl AsRef<[u8]>, signing_key: &SigningKey) -> String {
    let signature = signing_key.sign(data.as_ref());
    Base64::encode_string(&signature.to_bytes())
}

/// Verify an Ed25519 signature.
///
/// # Arguments
/// * `data` - The data that was signed
/// * `signature_base64` - Base64-encoded signature
/// * `verifying_key` - Public key for verification
pub fn verify_signature(
    data: impl AsRef<[u8]>,
    signature_base64: impl AsRef<str>,
    verifying_key: &VerifyingKey,
) -> Result<(), CryptoError> {
    let signature_bytes =
        Base64::decode_vec(signature_base64.as_ref()).map_err(|_| CryptoError::InvalidSignature)?;

    let sig_array: [u8; ED25519_SIGNATURE_SIZE] = signature_bytes
        .try_into()
        .map_err(|_| CryptoError::InvalidSignature)?;
    let signature = Signature::from_bytes(&sig_array);

    verifying_key
        .verify(data.as_ref(), &signature)
        .map_err(|_| CryptoError::InvalidSignature)
}

/// Generate a high-entropy recovery secret, independent of the passcode.
///
/// Returns 32 random bytes, base64 encoded. Presenting this secret
/// authorizes *initiating* a recovery request, never unlocking the identity.
pub fn generate_recovery_secret() -> String {
    generate_secret()
}

/// Generate an opaque random secret (32 bytes, base64 encoded).
///
/// Used for recovery secrets, access tokens, and device sync keys.
pub fn generate_secret() -> String {
    let mut bytes = [0u8; SECRET_SIZE];
    OsRng.fill(&mut bytes);
    Base64::encode_string(&bytes)
}

/// Generate a 6-digit numeric invitation code.
///
/// Shared out-of-band between the owner and the invited custodian; acceptance
/// requires the exact code back.
pub fn generate_invitation_code() -> String {
    let mut rng = OsRng;
    (0..INVITATION_CODE_LEN)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect()
}

/// Hash an identity's public key for transfer keying.
///
/// Returns the hex-encoded SHA-256 of the prefixed public key string. Asset
/// transfer on recovery completion is keyed `old hash -> new hash`.
pub fn identity_hash(public_key: &str) -> String {
    let digest = Sha256::digest(public_key.as_bytes());
    hex::encode(digest)
}
