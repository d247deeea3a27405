//! Identity creation, authentication, and the identity file format
//!
//! An identity is a passcode-sealed payload plus a public key. Creation
//! derives a symmetric key from (pN name, passcode, fresh salt) via Argon2id
//! and seals the payload with AES-256-GCM; authentication re-derives the key
//! from the stored salt and checks the decrypted pN name against the
//! supplied one, so a key reused under the wrong name still fails.

mod errors;
pub mod file;
pub mod policy;
mod types;

pub use errors::IdentityError;
pub use file::IdentityFile;
pub use types::{EncryptedIdentity, IdentityPayload};

use base64ct::{Base64, Encoding};
use tracing::debug;
use zeroize::Zeroize;

use crate::Result;
use crate::clock::Clock;
use crate::crypto::{cipher, kdf, keys};

/// Create a new identity sealed under `(pn_name, passcode)`.
///
/// Derives a symmetric key from the passcode and a fresh salt, serializes
/// the identity fields, and seals them with a fresh nonce. The public key is
/// derived independently from a freshly generated Ed25519 keypair.
///
/// Fails with a validation error if `pn_name`, `nickname`, or `passcode`
/// fail format rules.
pub fn create_identity(
    pn_name: &str,
    nickname: &str,
    passcode: &str,
    recovery_email: Option<&str>,
    recovery_phone: Option<&str>,
    clock: &dyn Clock,
) -> Result<EncryptedIdentity> {
    policy::validate_pn_name(pn_name)?;
    policy::validate_nickname(nickname)?;
    policy::validate_passcode(passcode)?;

    let created_at = clock.now_millis();
    let payload = IdentityPayload {
        pn_name: pn_name.to_string(),
        nickname: nickname.to_string(),
        recovery_email: recovery_email.map(str::to_string),
        recovery_phone: recovery_phone.map(str::to_string),
        created_at,
    };

    let (_, verifying_key) = keys::generate_keypair();
    let public_key = keys::format_public_key(&verifying_key);

    let identity = seal_payload(&payload, passcode, &public_key, created_at)?;
    debug!(public_key = %identity.public_key, "created identity");
    Ok(identity)
}

/// Unlock an identity with the supplied credentials.
///
/// Re-derives the key from the stored salt, opens the ciphertext, and checks
/// that the decrypted pN name matches the supplied one. Both a failed open
/// and a name mismatch surface as the same `AuthenticationFailed` error.
pub fn authenticate_identity(
    identity: &EncryptedIdentity,
    passcode: &str,
    pn_name: &str,
) -> Result<IdentityPayload> {
    let payload = open_payload(identity, passcode)?;

    if payload.pn_name != pn_name {
        debug!(public_key = %identity.public_key, "pN name mismatch on unlock");
        return Err(IdentityError::AuthenticationFailed.into());
    }

    Ok(payload)
}

/// Lightweight passcode check used during recovery initiation.
///
/// Checks against the stored PHC hash, so a mismatch is detected without
/// deserializing the payload. Returns `false` on a mismatch or a malformed
/// stored hash rather than an error.
pub fn verify_passcode(identity: &EncryptedIdentity, passcode: &str) -> bool {
    kdf::verify_passcode_hash(passcode, &identity.passcode_hash).unwrap_or(false)
}

/// Re-seal an identity under a new passcode.
///
/// Requires the old credentials; the payload and public key are retained,
/// the salt and nonce are fresh.
pub fn change_passcode(
    identity: &EncryptedIdentity,
    pn_name: &str,
    old_passcode: &str,
    new_passcode: &str,
) -> Result<EncryptedIdentity> {
    policy::validate_passcode(new_passcode)?;
    let payload = authenticate_identity(identity, old_passcode, pn_name)?;

    seal_payload(&payload, new_passcode, &identity.public_key, identity.created_at)
}

fn seal_payload(
    payload: &IdentityPayload,
    passcode: &str,
    public_key: &str,
    created_at: u64,
) -> Result<EncryptedIdentity> {
    let salt = kdf::generate_salt();
    let mut encryption_key = kdf::derive_encryption_key(passcode, &salt)?;

    let mut plaintext = serde_json::to_vec(payload)?;
    let sealed = cipher::seal(&plaintext, &encryption_key);
    plaintext.zeroize();
    encryption_key.zeroize();
    let (ciphertext, nonce) = sealed?;

    Ok(EncryptedIdentity {
        public_key: public_key.to_string(),
        encrypted_data: Base64::encode_string(&ciphertext),
        iv: Base64::encode_string(&nonce),
        salt,
        passcode_hash: kdf::hash_passcode(passcode)?,
        created_at,
    })
}

fn open_payload(identity: &EncryptedIdentity, passcode: &str) -> Result<IdentityPayload> {
    let mut encryption_key = kdf::derive_encryption_key(passcode, &identity.salt)?;

    let ciphertext = identity
        .ciphertext_bytes()
        .map_err(|_| IdentityError::AuthenticationFailed)?;
    let nonce = identity
        .iv_bytes()
        .map_err(|_| IdentityError::AuthenticationFailed)?;

    let opened = cipher::open(&ciphertext, &nonce, &encryption_key);
    encryption_key.zeroize();

    let mut plaintext = opened.map_err(|_| IdentityError::AuthenticationFailed)?;
    let payload = serde_json::from_slice(&plaintext);
    plaintext.zeroize();

    payload.map_err(|_| IdentityError::AuthenticationFailed.into())
}
