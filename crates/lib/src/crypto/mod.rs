//! Cryptographic primitives for pnvault
//!
//! Three concerns live here:
//! - `kdf`: Argon2id passcode hashing and key derivation
//! - `cipher`: AES-256-GCM sealing of the identity payload
//! - `keys`: Ed25519 keypairs, approval signatures, and random secrets
//!
//! Everything above this module works with strings and opaque byte vectors;
//! algorithm choices are confined to this module.

pub mod cipher;
mod errors;
pub mod kdf;
pub mod keys;

pub use errors::CryptoError;
