//! Storage layer for encrypted identity records
//!
//! The [`IdentityStore`] trait abstracts the persisted blob store keyed by
//! public key. The core never inspects record contents; records are opaque
//! sealed blobs. [`InMemoryStore`] is the bundled implementation, with JSON
//! file persistence for simple durability.

mod errors;
mod memory;

pub use errors::StoreError;
pub use memory::InMemoryStore;

use crate::Result;
use crate::identity::EncryptedIdentity;

/// Blob store for [`EncryptedIdentity`] records, keyed by public key.
///
/// Implementations must be `Send + Sync`; all components treat the store as
/// a single-writer-at-a-time resource per identity key.
pub trait IdentityStore: Send + Sync {
    /// Retrieve a record by public key.
    ///
    /// Returns `StoreError::NotFound` if no record is stored under the key.
    fn get(&self, public_key: &str) -> Result<EncryptedIdentity>;

    /// Store a record, replacing any existing record under the same key.
    fn put(&self, identity: EncryptedIdentity) -> Result<()>;

    /// Remove a record by public key.
    ///
    /// Returns `StoreError::NotFound` if no record is stored under the key.
    fn remove(&self, public_key: &str) -> Result<()>;

    /// Check whether a record is stored under the key.
    fn contains(&self, public_key: &str) -> bool;

    /// List all stored records.
    fn list(&self) -> Vec<EncryptedIdentity>;
}
