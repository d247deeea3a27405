//! In-memory identity store
//!
//! A `RwLock<HashMap>` keyed by public key, suitable for testing and for
//! hosts that persist state externally. Provides basic persistence via
//! `save_to_file`/`load_from_file`, serializing the map to JSON.

use std::collections::HashMap;
use std::path::Path;
use std::sync::RwLock;

use super::errors::StoreError;
use super::IdentityStore;
use crate::Result;
use crate::identity::EncryptedIdentity;

/// A simple in-memory identity store.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    records: RwLock<HashMap<String, EncryptedIdentity>>,
}

impl InMemoryStore {
    /// Creates a new, empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.read().unwrap().len()
    }

    /// Check whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.records.read().unwrap().is_empty()
    }

    /// Saves the entire store state to a file as JSON.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let records = self.records.read().unwrap();
        let json = serde_json::to_string_pretty(&*records)?;
        std::fs::write(path.as_ref(), json).map_err(|e| {
            StoreError::Io {
                reason: format!("Failed to write {}: {e}", path.as_ref().display()),
            }
        })?;
        Ok(())
    }

    /// Loads store state from a JSON file.
    ///
    /// If the file does not exist, a new, empty store is returned.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::new());
        }

        let json = std::fs::read_to_string(path).map_err(|e| StoreError::Io {
            reason: format!("Failed to read {}: {e}", path.display()),
        })?;
        let records: HashMap<String, EncryptedIdentity> =
            serde_json::from_str(&json).map_err(|e| StoreError::Corrupted {
                reason: format!("Failed to parse {}: {e}", path.display()),
            })?;

        Ok(Self {
            records: RwLock::new(records),
        })
    }
}

impl IdentityStore for InMemoryStore {
    fn get(&self, public_key: &str) -> Result<EncryptedIdentity> {
        self.records
            .read()
            .unwrap()
            .get(public_key)
            .cloned()
            .ok_or_else(|| {
                StoreError::NotFound {
                    public_key: public_key.to_string(),
                }
                .into()
            })
    }

    fn put(&self, identity: EncryptedIdentity) -> Result<()> {
        self.records
            .write()
            .unwrap()
            .insert(identity.public_key.clone(), identity);
        Ok(())
    }

    fn remove(&self, public_key: &str) -> Result<()> {
        self.records
            .write()
            .unwrap()
            .remove(public_key)
            .map(|_| ())
            .ok_or_else(|| {
                StoreError::NotFound {
                    public_key: public_key.to_string(),
                }
                .into()
            })
    }

    fn contains(&self, public_key: &str) -> bool {
        self.records.read().unwrap().contains_key(public_key)
    }

    fn list(&self) -> Vec<EncryptedIdentity> {
        self.records.read().unwrap().values().cloned().collect()
    }
}
