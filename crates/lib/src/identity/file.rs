//! Identity file format
//!
//! The interchange format for exported identities: JSON
//! `{ version, timestamp, identities: [...] }`. A single-identity file must
//! contain exactly one entry. Accepted extensions: `.pn`, `.id`, `.json`,
//! `.identity`.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::errors::IdentityError;
use super::types::EncryptedIdentity;
use crate::Result;
use crate::clock::Clock;
use crate::constants::{IDENTITY_FILE_EXTENSIONS, IDENTITY_FILE_VERSION};

/// An exported identity file.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IdentityFile {
    /// Format version
    pub version: u32,

    /// Export timestamp (RFC3339)
    pub timestamp: String,

    /// The exported identity records
    pub identities: Vec<EncryptedIdentity>,
}

impl IdentityFile {
    /// Create a single-identity export file.
    pub fn new_single(identity: EncryptedIdentity, clock: &dyn Clock) -> Self {
        Self {
            version: IDENTITY_FILE_VERSION,
            timestamp: clock.now_rfc3339(),
            identities: vec![identity],
        }
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse an identity file from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| {
            IdentityError::MalformedIdentityFile {
                reason: e.to_string(),
            }
            .into()
        })
    }

    /// Extract the sole identity from a single-identity file.
    ///
    /// Fails with a validation error if the file does not contain exactly
    /// one entry.
    pub fn single(&self) -> Result<&EncryptedIdentity> {
        match self.identities.as_slice() {
            [identity] => Ok(identity),
            other => Err(IdentityError::WrongIdentityCount { count: other.len() }.into()),
        }
    }
}

/// Check whether a path carries an accepted identity file extension.
pub fn has_supported_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            IDENTITY_FILE_EXTENSIONS
                .iter()
                .any(|accepted| accepted.eq_ignore_ascii_case(ext))
        })
        .unwrap_or(false)
}

/// Validate a path's extension, returning a validation error for anything
/// other than `.pn`, `.id`, `.json`, or `.identity`.
pub fn validate_extension(path: &Path) -> Result<()> {
    if has_supported_extension(path) {
        Ok(())
    } else {
        Err(IdentityError::UnsupportedExtension {
            extension: path
                .extension()
                .and_then(|ext| ext.to_str())
                .unwrap_or("")
                .to_string(),
        }
        .into())
    }
}
