//! Paired devices and the single-primary invariant
//!
//! Each identity has at most one primary device at a time. Pairing a new
//! primary demotes the previous one; completing a recovery registers the
//! recovering device as the new primary and revokes every other device.

use std::collections::HashMap;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use super::errors::SyncError;
use crate::Result;
use crate::crypto::keys;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    Mobile,
    Desktop,
    Web,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DeviceStatus {
    Active,
    Revoked,
}

/// A device paired to an identity for metadata sync.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SyncedDevice {
    /// Device id (UUID)
    pub id: String,

    pub name: String,

    pub kind: DeviceKind,

    pub status: DeviceStatus,

    /// Last successful sync, if any (milliseconds since Unix epoch)
    pub last_sync: Option<u64>,

    /// Stable fingerprint of the device installation
    pub device_fingerprint: String,

    /// Per-device sync secret
    pub sync_key: String,

    pub is_primary: bool,

    pub paired_at: u64,
}

/// Per-identity device table.
#[derive(Default)]
pub struct DeviceRegistry {
    devices: RwLock<HashMap<String, Vec<SyncedDevice>>>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pair a device to an identity.
    ///
    /// When `is_primary` is set, the previous primary (if any) is demoted so
    /// that at most one primary exists per identity.
    pub fn pair_device(
        &self,
        identity_id: &str,
        name: &str,
        kind: DeviceKind,
        is_primary: bool,
        now: u64,
    ) -> SyncedDevice {
        let device = SyncedDevice {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            kind,
            status: DeviceStatus::Active,
            last_sync: None,
            device_fingerprint: keys::identity_hash(&format!("{identity_id}:{name}:{now}")),
            sync_key: keys::generate_secret(),
            is_primary,
            paired_at: now,
        };

        let mut devices = self.devices.write().unwrap();
        let entry = devices.entry(identity_id.to_string()).or_default();
        if is_primary {
            for existing in entry.iter_mut() {
                existing.is_primary = false;
            }
        }
        entry.push(device.clone());
        device
    }

    /// Revoke a device; a revoked primary leaves the identity with none.
    pub fn revoke_device(&self, identity_id: &str, device_id: &str) -> Result<()> {
        let mut devices = self.devices.write().unwrap();
        let device = devices
            .get_mut(identity_id)
            .and_then(|list| list.iter_mut().find(|d| d.id == device_id))
            .ok_or_else(|| SyncError::DeviceNotFound {
                device_id: device_id.to_string(),
            })?;
        device.status = DeviceStatus::Revoked;
        device.is_primary = false;
        Ok(())
    }

    /// Record a successful sync for a device.
    pub fn touch_device(&self, identity_id: &str, device_id: &str, now: u64) -> Result<()> {
        let mut devices = self.devices.write().unwrap();
        let device = devices
            .get_mut(identity_id)
            .and_then(|list| list.iter_mut().find(|d| d.id == device_id))
            .ok_or_else(|| SyncError::DeviceNotFound {
                device_id: device_id.to_string(),
            })?;
        if device.status == DeviceStatus::Revoked {
            return Err(SyncError::DeviceRevoked {
                device_id: device_id.to_string(),
            }
            .into());
        }
        device.last_sync = Some(now);
        Ok(())
    }

    /// All devices paired to an identity.
    pub fn devices(&self, identity_id: &str) -> Vec<SyncedDevice> {
        self.devices
            .read()
            .unwrap()
            .get(identity_id)
            .cloned()
            .unwrap_or_default()
    }

    /// The current primary device, if one exists.
    pub fn primary(&self, identity_id: &str) -> Option<SyncedDevice> {
        self.devices
            .read()
            .unwrap()
            .get(identity_id)?
            .iter()
            .find(|d| d.is_primary && d.status == DeviceStatus::Active)
            .cloned()
    }

    /// After a completed recovery: register the recovering device as the new
    /// primary and revoke every previously paired device.
    pub fn reassign_primary_for_recovery(
        &self,
        identity_id: &str,
        device_name: &str,
        kind: DeviceKind,
        now: u64,
    ) -> SyncedDevice {
        {
            let mut devices = self.devices.write().unwrap();
            if let Some(entry) = devices.get_mut(identity_id) {
                for existing in entry.iter_mut() {
                    existing.status = DeviceStatus::Revoked;
                    existing.is_primary = false;
                }
            }
        }
        info!(identity_id, "revoked all devices for recovery handover");
        self.pair_device(identity_id, device_name, kind, true, now)
    }
}
