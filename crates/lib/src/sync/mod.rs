//! Metadata sync with last-write-wins merging
//!
//! Non-secret metadata (nickname, profile picture, privacy flags, plus
//! custodian/recovery-key/device log events) flows between devices as an
//! append-only record log. The merged profile view is computed per field with
//! last-write-wins; updates made offline queue locally and flush best-effort.

pub mod device;
mod errors;
pub mod queue;
pub mod types;

pub use device::{DeviceKind, DeviceRegistry, DeviceStatus, SyncedDevice};
pub use errors::SyncError;
pub use queue::{PendingQueue, SyncSink};
pub use types::{
    CustodianAction, DeviceAction, MetadataProfile, MetadataUpdate, MetadataUpdateRecord,
};

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tracing::debug;

use crate::Result;
use crate::clock::Clock;

/// Per-identity metadata log, merged views, offline queue, and device table.
pub struct SyncEngine {
    clock: Arc<dyn Clock>,
    records: RwLock<HashMap<String, Vec<MetadataUpdateRecord>>>,
    queue: PendingQueue,
    devices: DeviceRegistry,
}

impl SyncEngine {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            records: RwLock::new(HashMap::new()),
            queue: PendingQueue::new(),
            devices: DeviceRegistry::new(),
        }
    }

    /// Append a metadata update written by a device, and queue it for
    /// delivery to other devices.
    pub fn record_update(
        &self,
        identity_id: &str,
        device_id: &str,
        update: MetadataUpdate,
    ) -> MetadataUpdateRecord {
        let record = MetadataUpdateRecord {
            update,
            identity_id: identity_id.to_string(),
            public_key: identity_id.to_string(),
            updated_by_device_id: device_id.to_string(),
            updated_at: self.clock.now_millis(),
        };

        self.records
            .write()
            .unwrap()
            .entry(identity_id.to_string())
            .or_default()
            .push(record.clone());
        self.queue.enqueue(record.clone());

        debug!(identity_id, device_id, "recorded metadata update");
        record
    }

    /// Ingest records received from another device into the local log.
    pub fn ingest(&self, records: Vec<MetadataUpdateRecord>) {
        let mut table = self.records.write().unwrap();
        for record in records {
            table
                .entry(record.identity_id.clone())
                .or_default()
                .push(record);
        }
    }

    /// The merged metadata view for an identity.
    pub fn profile(&self, identity_id: &str) -> MetadataProfile {
        let mut profile = MetadataProfile::default();
        if let Some(records) = self.records.read().unwrap().get(identity_id) {
            profile.merge_records(records);
        }
        profile
    }

    /// The raw per-identity record log.
    pub fn records(&self, identity_id: &str) -> Vec<MetadataUpdateRecord> {
        self.records
            .read()
            .unwrap()
            .get(identity_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Number of local updates not yet delivered.
    pub fn pending_count(&self) -> usize {
        self.queue.pending_count()
    }

    /// Best-effort flush of queued updates; returns how many were delivered.
    pub fn flush(&self, sink: &dyn SyncSink) -> usize {
        self.queue.flush(sink)
    }

    /// The device registry for pairing and revocation.
    pub fn devices(&self) -> &DeviceRegistry {
        &self.devices
    }

    /// Mark a device as having completed a sync now.
    pub fn mark_synced(&self, identity_id: &str, device_id: &str) -> Result<()> {
        self.devices
            .touch_device(identity_id, device_id, self.clock.now_millis())
    }
}
