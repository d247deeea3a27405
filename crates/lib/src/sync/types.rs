//! Metadata update records and last-write-wins merging
//!
//! Every metadata change is a typed update wrapped in a
//! [`MetadataUpdateRecord`] carrying the writing device and a millisecond
//! timestamp. Merging is per-field last-write-wins: an incoming value
//! replaces the local one only when its timestamp is strictly newer than the
//! timestamp of that field, never of the record as a whole.

use serde::{Deserialize, Serialize};

use crate::recovery::RecoveryKeyPurpose;

/// What happened to a custodian, as seen by the sync log.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CustodianAction {
    Added,
    Removed,
}

/// What happened to a device, as seen by the sync log.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DeviceAction {
    Paired,
    Removed,
}

/// A typed metadata change.
///
/// The wire format is a tagged union (`"type"` discriminator); consumers can
/// match on the variant instead of sniffing loose key/value payloads.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum MetadataUpdate {
    Nickname {
        nickname: String,
    },
    ProfilePicture {
        image_ref: String,
    },
    Custodian {
        custodian_id: String,
        action: CustodianAction,
    },
    RecoveryKey {
        recovery_key_id: String,
        purpose: RecoveryKeyPurpose,
    },
    Device {
        device_id: String,
        action: DeviceAction,
    },
    Privacy {
        discoverable: bool,
        share_analytics: bool,
    },
}

/// One entry in an identity's append-only metadata log.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MetadataUpdateRecord {
    #[serde(flatten)]
    pub update: MetadataUpdate,

    /// Public key of the identity this record belongs to
    pub identity_id: String,

    /// The identity's public key as carried on the wire. Always equals
    /// `identity_id` here; kept as a separate field for remote log
    /// consumers that key on it.
    pub public_key: String,

    /// Device that wrote the record
    pub updated_by_device_id: String,

    /// Write time (milliseconds since Unix epoch)
    pub updated_at: u64,
}

/// The merged per-identity metadata view, with per-field timestamps.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct MetadataProfile {
    pub nickname: Option<String>,
    pub nickname_updated_at: u64,

    pub profile_picture: Option<String>,
    pub profile_picture_updated_at: u64,

    pub discoverable: bool,
    pub share_analytics: bool,
    pub privacy_updated_at: u64,
}

impl MetadataProfile {
    /// Fold a batch of records into this profile, last-write-wins per field.
    ///
    /// A record only replaces a field when it is strictly newer than that
    /// field's current timestamp; on a tie the existing value stays.
    /// Custodian, recovery-key, and device records are log events handled by
    /// their own engines and do not touch the profile.
    pub fn merge_records(&mut self, records: &[MetadataUpdateRecord]) {
        for record in records {
            match &record.update {
                MetadataUpdate::Nickname { nickname } => {
                    if record.updated_at > self.nickname_updated_at {
                        self.nickname = Some(nickname.clone());
                        self.nickname_updated_at = record.updated_at;
                    }
                }
                MetadataUpdate::ProfilePicture { image_ref } => {
                    if record.updated_at > self.profile_picture_updated_at {
                        self.profile_picture = Some(image_ref.clone());
                        self.profile_picture_updated_at = record.updated_at;
                    }
                }
                MetadataUpdate::Privacy {
                    discoverable,
                    share_analytics,
                } => {
                    if record.updated_at > self.privacy_updated_at {
                        self.discoverable = *discoverable;
                        self.share_analytics = *share_analytics;
                        self.privacy_updated_at = record.updated_at;
                    }
                }
                MetadataUpdate::Custodian { .. }
                | MetadataUpdate::RecoveryKey { .. }
                | MetadataUpdate::Device { .. } => {}
            }
        }
    }
}
