//! End-to-end scenarios through the Vault context object.

use std::sync::Mutex;

use pnvault::Clock;
use pnvault::recovery::RecoveryKeyPurpose;
use pnvault::sync::{DeviceKind, DeviceStatus};
use pnvault::transfer::{TransferSink, TransferTicket};
use pnvault::vault::TransferOffer;
use url::Url;

use crate::helpers::{PASSCODE, add_active_custodian, create_alice, test_vault};

#[derive(Default)]
struct CapturingTransferSink {
    offers: Mutex<Vec<(TransferTicket, Url)>>,
}

impl TransferSink for CapturingTransferSink {
    fn offer(&self, ticket: &TransferTicket, url: &Url) -> pnvault::Result<()> {
        self.offers.lock().unwrap().push((ticket.clone(), url.clone()));
        Ok(())
    }
}

struct FailingTransferSink;

impl TransferSink for FailingTransferSink {
    fn offer(&self, _ticket: &TransferTicket, _url: &Url) -> pnvault::Result<()> {
        Err(pnvault::transfer::TransferError::InvalidTransferUrl {
            reason: "relay unreachable".to_string(),
        }
        .into())
    }
}

/// The full lifecycle: create, protect with custodians, lose the device,
/// recover with a 2-of-3 quorum, hand over to the new device.
#[test]
fn full_recovery_scenario() {
    let (vault, clock) = test_vault();
    let identity = create_alice(&vault);

    // Alice pairs her phone as primary and configures recovery.
    let phone = vault.sync().devices().pair_device(
        &identity.public_key,
        "phone",
        DeviceKind::Mobile,
        true,
        clock.now_millis(),
    );
    vault
        .recovery()
        .set_recovery_threshold(&identity.public_key, 2)
        .unwrap();
    let ben = add_active_custodian(&vault, &identity.public_key, "ben");
    let cam = add_active_custodian(&vault, &identity.public_key, "cam");
    add_active_custodian(&vault, &identity.public_key, "dan");
    let key = vault.recovery().generate_recovery_key(
        &identity.public_key,
        RecoveryKeyPurpose::Personal,
        Some("printed, in the safe"),
    );

    // Phone is lost. Alice initiates from a new device with the printed key.
    let request = vault
        .recovery()
        .initiate_with_recovery_key(&identity.public_key, &key.key_data, "ed25519:new-phone", "Alice")
        .unwrap();
    vault.recovery().approve(&request.id, &ben).unwrap();
    vault.recovery().approve(&request.id, &cam).unwrap();

    let sink = CapturingTransferSink::default();
    let (completed, new_primary) = vault
        .complete_recovery(
            &request.id,
            "new-phone",
            DeviceKind::Mobile,
            Some(TransferOffer {
                sink: &sink,
                origin: "https://app.example.com",
                ipfs_cid: "bafy-alice-assets",
            }),
        )
        .unwrap();

    assert_eq!(completed.identity_id, identity.public_key);
    assert_ne!(completed.new_identity_hash, completed.old_identity_hash.unwrap());

    // The new device is the only active one; the old phone is revoked.
    assert!(new_primary.is_primary);
    let devices = vault.sync().devices().devices(&identity.public_key);
    let old_phone = devices.iter().find(|d| d.id == phone.id).unwrap();
    assert_eq!(old_phone.status, DeviceStatus::Revoked);

    // The asset transfer was offered exactly once.
    let offers = sink.offers.lock().unwrap();
    assert_eq!(offers.len(), 1);
    assert_eq!(offers[0].0.ipfs_cid, "bafy-alice-assets");

    // A second completion for the same identity is rejected.
    assert!(
        vault
            .complete_recovery(&request.id, "another", DeviceKind::Mobile, None)
            .is_err()
    );
}

#[test]
fn transfer_failure_does_not_block_completion() {
    let (vault, _) = test_vault();
    let identity = create_alice(&vault);
    vault
        .recovery()
        .set_recovery_threshold(&identity.public_key, 2)
        .unwrap();
    let ben = add_active_custodian(&vault, &identity.public_key, "ben");
    let cam = add_active_custodian(&vault, &identity.public_key, "cam");

    let key = vault.recovery().generate_recovery_key(
        &identity.public_key,
        RecoveryKeyPurpose::Personal,
        None,
    );
    let request = vault
        .recovery()
        .initiate_with_recovery_key(&identity.public_key, &key.key_data, "ed25519:new", "Alice")
        .unwrap();
    vault.recovery().approve(&request.id, &ben).unwrap();
    vault.recovery().approve(&request.id, &cam).unwrap();

    // Delivery fails, completion still succeeds.
    let (completed, _) = vault
        .complete_recovery(
            &request.id,
            "new-phone",
            DeviceKind::Mobile,
            Some(TransferOffer {
                sink: &FailingTransferSink,
                origin: "https://app.example.com",
                ipfs_cid: "bafy-alice-assets",
            }),
        )
        .unwrap();
    assert_eq!(completed.identity_id, identity.public_key);
}

#[test]
fn metadata_written_while_locked_is_visible_after_unlock() {
    let (vault, clock) = test_vault();
    let identity = create_alice(&vault);

    // Another device pushes a nickname change while this one is locked.
    vault.sync().ingest(vec![pnvault::sync::MetadataUpdateRecord {
        update: pnvault::sync::MetadataUpdate::Nickname {
            nickname: "Alice (updated)".to_string(),
        },
        identity_id: identity.public_key.clone(),
        public_key: identity.public_key.clone(),
        updated_by_device_id: "device-b".to_string(),
        updated_at: clock.now_millis(),
    }]);

    vault
        .authenticate(&identity.public_key, "alice-id", PASSCODE)
        .unwrap();
    assert_eq!(
        vault.profile(&identity.public_key).nickname.as_deref(),
        Some("Alice (updated)")
    );
}
