//! Custodian lifecycle, invitations, and the threshold recovery protocol.

use std::sync::Mutex;

use pnvault::constants::{INVITATION_TTL_MILLIS, MAX_CUSTODIANS};
use pnvault::recovery::{
    ContactType, CustodianInvitation, CustodianKind, CustodianStatus, InvitationSink,
    RecoveryKeyPurpose, RequestStatus,
};
use url::Url;

use crate::helpers::{PASSCODE, add_active_custodian, create_alice, test_vault};

/// Sink that records every invitation delivery.
#[derive(Default)]
struct CapturingInvitationSink {
    sent: Mutex<Vec<(ContactType, String, Url)>>,
}

impl InvitationSink for CapturingInvitationSink {
    fn send_invitation(
        &self,
        contact_type: ContactType,
        contact_value: &str,
        link: &Url,
    ) -> pnvault::Result<()> {
        self.sent
            .lock()
            .unwrap()
            .push((contact_type, contact_value.to_string(), link.clone()));
        Ok(())
    }
}

#[test]
fn invitation_deep_link_round_trip() {
    let (vault, _) = test_vault();
    let identity = create_alice(&vault);
    let custodian = vault
        .recovery()
        .add_custodian(
            &identity.public_key,
            "Bob",
            CustodianKind::Person,
            ContactType::Email,
            "bob@example.com",
            3,
            Some("424242"),
        )
        .unwrap();

    let sink = CapturingInvitationSink::default();
    let invitation = vault
        .invite_custodian(
            &identity.public_key,
            &custodian.id,
            "Alice",
            "alice-id",
            "https://app.example.com",
            &sink,
        )
        .unwrap();

    // The link was delivered to the custodian's contact.
    let sent = sink.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].1, "bob@example.com");

    // The invited party opens the link and accepts with the shared code.
    let parsed = CustodianInvitation::parse_invitation_link(sent[0].2.as_str()).unwrap();
    assert_eq!(parsed.invitation_id, invitation.invitation_id);
    assert_eq!(parsed.identity_username, "alice-id");
    drop(sent);

    let accepted = vault
        .recovery()
        .accept_invitation(&parsed.invitation_id, "bob@example.com", "424242", "ed25519:bob")
        .unwrap();
    assert_eq!(accepted.status, CustodianStatus::Active);
    assert!(accepted.invitation_code.is_none());
}

#[test]
fn invitation_expires_after_24_hours() {
    let (vault, clock) = test_vault();
    let identity = create_alice(&vault);
    let custodian = vault
        .recovery()
        .add_custodian(
            &identity.public_key,
            "Bob",
            CustodianKind::Person,
            ContactType::Email,
            "bob@example.com",
            3,
            Some("424242"),
        )
        .unwrap();
    let invitation = vault
        .recovery()
        .create_invitation(&identity.public_key, &custodian.id, "Alice", "alice-id")
        .unwrap();

    clock.advance(INVITATION_TTL_MILLIS + 1);
    let err = vault
        .recovery()
        .accept_invitation(&invitation.invitation_id, "bob@example.com", "424242", "ed25519:bob")
        .unwrap_err();
    assert!(err.is_expired());

    // The custodian stays pending and cannot vote.
    let custodians = vault.recovery().custodians(&identity.public_key);
    assert_eq!(custodians[0].status, CustodianStatus::Pending);
}

#[test]
fn sixth_custodian_is_rejected() {
    let (vault, _) = test_vault();
    let identity = create_alice(&vault);

    for i in 0..MAX_CUSTODIANS {
        add_active_custodian(&vault, &identity.public_key, &format!("custodian{i}"));
    }
    let err = vault
        .recovery()
        .add_custodian(
            &identity.public_key,
            "one-too-many",
            CustodianKind::Person,
            ContactType::Email,
            "extra@example.com",
            1,
            Some("424242"),
        )
        .unwrap_err();
    assert!(err.is_protocol_error());
    assert_eq!(
        vault.recovery().custodians(&identity.public_key).len(),
        MAX_CUSTODIANS
    );
}

#[test]
fn approval_crosses_threshold_exactly_at_k() {
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
        Some("desk drawer"),
    );
    let request = vault
        .recovery()
        .initiate_with_recovery_key(&identity.public_key, &key.key_data, "ed25519:new", "Alice")
        .unwrap();

    // 1 of 2: still pending
    assert_eq!(
        vault.recovery().approve(&request.id, &ben).unwrap(),
        RequestStatus::Pending
    );
    // 2 of 2: approved
    assert_eq!(
        vault.recovery().approve(&request.id, &cam).unwrap(),
        RequestStatus::Approved
    );

    let settled = vault.recovery().request(&request.id).unwrap();
    assert_eq!(settled.current_approvals(), 2);
    // Each approval carries a verifiable signature.
    for signature in &settled.signatures {
        signature.verify(&settled.id, &settled.requesting_did).unwrap();
    }
}

#[test]
fn two_denials_deny_the_request() {
    let (vault, _) = test_vault();
    let identity = create_alice(&vault);
    vault
        .recovery()
        .set_recovery_threshold(&identity.public_key, 2)
        .unwrap();
    let ben = add_active_custodian(&vault, &identity.public_key, "ben");
    let cam = add_active_custodian(&vault, &identity.public_key, "cam");
    let dan = add_active_custodian(&vault, &identity.public_key, "dan");

    let key = vault.recovery().generate_recovery_key(
        &identity.public_key,
        RecoveryKeyPurpose::Personal,
        None,
    );
    let request = vault
        .recovery()
        .initiate_with_recovery_key(&identity.public_key, &key.key_data, "ed25519:new", "Alice")
        .unwrap();

    vault.recovery().deny(&request.id, &ben).unwrap();
    assert_eq!(
        vault.recovery().deny(&request.id, &cam).unwrap(),
        RequestStatus::Denied
    );

    // Votes after settlement are rejected, including approvals.
    let err = vault.recovery().approve(&request.id, &dan).unwrap_err();
    assert!(err.is_protocol_error());
    assert_eq!(
        vault.recovery().request(&request.id).unwrap().status,
        RequestStatus::Denied
    );
}

#[test]
fn duplicate_votes_rejected_across_both_lists() {
    let (vault, _) = test_vault();
    let identity = create_alice(&vault);
    let ben = add_active_custodian(&vault, &identity.public_key, "ben");
    add_active_custodian(&vault, &identity.public_key, "cam");
    add_active_custodian(&vault, &identity.public_key, "dan");

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
    // Same custodian cannot approve twice nor switch to deny.
    assert!(vault.recovery().approve(&request.id, &ben).is_err());
    assert!(vault.recovery().deny(&request.id, &ben).is_err());
    assert_eq!(
        vault.recovery().request(&request.id).unwrap().current_approvals(),
        1
    );
}

#[test]
fn pending_request_expires_at_read_after_72_hours() {
    let (vault, clock) = test_vault();
    let identity = create_alice(&vault);
    let ben = add_active_custodian(&vault, &identity.public_key, "ben");

    let key = vault.recovery().generate_recovery_key(
        &identity.public_key,
        RecoveryKeyPurpose::Personal,
        None,
    );
    let request = vault
        .recovery()
        .initiate_with_recovery_key(&identity.public_key, &key.key_data, "ed25519:new", "Alice")
        .unwrap();

    clock.advance(73 * 60 * 60 * 1000);
    let read = vault.recovery().request(&request.id).unwrap();
    assert_eq!(read.status, RequestStatus::Expired);

    // Expiry is terminal: no votes, no completion.
    assert!(vault.recovery().approve(&request.id, &ben).unwrap_err().is_expired());
    assert!(vault.recovery().complete_recovery(&request.id).is_err());
}

#[test]
fn factor_based_initiation_requires_all_four_fields() {
    let (vault, _) = test_vault();
    let identity = create_alice(&vault);
    let stored = vault.store().get(&identity.public_key).unwrap();

    // All four match
    vault
        .recovery()
        .initiate_with_factors(
            &stored,
            "alice-id",
            PASSCODE,
            "Alice",
            "alice@example.com",
            "ed25519:new",
        )
        .unwrap();

    // Any mismatch is rejected without leaking which factor failed
    for (pn_name, passcode, nickname, contact) in [
        ("alice-id", "wrong-passcode-X1", "Alice", "alice@example.com"),
        ("mallory-id", PASSCODE, "Alice", "alice@example.com"),
        ("alice-id", PASSCODE, "Mallory", "alice@example.com"),
        ("alice-id", PASSCODE, "Alice", "mallory@example.com"),
    ] {
        let err = vault
            .recovery()
            .initiate_with_factors(&stored, pn_name, passcode, nickname, contact, "ed25519:new")
            .unwrap_err();
        assert!(err.is_protocol_error());
        assert_eq!(err.to_string(), "Recovery initiation rejected");
    }
}

#[test]
fn inactive_custodian_cannot_vote() {
    let (vault, _) = test_vault();
    let identity = create_alice(&vault);
    let ben = add_active_custodian(&vault, &identity.public_key, "ben");
    let cam = add_active_custodian(&vault, &identity.public_key, "cam");

    vault
        .recovery()
        .mark_custodian_inactive(&identity.public_key, &ben)
        .unwrap();

    let key = vault.recovery().generate_recovery_key(
        &identity.public_key,
        RecoveryKeyPurpose::Personal,
        None,
    );
    let request = vault
        .recovery()
        .initiate_with_recovery_key(&identity.public_key, &key.key_data, "ed25519:new", "Alice")
        .unwrap();

    assert!(vault.recovery().approve(&request.id, &ben).is_err());
    vault.recovery().approve(&request.id, &cam).unwrap();
}
