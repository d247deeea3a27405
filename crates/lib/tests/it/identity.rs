//! Identity creation, authentication, and identity file handling.

use pnvault::identity::{self, IdentityFile};
use pnvault::{FixedClock, constants};

use crate::helpers::{PASSCODE, T0, create_alice, test_vault};

#[test]
fn round_trip_create_then_authenticate() {
    let (vault, _) = test_vault();
    let identity = create_alice(&vault);

    assert!(identity.public_key.starts_with("ed25519:"));
    assert_eq!(identity.created_at, T0);

    let session = vault
        .authenticate(&identity.public_key, "alice-id", PASSCODE)
        .unwrap();
    assert_eq!(session.nickname, "Alice");
}

#[test]
fn one_character_off_passcode_fails() {
    let (vault, _) = test_vault();
    let identity = create_alice(&vault);

    // Flip each character of the passcode in turn; every variant must fail.
    for i in 0..PASSCODE.len() {
        let mut wrong: Vec<u8> = PASSCODE.bytes().collect();
        wrong[i] = if wrong[i] == b'x' { b'y' } else { b'x' };
        let wrong = String::from_utf8(wrong).unwrap();

        let err = vault
            .authenticate(&identity.public_key, "alice-id", &wrong)
            .unwrap_err();
        assert!(err.is_authentication_error(), "variant {i} unlocked");
    }
}

#[test]
fn wrong_pn_name_fails_even_with_correct_passcode() {
    let (vault, _) = test_vault();
    let identity = create_alice(&vault);

    let err = vault
        .authenticate(&identity.public_key, "mallory-id", PASSCODE)
        .unwrap_err();
    assert!(err.is_authentication_error());
}

#[test]
fn repeated_unlock_is_idempotent() {
    let (vault, _) = test_vault();
    let identity = create_alice(&vault);
    let stored = vault.store().get(&identity.public_key).unwrap();

    let first = identity::authenticate_identity(&stored, PASSCODE, "alice-id").unwrap();
    let second = identity::authenticate_identity(&stored, PASSCODE, "alice-id").unwrap();
    assert_eq!(first.nickname, second.nickname);
    assert_eq!(first.pn_name, second.pn_name);
}

#[test]
fn name_and_passcode_policies_enforced() {
    let (vault, _) = test_vault();

    // Too short, bad charset, reserved
    for bad_name in ["ab", "Alice!", "admin", "-alice", "alice-"] {
        let err = vault
            .create_identity(bad_name, "Alice", PASSCODE, None, None)
            .unwrap_err();
        assert!(err.is_validation_error(), "accepted {bad_name:?}");
    }

    // Too short, missing character classes
    for bad_passcode in ["short-1A", "alllowercaseletters", "NoDigitsOrSymbolsHere"] {
        let err = vault
            .create_identity("alice-id", "Alice", bad_passcode, None, None)
            .unwrap_err();
        assert!(err.is_validation_error(), "accepted {bad_passcode:?}");
    }
}

#[test]
fn identity_file_accepts_exactly_one_identity() {
    let (vault, _) = test_vault();
    let identity = create_alice(&vault);

    let clock = FixedClock::new(T0);
    let file = IdentityFile::new_single(identity.clone(), &clock);
    assert_eq!(file.version, constants::IDENTITY_FILE_VERSION);
    assert!(file.single().is_ok());

    let mut doubled = file.clone();
    doubled.identities.push(identity);
    assert!(doubled.single().is_err());
}

#[test]
fn export_import_across_vaults() {
    let (vault, _) = test_vault();
    let identity = create_alice(&vault);
    let json = vault
        .export_identity(&identity.public_key)
        .unwrap()
        .to_json()
        .unwrap();

    let (other, _) = test_vault();
    for name in ["alice.pn", "alice.id", "alice.json", "alice.identity"] {
        other.import_identity(name, &json).unwrap();
    }
    assert!(other.import_identity("alice.txt", &json).is_err());

    other
        .authenticate(&identity.public_key, "alice-id", PASSCODE)
        .unwrap();
}
