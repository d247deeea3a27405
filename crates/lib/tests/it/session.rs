//! Session issuance, expiry, inactivity lock, and attempt throttling.

use pnvault::constants::{
    AUTH_ATTEMPT_LIMIT, AUTH_ATTEMPT_WINDOW_MILLIS, INACTIVITY_LOCK_MILLIS, SESSION_TTL_SECS,
};

use crate::helpers::{PASSCODE, create_alice, test_vault};

#[test]
fn session_token_is_opaque_and_fresh() {
    let (vault, _) = test_vault();
    let identity = create_alice(&vault);

    let first = vault
        .authenticate(&identity.public_key, "alice-id", PASSCODE)
        .unwrap();
    let second = vault
        .authenticate(&identity.public_key, "alice-id", PASSCODE)
        .unwrap();

    assert_ne!(first.access_token, second.access_token);
    assert_eq!(first.expires_in, SESSION_TTL_SECS);
    // The token carries no identity material.
    assert!(!first.access_token.contains("alice"));
}

#[test]
fn session_expires_after_one_hour() {
    let (vault, clock) = test_vault();
    let identity = create_alice(&vault);
    let session = vault
        .authenticate(&identity.public_key, "alice-id", PASSCODE)
        .unwrap();

    // Keep activity alive so only the hard TTL fires.
    for _ in 0..13 {
        clock.advance(INACTIVITY_LOCK_MILLIS);
        let _ = vault.sessions().touch(&session.access_token);
    }
    clock.advance(SESSION_TTL_SECS * 1000);
    let err = vault.sessions().validate(&session.access_token).unwrap_err();
    assert!(err.is_expired());
}

#[test]
fn inactivity_locks_after_five_minutes() {
    let (vault, clock) = test_vault();
    let identity = create_alice(&vault);
    let session = vault
        .authenticate(&identity.public_key, "alice-id", PASSCODE)
        .unwrap();

    clock.advance(INACTIVITY_LOCK_MILLIS + 1);
    let err = vault.sessions().validate(&session.access_token).unwrap_err();
    assert!(err.is_expired());

    // Re-authentication issues a fresh session.
    let fresh = vault
        .authenticate(&identity.public_key, "alice-id", PASSCODE)
        .unwrap();
    vault.sessions().validate(&fresh.access_token).unwrap();
}

#[test]
fn logout_requires_full_reauthentication() {
    let (vault, _) = test_vault();
    let identity = create_alice(&vault);
    let session = vault
        .authenticate(&identity.public_key, "alice-id", PASSCODE)
        .unwrap();

    vault.sessions().logout(&session.access_token).unwrap();
    assert!(
        vault
            .sessions()
            .validate(&session.access_token)
            .unwrap_err()
            .is_not_found()
    );
}

#[test]
fn failed_attempts_are_throttled_per_identity() {
    let (vault, clock) = test_vault();
    let alice = create_alice(&vault);
    let bob = vault
        .create_identity("bob-id", "Bob", PASSCODE, None, None)
        .unwrap();

    for _ in 0..AUTH_ATTEMPT_LIMIT {
        let _ = vault.authenticate(&alice.public_key, "alice-id", "wrong-passcode-X1");
    }
    assert!(
        vault
            .authenticate(&alice.public_key, "alice-id", PASSCODE)
            .unwrap_err()
            .is_rate_limited()
    );

    // Bob's window is independent.
    vault.authenticate(&bob.public_key, "bob-id", PASSCODE).unwrap();

    clock.advance(AUTH_ATTEMPT_WINDOW_MILLIS);
    vault
        .authenticate(&alice.public_key, "alice-id", PASSCODE)
        .unwrap();
}
