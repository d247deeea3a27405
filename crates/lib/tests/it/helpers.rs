use std::sync::Arc;

use pnvault::{
    FixedClock, Vault,
    recovery::{ContactType, CustodianKind},
    store::InMemoryStore,
};

/// A strong passcode that passes the complexity policy.
pub const PASSCODE: &str = "correct-horse-9-Battery";

/// Default fixed-clock epoch (2024-01-01T00:00:00Z in milliseconds).
pub const T0: u64 = 1_704_067_200_000;

/// A vault over an in-memory store with a controllable clock.
pub fn test_vault() -> (Vault, Arc<FixedClock>) {
    let clock = Arc::new(FixedClock::new(T0));
    let vault = Vault::new(Arc::new(InMemoryStore::new()), clock.clone());
    (vault, clock)
}

/// Create the canonical test identity: pN name `alice-id`, nickname `Alice`.
pub fn create_alice(vault: &Vault) -> pnvault::identity::EncryptedIdentity {
    vault
        .create_identity(
            "alice-id",
            "Alice",
            PASSCODE,
            Some("alice@example.com"),
            None,
        )
        .unwrap()
}

/// Add a custodian (engine-minted code) and walk it through the full
/// invitation handshake.
pub fn add_active_custodian(vault: &Vault, identity_id: &str, name: &str) -> String {
    let contact = format!("{name}@example.com");
    let custodian = vault
        .recovery()
        .add_custodian(
            identity_id,
            name,
            CustodianKind::Person,
            ContactType::Email,
            &contact,
            3,
            None,
        )
        .unwrap();
    let code = custodian.invitation_code.clone().unwrap();
    let invitation = vault
        .recovery()
        .create_invitation(identity_id, &custodian.id, "Alice", "alice-id")
        .unwrap();
    vault
        .recovery()
        .accept_invitation(
            &invitation.invitation_id,
            &contact,
            &code,
            &format!("ed25519:{name}"),
        )
        .unwrap();
    custodian.id
}
