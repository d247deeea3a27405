//! Custodian records and lifecycle
//!
//! A custodian is a trusted party (or the owner themself) who can approve or
//! deny a recovery request. Lifecycle: `Pending -> Active` on invitation
//! acceptance, `Pending/Active -> removed` by the owner, `Active -> Inactive`
//! on contact re-verification failure. The `can_approve` flag is kept equal
//! to `status == Active` by every transition.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::RecoveryError;
use crate::constants::INVITATION_CODE_LEN;

/// What kind of party a custodian is.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CustodianKind {
    /// A trusted person
    Person,
    /// A custody service
    Service,
    /// The owner acting as their own custodian (e.g. a second device)
    #[serde(rename = "self")]
    SelfCustody,
}

/// Custodian lifecycle state.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CustodianStatus {
    /// Invited, not yet accepted
    Pending,
    /// Accepted; may vote on recovery requests
    Active,
    /// Contact re-verification failed; may not vote
    Inactive,
}

/// How a custodian is reached.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ContactType {
    Email,
    Phone,
}

/// A custodian record owned by one identity.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RecoveryCustodian {
    /// Record id (UUID)
    pub id: String,

    /// Public key of the identity this custodian protects
    pub identity_id: String,

    /// Custodian display name
    pub name: String,

    pub kind: CustodianKind,

    pub status: CustodianStatus,

    /// When the owner created this record (milliseconds since Unix epoch)
    pub added_at: u64,

    /// Last successful contact verification, if any
    pub last_verified: Option<u64>,

    /// True iff `status == Active`
    pub can_approve: bool,

    pub contact_type: ContactType,

    pub contact_value: String,

    /// The custodian's own public key; empty until acceptance
    pub public_key: String,

    /// Opaque share reference handed to the custodian, if any
    pub recovery_key_share: Option<String>,

    /// Owner-assigned trust weight (informational)
    pub trust_level: u8,

    /// Owner-issued 6-digit invitation code.
    ///
    /// Known only to owner and intended custodian (shared out-of-band);
    /// cleared once the invitation is accepted.
    pub invitation_code: Option<String>,
}

impl RecoveryCustodian {
    /// Create a pending custodian record.
    ///
    /// Fails if the invitation code is not exactly 6 ASCII digits.
    #[allow(clippy::too_many_arguments)]
    pub fn new_pending(
        identity_id: &str,
        name: &str,
        kind: CustodianKind,
        contact_type: ContactType,
        contact_value: &str,
        trust_level: u8,
        invitation_code: &str,
        added_at: u64,
    ) -> Result<Self, RecoveryError> {
        validate_invitation_code(invitation_code)?;

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            identity_id: identity_id.to_string(),
            name: name.to_string(),
            kind,
            status: CustodianStatus::Pending,
            added_at,
            last_verified: None,
            can_approve: false,
            contact_type,
            contact_value: contact_value.to_string(),
            public_key: String::new(),
            recovery_key_share: None,
            trust_level,
            invitation_code: Some(invitation_code.to_string()),
        })
    }

    /// Flip the custodian to `Active` after invitation acceptance.
    ///
    /// Records the acceptor's public key, clears the invitation code, and
    /// sets `can_approve`.
    pub fn activate(&mut self, acceptor_public_key: &str, now: u64) {
        self.status = CustodianStatus::Active;
        self.can_approve = true;
        self.public_key = acceptor_public_key.to_string();
        self.last_verified = Some(now);
        self.invitation_code = None;
    }

    /// Mark the custodian inactive (contact re-verification failure).
    pub fn mark_inactive(&mut self) {
        self.status = CustodianStatus::Inactive;
        self.can_approve = false;
    }
}

/// Validate that an invitation code is exactly 6 ASCII digits.
pub fn validate_invitation_code(code: &str) -> Result<(), RecoveryError> {
    if code.len() != INVITATION_CODE_LEN || !code.chars().all(|c| c.is_ascii_digit()) {
        return Err(RecoveryError::InvalidInvitationCode {
            reason: format!("must be exactly {INVITATION_CODE_LEN} digits"),
        });
    }
    Ok(())
}
