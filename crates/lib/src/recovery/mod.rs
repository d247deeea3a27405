//! Custodian lifecycle and threshold-based social recovery
//!
//! The [`RecoveryEngine`] owns all custodian, invitation, recovery-key, and
//! recovery-request state for every identity. Vote application is serialized
//! per request: the request table holds `Arc<Mutex<RecoveryRequest>>`
//! entries, so concurrent approve/deny calls for the same request are applied
//! one at a time and never lose updates to the vote lists.

pub mod custodian;
mod errors;
pub mod invitation;
pub mod request;

pub use custodian::{ContactType, CustodianKind, CustodianStatus, RecoveryCustodian};
pub use errors::RecoveryError;
pub use invitation::{CustodianInvitation, InvitationSink};
pub use request::{
    ApprovalSignature, RecoveryKey, RecoveryKeyPurpose, RecoveryRequest, RequestStatus,
};

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, RwLock};

use tracing::{debug, info};
use uuid::Uuid;

use crate::Result;
use crate::clock::Clock;
use crate::constants::{
    INVITATION_TTL_MILLIS, MAX_CUSTODIANS, MAX_RECOVERY_THRESHOLD, MIN_RECOVERY_THRESHOLD,
    RECOVERY_REQUEST_TTL_MILLIS,
};
use crate::crypto::keys;
use crate::identity::{self, EncryptedIdentity};

/// The outcome of a completed recovery, used by the vault to reassign the
/// primary device and drive the best-effort asset transfer.
#[derive(Clone, Debug)]
pub struct CompletedRecovery {
    pub request_id: String,
    pub identity_id: String,
    pub requesting_did: String,
    pub old_identity_hash: Option<String>,
    pub new_identity_hash: String,
}

/// Custodian and recovery-request state for all identities.
pub struct RecoveryEngine {
    clock: Arc<dyn Clock>,
    custodians: RwLock<HashMap<String, Vec<RecoveryCustodian>>>,
    thresholds: RwLock<HashMap<String, usize>>,
    recovery_keys: RwLock<HashMap<String, Vec<RecoveryKey>>>,
    invitations: RwLock<HashMap<String, PendingInvitation>>,
    requests: RwLock<HashMap<String, Arc<Mutex<RecoveryRequest>>>>,
    completed: RwLock<HashSet<String>>,
}

struct PendingInvitation {
    custodian_id: String,
    identity_id: String,
    invitation: CustodianInvitation,
}

impl RecoveryEngine {
    /// Create an engine with the given time source.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            custodians: RwLock::new(HashMap::new()),
            thresholds: RwLock::new(HashMap::new()),
            recovery_keys: RwLock::new(HashMap::new()),
            invitations: RwLock::new(HashMap::new()),
            requests: RwLock::new(HashMap::new()),
            completed: RwLock::new(HashSet::new()),
        }
    }

    // === Threshold configuration ===

    /// Set the owner-configured recovery threshold (2-5).
    pub fn set_recovery_threshold(&self, identity_id: &str, threshold: usize) -> Result<()> {
        if !(MIN_RECOVERY_THRESHOLD..=MAX_RECOVERY_THRESHOLD).contains(&threshold) {
            return Err(RecoveryError::InvalidThreshold { value: threshold }.into());
        }
        self.thresholds
            .write()
            .unwrap()
            .insert(identity_id.to_string(), threshold);
        Ok(())
    }

    /// The configured threshold for an identity, defaulting to the minimum.
    pub fn recovery_threshold(&self, identity_id: &str) -> usize {
        self.thresholds
            .read()
            .unwrap()
            .get(identity_id)
            .copied()
            .unwrap_or(MIN_RECOVERY_THRESHOLD)
    }

    // === Custodian lifecycle ===

    /// Add a pending custodian with a 6-digit invitation code.
    ///
    /// The owner may supply the code (shared out-of-band already) or pass
    /// `None` to have a fresh one minted; either way the code is stored on
    /// the returned custodian for the acceptance check.
    ///
    /// Fails with `CustodianLimitReached` once the identity has 5 custodians;
    /// the custodian set is left unchanged.
    #[allow(clippy::too_many_arguments)]
    pub fn add_custodian(
        &self,
        identity_id: &str,
        name: &str,
        kind: CustodianKind,
        contact_type: ContactType,
        contact_value: &str,
        trust_level: u8,
        invitation_code: Option<&str>,
    ) -> Result<RecoveryCustodian> {
        let mut custodians = self.custodians.write().unwrap();
        let entry = custodians.entry(identity_id.to_string()).or_default();

        if entry.len() >= MAX_CUSTODIANS {
            return Err(RecoveryError::CustodianLimitReached {
                limit: MAX_CUSTODIANS,
            }
            .into());
        }

        let minted;
        let code = match invitation_code {
            Some(code) => code,
            None => {
                minted = keys::generate_invitation_code();
                minted.as_str()
            }
        };
        let custodian = RecoveryCustodian::new_pending(
            identity_id,
            name,
            kind,
            contact_type,
            contact_value,
            trust_level,
            code,
            self.clock.now_millis(),
        )?;
        entry.push(custodian.clone());
        debug!(identity_id, custodian_id = %custodian.id, "added pending custodian");
        Ok(custodian)
    }

    /// Remove a custodian (allowed in any state).
    pub fn remove_custodian(&self, identity_id: &str, custodian_id: &str) -> Result<()> {
        let mut custodians = self.custodians.write().unwrap();
        let entry = custodians.entry(identity_id.to_string()).or_default();
        let before = entry.len();
        entry.retain(|c| c.id != custodian_id);
        if entry.len() == before {
            return Err(RecoveryError::CustodianNotFound {
                custodian_id: custodian_id.to_string(),
            }
            .into());
        }
        debug!(identity_id, custodian_id, "removed custodian");
        Ok(())
    }

    /// Mark a custodian inactive (contact re-verification failure).
    pub fn mark_custodian_inactive(&self, identity_id: &str, custodian_id: &str) -> Result<()> {
        let mut custodians = self.custodians.write().unwrap();
        let entry = custodians.entry(identity_id.to_string()).or_default();
        let custodian = entry
            .iter_mut()
            .find(|c| c.id == custodian_id)
            .ok_or_else(|| RecoveryError::CustodianNotFound {
                custodian_id: custodian_id.to_string(),
            })?;
        custodian.mark_inactive();
        Ok(())
    }

    /// All custodians for an identity.
    pub fn custodians(&self, identity_id: &str) -> Vec<RecoveryCustodian> {
        self.custodians
            .read()
            .unwrap()
            .get(identity_id)
            .cloned()
            .unwrap_or_default()
    }

    fn find_custodian(&self, identity_id: &str, custodian_id: &str) -> Result<RecoveryCustodian> {
        self.custodians
            .read()
            .unwrap()
            .get(identity_id)
            .and_then(|list| list.iter().find(|c| c.id == custodian_id))
            .cloned()
            .ok_or_else(|| {
                RecoveryError::CustodianNotFound {
                    custodian_id: custodian_id.to_string(),
                }
                .into()
            })
    }

    // === Invitations ===

    /// Create an invitation artifact for a pending custodian.
    ///
    /// The returned bundle expires 24 hours from generation and can be
    /// rendered as a deep link or QR code by the host.
    pub fn create_invitation(
        &self,
        identity_id: &str,
        custodian_id: &str,
        identity_name: &str,
        identity_username: &str,
    ) -> Result<CustodianInvitation> {
        let custodian = self.find_custodian(identity_id, custodian_id)?;

        let invitation = CustodianInvitation {
            invitation_id: Uuid::new_v4().to_string(),
            custodian_name: custodian.name.clone(),
            custodian_type: custodian.kind,
            contact_type: custodian.contact_type,
            contact_value: custodian.contact_value.clone(),
            identity_name: identity_name.to_string(),
            identity_username: identity_username.to_string(),
            expires_at: self.clock.now_millis() + INVITATION_TTL_MILLIS,
        };

        self.invitations.write().unwrap().insert(
            invitation.invitation_id.clone(),
            PendingInvitation {
                custodian_id: custodian_id.to_string(),
                identity_id: identity_id.to_string(),
                invitation: invitation.clone(),
            },
        );

        debug!(identity_id, custodian_id, invitation_id = %invitation.invitation_id, "created invitation");
        Ok(invitation)
    }

    /// Accept an invitation on behalf of the invited party.
    ///
    /// The invited party must have unlocked their own identity first
    /// (`acceptor_public_key`), supply the contact value the invitation was
    /// addressed to, and echo the exact owner-issued 6-digit code. On
    /// success the custodian flips to `Active` with `can_approve = true` and
    /// the stored code is cleared.
    pub fn accept_invitation(
        &self,
        invitation_id: &str,
        supplied_contact: &str,
        supplied_code: &str,
        acceptor_public_key: &str,
    ) -> Result<RecoveryCustodian> {
        let now = self.clock.now_millis();

        let (identity_id, custodian_id) = {
            let invitations = self.invitations.read().unwrap();
            let pending = invitations.get(invitation_id).ok_or_else(|| {
                RecoveryError::InvitationNotFound {
                    invitation_id: invitation_id.to_string(),
                }
            })?;

            if pending.invitation.is_expired(now) {
                return Err(RecoveryError::InvitationExpired {
                    invitation_id: invitation_id.to_string(),
                }
                .into());
            }
            if pending.invitation.contact_value != supplied_contact {
                return Err(RecoveryError::ContactMismatch.into());
            }
            (pending.identity_id.clone(), pending.custodian_id.clone())
        };

        let mut custodians = self.custodians.write().unwrap();
        let custodian = custodians
            .get_mut(&identity_id)
            .and_then(|list| list.iter_mut().find(|c| c.id == custodian_id))
            .ok_or_else(|| RecoveryError::CustodianNotFound {
                custodian_id: custodian_id.clone(),
            })?;

        // The acceptance check is against the exact owner-issued code, not an
        // independent complexity rule.
        if custodian.invitation_code.as_deref() != Some(supplied_code) {
            return Err(RecoveryError::InvitationCodeMismatch.into());
        }

        custodian.activate(acceptor_public_key, now);
        self.invitations.write().unwrap().remove(invitation_id);

        info!(identity_id, custodian_id = %custodian.id, "custodian accepted invitation");
        Ok(custodian.clone())
    }

    // === Recovery keys ===

    /// Generate a recovery key for an identity.
    ///
    /// The secret initiates (never completes) a recovery request and is not
    /// required to be stored server-side; the engine keeps a copy so a later
    /// presentation can be matched.
    pub fn generate_recovery_key(
        &self,
        identity_id: &str,
        purpose: RecoveryKeyPurpose,
        description: Option<&str>,
    ) -> RecoveryKey {
        let key = RecoveryKey::generate(identity_id, purpose, description, self.clock.now_millis());
        self.recovery_keys
            .write()
            .unwrap()
            .entry(identity_id.to_string())
            .or_default()
            .push(key.clone());
        key
    }

    /// All recovery keys generated for an identity.
    pub fn recovery_keys(&self, identity_id: &str) -> Vec<RecoveryKey> {
        self.recovery_keys
            .read()
            .unwrap()
            .get(identity_id)
            .cloned()
            .unwrap_or_default()
    }

    // === Recovery requests ===

    /// Initiate recovery by presenting a previously generated recovery key.
    ///
    /// The presented secret must equal one of the identity's stored
    /// `RecoveryKey` secrets; otherwise initiation is rejected.
    pub fn initiate_with_recovery_key(
        &self,
        identity_id: &str,
        presented_secret: &str,
        requesting_did: &str,
        requesting_user: &str,
    ) -> Result<RecoveryRequest> {
        let matches = self
            .recovery_keys
            .read()
            .unwrap()
            .get(identity_id)
            .map(|list| list.iter().any(|key| key.key_data == presented_secret))
            .unwrap_or(false);
        if !matches {
            return Err(RecoveryError::InitiationRejected.into());
        }

        Ok(self.open_request(identity_id, requesting_did, requesting_user))
    }

    /// Initiate recovery with the 4-factor tuple
    /// `(pn_name, passcode, nickname, recovery email or phone)`.
    ///
    /// The passcode must decrypt the stored identity and all four fields
    /// must match before a request is created.
    #[allow(clippy::too_many_arguments)]
    pub fn initiate_with_factors(
        &self,
        stored: &EncryptedIdentity,
        pn_name: &str,
        passcode: &str,
        nickname: &str,
        recovery_contact: &str,
        requesting_did: &str,
    ) -> Result<RecoveryRequest> {
        let payload = identity::authenticate_identity(stored, passcode, pn_name)
            .map_err(|_| RecoveryError::InitiationRejected)?;

        if payload.nickname != nickname || !payload.matches_recovery_contact(recovery_contact) {
            return Err(RecoveryError::InitiationRejected.into());
        }

        Ok(self.open_request(&stored.public_key, requesting_did, &payload.nickname))
    }

    fn open_request(
        &self,
        identity_id: &str,
        requesting_did: &str,
        requesting_user: &str,
    ) -> RecoveryRequest {
        let request = RecoveryRequest::new(
            identity_id,
            requesting_did,
            requesting_user,
            self.recovery_threshold(identity_id),
            Some(keys::identity_hash(identity_id)),
            self.clock.now_millis(),
            RECOVERY_REQUEST_TTL_MILLIS,
        );

        info!(
            request_id = %request.id,
            identity_id,
            required_approvals = request.required_approvals,
            "recovery request opened"
        );
        self.requests
            .write()
            .unwrap()
            .insert(request.id.clone(), Arc::new(Mutex::new(request.clone())));
        request
    }

    fn request_handle(&self, request_id: &str) -> Result<Arc<Mutex<RecoveryRequest>>> {
        self.requests
            .read()
            .unwrap()
            .get(request_id)
            .cloned()
            .ok_or_else(|| {
                RecoveryError::RequestNotFound {
                    request_id: request_id.to_string(),
                }
                .into()
            })
    }

    /// Snapshot a request, applying read-time expiry first.
    pub fn request(&self, request_id: &str) -> Result<RecoveryRequest> {
        let handle = self.request_handle(request_id)?;
        let mut request = handle.lock().unwrap();
        request.apply_expiry(self.clock.now_millis());
        Ok(request.clone())
    }

    /// All requests targeting an identity, expiry applied.
    pub fn requests_for(&self, identity_id: &str) -> Vec<RecoveryRequest> {
        let now = self.clock.now_millis();
        let handles: Vec<_> = self.requests.read().unwrap().values().cloned().collect();
        handles
            .iter()
            .filter_map(|handle| {
                let mut request = handle.lock().unwrap();
                (request.identity_id == identity_id).then(|| {
                    request.apply_expiry(now);
                    request.clone()
                })
            })
            .collect()
    }

    /// Record an approval vote from a custodian.
    ///
    /// The custodian must belong to the request's identity and be active.
    /// Returns the request status after threshold evaluation.
    pub fn approve(&self, request_id: &str, custodian_id: &str) -> Result<RequestStatus> {
        let handle = self.request_handle(request_id)?;
        let mut request = handle.lock().unwrap();

        let custodian = self.find_custodian(&request.identity_id, custodian_id)?;
        if !custodian.can_approve {
            return Err(RecoveryError::CustodianNotActive {
                custodian_id: custodian_id.to_string(),
            }
            .into());
        }

        let now = self.clock.now_millis();
        let signature =
            ApprovalSignature::create(&request.id, custodian_id, &request.requesting_did, now)?;
        Ok(request.record_approval(custodian_id, signature, now)?)
    }

    /// Record a denial vote from a custodian.
    pub fn deny(&self, request_id: &str, custodian_id: &str) -> Result<RequestStatus> {
        let handle = self.request_handle(request_id)?;
        let mut request = handle.lock().unwrap();

        let custodian = self.find_custodian(&request.identity_id, custodian_id)?;
        if !custodian.can_approve {
            return Err(RecoveryError::CustodianNotActive {
                custodian_id: custodian_id.to_string(),
            }
            .into());
        }

        Ok(request.record_denial(custodian_id, self.clock.now_millis())?)
    }

    /// Settle an approved request into a completed recovery.
    ///
    /// Completion is a separate explicit step after approval. Only the first
    /// request to reach threshold completes recovery for an identity;
    /// further completions are rejected. The caller (the vault) reassigns
    /// the primary device and drives the best-effort asset transfer.
    pub fn complete_recovery(&self, request_id: &str) -> Result<CompletedRecovery> {
        let handle = self.request_handle(request_id)?;
        let mut request = handle.lock().unwrap();
        request.apply_expiry(self.clock.now_millis());

        if request.status != RequestStatus::Approved {
            return Err(RecoveryError::RequestNotApproved {
                request_id: request_id.to_string(),
            }
            .into());
        }

        {
            let mut completed = self.completed.write().unwrap();
            if !completed.insert(request.identity_id.clone()) {
                return Err(RecoveryError::AlreadyCompleted {
                    identity_id: request.identity_id.clone(),
                }
                .into());
            }
        }

        info!(request_id, identity_id = %request.identity_id, "recovery completed");
        Ok(CompletedRecovery {
            request_id: request.id.clone(),
            identity_id: request.identity_id.clone(),
            requesting_did: request.requesting_did.clone(),
            old_identity_hash: request.old_identity_hash.clone(),
            new_identity_hash: keys::identity_hash(&request.requesting_did),
        })
    }
}
