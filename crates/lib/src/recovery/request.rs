//! Recovery requests, votes, and threshold evaluation
//!
//! A recovery request collects custodian votes until one of two symmetric
//! thresholds is reached. Both thresholds use the same `required_approvals`
//! value; after every vote the approval threshold is evaluated *before* the
//! denial threshold, which is the documented tie-break for simultaneous
//! approval and denial. Requests expire 72 hours after creation; expiry is
//! enforced at read time and is terminal.

use ed25519_dalek::SigningKey;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use super::errors::RecoveryError;
use crate::crypto::keys;

/// Recovery request lifecycle state.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Approved,
    Denied,
    Expired,
}

/// Why a recovery key was generated.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RecoveryKeyPurpose {
    Personal,
    Legal,
    Insurance,
    Will,
}

/// An out-of-band secret that *initiates* (never completes) recovery.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RecoveryKey {
    /// Record id (UUID)
    pub id: String,

    /// Public key of the identity this key can initiate recovery for
    pub identity_id: String,

    /// The secret itself (32 random bytes, base64)
    pub key_data: String,

    /// Generation timestamp (milliseconds since Unix epoch)
    pub created_at: u64,

    pub purpose: RecoveryKeyPurpose,

    pub description: Option<String>,
}

impl RecoveryKey {
    /// Generate a fresh recovery key for an identity.
    pub fn generate(
        identity_id: &str,
        purpose: RecoveryKeyPurpose,
        description: Option<&str>,
        now: u64,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            identity_id: identity_id.to_string(),
            key_data: keys::generate_recovery_secret(),
            created_at: now,
            purpose,
            description: description.map(str::to_string),
        }
    }
}

/// The canonical message a custodian signs when approving.
///
/// Serialized as JSON with these exact field names; the signature covers the
/// serialized bytes.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalMessage {
    pub recovery_request_id: String,
    pub custodian_id: String,
    pub requesting_did: String,
    pub timestamp: u64,
    pub nonce: String,
}

/// An authenticated approval signature.
///
/// A freshly generated Ed25519 key signs the canonical [`ApprovalMessage`];
/// the verifying key ships with the signature. This proves the vote was not
/// tampered with in transit. It is *not* a zero-knowledge proof and claims
/// no possession of the custodian's recovery-key share.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApprovalSignature {
    pub custodian_id: String,

    /// When the approval was signed (milliseconds since Unix epoch)
    pub signed_at: u64,

    /// Random nonce bound into the signed message (base64)
    pub nonce: String,

    /// Ed25519 signature over the canonical message bytes (base64)
    pub signature: String,

    /// Verifying key for the signature (prefixed string)
    pub verifying_key: String,
}

impl ApprovalSignature {
    /// Sign a canonical approval message with a freshly generated key.
    pub fn create(
        request_id: &str,
        custodian_id: &str,
        requesting_did: &str,
        now: u64,
    ) -> crate::Result<Self> {
        let nonce = keys::generate_secret();
        let message = ApprovalMessage {
            recovery_request_id: request_id.to_string(),
            custodian_id: custodian_id.to_string(),
            requesting_did: requesting_did.to_string(),
            timestamp: now,
            nonce: nonce.clone(),
        };
        let message_bytes = serde_json::to_vec(&message)?;

        let (signing_key, verifying_key): (SigningKey, _) = keys::generate_keypair();
        let signature = keys::sign_data(&message_bytes, &signing_key);

        Ok(Self {
            custodian_id: custodian_id.to_string(),
            signed_at: now,
            nonce,
            signature,
            verifying_key: keys::format_public_key(&verifying_key),
        })
    }

    /// Verify this signature against the canonical message it claims to cover.
    pub fn verify(&self, request_id: &str, requesting_did: &str) -> crate::Result<()> {
        let message = ApprovalMessage {
            recovery_request_id: request_id.to_string(),
            custodian_id: self.custodian_id.clone(),
            requesting_did: requesting_did.to_string(),
            timestamp: self.signed_at,
            nonce: self.nonce.clone(),
        };
        let message_bytes = serde_json::to_vec(&message)?;

        let verifying_key = keys::parse_public_key(&self.verifying_key)?;
        keys::verify_signature(&message_bytes, &self.signature, &verifying_key)?;
        Ok(())
    }
}

/// A recovery request collecting custodian votes for one identity.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RecoveryRequest {
    /// Request id (UUID)
    pub id: String,

    /// Public key of the identity being recovered
    pub identity_id: String,

    /// The claimant's DID / public key
    pub requesting_did: String,

    /// The claimant's display name
    pub requesting_user: String,

    /// Creation timestamp (milliseconds since Unix epoch)
    pub timestamp: u64,

    pub status: RequestStatus,

    /// Custodian ids that approved
    pub approvals: Vec<String>,

    /// Custodian ids that denied
    pub denials: Vec<String>,

    /// One signature per approval
    pub signatures: Vec<ApprovalSignature>,

    /// Expiry, 72h from creation (milliseconds since Unix epoch)
    pub expires_at: u64,

    /// Approvals (and, symmetrically, denials) needed to settle the request
    pub required_approvals: usize,

    /// Hash of the identity being replaced, for asset transfer keying
    pub old_identity_hash: Option<String>,
}

impl RecoveryRequest {
    /// Create a pending request.
    pub fn new(
        identity_id: &str,
        requesting_did: &str,
        requesting_user: &str,
        required_approvals: usize,
        old_identity_hash: Option<String>,
        now: u64,
        ttl_millis: u64,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            identity_id: identity_id.to_string(),
            requesting_did: requesting_did.to_string(),
            requesting_user: requesting_user.to_string(),
            timestamp: now,
            status: RequestStatus::Pending,
            approvals: Vec::new(),
            denials: Vec::new(),
            signatures: Vec::new(),
            expires_at: now + ttl_millis,
            required_approvals,
            old_identity_hash,
        }
    }

    /// Number of approvals collected so far.
    pub fn current_approvals(&self) -> usize {
        self.signatures.len()
    }

    /// Check whether a custodian already voted (either way).
    pub fn has_voted(&self, custodian_id: &str) -> bool {
        self.approvals.iter().any(|id| id == custodian_id)
            || self.denials.iter().any(|id| id == custodian_id)
    }

    /// Apply read-time expiry: a pending request past its expiry becomes
    /// `Expired`, terminally. Returns true if the status changed.
    pub fn apply_expiry(&mut self, now: u64) -> bool {
        if self.status == RequestStatus::Pending && now > self.expires_at {
            self.status = RequestStatus::Expired;
            info!(request_id = %self.id, "recovery request expired");
            return true;
        }
        false
    }

    /// Reject votes on anything but a live pending request.
    fn ensure_votable(&mut self, custodian_id: &str, now: u64) -> Result<(), RecoveryError> {
        self.apply_expiry(now);
        match self.status {
            RequestStatus::Pending => {}
            RequestStatus::Expired => {
                return Err(RecoveryError::RequestExpired {
                    request_id: self.id.clone(),
                });
            }
            status => {
                return Err(RecoveryError::RequestNotPending {
                    request_id: self.id.clone(),
                    status,
                });
            }
        }
        if self.has_voted(custodian_id) {
            return Err(RecoveryError::DuplicateVote {
                custodian_id: custodian_id.to_string(),
            });
        }
        Ok(())
    }

    /// Record an approval vote and evaluate thresholds.
    ///
    /// Returns the (possibly settled) status after the vote.
    pub fn record_approval(
        &mut self,
        custodian_id: &str,
        signature: ApprovalSignature,
        now: u64,
    ) -> Result<RequestStatus, RecoveryError> {
        self.ensure_votable(custodian_id, now)?;

        self.approvals.push(custodian_id.to_string());
        self.signatures.push(signature);
        Ok(self.evaluate_thresholds())
    }

    /// Record a denial vote and evaluate thresholds.
    pub fn record_denial(
        &mut self,
        custodian_id: &str,
        now: u64,
    ) -> Result<RequestStatus, RecoveryError> {
        self.ensure_votable(custodian_id, now)?;

        self.denials.push(custodian_id.to_string());
        Ok(self.evaluate_thresholds())
    }

    /// Evaluate both thresholds, approval first (the tie-break rule).
    fn evaluate_thresholds(&mut self) -> RequestStatus {
        if self.signatures.len() >= self.required_approvals {
            self.status = RequestStatus::Approved;
            info!(
                request_id = %self.id,
                approvals = self.signatures.len(),
                required = self.required_approvals,
                "recovery request approved"
            );
        } else if self.denials.len() >= self.required_approvals {
            self.status = RequestStatus::Denied;
            info!(
                request_id = %self.id,
                denials = self.denials.len(),
                required = self.required_approvals,
                "recovery request denied"
            );
        }
        self.status
    }
}
