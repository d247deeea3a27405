//! Error types for the custodian and recovery protocol
//!
//! Protocol errors: each is recovered locally with a specific message and
//! never corrupts custodian or request state.

use thiserror::Error;

use super::request::RequestStatus;

/// Errors from custodian lifecycle, invitations, and recovery requests.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RecoveryError {
    /// Adding a custodian would exceed the per-identity cap.
    #[error("Custodian limit reached: at most {limit} custodians per identity")]
    CustodianLimitReached { limit: usize },

    #[error("Custodian not found: {custodian_id}")]
    CustodianNotFound { custodian_id: String },

    /// The custodian cannot vote (not active).
    #[error("Custodian cannot approve: {custodian_id}")]
    CustodianNotActive { custodian_id: String },

    /// The 6-digit invitation code failed format rules at creation time.
    #[error("Invalid invitation code: {reason}")]
    InvalidInvitationCode { reason: String },

    /// The supplied code does not equal the owner-issued code.
    #[error("Invitation code does not match")]
    InvitationCodeMismatch,

    /// The supplied contact does not equal the invitation's contact.
    #[error("Contact value does not match the invitation")]
    ContactMismatch,

    #[error("Invitation expired: {invitation_id}")]
    InvitationExpired { invitation_id: String },

    #[error("Invitation not found: {invitation_id}")]
    InvitationNotFound { invitation_id: String },

    /// A deep link could not be parsed into an invitation.
    #[error("Invalid invitation link: {reason}")]
    InvalidInvitationLink { reason: String },

    /// Recovery threshold outside the allowed 2-5 range.
    #[error("Invalid recovery threshold: {value} (must be 2-5)")]
    InvalidThreshold { value: usize },

    #[error("Recovery request not found: {request_id}")]
    RequestNotFound { request_id: String },

    /// The request is no longer pending; votes are rejected.
    #[error("Recovery request {request_id} is {status:?}, not pending")]
    RequestNotPending {
        request_id: String,
        status: RequestStatus,
    },

    /// The request passed its 72-hour expiry; terminal at read time.
    #[error("Recovery request expired: {request_id}")]
    RequestExpired { request_id: String },

    /// Each custodian may approve or deny exactly once per request.
    #[error("Custodian {custodian_id} already voted on this request")]
    DuplicateVote { custodian_id: String },

    /// Completion requires an approved request.
    #[error("Recovery request {request_id} is not approved")]
    RequestNotApproved { request_id: String },

    /// Only the first request to reach threshold completes recovery.
    #[error("Recovery already completed for identity: {identity_id}")]
    AlreadyCompleted { identity_id: String },

    /// Recovery initiation rejected: the presented recovery key or
    /// 4-factor tuple did not match the stored identity.
    #[error("Recovery initiation rejected")]
    InitiationRejected,
}

impl RecoveryError {
    /// Check if this error indicates a resource was not found.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            RecoveryError::CustodianNotFound { .. }
                | RecoveryError::RequestNotFound { .. }
                | RecoveryError::InvitationNotFound { .. }
        )
    }

    /// Check if this error indicates an expired artifact.
    pub fn is_expired(&self) -> bool {
        matches!(
            self,
            RecoveryError::InvitationExpired { .. } | RecoveryError::RequestExpired { .. }
        )
    }

    /// Check if this error is a rejected duplicate vote.
    pub fn is_duplicate_vote(&self) -> bool {
        matches!(self, RecoveryError::DuplicateVote { .. })
    }
}
