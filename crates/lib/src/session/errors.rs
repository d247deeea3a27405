//! Error types for sessions and authentication throttling

use thiserror::Error;

/// Errors from session issuance, validation, and rate limiting.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    /// No session exists for the presented token.
    #[error("Unknown session token")]
    UnknownToken,

    /// The session passed its expiry and was removed.
    #[error("Session expired")]
    Expired,

    /// No activity within the inactivity window; the identity is locked
    /// until the passcode is re-entered.
    #[error("Session locked after inactivity")]
    InactivityLocked,

    /// Too many authentication attempts in the current window.
    #[error("Too many authentication attempts, try again later")]
    RateLimited,
}

impl SessionError {
    /// Check if this error indicates a resource was not found.
    pub fn is_not_found(&self) -> bool {
        matches!(self, SessionError::UnknownToken)
    }

    /// Check if this error indicates an expired or locked session.
    pub fn is_expired(&self) -> bool {
        matches!(self, SessionError::Expired | SessionError::InactivityLocked)
    }

    /// Check if this error is an authentication rate limit.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, SessionError::RateLimited)
    }
}
