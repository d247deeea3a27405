//! Custodian invitations and deep links
//!
//! The owner generates a self-contained invitation bundle, rendered as a
//! deep link (`<origin>?custodian-invitation=<url-encoded JSON>`) and shown
//! as a QR code by the host application. Delivery is a collaborator concern
//! behind [`InvitationSink`]. Invitations expire 24 hours after generation;
//! expiry is checked at acceptance time, not via timers.

use serde::{Deserialize, Serialize};
use url::Url;

use super::custodian::{ContactType, CustodianKind};
use super::errors::RecoveryError;
use crate::Result;
use crate::constants::INVITATION_QUERY_PARAM;

/// A self-contained invitation bundle, embedded in the deep link.
///
/// Field names follow the wire format of the deep link JSON.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CustodianInvitation {
    /// Invitation id (UUID)
    pub invitation_id: String,

    pub custodian_name: String,

    pub custodian_type: CustodianKind,

    pub contact_type: ContactType,

    pub contact_value: String,

    /// Display name of the inviting identity
    pub identity_name: String,

    /// pN name of the inviting identity
    pub identity_username: String,

    /// Expiry (milliseconds since Unix epoch), 24h from generation
    pub expires_at: u64,
}

impl CustodianInvitation {
    /// Check whether the invitation has passed its expiry.
    pub fn is_expired(&self, now: u64) -> bool {
        now > self.expires_at
    }

    /// Render the invitation as a deep link on the given origin.
    pub fn invitation_link(&self, origin: &str) -> Result<Url> {
        let mut url = Url::parse(origin).map_err(|e| RecoveryError::InvalidInvitationLink {
            reason: format!("Invalid origin: {e}"),
        })?;
        let json = serde_json::to_string(self)?;
        url.query_pairs_mut()
            .append_pair(INVITATION_QUERY_PARAM, &json);
        Ok(url)
    }

    /// Parse an invitation back out of a deep link.
    pub fn parse_invitation_link(link: &str) -> Result<Self> {
        let url = Url::parse(link).map_err(|e| RecoveryError::InvalidInvitationLink {
            reason: format!("Invalid URL: {e}"),
        })?;

        let (_, json) = url
            .query_pairs()
            .find(|(key, _)| key == INVITATION_QUERY_PARAM)
            .ok_or_else(|| RecoveryError::InvalidInvitationLink {
                reason: format!("Missing '{INVITATION_QUERY_PARAM}' query parameter"),
            })?;

        serde_json::from_str(&json).map_err(|e| {
            RecoveryError::InvalidInvitationLink {
                reason: format!("Malformed invitation payload: {e}"),
            }
            .into()
        })
    }
}

/// Transport-agnostic sink for delivering an invitation payload.
///
/// The host application decides whether this composes an email, an SMS, or
/// anything else; the core only hands over the contact and the link.
pub trait InvitationSink: Send + Sync {
    /// Deliver an invitation link to the given contact.
    fn send_invitation(
        &self,
        contact_type: ContactType,
        contact_value: &str,
        link: &Url,
    ) -> Result<()>;
}
