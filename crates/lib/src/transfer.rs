//! Transfer tickets for handing identity assets to a recovered device
//!
//! After a completed recovery the old device's assets are offered to the new
//! one through a short-lived ticket rendered as a URL
//! (`<origin>/transfer/id=<id>?data=<base64 JSON>`). Tickets expire 30
//! minutes after creation; expiry is checked when the ticket is accepted.
//! Content storage and delivery are collaborator concerns behind
//! [`ContentSink`] and [`TransferSink`].

use base64ct::{Base64, Encoding};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;
use uuid::Uuid;

use crate::Result;
use crate::constants::TRANSFER_TTL_MILLIS;
use crate::crypto::keys;

/// Errors from transfer ticket creation and acceptance.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TransferError {
    /// A transfer URL could not be parsed back into a ticket.
    #[error("Invalid transfer URL: {reason}")]
    InvalidTransferUrl { reason: String },

    /// The ticket passed its 30-minute expiry.
    #[error("Transfer ticket expired: {ticket_id}")]
    TicketExpired { ticket_id: String },

    /// The supplied transfer passcode does not match the ticket.
    #[error("Transfer passcode does not match")]
    PasscodeMismatch,
}

impl TransferError {
    /// Check if this error indicates an expired ticket.
    pub fn is_expired(&self) -> bool {
        matches!(self, TransferError::TicketExpired { .. })
    }
}

/// A short-lived offer of content-addressed assets to a recovered device.
///
/// Field names follow the wire format of the transfer URL JSON.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TransferTicket {
    /// Ticket id (UUID)
    pub id: String,

    /// Content address of the bundled assets
    pub ipfs_cid: String,

    /// Display name shown to the accepting device
    pub nickname: String,

    /// One-time passcode the accepting device must present
    pub transfer_passcode: String,

    /// Expiry (milliseconds since Unix epoch), 30 minutes from creation
    pub expires_at: u64,
}

impl TransferTicket {
    /// Create a ticket with a fresh id and one-time passcode.
    pub fn new(ipfs_cid: &str, nickname: &str, now: u64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            ipfs_cid: ipfs_cid.to_string(),
            nickname: nickname.to_string(),
            transfer_passcode: keys::generate_secret(),
            expires_at: now + TRANSFER_TTL_MILLIS,
        }
    }

    /// Check whether the ticket has passed its expiry.
    pub fn is_expired(&self, now: u64) -> bool {
        now > self.expires_at
    }

    /// Render the ticket as a transfer URL on the given origin.
    pub fn transfer_url(&self, origin: &str) -> Result<Url> {
        let mut url = Url::parse(origin).map_err(|e| TransferError::InvalidTransferUrl {
            reason: format!("Invalid origin: {e}"),
        })?;
        url.set_path(&format!("transfer/id={}", self.id));

        let json = serde_json::to_vec(self)?;
        url.query_pairs_mut()
            .append_pair("data", &Base64::encode_string(&json));
        Ok(url)
    }

    /// Parse a ticket back out of a transfer URL.
    pub fn parse_transfer_url(link: &str) -> Result<Self> {
        let url = Url::parse(link).map_err(|e| TransferError::InvalidTransferUrl {
            reason: format!("Invalid URL: {e}"),
        })?;

        let (_, data) = url
            .query_pairs()
            .find(|(key, _)| key == "data")
            .ok_or_else(|| TransferError::InvalidTransferUrl {
                reason: "Missing 'data' query parameter".to_string(),
            })?;

        let json =
            Base64::decode_vec(&data).map_err(|e| TransferError::InvalidTransferUrl {
                reason: format!("Malformed base64 payload: {e}"),
            })?;
        let ticket: TransferTicket =
            serde_json::from_slice(&json).map_err(|e| TransferError::InvalidTransferUrl {
                reason: format!("Malformed ticket payload: {e}"),
            })?;

        // The path segment must name the same ticket as the payload.
        let path_id = url
            .path_segments()
            .and_then(|mut segments| segments.find(|s| s.starts_with("id=")))
            .map(|s| s.trim_start_matches("id=").to_string());
        if path_id.as_deref() != Some(ticket.id.as_str()) {
            return Err(TransferError::InvalidTransferUrl {
                reason: "Ticket id does not match URL path".to_string(),
            }
            .into());
        }

        Ok(ticket)
    }

    /// Accept the ticket: verifies expiry and the one-time passcode.
    pub fn accept(&self, presented_passcode: &str, now: u64) -> Result<&str> {
        if self.is_expired(now) {
            return Err(TransferError::TicketExpired {
                ticket_id: self.id.clone(),
            }
            .into());
        }
        if self.transfer_passcode != presented_passcode {
            return Err(TransferError::PasscodeMismatch.into());
        }
        Ok(&self.ipfs_cid)
    }
}

/// Content-addressed storage collaborator.
pub trait ContentSink: Send + Sync {
    /// Store a blob, returning its content address.
    fn put_content(&self, bytes: &[u8]) -> Result<String>;

    /// Fetch a blob by content address.
    fn get_content(&self, cid: &str) -> Result<Vec<u8>>;
}

/// Delivery collaborator invoked on recovery completion.
///
/// Delivery is best-effort: the vault logs a failure and completes the
/// recovery anyway.
pub trait TransferSink: Send + Sync {
    /// Offer a ticket to the recovered device.
    fn offer(&self, ticket: &TransferTicket, url: &Url) -> Result<()>;
}
