//! Transfer tickets and their URL encoding.

use std::collections::HashMap;
use std::sync::Mutex;

use pnvault::constants::TRANSFER_TTL_MILLIS;
use pnvault::transfer::{ContentSink, TransferTicket};

use crate::helpers::T0;

/// In-memory content-addressed store.
#[derive(Default)]
struct MemoryContentSink {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
}

impl ContentSink for MemoryContentSink {
    fn put_content(&self, bytes: &[u8]) -> pnvault::Result<String> {
        let mut blobs = self.blobs.lock().unwrap();
        let cid = format!("bafy-{}", blobs.len());
        blobs.insert(cid.clone(), bytes.to_vec());
        Ok(cid)
    }

    fn get_content(&self, cid: &str) -> pnvault::Result<Vec<u8>> {
        self.blobs.lock().unwrap().get(cid).cloned().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, format!("no blob at {cid}")).into()
        })
    }
}

#[test]
fn ticket_url_round_trip() {
    let ticket = TransferTicket::new("bafy-assets-cid", "Alice", T0);
    let url = ticket.transfer_url("https://app.example.com").unwrap();

    assert!(url.as_str().contains("/transfer/id="));
    let parsed = TransferTicket::parse_transfer_url(url.as_str()).unwrap();
    assert_eq!(parsed, ticket);
    assert_eq!(
        parsed.accept(&ticket.transfer_passcode, T0 + 1).unwrap(),
        "bafy-assets-cid"
    );
}

#[test]
fn ticket_expires_after_30_minutes() {
    let ticket = TransferTicket::new("bafy-assets-cid", "Alice", T0);

    assert!(ticket.accept(&ticket.transfer_passcode, T0 + TRANSFER_TTL_MILLIS).is_ok());
    let err = ticket
        .accept(&ticket.transfer_passcode, T0 + TRANSFER_TTL_MILLIS + 1)
        .unwrap_err();
    assert!(err.is_expired());
}

#[test]
fn wrong_transfer_passcode_rejected() {
    let ticket = TransferTicket::new("bafy-assets-cid", "Alice", T0);
    assert!(ticket.accept("not-the-passcode", T0 + 1).is_err());
}

#[test]
fn accepted_ticket_fetches_stored_assets() {
    let sink = MemoryContentSink::default();
    let cid = sink.put_content(b"bundled assets").unwrap();

    // The ticket carries the content address; acceptance yields it back for
    // the fetch.
    let ticket = TransferTicket::new(&cid, "Alice", T0);
    let accepted_cid = ticket.accept(&ticket.transfer_passcode, T0 + 1).unwrap();
    assert_eq!(sink.get_content(accepted_cid).unwrap(), b"bundled assets");

    assert!(sink.get_content("bafy-missing").unwrap_err().is_storage_error());
}
