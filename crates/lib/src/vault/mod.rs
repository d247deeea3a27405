//! The explicit context object tying the subsystems together
//!
//! A [`Vault`] owns the identity store, the clock, and the recovery, sync,
//! and session engines. There are no ambient globals: every operation goes
//! through a `Vault` handed its collaborators at construction, which keeps
//! tests hermetic and lets hosts swap the store or the time source.

use std::sync::Arc;

use tracing::{info, warn};

use crate::Result;
use crate::clock::{Clock, SystemClock};
use crate::identity::{self, EncryptedIdentity, IdentityFile};
use crate::recovery::{CompletedRecovery, CustodianInvitation, InvitationSink, RecoveryEngine};
use crate::session::{AuthSession, SessionManager};
use crate::store::{IdentityStore, InMemoryStore};
use crate::sync::{DeviceKind, MetadataProfile, SyncEngine, SyncedDevice};
use crate::transfer::{TransferSink, TransferTicket};

/// An offer of the old device's assets, delivered best-effort after a
/// completed recovery.
pub struct TransferOffer<'a> {
    pub sink: &'a dyn TransferSink,
    /// Origin the transfer URL is rendered on
    pub origin: &'a str,
    /// Content address of the bundled assets
    pub ipfs_cid: &'a str,
}

/// Top-level entry point for identity, recovery, sync, and sessions.
pub struct Vault {
    store: Arc<dyn IdentityStore>,
    clock: Arc<dyn Clock>,
    recovery: RecoveryEngine,
    sync: SyncEngine,
    sessions: SessionManager,
}

impl Vault {
    /// Create a vault over the given store and time source.
    pub fn new(store: Arc<dyn IdentityStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            recovery: RecoveryEngine::new(clock.clone()),
            sync: SyncEngine::new(clock.clone()),
            sessions: SessionManager::new(clock.clone()),
            clock,
        }
    }

    /// Create a vault with an in-memory store and the system clock.
    pub fn open_in_memory() -> Self {
        Self::new(Arc::new(InMemoryStore::new()), Arc::new(SystemClock))
    }

    /// The underlying identity store.
    pub fn store(&self) -> &Arc<dyn IdentityStore> {
        &self.store
    }

    /// The custodian and recovery engine.
    pub fn recovery(&self) -> &RecoveryEngine {
        &self.recovery
    }

    /// The metadata sync engine.
    pub fn sync(&self) -> &SyncEngine {
        &self.sync
    }

    /// The session manager.
    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    // === Identity lifecycle ===

    /// Create and persist a new identity.
    pub fn create_identity(
        &self,
        pn_name: &str,
        nickname: &str,
        passcode: &str,
        recovery_email: Option<&str>,
        recovery_phone: Option<&str>,
    ) -> Result<EncryptedIdentity> {
        let identity = identity::create_identity(
            pn_name,
            nickname,
            passcode,
            recovery_email,
            recovery_phone,
            self.clock.as_ref(),
        )?;
        self.put_with_retry(identity.clone())?;
        info!(public_key = %identity.public_key, "created identity");
        Ok(identity)
    }

    /// Unlock an identity with its name and passcode, yielding a session.
    ///
    /// Attempts are throttled per pN name before any decryption work; a
    /// successful unlock clears the throttle window and merges any pending
    /// metadata into the identity's profile view.
    pub fn authenticate(
        &self,
        public_key: &str,
        pn_name: &str,
        passcode: &str,
    ) -> Result<AuthSession> {
        self.sessions
            .limiter()
            .check(pn_name, self.clock.now_millis())?;

        let stored = self.store.get(public_key)?;
        let payload = identity::authenticate_identity(&stored, passcode, pn_name)?;

        self.sessions.limiter().reset(pn_name);
        let session = self
            .sessions
            .issue(public_key, &payload.pn_name, &payload.nickname);

        // Unlock is the natural merge point for metadata that arrived while
        // the identity was locked.
        let profile = self.sync.profile(public_key);
        info!(
            pn_name,
            pending = self.sync.pending_count(),
            merged_nickname = profile.nickname.as_deref().unwrap_or(&payload.nickname),
            "identity unlocked"
        );
        Ok(session)
    }

    /// Check a passcode without issuing a session.
    pub fn verify_passcode(&self, public_key: &str, passcode: &str) -> Result<bool> {
        let stored = self.store.get(public_key)?;
        Ok(identity::verify_passcode(&stored, passcode))
    }

    /// Re-seal an identity under a new passcode and persist it.
    pub fn change_passcode(
        &self,
        public_key: &str,
        pn_name: &str,
        old_passcode: &str,
        new_passcode: &str,
    ) -> Result<EncryptedIdentity> {
        let stored = self.store.get(public_key)?;
        let resealed = identity::change_passcode(&stored, pn_name, old_passcode, new_passcode)?;
        self.put_with_retry(resealed.clone())?;
        info!(public_key, "passcode changed");
        Ok(resealed)
    }

    /// Delete an identity record. The passcode must verify first.
    pub fn delete_identity(&self, public_key: &str, passcode: &str) -> Result<()> {
        let stored = self.store.get(public_key)?;
        if !identity::verify_passcode(&stored, passcode) {
            return Err(identity::IdentityError::AuthenticationFailed.into());
        }
        self.store.remove(public_key)?;
        info!(public_key, "deleted identity");
        Ok(())
    }

    /// Export an identity as a single-entry identity file.
    pub fn export_identity(&self, public_key: &str) -> Result<IdentityFile> {
        let stored = self.store.get(public_key)?;
        Ok(IdentityFile::new_single(stored, self.clock.as_ref()))
    }

    /// Import an identity file (must contain exactly one identity) and
    /// persist its record.
    pub fn import_identity(&self, file_name: &str, json: &str) -> Result<EncryptedIdentity> {
        identity::file::validate_extension(std::path::Path::new(file_name))?;
        let file = IdentityFile::from_json(json)?;
        let imported = file.single()?.clone();
        self.put_with_retry(imported.clone())?;
        info!(public_key = %imported.public_key, "imported identity");
        Ok(imported)
    }

    /// Create an invitation for a pending custodian and deliver its deep
    /// link through the given sink.
    pub fn invite_custodian(
        &self,
        identity_id: &str,
        custodian_id: &str,
        identity_name: &str,
        identity_username: &str,
        origin: &str,
        sink: &dyn InvitationSink,
    ) -> Result<CustodianInvitation> {
        let invitation = self.recovery.create_invitation(
            identity_id,
            custodian_id,
            identity_name,
            identity_username,
        )?;
        let link = invitation.invitation_link(origin)?;
        sink.send_invitation(invitation.contact_type, &invitation.contact_value, &link)?;
        Ok(invitation)
    }

    // === Profile ===

    /// The merged metadata view for an identity.
    pub fn profile(&self, public_key: &str) -> MetadataProfile {
        self.sync.profile(public_key)
    }

    // === Recovery completion ===

    /// Settle an approved recovery request.
    ///
    /// The recovering device becomes the identity's primary and all other
    /// devices are revoked. If a transfer offer is supplied, a 30-minute
    /// ticket for the old device's assets is delivered best-effort; a
    /// delivery failure is logged and never blocks completion.
    pub fn complete_recovery(
        &self,
        request_id: &str,
        device_name: &str,
        device_kind: DeviceKind,
        transfer: Option<TransferOffer<'_>>,
    ) -> Result<(CompletedRecovery, SyncedDevice)> {
        let completed = self.recovery.complete_recovery(request_id)?;

        let new_primary = self.sync.devices().reassign_primary_for_recovery(
            &completed.identity_id,
            device_name,
            device_kind,
            self.clock.now_millis(),
        );

        if let Some(offer) = transfer {
            let ticket = TransferTicket::new(
                offer.ipfs_cid,
                &completed.requesting_did,
                self.clock.now_millis(),
            );
            match ticket.transfer_url(offer.origin) {
                Ok(url) => {
                    if let Err(e) = offer.sink.offer(&ticket, &url) {
                        warn!(error = %e, "asset transfer offer failed, recovery completed anyway");
                    }
                }
                Err(e) => {
                    warn!(error = %e, "could not render transfer URL, recovery completed anyway");
                }
            }
        }

        Ok((completed, new_primary))
    }

    // A single retry absorbs transient I/O write failures; everything else
    // surfaces to the caller immediately.
    fn put_with_retry(&self, identity: EncryptedIdentity) -> Result<()> {
        match self.store.put(identity.clone()) {
            Ok(()) => Ok(()),
            Err(crate::Error::Store(first)) if first.is_io() => {
                warn!(error = %first, "store put failed, retrying once");
                self.store.put(identity)
            }
            Err(e) => Err(e),
        }
    }
}
