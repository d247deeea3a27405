//! Sessions and authentication throttling
//!
//! A successful unlock yields an [`AuthSession`] with an opaque random
//! bearer token and a one-hour expiry. In installed-app mode the session
//! additionally locks after five minutes without activity; `touch` refreshes
//! the activity clock. The [`AttemptLimiter`] throttles unlock attempts to
//! five per minute per identity, checked before any decryption work.

mod errors;

pub use errors::SessionError;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::Result;
use crate::clock::Clock;
use crate::constants::{
    AUTH_ATTEMPT_LIMIT, AUTH_ATTEMPT_WINDOW_MILLIS, INACTIVITY_LOCK_MILLIS, SESSION_TTL_SECS,
};
use crate::crypto::keys;

/// The result of a successful authentication.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AuthSession {
    /// Session id (UUID)
    pub id: String,

    pub pn_name: String,

    pub nickname: String,

    /// Opaque random bearer token (base64)
    pub access_token: String,

    /// Token lifetime in seconds
    pub expires_in: u64,

    /// When the session was issued (milliseconds since Unix epoch)
    pub authenticated_at: u64,

    /// Public key of the authenticated identity
    pub public_key: String,
}

struct SessionState {
    session: AuthSession,
    last_activity: u64,
}

/// Fixed-window authentication throttle, per identity.
#[derive(Default)]
pub struct AttemptLimiter {
    windows: Mutex<HashMap<String, (u64, u32)>>,
}

impl AttemptLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an attempt; errors with `RateLimited` once the window's quota
    /// is exhausted.
    pub fn check(&self, identity_id: &str, now: u64) -> Result<()> {
        let mut windows = self.windows.lock().unwrap();
        let (window_start, count) = windows
            .entry(identity_id.to_string())
            .or_insert((now, 0));

        if now.saturating_sub(*window_start) >= AUTH_ATTEMPT_WINDOW_MILLIS {
            *window_start = now;
            *count = 0;
        }
        if *count >= AUTH_ATTEMPT_LIMIT {
            return Err(SessionError::RateLimited.into());
        }
        *count += 1;
        Ok(())
    }

    /// Clear the window after a successful unlock.
    pub fn reset(&self, identity_id: &str) {
        self.windows.lock().unwrap().remove(identity_id);
    }
}

/// Issues, validates, and revokes sessions.
pub struct SessionManager {
    clock: Arc<dyn Clock>,
    sessions: RwLock<HashMap<String, SessionState>>,
    limiter: AttemptLimiter,
}

impl SessionManager {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            sessions: RwLock::new(HashMap::new()),
            limiter: AttemptLimiter::new(),
        }
    }

    /// The authentication throttle, consulted before attempting decryption.
    pub fn limiter(&self) -> &AttemptLimiter {
        &self.limiter
    }

    /// Issue a session for an authenticated identity.
    pub fn issue(&self, public_key: &str, pn_name: &str, nickname: &str) -> AuthSession {
        let now = self.clock.now_millis();
        let session = AuthSession {
            id: Uuid::new_v4().to_string(),
            pn_name: pn_name.to_string(),
            nickname: nickname.to_string(),
            access_token: keys::generate_secret(),
            expires_in: SESSION_TTL_SECS,
            authenticated_at: now,
            public_key: public_key.to_string(),
        };

        self.sessions.write().unwrap().insert(
            session.access_token.clone(),
            SessionState {
                session: session.clone(),
                last_activity: now,
            },
        );
        info!(pn_name, session_id = %session.id, "issued session");
        session
    }

    /// Validate a bearer token.
    ///
    /// Expired or inactivity-locked sessions are removed; the caller must
    /// re-authenticate with the passcode.
    pub fn validate(&self, token: &str) -> Result<AuthSession> {
        let now = self.clock.now_millis();
        let mut sessions = self.sessions.write().unwrap();

        let state = sessions.get(token).ok_or(SessionError::UnknownToken)?;

        let expires_at = state.session.authenticated_at + state.session.expires_in * 1000;
        if now > expires_at {
            sessions.remove(token);
            return Err(SessionError::Expired.into());
        }
        if now.saturating_sub(state.last_activity) > INACTIVITY_LOCK_MILLIS {
            sessions.remove(token);
            debug!("session locked after inactivity");
            return Err(SessionError::InactivityLocked.into());
        }

        Ok(state.session.clone())
    }

    /// Refresh the inactivity clock for a live session.
    pub fn touch(&self, token: &str) -> Result<()> {
        let now = self.clock.now_millis();
        let mut sessions = self.sessions.write().unwrap();
        let state = sessions.get_mut(token).ok_or(SessionError::UnknownToken)?;
        state.last_activity = now;
        Ok(())
    }

    /// Remove a session. The next launch requires full re-authentication.
    pub fn logout(&self, token: &str) -> Result<()> {
        self.sessions
            .write()
            .unwrap()
            .remove(token)
            .ok_or(SessionError::UnknownToken)?;
        Ok(())
    }

    /// Number of live sessions (expired ones may still be counted until
    /// their next validation).
    pub fn session_count(&self) -> usize {
        self.sessions.read().unwrap().len()
    }
}
