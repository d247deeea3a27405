//! Protocol-wide constants.
//!
//! Limits and lifetimes for custodians, recovery requests, invitations,
//! sessions, and the identity file format.

/// Maximum number of custodians per identity.
pub const MAX_CUSTODIANS: usize = 5;

/// Minimum owner-configurable recovery threshold.
pub const MIN_RECOVERY_THRESHOLD: usize = 2;

/// Maximum owner-configurable recovery threshold.
pub const MAX_RECOVERY_THRESHOLD: usize = 5;

/// Invitation lifetime: 24 hours, in milliseconds.
pub const INVITATION_TTL_MILLIS: u64 = 24 * 60 * 60 * 1000;

/// Recovery request lifetime: 72 hours, in milliseconds.
pub const RECOVERY_REQUEST_TTL_MILLIS: u64 = 72 * 60 * 60 * 1000;

/// Transfer ticket lifetime: 30 minutes, in milliseconds.
pub const TRANSFER_TTL_MILLIS: u64 = 30 * 60 * 1000;

/// Default access token lifetime, in seconds.
pub const SESSION_TTL_SECS: u64 = 3600;

/// Inactivity window after which an installed-app session re-locks: 5 minutes.
pub const INACTIVITY_LOCK_MILLIS: u64 = 5 * 60 * 1000;

/// Maximum authentication attempts per identity per rate-limit window.
pub const AUTH_ATTEMPT_LIMIT: u32 = 5;

/// Rate-limit window for authentication attempts: 1 minute.
pub const AUTH_ATTEMPT_WINDOW_MILLIS: u64 = 60 * 1000;

/// Minimum passcode length.
pub const MIN_PASSCODE_LEN: usize = 12;

/// Minimum pN name length.
pub const MIN_PN_NAME_LEN: usize = 3;

/// Maximum pN name length.
pub const MAX_PN_NAME_LEN: usize = 30;

/// Invitation code length (6 ASCII digits, shared out-of-band).
pub const INVITATION_CODE_LEN: usize = 6;

/// Identity file format version.
pub const IDENTITY_FILE_VERSION: u32 = 1;

/// File extensions accepted for identity files.
pub const IDENTITY_FILE_EXTENSIONS: &[&str] = &["pn", "id", "json", "identity"];

/// Reserved words rejected as pN names.
pub const RESERVED_PN_NAMES: &[&str] = &["admin", "root", "system", "support", "help", "info"];

/// Query parameter carrying a custodian invitation in a deep link.
pub const INVITATION_QUERY_PARAM: &str = "custodian-invitation";
