/*! Integration tests for pnvault.
 *
 * This test suite is organized as a single integration test binary
 * following the pattern described by matklad in
 * https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html
 *
 * The module structure mirrors the main library structure:
 * - identity: Identity creation, authentication, and identity files
 * - recovery: Custodian lifecycle, invitations, and the recovery protocol
 * - session: Session issuance, expiry, and authentication throttling
 * - sync: Metadata merging, the offline queue, and the device registry
 * - transfer: Transfer tickets and URLs
 * - vault: End-to-end scenarios through the Vault context object
 */

use tracing_subscriber::EnvFilter;

#[ctor::ctor]
fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("pnvault=info".parse().unwrap()),
        )
        .with_test_writer()
        .try_init();
}

mod helpers;
mod identity;
mod recovery;
mod session;
mod transfer;
mod vault;
