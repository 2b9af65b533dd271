//! `keyrotor status` — counts, grace period, key fingerprints, last event.

use crate::cli::{load_service, output, Cli};
use crate::errors::Result;

/// Execute the `status` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let service = load_service(cli)?;
    let status = service.status();

    output::print_status(&status, &service.key_fingerprints());

    if status.jwt_secrets_count > 1 || status.encryption_keys_count > 1 {
        output::tip(
            "Previous entries are configured. Remove them once `re-encrypt` reports \
             no failures and no tokens validate via a previous secret.",
        );
    }

    Ok(())
}
