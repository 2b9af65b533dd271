//! `keyrotor decrypt` — decrypt one payload, current or legacy format.

use crate::cli::{load_service, output, Cli};
use crate::errors::Result;

/// Execute the `decrypt` command.
pub fn execute(cli: &Cli, payload: &str) -> Result<()> {
    let service = load_service(cli)?;
    let plaintext = service.decrypt(payload)?;

    if !service.is_encrypted_with_current_key(payload) {
        output::warning("Payload is not on the current key; run `re-encrypt` to migrate it.");
    }

    println!("{plaintext}");
    Ok(())
}
