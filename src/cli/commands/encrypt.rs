//! `keyrotor encrypt` — encrypt one value under the current key.

use crate::cli::{load_service, Cli};
use crate::errors::Result;

/// Execute the `encrypt` command.
pub fn execute(cli: &Cli, plaintext: &str) -> Result<()> {
    let service = load_service(cli)?;
    println!("{}", service.encrypt(plaintext)?);
    Ok(())
}
