//! `keyrotor events` — recent rotation journal entries.

use crate::cli::{load_service, output, Cli};
use crate::errors::Result;

/// Execute the `events` command.
pub fn execute(cli: &Cli, last: usize) -> Result<()> {
    let service = load_service(cli)?;
    output::print_events_table(&service.rotation_events(last));
    Ok(())
}
