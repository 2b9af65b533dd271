//! `keyrotor re-encrypt` — migrate a batch of records to the current key.
//!
//! Input is a JSON array of `{"id": ..., "payload": "..."}`. Ids are
//! passed through untouched, so numbers and strings both work. Per-record
//! failures are reported in the output and never abort the batch.

use std::fs;

use serde_json::Value;

use crate::cli::{load_service, output, Cli};
use crate::crypto::BatchItem;
use crate::errors::{RotationError, Result};

/// Execute the `re-encrypt` command.
pub fn execute(cli: &Cli, file: &str, output_path: Option<&str>) -> Result<()> {
    let service = load_service(cli)?;

    let contents = fs::read_to_string(file)?;
    let items: Vec<BatchItem<Value>> = serde_json::from_str(&contents)
        .map_err(|e| RotationError::SerializationError(format!("{file}: {e}")))?;

    let results = service.re_encrypt_batch(items);
    let failed = results.iter().filter(|r| !r.success).count();

    let rendered = serde_json::to_string_pretty(&results)
        .map_err(|e| RotationError::SerializationError(e.to_string()))?;

    match output_path {
        Some(path) => fs::write(path, rendered)?,
        None => println!("{rendered}"),
    }

    if failed > 0 {
        output::warning(&format!(
            "{failed} of {} records could not be re-encrypted",
            results.len()
        ));
    } else {
        output::success(&format!("{} records on the current key", results.len()));
    }

    Ok(())
}
