//! `keyrotor verify` — validate a token against every configured secret.

use crate::cli::{load_service, output, Cli};
use crate::errors::{RotationError, Result};
use crate::jwt::TokenError;

/// Execute the `verify` command. Prints the claims as JSON on success.
pub fn execute(cli: &Cli, token: &str) -> Result<()> {
    let service = load_service(cli)?;

    match service.validate_jwt_with_error(token) {
        Ok(claims) => {
            let rendered = serde_json::to_string_pretty(&claims)
                .map_err(|e| RotationError::SerializationError(e.to_string()))?;
            println!("{rendered}");
            Ok(())
        }
        Err(cause) => {
            if cause == TokenError::TokenExpired {
                output::tip("The signature is genuine; ask the user to sign in again.");
            }
            let code = serde_json::to_value(cause)
                .ok()
                .and_then(|v| v.as_str().map(str::to_string))
                .unwrap_or_else(|| cause.to_string());
            Err(RotationError::CommandFailed(code))
        }
    }
}
