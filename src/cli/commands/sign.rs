//! `keyrotor sign` — issue a session token with the current secret.

use crate::cli::{load_service, Cli};
use crate::errors::Result;
use crate::jwt::SessionIdentity;

/// Execute the `sign` command.
pub fn execute(cli: &Cli, identity: &SessionIdentity, ttl: Option<&str>) -> Result<()> {
    let service = load_service(cli)?;

    let token = match ttl {
        Some(ttl) => service.sign_jwt_with_ttl(identity, ttl)?,
        None => service.sign_jwt(identity)?,
    };

    println!("{token}");
    Ok(())
}
