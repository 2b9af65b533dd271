//! Build `SecretList` / `KeyList` from configuration.
//!
//! Precedence: an explicit list passed by the caller, then the list in
//! `Settings`, then the `current` + `previous` pair. With nothing
//! configured the only way out is the placeholder material, which needs
//! both the `insecure-dev-defaults` feature and a development environment.

use tracing::{info, warn};

use super::lists::{EncryptionKey, KeyList, SecretList};
use crate::config::{Environment, Settings};
use crate::errors::{RotationError, Result};

/// Placeholder JWT secret for local development builds only.
const DEV_PLACEHOLDER_JWT_SECRET: &str = "keyrotor-dev-only-jwt-secret-never-in-production";

/// Placeholder encryption key for local development builds only.
const DEV_PLACEHOLDER_KEY: &[u8; 32] = b"keyrotor-dev-only-encryption-key";

/// Load the ordered JWT secret list.
pub fn load_jwt_secrets(explicit: Option<Vec<String>>, settings: &Settings) -> Result<SecretList> {
    let candidates = match explicit.filter(|list| !list.is_empty()) {
        Some(list) => list,
        None => settings.jwt_candidates()?,
    };

    if candidates.is_empty() {
        if !insecure_fallback_allowed(settings.environment) {
            return Err(RotationError::MissingSecrets);
        }
        warn!(
            "No JWT secret configured — using the fixed development placeholder. \
             Tokens signed now are forgeable by anyone with this build."
        );
        return SecretList::new(vec![DEV_PLACEHOLDER_JWT_SECRET.to_string()]);
    }

    let list = SecretList::new(candidates)?;
    info!(count = list.len(), "loaded JWT secrets");
    Ok(list)
}

/// Load the ordered encryption key list. Every entry must be base64 that
/// decodes to exactly 32 bytes.
pub fn load_encryption_keys(explicit: Option<Vec<String>>, settings: &Settings) -> Result<KeyList> {
    let candidates = match explicit.filter(|list| !list.is_empty()) {
        Some(list) => list,
        None => settings.key_candidates()?,
    };

    if candidates.is_empty() {
        if !insecure_fallback_allowed(settings.environment) {
            return Err(RotationError::MissingEncryptionKeys);
        }
        warn!(
            "No encryption key configured — using the fixed development placeholder. \
             Data encrypted now is readable by anyone with this build."
        );
        return KeyList::new(vec![EncryptionKey::new(*DEV_PLACEHOLDER_KEY)]);
    }

    let list = KeyList::from_base64(&candidates)?;
    info!(count = list.len(), "loaded encryption keys");
    Ok(list)
}

/// The placeholder is a compile-time opt-in, and even then only in development.
fn insecure_fallback_allowed(environment: Environment) -> bool {
    cfg!(feature = "insecure-dev-defaults") && environment == Environment::Development
}
