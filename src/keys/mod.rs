//! Secret/key loading and the ordered lists both subsystems read from.
//!
//! - `SecretList`: JWT signing secrets, index 0 = current.
//! - `KeyList`: 32-byte AES-256-GCM keys, same precedence.
//! - `load_jwt_secrets` / `load_encryption_keys`: build the lists from
//!   configuration, enforcing minimum strength.

pub mod loader;
pub mod lists;

pub use lists::{EncryptionKey, KeyList, SecretList, KEY_LEN, MIN_SECRET_LEN};
pub use loader::{load_encryption_keys, load_jwt_secrets};
