//! Field-level authenticated encryption.
//!
//! This module provides:
//! - AES-256-GCM seal/open with a detached tag (`encryption`)
//! - The colon-delimited `EncryptedPayload` wire format (`payload`)
//! - `FieldCipher`: encrypt / decrypt / re-encrypt over a rotating `KeyList` (`field`)

pub mod encryption;
pub mod field;
pub mod payload;

pub use encryption::{open, seal, Sealed, IV_LEN, TAG_LEN};
pub use field::{BatchItem, BatchResult, FieldCipher};
pub use payload::{EncryptedPayload, KeyHint};
