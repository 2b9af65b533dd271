//! Wire format for encrypted fields.
//!
//! ```text
//! current: <keyIndex>:<iv-b64>:<authTag-b64>:<ciphertext-b64>
//! legacy:             <iv-b64>:<authTag-b64>:<ciphertext-b64>
//! ```
//!
//! Both forms use standard (padded) base64. The legacy form carries no key
//! index and stays decodable forever. This format is a stored-data
//! contract: do not change it.

use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use super::encryption::{Sealed, IV_LEN, TAG_LEN};
use crate::errors::{RotationError, Result};

const SEPARATOR: char = ':';

/// What a payload says about the key that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyHint {
    /// Four-field payload with a numeric index.
    Index(usize),
    /// Four-field payload whose index field is not a number. Treated like
    /// an out-of-range index.
    Unreadable(String),
    /// Three-field payload from before key indices existed.
    Legacy,
}

/// A parsed encrypted field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedPayload {
    pub hint: KeyHint,
    pub sealed: Sealed,
}

impl EncryptedPayload {
    /// Payload in the current format, tagged with `index`.
    pub fn indexed(index: usize, sealed: Sealed) -> Self {
        Self {
            hint: KeyHint::Index(index),
            sealed,
        }
    }

    /// Parse either format. Anything other than 3 or 4 fields, bad base64,
    /// or a wrong IV/tag length is rejected before any key is tried.
    pub fn parse(payload: &str) -> Result<Self> {
        let parts: Vec<&str> = payload.split(SEPARATOR).collect();

        let (hint, rest) = match parts.as_slice() {
            [index, rest @ ..] if rest.len() == 3 => {
                let hint = index
                    .parse::<usize>()
                    .map(KeyHint::Index)
                    .unwrap_or_else(|_| KeyHint::Unreadable((*index).to_string()));
                (hint, rest)
            }
            rest if rest.len() == 3 => (KeyHint::Legacy, rest),
            other => {
                return Err(RotationError::InvalidPayloadFormat(format!(
                    "expected 3 or 4 ':'-separated fields, found {}",
                    other.len()
                )))
            }
        };

        let iv = decode_fixed::<IV_LEN>(rest[0], "iv")?;
        let tag = decode_fixed::<TAG_LEN>(rest[1], "auth tag")?;
        let ciphertext = STANDARD.decode(rest[2]).map_err(|_| {
            RotationError::InvalidPayloadFormat("ciphertext is not valid base64".into())
        })?;

        Ok(Self {
            hint,
            sealed: Sealed { iv, tag, ciphertext },
        })
    }

    /// The embedded key index, if the payload has a readable one.
    pub fn key_index(&self) -> Option<usize> {
        match self.hint {
            KeyHint::Index(index) => Some(index),
            _ => None,
        }
    }

    pub fn is_legacy(&self) -> bool {
        self.hint == KeyHint::Legacy
    }
}

impl fmt::Display for EncryptedPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.hint {
            KeyHint::Index(index) => write!(f, "{index}{SEPARATOR}")?,
            KeyHint::Unreadable(raw) => write!(f, "{raw}{SEPARATOR}")?,
            KeyHint::Legacy => {}
        }
        write!(
            f,
            "{}{SEPARATOR}{}{SEPARATOR}{}",
            STANDARD.encode(self.sealed.iv),
            STANDARD.encode(self.sealed.tag),
            STANDARD.encode(&self.sealed.ciphertext)
        )
    }
}

/// Read the key index of a current-format payload without decoding or
/// decrypting anything.
pub fn peek_key_index(payload: &str) -> Option<usize> {
    let mut parts = payload.split(SEPARATOR);
    let index = parts.next()?;
    if parts.count() != 3 {
        return None;
    }
    index.parse().ok()
}

fn decode_fixed<const N: usize>(field: &str, what: &str) -> Result<[u8; N]> {
    let bytes = STANDARD
        .decode(field)
        .map_err(|_| RotationError::InvalidPayloadFormat(format!("{what} is not valid base64")))?;

    bytes.as_slice().try_into().map_err(|_| {
        RotationError::InvalidPayloadFormat(format!(
            "{what} must be {N} bytes, found {}",
            bytes.len()
        ))
    })
}
