use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use crate::errors::{RotationError, Result};

/// Minimum number of characters in a JWT signing secret.
pub const MIN_SECRET_LEN: usize = 32;

/// Length of an AES-256 key in bytes.
pub const KEY_LEN: usize = 32;

// ---------------------------------------------------------------------------
// SecretList
// ---------------------------------------------------------------------------

/// Ordered, non-empty list of JWT signing secrets.
///
/// Index 0 signs; every index is accepted on validation. Immutable once
/// built; a rotation builds a new list with [`SecretList::rotated`].
#[derive(Clone)]
pub struct SecretList {
    secrets: Vec<Zeroizing<String>>,
}

impl SecretList {
    /// Build a list, rejecting it if empty or if any entry is shorter
    /// than [`MIN_SECRET_LEN`] characters.
    pub fn new(secrets: Vec<String>) -> Result<Self> {
        if secrets.is_empty() {
            return Err(RotationError::MissingSecrets);
        }

        for (index, secret) in secrets.iter().enumerate() {
            let length = secret.chars().count();
            if length < MIN_SECRET_LEN {
                return Err(RotationError::SecretTooShort { index, length });
            }
        }

        Ok(Self {
            secrets: secrets.into_iter().map(Zeroizing::new).collect(),
        })
    }

    /// The current signing secret.
    pub fn primary(&self) -> &str {
        // Non-empty by construction.
        self.secrets[0].as_str()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.secrets.get(index).map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.secrets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.secrets.is_empty()
    }

    /// Secrets in precedence order, with their index.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.secrets.iter().map(|s| s.as_str()).enumerate()
    }

    /// Produce the list that follows a rotation: `new_secret` becomes the
    /// current secret, the old current is demoted to index 1, and anything
    /// beyond `max_retained` entries is dropped.
    pub fn rotated(&self, new_secret: String, max_retained: usize) -> Result<Self> {
        let keep = max_retained.max(1);
        let mut next = Vec::with_capacity(keep);
        next.push(new_secret);
        next.extend(
            self.secrets
                .iter()
                .take(keep - 1)
                .map(|s| s.as_str().to_string()),
        );
        Self::new(next)
    }
}

impl fmt::Debug for SecretList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretList")
            .field("len", &self.secrets.len())
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// EncryptionKey / KeyList
// ---------------------------------------------------------------------------

/// A 256-bit key, wiped from memory on drop.
#[derive(Clone)]
pub struct EncryptionKey {
    bytes: Zeroizing<[u8; KEY_LEN]>,
}

impl EncryptionKey {
    pub fn new(bytes: [u8; KEY_LEN]) -> Self {
        Self {
            bytes: Zeroizing::new(bytes),
        }
    }

    /// Decode a standard-base64 key. `index` is only used for error reporting.
    pub fn from_base64(encoded: &str, index: usize) -> Result<Self> {
        let decoded = Zeroizing::new(
            STANDARD
                .decode(encoded.trim())
                .map_err(|_| RotationError::InvalidKeyEncoding { index })?,
        );

        if decoded.len() != KEY_LEN {
            return Err(RotationError::InvalidKeyLength {
                index,
                length: decoded.len(),
            });
        }

        let mut bytes = [0u8; KEY_LEN];
        bytes.copy_from_slice(&decoded);
        Ok(Self::new(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }

    /// Short SHA-256 fingerprint for operator-facing output.
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(self.bytes.as_slice());
        digest[..8].iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EncryptionKey({})", self.fingerprint())
    }
}

/// Ordered, non-empty list of encryption keys. Index 0 encrypts.
#[derive(Debug, Clone)]
pub struct KeyList {
    keys: Vec<EncryptionKey>,
}

impl KeyList {
    pub fn new(keys: Vec<EncryptionKey>) -> Result<Self> {
        if keys.is_empty() {
            return Err(RotationError::MissingEncryptionKeys);
        }
        Ok(Self { keys })
    }

    /// Decode every entry, reporting the first bad one by index.
    pub fn from_base64<S: AsRef<str>>(encoded: &[S]) -> Result<Self> {
        let keys = encoded
            .iter()
            .enumerate()
            .map(|(index, k)| EncryptionKey::from_base64(k.as_ref(), index))
            .collect::<Result<Vec<_>>>()?;
        Self::new(keys)
    }

    pub fn primary(&self) -> &EncryptionKey {
        &self.keys[0]
    }

    pub fn get(&self, index: usize) -> Option<&EncryptionKey> {
        self.keys.get(index)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &EncryptionKey)> {
        self.keys.iter().enumerate()
    }

    /// Same rotation rule as [`SecretList::rotated`].
    pub fn rotated(&self, new_key: EncryptionKey, max_retained: usize) -> Result<Self> {
        let keep = max_retained.max(1);
        let mut next = Vec::with_capacity(keep);
        next.push(new_key);
        next.extend(self.keys.iter().take(keep - 1).cloned());
        Self::new(next)
    }
}
