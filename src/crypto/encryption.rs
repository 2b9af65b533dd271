//! AES-256-GCM authenticated encryption.
//!
//! Each call to `seal` generates a fresh random 12-byte IV. The 16-byte
//! authentication tag is kept apart from the ciphertext because the
//! payload format stores the two in separate fields.

use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{AeadCore, Aes256Gcm, Nonce};

use crate::errors::{RotationError, Result};
use crate::keys::KEY_LEN;

/// Size of the AES-256-GCM IV (nonce) in bytes.
pub const IV_LEN: usize = 12;

/// Size of the AES-256-GCM authentication tag in bytes.
pub const TAG_LEN: usize = 16;

/// The three parts of one AES-GCM encryption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sealed {
    pub iv: [u8; IV_LEN],
    pub tag: [u8; TAG_LEN],
    pub ciphertext: Vec<u8>,
}

/// Encrypt `plaintext` with a 32-byte `key`.
pub fn seal(key: &[u8; KEY_LEN], plaintext: &[u8]) -> Result<Sealed> {
    let cipher = Aes256Gcm::new_from_slice(key)
        .map_err(|e| RotationError::EncryptionFailed(format!("invalid key length: {e}")))?;

    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

    // aes-gcm appends the tag to the ciphertext; split it back off.
    let mut ciphertext = cipher
        .encrypt(&nonce, plaintext)
        .map_err(|e| RotationError::EncryptionFailed(format!("encryption error: {e}")))?;
    let tag_bytes = ciphertext.split_off(ciphertext.len() - TAG_LEN);

    let mut iv = [0u8; IV_LEN];
    iv.copy_from_slice(nonce.as_slice());
    let mut tag = [0u8; TAG_LEN];
    tag.copy_from_slice(&tag_bytes);

    Ok(Sealed { iv, tag, ciphertext })
}

/// Decrypt and authenticate `sealed` with a single key.
pub fn open(key: &[u8; KEY_LEN], sealed: &Sealed) -> Result<Vec<u8>> {
    let cipher = Aes256Gcm::new_from_slice(key)
        .map_err(|_| RotationError::DecryptionFailed { attempts: 1 })?;

    let mut combined = Vec::with_capacity(sealed.ciphertext.len() + TAG_LEN);
    combined.extend_from_slice(&sealed.ciphertext);
    combined.extend_from_slice(&sealed.tag);

    cipher
        .decrypt(Nonce::from_slice(&sealed.iv), combined.as_slice())
        .map_err(|_| RotationError::DecryptionFailed { attempts: 1 })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seal_open_roundtrip() {
        let key = [0xABu8; 32];
        let sealed = seal(&key, b"card-4242").unwrap();
        assert_eq!(sealed.ciphertext.len(), 9);
        assert_eq!(open(&key, &sealed).unwrap(), b"card-4242");
    }

    #[test]
    fn fresh_iv_every_call() {
        let key = [0xCDu8; 32];
        let a = seal(&key, b"same").unwrap();
        let b = seal(&key, b"same").unwrap();
        assert_ne!(a.iv, b.iv);
        assert_ne!(a, b);
    }

    #[test]
    fn wrong_key_fails() {
        let sealed = seal(&[0x11u8; 32], b"secret").unwrap();
        assert!(open(&[0x22u8; 32], &sealed).is_err());
    }

    #[test]
    fn tampered_tag_fails() {
        let key = [0x33u8; 32];
        let mut sealed = seal(&key, b"secret").unwrap();
        sealed.tag[0] ^= 0xFF;
        assert!(open(&key, &sealed).is_err());
    }

    #[test]
    fn empty_plaintext_roundtrips() {
        let key = [0x44u8; 32];
        let sealed = seal(&key, b"").unwrap();
        assert!(sealed.ciphertext.is_empty());
        assert_eq!(open(&key, &sealed).unwrap(), b"");
    }
}
