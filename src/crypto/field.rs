//! `FieldCipher`: encrypt/decrypt sensitive fields across key rotations.
//!
//! Encryption always uses key 0 and embeds that index in the payload.
//! Decryption goes straight to the embedded key and only scans the whole
//! list when that fails, the index is unusable, or the payload is legacy.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use super::encryption::{open, seal};
use super::payload::{peek_key_index, EncryptedPayload};
use crate::errors::{RotationError, Result};
use crate::events::{RotationEventLog, RotationKind, RotationObserver};
use crate::keys::KeyList;

/// One record to migrate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchItem<I> {
    pub id: I,
    pub payload: String,
}

/// Outcome for one record. On failure `payload` is the input, untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchResult<I> {
    pub id: I,
    pub payload: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub struct FieldCipher {
    keys: KeyList,
    events: Arc<RotationEventLog>,
    observer: Arc<dyn RotationObserver>,
}

impl FieldCipher {
    pub fn new(
        keys: KeyList,
        events: Arc<RotationEventLog>,
        observer: Arc<dyn RotationObserver>,
    ) -> Self {
        Self {
            keys,
            events,
            observer,
        }
    }

    pub fn keys(&self) -> &KeyList {
        &self.keys
    }

    /// Encrypt under the current key: `"0:<iv>:<tag>:<ciphertext>"`.
    pub fn encrypt(&self, plaintext: &str) -> Result<String> {
        let sealed = seal(self.keys.primary().as_bytes(), plaintext.as_bytes())?;
        Ok(EncryptedPayload::indexed(0, sealed).to_string())
    }

    /// Decrypt either payload format.
    ///
    /// Malformed payloads fail immediately; otherwise every key is tried
    /// before giving up with `DecryptionFailed`.
    pub fn decrypt(&self, payload: &str) -> Result<String> {
        let parsed = EncryptedPayload::parse(payload)?;
        let mut attempts = 0;

        let direct = parsed.key_index();
        if let Some(index) = direct {
            match self.keys.get(index) {
                Some(key) => {
                    attempts += 1;
                    if let Ok(plaintext) = open(key.as_bytes(), &parsed.sealed) {
                        if index > 0 {
                            self.observer
                                .previous_entry_used(RotationKind::EncryptionKey, index);
                        }
                        return into_utf8(plaintext);
                    }
                    debug!(key_index = index, "embedded key failed authentication, scanning all keys");
                }
                None => {
                    debug!(key_index = index, keys = self.keys.len(), "embedded key index out of range");
                }
            }
        }

        for (index, key) in self.keys.iter() {
            if direct == Some(index) {
                continue;
            }
            attempts += 1;
            if let Ok(plaintext) = open(key.as_bytes(), &parsed.sealed) {
                if index > 0 || direct.is_some() {
                    self.observer
                        .previous_entry_used(RotationKind::EncryptionKey, index);
                }
                return into_utf8(plaintext);
            }
        }

        Err(RotationError::DecryptionFailed { attempts })
    }

    /// Decrypt with whatever key works, then encrypt under the current key.
    pub fn re_encrypt(&self, payload: &str) -> Result<String> {
        let plaintext = self.decrypt(payload)?;
        self.encrypt(&plaintext)
    }

    /// Structural check of the embedded index; nothing is decrypted.
    pub fn is_encrypted_with_current_key(&self, payload: &str) -> bool {
        peek_key_index(payload) == Some(0)
    }

    /// Move every item onto the current key.
    ///
    /// Items already on key 0 are passed through. A failing item is reported
    /// in its own result and never stops the batch. Results come back in
    /// input order, and one aggregate `ENCRYPTION_KEY` event is recorded.
    ///
    /// The pass-through uses [`FieldCipher::is_encrypted_with_current_key`],
    /// which reads the index and nothing else. A skipped item therefore has
    /// `success = true` without ever being decrypted: a corrupt `"0:..."`
    /// value, or one written as `0:` under a key that has since been demoted,
    /// comes back unchanged and counted as skipped. `success` means "on the
    /// current key or moved there", not "verified decryptable"; call
    /// [`FieldCipher::re_encrypt`] to force a check.
    pub fn re_encrypt_batch<I>(
        &self,
        items: impl IntoIterator<Item = BatchItem<I>>,
    ) -> Vec<BatchResult<I>> {
        let mut skipped = 0usize;
        let mut failed = 0usize;

        let results: Vec<BatchResult<I>> = items
            .into_iter()
            .map(|item| {
                if self.is_encrypted_with_current_key(&item.payload) {
                    skipped += 1;
                    return BatchResult {
                        id: item.id,
                        payload: item.payload,
                        success: true,
                        error: None,
                    };
                }

                match self.re_encrypt(&item.payload) {
                    Ok(payload) => BatchResult {
                        id: item.id,
                        payload,
                        success: true,
                        error: None,
                    },
                    Err(e) => {
                        failed += 1;
                        BatchResult {
                            id: item.id,
                            payload: item.payload,
                            success: false,
                            error: Some(e.to_string()),
                        }
                    }
                }
            })
            .collect();

        let total = results.len();
        let succeeded = total - failed;
        self.events.record(
            RotationKind::EncryptionKey,
            failed == 0,
            (failed > 0).then(|| format!("{failed} of {total} items failed to re-encrypt")),
            Some(json!({
                "operation": "re_encrypt_batch",
                "total": total,
                "succeeded": succeeded,
                "failed": failed,
                "skipped": skipped,
            })),
        );

        results
    }
}

fn into_utf8(plaintext: Vec<u8>) -> Result<String> {
    String::from_utf8(plaintext)
        .map_err(|_| RotationError::InvalidPayloadFormat("decrypted value is not UTF-8".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::encryption::seal;
    use crate::events::TracingObserver;
    use crate::keys::EncryptionKey;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Counting(AtomicUsize);

    impl RotationObserver for Counting {
        fn previous_entry_used(&self, _kind: RotationKind, _index: usize) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn cipher(keys: &[[u8; 32]]) -> FieldCipher {
        let list = KeyList::new(keys.iter().copied().map(EncryptionKey::new).collect()).unwrap();
        FieldCipher::new(list, Arc::new(RotationEventLog::new()), Arc::new(TracingObserver))
    }

    fn legacy_payload(key: &[u8; 32], plaintext: &str) -> String {
        let sealed = seal(key, plaintext.as_bytes()).unwrap();
        let current = EncryptedPayload::indexed(0, sealed).to_string();
        current["0:".len()..].to_string()
    }

    #[test]
    fn encrypt_prefixes_index_zero_and_roundtrips() {
        let c = cipher(&[[1u8; 32]]);
        let payload = c.encrypt("hello-world").unwrap();
        assert!(payload.starts_with("0:"));
        assert_eq!(c.decrypt(&payload).unwrap(), "hello-world");
    }

    #[test]
    fn legacy_payload_decrypts_with_any_configured_key() {
        let old = [7u8; 32];
        let c = cipher(&[[8u8; 32], old]);
        let legacy = legacy_payload(&old, "legacy-value");
        assert_eq!(c.decrypt(&legacy).unwrap(), "legacy-value");
    }

    #[test]
    fn out_of_range_index_falls_back_to_scan() {
        let key = [3u8; 32];
        let c = cipher(&[key]);
        let payload = format!("5:{}", legacy_payload(&key, "v"));
        assert_eq!(c.decrypt(&payload).unwrap(), "v");
    }

    #[test]
    fn wrong_embedded_index_falls_back_and_notifies() {
        let old = [4u8; 32];
        let list = KeyList::new(vec![EncryptionKey::new([5u8; 32]), EncryptionKey::new(old)]).unwrap();
        let counter = Arc::new(Counting::default());
        let c = FieldCipher::new(list, Arc::new(RotationEventLog::new()), counter.clone());

        // Produced under `old` while it was current, so it claims index 0.
        let payload = format!("0:{}", legacy_payload(&old, "moved"));
        assert_eq!(c.decrypt(&payload).unwrap(), "moved");
        assert_eq!(counter.0.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn unknown_key_exhausts_every_attempt() {
        let c = cipher(&[[1u8; 32], [2u8; 32]]);
        let foreign = legacy_payload(&[9u8; 32], "x");
        assert!(matches!(
            c.decrypt(&foreign),
            Err(RotationError::DecryptionFailed { attempts: 2 })
        ));
    }

    #[test]
    fn malformed_payload_is_rejected_without_attempts() {
        let c = cipher(&[[1u8; 32]]);
        assert!(matches!(
            c.decrypt("not-a-payload"),
            Err(RotationError::InvalidPayloadFormat(_))
        ));
    }

    #[test]
    fn re_encrypt_converges_on_current_key() {
        let old = [6u8; 32];
        let c = cipher(&[[7u8; 32], old]);
        let legacy = legacy_payload(&old, "pii");
        assert!(!c.is_encrypted_with_current_key(&legacy));

        let fresh = c.re_encrypt(&legacy).unwrap();
        assert!(c.is_encrypted_with_current_key(&fresh));
        assert_eq!(c.decrypt(&fresh).unwrap(), "pii");
    }

    #[test]
    fn batch_skip_is_structural_and_does_not_decrypt() {
        let events = Arc::new(RotationEventLog::new());
        let list = KeyList::new(vec![EncryptionKey::new([1u8; 32])]).unwrap();
        let c = FieldCipher::new(list, events.clone(), Arc::new(TracingObserver));

        let results = c.re_encrypt_batch(vec![BatchItem {
            id: "corrupt",
            payload: "0:garbage:x:y".to_string(),
        }]);

        assert!(results[0].success);
        assert_eq!(results[0].payload, "0:garbage:x:y");
        assert!(c.decrypt(&results[0].payload).is_err());

        let meta = events.last().unwrap().metadata.unwrap();
        assert_eq!(meta["skipped"], 1);
        assert_eq!(meta["failed"], 0);
    }

    #[test]
    fn batch_isolates_failures_and_records_one_event() {
        let old = [1u8; 32];
        let events = Arc::new(RotationEventLog::new());
        let list = KeyList::new(vec![EncryptionKey::new([2u8; 32]), EncryptionKey::new(old)]).unwrap();
        let c = FieldCipher::new(list, events.clone(), Arc::new(TracingObserver));

        let current = c.encrypt("already").unwrap();
        let items = vec![
            BatchItem { id: 1, payload: legacy_payload(&old, "a") },
            BatchItem { id: 2, payload: "broken".to_string() },
            BatchItem { id: 3, payload: current.clone() },
        ];

        let results = c.re_encrypt_batch(items);
        assert_eq!(results.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1, 2, 3]);
        assert!(results[0].success);
        assert!(results[0].payload.starts_with("0:"));
        assert!(!results[1].success);
        assert_eq!(results[1].payload, "broken");
        assert!(results[1].error.is_some());
        assert!(results[2].success);
        assert_eq!(results[2].payload, current);

        assert_eq!(events.len(), 1);
        let event = events.last().unwrap();
        assert!(!event.success);
        let meta = event.metadata.unwrap();
        assert_eq!(meta["total"], 3);
        assert_eq!(meta["failed"], 1);
        assert_eq!(meta["skipped"], 1);
    }
}
