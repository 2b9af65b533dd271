//! Integration tests for the keyrotor crypto module.

use std::sync::Arc;

use keyrotor::crypto::{open, seal, EncryptedPayload, FieldCipher, KeyHint, IV_LEN, TAG_LEN};
use keyrotor::events::{RotationEventLog, TracingObserver};
use keyrotor::keys::{EncryptionKey, KeyList};
use keyrotor::RotationError;

fn cipher(keys: &[u8]) -> FieldCipher {
    let list = KeyList::new(keys.iter().map(|b| EncryptionKey::new([*b; 32])).collect()).unwrap();
    FieldCipher::new(list, Arc::new(RotationEventLog::new()), Arc::new(TracingObserver))
}

// ---------------------------------------------------------------------------
// AES-256-GCM primitive
// ---------------------------------------------------------------------------

#[test]
fn seal_produces_detached_tag_and_same_length_ciphertext() {
    let key = [0xABu8; 32];
    let plaintext = b"DATABASE_URL=postgres://localhost/mydb";

    let sealed = seal(&key, plaintext).expect("seal should succeed");
    assert_eq!(sealed.iv.len(), IV_LEN);
    assert_eq!(sealed.tag.len(), TAG_LEN);
    assert_eq!(sealed.ciphertext.len(), plaintext.len());

    let recovered = open(&key, &sealed).expect("open should succeed");
    assert_eq!(recovered, plaintext);
}

#[test]
fn corrupted_ciphertext_fails_auth_check() {
    let key = [0xBBu8; 32];
    let mut sealed = seal(&key, b"VALUE=abc").expect("seal");
    sealed.ciphertext[0] ^= 0xFF;

    assert!(open(&key, &sealed).is_err(), "corrupted ciphertext must fail auth check");
}

// ---------------------------------------------------------------------------
// Payload wire format
// ---------------------------------------------------------------------------

#[test]
fn payload_fields_are_base64_of_expected_sizes() {
    let payload = cipher(&[1]).encrypt("hello").unwrap();
    let parts: Vec<&str> = payload.split(':').collect();

    assert_eq!(parts.len(), 4);
    assert_eq!(parts[0], "0");
    // 12 bytes -> 16 base64 chars, 16 bytes -> 24 base64 chars.
    assert_eq!(parts[1].len(), 16);
    assert_eq!(parts[2].len(), 24);

    let parsed = EncryptedPayload::parse(&payload).unwrap();
    assert_eq!(parsed.hint, KeyHint::Index(0));
    assert_eq!(parsed.to_string(), payload);
}

#[test]
fn two_encryptions_of_same_value_differ() {
    let c = cipher(&[1]);
    assert_ne!(c.encrypt("same").unwrap(), c.encrypt("same").unwrap());
}

#[test]
fn tampered_payload_is_a_decryption_error_not_a_format_error() {
    let c = cipher(&[1, 2]);
    let payload = c.encrypt("amount=100").unwrap();

    let mut parsed = EncryptedPayload::parse(&payload).unwrap();
    parsed.sealed.tag[3] ^= 0x01;

    assert!(matches!(
        c.decrypt(&parsed.to_string()),
        Err(RotationError::DecryptionFailed { attempts: 2 })
    ));
}

#[test]
fn non_numeric_index_scans_every_key() {
    let c = cipher(&[4, 5]);
    let payload = cipher(&[5]).encrypt("found").unwrap();
    let odd = format!("v{}", &payload[1..]);

    assert_eq!(c.decrypt(&odd).unwrap(), "found");
    assert!(!c.is_encrypted_with_current_key(&odd));
}

#[test]
fn field_count_other_than_three_or_four_is_rejected() {
    let c = cipher(&[1]);
    for bad in ["", "plain", "a:b", "0:a:b:c:d:e"] {
        assert!(
            matches!(c.decrypt(bad), Err(RotationError::InvalidPayloadFormat(_))),
            "{bad:?} should be an invalid-format error"
        );
    }
}

#[test]
fn bad_base64_is_rejected_as_format() {
    let c = cipher(&[1]);
    assert!(matches!(
        c.decrypt("0:!!!!:????:####"),
        Err(RotationError::InvalidPayloadFormat(_))
    ));
}
