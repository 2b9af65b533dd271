//! `RotationService` — the composition root.
//!
//! Built once from `Settings` by the application and shared (`Arc`) with
//! request handlers and the data-access layer. Nothing here is global;
//! rotating means building a new instance from a rotated list.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde_json::json;

use crate::config::Settings;
use crate::crypto::{BatchItem, BatchResult, FieldCipher};
use crate::errors::Result;
use crate::events::{RotationEvent, RotationEventLog, RotationKind, RotationObserver, TracingObserver};
use crate::jwt::{parse_ttl, JwtClaims, JwtSigner, SessionIdentity, TokenError};
use crate::keys::{load_encryption_keys, load_jwt_secrets, EncryptionKey, KeyList, SecretList};

/// Snapshot returned by [`RotationService::status`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RotationStatus {
    pub jwt_secrets_count: usize,
    pub encryption_keys_count: usize,
    /// Configured rotation window. Informational only: nothing expires a
    /// previous secret or key automatically.
    pub grace_period_ms: u64,
    pub last_rotation_event: Option<RotationEvent>,
}

pub struct RotationService {
    jwt: JwtSigner,
    cipher: FieldCipher,
    events: Arc<RotationEventLog>,
    observer: Arc<dyn RotationObserver>,
    grace_period: Duration,
    max_retained: usize,
}

impl RotationService {
    /// Build from settings with the default `tracing` observer.
    pub fn new(settings: &Settings) -> Result<Self> {
        Self::with_observer(settings, Arc::new(TracingObserver))
    }

    /// Build from settings, reporting fallback usage to `observer`.
    pub fn with_observer(settings: &Settings, observer: Arc<dyn RotationObserver>) -> Result<Self> {
        let secrets = load_jwt_secrets(None, settings)?;
        let keys = load_encryption_keys(None, settings)?;
        Self::from_lists_with_observer(settings, secrets, keys, observer)
    }

    /// Build from lists that were already validated elsewhere, e.g. by
    /// `load_jwt_secrets(Some(explicit), ..)`.
    pub fn from_lists(settings: &Settings, secrets: SecretList, keys: KeyList) -> Result<Self> {
        Self::from_lists_with_observer(settings, secrets, keys, Arc::new(TracingObserver))
    }

    /// Every constructor ends here, so every fresh instance journals one
    /// load event per list.
    pub fn from_lists_with_observer(
        settings: &Settings,
        secrets: SecretList,
        keys: KeyList,
        observer: Arc<dyn RotationObserver>,
    ) -> Result<Self> {
        let service = Self::assemble(
            settings,
            secrets,
            keys,
            observer,
            Arc::new(RotationEventLog::new()),
        )?;

        service.events.record(
            RotationKind::JwtSecret,
            true,
            None,
            Some(json!({ "operation": "load", "count": service.jwt.secrets().len() })),
        );
        service.events.record(
            RotationKind::EncryptionKey,
            true,
            None,
            Some(json!({ "operation": "load", "count": service.cipher.keys().len() })),
        );

        Ok(service)
    }

    fn assemble(
        settings: &Settings,
        secrets: SecretList,
        keys: KeyList,
        observer: Arc<dyn RotationObserver>,
        events: Arc<RotationEventLog>,
    ) -> Result<Self> {
        let ttl = parse_ttl(&settings.jwt_ttl)?;
        let jwt = JwtSigner::new(secrets, settings.jwt_issuer.clone(), ttl, observer.clone());
        let cipher = FieldCipher::new(keys, events.clone(), observer.clone());

        Ok(Self {
            jwt,
            cipher,
            events,
            observer,
            grace_period: settings.grace_period(),
            max_retained: settings.max_retained,
        })
    }

    // ── JWT ──────────────────────────────────────────────────────────

    pub fn sign_jwt(&self, identity: &SessionIdentity) -> Result<String> {
        self.jwt.sign(identity)
    }

    pub fn sign_jwt_with_ttl(&self, identity: &SessionIdentity, ttl: &str) -> Result<String> {
        self.jwt.sign_with_ttl(identity, ttl)
    }

    pub fn validate_jwt(&self, token: &str) -> Option<JwtClaims> {
        self.jwt.validate(token)
    }

    pub fn validate_jwt_with_error(&self, token: &str) -> std::result::Result<JwtClaims, TokenError> {
        self.jwt.validate_with_error(token)
    }

    // ── Encryption ───────────────────────────────────────────────────

    pub fn encrypt(&self, plaintext: &str) -> Result<String> {
        self.cipher.encrypt(plaintext)
    }

    pub fn decrypt(&self, payload: &str) -> Result<String> {
        self.cipher.decrypt(payload)
    }

    pub fn re_encrypt(&self, payload: &str) -> Result<String> {
        self.cipher.re_encrypt(payload)
    }

    pub fn is_encrypted_with_current_key(&self, payload: &str) -> bool {
        self.cipher.is_encrypted_with_current_key(payload)
    }

    pub fn re_encrypt_batch<I>(
        &self,
        items: impl IntoIterator<Item = BatchItem<I>>,
    ) -> Vec<BatchResult<I>> {
        self.cipher.re_encrypt_batch(items)
    }

    // ── Status ───────────────────────────────────────────────────────

    pub fn status(&self) -> RotationStatus {
        RotationStatus {
            jwt_secrets_count: self.jwt.secrets().len(),
            encryption_keys_count: self.cipher.keys().len(),
            grace_period_ms: u64::try_from(self.grace_period.as_millis()).unwrap_or(u64::MAX),
            last_rotation_event: self.events.last(),
        }
    }

    /// Up to `limit` most recent events, most recent last.
    pub fn rotation_events(&self, limit: usize) -> Vec<RotationEvent> {
        self.events.recent(limit)
    }

    /// `(index, fingerprint)` for every configured encryption key.
    pub fn key_fingerprints(&self) -> Vec<(usize, String)> {
        self.cipher
            .keys()
            .iter()
            .map(|(index, key)| (index, key.fingerprint()))
            .collect()
    }

    pub fn jwt(&self) -> &JwtSigner {
        &self.jwt
    }

    pub fn cipher(&self) -> &FieldCipher {
        &self.cipher
    }

    // ── Rotation ─────────────────────────────────────────────────────

    /// A new service whose current JWT secret is `new_secret`; the old
    /// current becomes previous. `self` is left untouched and the event
    /// journal is carried over.
    pub fn rotate_jwt_secret(&self, new_secret: String) -> Result<Self> {
        let secrets = match self.jwt.secrets().rotated(new_secret, self.max_retained) {
            Ok(secrets) => secrets,
            Err(e) => {
                self.events.record(
                    RotationKind::JwtSecret,
                    false,
                    Some(e.to_string()),
                    Some(json!({ "operation": "rotate" })),
                );
                return Err(e);
            }
        };

        let next = self.successor(secrets, self.cipher.keys().clone());
        next.events.record(
            RotationKind::JwtSecret,
            true,
            None,
            Some(json!({ "operation": "rotate", "count": next.jwt.secrets().len() })),
        );
        Ok(next)
    }

    /// Same as [`RotationService::rotate_jwt_secret`] for the encryption
    /// key. `new_key` is standard base64 of 32 bytes.
    pub fn rotate_encryption_key(&self, new_key: &str) -> Result<Self> {
        let rotated = EncryptionKey::from_base64(new_key, 0)
            .and_then(|key| self.cipher.keys().rotated(key, self.max_retained));

        let keys = match rotated {
            Ok(keys) => keys,
            Err(e) => {
                self.events.record(
                    RotationKind::EncryptionKey,
                    false,
                    Some(e.to_string()),
                    Some(json!({ "operation": "rotate" })),
                );
                return Err(e);
            }
        };

        let next = self.successor(self.jwt.secrets().clone(), keys);
        next.events.record(
            RotationKind::EncryptionKey,
            true,
            None,
            Some(json!({ "operation": "rotate", "count": next.cipher.keys().len() })),
        );
        Ok(next)
    }

    fn successor(&self, secrets: SecretList, keys: KeyList) -> Self {
        let events = Arc::new(RotationEventLog::from_events(self.events.snapshot()));
        let jwt = JwtSigner::new(
            secrets,
            self.jwt.issuer().to_string(),
            self.jwt.default_ttl(),
            self.observer.clone(),
        );
        let cipher = FieldCipher::new(keys, events.clone(), self.observer.clone());

        Self {
            jwt,
            cipher,
            events,
            observer: self.observer.clone(),
            grace_period: self.grace_period,
            max_retained: self.max_retained,
        }
    }
}
