use std::sync::Arc;
use std::time::Duration;

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use super::claims::{JwtClaims, SessionIdentity};
use super::ttl::parse_ttl;
use crate::errors::{RotationError, Result};
use crate::events::{RotationKind, RotationObserver};
use crate::keys::SecretList;

/// Why a token was refused by every secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenError {
    /// A secret verified the signature but the token is past `exp`.
    #[error("token expired")]
    TokenExpired,
    /// Bad signature, bad issuer, or not a JWT at all.
    #[error("token invalid")]
    TokenInvalid,
}

/// Signs with the current secret and validates against the whole list.
pub struct JwtSigner {
    secrets: SecretList,
    encoding_key: EncodingKey,
    decoding_keys: Vec<DecodingKey>,
    validation: Validation,
    issuer: String,
    default_ttl: Duration,
    observer: Arc<dyn RotationObserver>,
}

impl JwtSigner {
    pub fn new(
        secrets: SecretList,
        issuer: impl Into<String>,
        default_ttl: Duration,
        observer: Arc<dyn RotationObserver>,
    ) -> Self {
        let issuer = issuer.into();

        let encoding_key = EncodingKey::from_secret(secrets.primary().as_bytes());
        let decoding_keys = secrets
            .iter()
            .map(|(_, secret)| DecodingKey::from_secret(secret.as_bytes()))
            .collect();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_issuer(&[&issuer]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);

        Self {
            secrets,
            encoding_key,
            decoding_keys,
            validation,
            issuer,
            default_ttl,
            observer,
        }
    }

    pub fn secrets(&self) -> &SecretList {
        &self.secrets
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Sign with the default lifetime.
    pub fn sign(&self, identity: &SessionIdentity) -> Result<String> {
        self.sign_for(identity, self.default_ttl)
    }

    /// Sign with a lifetime string such as `"15m"`.
    pub fn sign_with_ttl(&self, identity: &SessionIdentity, ttl: &str) -> Result<String> {
        self.sign_for(identity, parse_ttl(ttl)?)
    }

    /// Sign with secret 0, always.
    pub fn sign_for(&self, identity: &SessionIdentity, ttl: Duration) -> Result<String> {
        let now = chrono::Utc::now().timestamp();
        let lifetime = i64::try_from(ttl.as_secs())
            .map_err(|_| RotationError::InvalidTtl(format!("{}s", ttl.as_secs())))?;

        let claims = JwtClaims {
            sub: identity.subject.clone(),
            email: identity.email.clone(),
            role: identity.role.clone(),
            iss: self.issuer.clone(),
            iat: now,
            exp: now.saturating_add(lifetime),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| RotationError::TokenSigning(e.to_string()))
    }

    /// Claims from the first secret that accepts the token, or `None`.
    pub fn validate(&self, token: &str) -> Option<JwtClaims> {
        self.validate_with_error(token).ok()
    }

    /// Like [`JwtSigner::validate`] but says why the token was refused.
    ///
    /// `TokenExpired` wins if any secret got as far as the expiry check,
    /// since that secret proved the signature genuine.
    pub fn validate_with_error(&self, token: &str) -> std::result::Result<JwtClaims, TokenError> {
        let mut expired = false;

        for (index, key) in self.decoding_keys.iter().enumerate() {
            match decode::<JwtClaims>(token, key, &self.validation) {
                Ok(data) => {
                    if index > 0 {
                        self.observer
                            .previous_entry_used(RotationKind::JwtSecret, index);
                    }
                    return Ok(data.claims);
                }
                Err(e) => {
                    if matches!(e.kind(), ErrorKind::ExpiredSignature) {
                        expired = true;
                    }
                    debug!(secret_index = index, error = %e, "token rejected by secret");
                }
            }
        }

        Err(if expired {
            TokenError::TokenExpired
        } else {
            TokenError::TokenInvalid
        })
    }
}
