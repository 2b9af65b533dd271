use serde::{Deserialize, Serialize};

/// Who a token is issued to. The signer adds issuer and timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionIdentity {
    pub subject: String,
    pub email: String,
    pub role: String,
}

impl SessionIdentity {
    pub fn new(
        subject: impl Into<String>,
        email: impl Into<String>,
        role: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            email: email.into(),
            role: role.into(),
        }
    }
}

/// JWT claims. Signed, never encrypted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Subject (user ID).
    pub sub: String,
    pub email: String,
    pub role: String,
    /// Issuer.
    pub iss: String,
    /// Issued at, seconds since the epoch.
    pub iat: i64,
    /// Expiration, seconds since the epoch.
    pub exp: i64,
}

impl JwtClaims {
    pub fn identity(&self) -> SessionIdentity {
        SessionIdentity::new(&self.sub, &self.email, &self.role)
    }
}
