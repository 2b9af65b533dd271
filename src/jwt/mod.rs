//! Session tokens signed with a rotating list of HS256 secrets.
//!
//! - `claims`: what goes inside a token
//! - `signer`: sign with secret 0, validate against every secret in order
//! - `ttl`: "15m"-style lifetimes

pub mod claims;
pub mod signer;
pub mod ttl;

pub use claims::{JwtClaims, SessionIdentity};
pub use signer::{JwtSigner, TokenError};
pub use ttl::parse_ttl;
