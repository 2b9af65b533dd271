//! keyrotor: JWT signing secrets and field encryption keys that rotate
//! without downtime.
//!
//! Build one [`service::RotationService`] at startup and share it. Tokens
//! are signed with the current secret and accepted under any configured
//! secret; fields are encrypted under the current key with its index
//! embedded, and stay readable under any configured key.

pub mod cli;
pub mod config;
pub mod crypto;
pub mod errors;
pub mod events;
pub mod jwt;
pub mod keys;
pub mod logging;
pub mod service;

pub use errors::{Result, RotationError};
pub use service::{RotationService, RotationStatus};
