//! Rotation event journal and the fallback observer hook.

pub mod journal;
pub mod observer;

pub use journal::{RotationEvent, RotationEventLog, RotationKind, MAX_EVENTS};
pub use observer::{RotationObserver, TracingObserver};
