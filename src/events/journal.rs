//! Bounded, append-only journal of rotation outcomes.
//!
//! Holds at most [`MAX_EVENTS`] entries; the oldest is evicted first.
//! Shared between the JWT and encryption subsystems behind an `Arc`.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info};

/// Maximum number of events kept in memory.
pub const MAX_EVENTS: usize = 100;

/// Which list an event is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RotationKind {
    JwtSecret,
    EncryptionKey,
}

impl std::fmt::Display for RotationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::JwtSecret => f.write_str("JWT_SECRET"),
            Self::EncryptionKey => f.write_str("ENCRYPTION_KEY"),
        }
    }
}

/// A single journal entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RotationEvent {
    #[serde(rename = "type")]
    pub kind: RotationKind,
    pub timestamp: DateTime<Utc>,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

/// FIFO journal capped at a fixed capacity.
#[derive(Debug)]
pub struct RotationEventLog {
    events: Mutex<VecDeque<RotationEvent>>,
    capacity: usize,
}

impl Default for RotationEventLog {
    fn default() -> Self {
        Self::new()
    }
}

impl RotationEventLog {
    pub fn new() -> Self {
        Self::with_capacity(MAX_EVENTS)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            events: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    /// Seed a journal with existing events (oldest first), keeping only
    /// the newest `MAX_EVENTS`.
    pub fn from_events(events: Vec<RotationEvent>) -> Self {
        let log = Self::new();
        {
            let mut guard = log.lock();
            for event in events {
                push_bounded(&mut guard, event, log.capacity);
            }
        }
        log
    }

    /// Append an event and log it: `error!` on failure, `info!` on success.
    pub fn record(
        &self,
        kind: RotationKind,
        success: bool,
        error: Option<String>,
        metadata: Option<Value>,
    ) -> RotationEvent {
        let event = RotationEvent {
            kind,
            timestamp: Utc::now(),
            success,
            error,
            metadata,
        };

        if event.success {
            info!(kind = %event.kind, metadata = ?event.metadata, "rotation event");
        } else {
            error!(
                kind = %event.kind,
                error = event.error.as_deref().unwrap_or("unknown"),
                metadata = ?event.metadata,
                "rotation event failed"
            );
        }

        push_bounded(&mut self.lock(), event.clone(), self.capacity);
        event
    }

    /// The most recent event, if any.
    pub fn last(&self) -> Option<RotationEvent> {
        self.lock().back().cloned()
    }

    /// Up to `limit` most recent events, oldest first (most recent last).
    pub fn recent(&self, limit: usize) -> Vec<RotationEvent> {
        let guard = self.lock();
        let skip = guard.len().saturating_sub(limit);
        guard.iter().skip(skip).cloned().collect()
    }

    /// Every retained event, oldest first.
    pub fn snapshot(&self) -> Vec<RotationEvent> {
        self.lock().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    // A poisoned lock only means another thread panicked mid-push; the
    // deque itself is still consistent.
    fn lock(&self) -> MutexGuard<'_, VecDeque<RotationEvent>> {
        self.events.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn push_bounded(events: &mut VecDeque<RotationEvent>, event: RotationEvent, capacity: usize) {
    while events.len() >= capacity {
        events.pop_front();
    }
    events.push_back(event);
}
