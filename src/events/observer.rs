use tracing::info;

use super::journal::RotationKind;

/// Notified whenever an operation only succeeded thanks to a non-current
/// entry — a token validated by a previous secret, or a payload opened by
/// a key other than the one it claims.
///
/// While this keeps firing, the old entry is still in use and must not be
/// removed from configuration yet.
pub trait RotationObserver: Send + Sync {
    fn previous_entry_used(&self, kind: RotationKind, index: usize);
}

/// Default observer: an `info!` line per occurrence.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl RotationObserver for TracingObserver {
    fn previous_entry_used(&self, kind: RotationKind, index: usize) {
        match kind {
            RotationKind::JwtSecret => {
                info!(secret_index = index, "token validated via previous secret");
            }
            RotationKind::EncryptionKey => {
                info!(key_index = index, "payload decrypted via previous key");
            }
        }
    }
}
