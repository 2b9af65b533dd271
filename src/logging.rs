//! `tracing` setup for the binary. Library code only emits events.

use tracing_subscriber::EnvFilter;

/// Environment variable holding an `EnvFilter` directive.
pub const LOG_ENV: &str = "KEYROTOR_LOG";

/// Install a stderr subscriber. Safe to call more than once.
pub fn init(verbose: bool) {
    let fallback = if verbose { "keyrotor=debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(fallback));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
