//! CLI module — Clap argument parser, output helpers, and command implementations.

pub mod commands;
pub mod output;

use std::path::Path;

use clap::Parser;

use crate::config::Settings;
use crate::errors::Result;
use crate::service::RotationService;

/// keyrotor CLI: inspect and exercise secret rotation.
#[derive(Parser)]
#[command(
    name = "keyrotor",
    about = "Rotating JWT secrets and field encryption keys",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Directory containing .keyrotor.toml (default: current directory)
    #[arg(long, env = "KEYROTOR_CONFIG_DIR", default_value = ".", global = true)]
    pub config_dir: String,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Show configured secret/key counts, grace period and last event
    Status,

    /// Show recent rotation events
    Events {
        /// Number of entries to show (default: 20)
        #[arg(long, default_value = "20")]
        last: usize,
    },

    /// Encrypt a value with the current key
    Encrypt {
        /// Plaintext to encrypt
        plaintext: String,
    },

    /// Decrypt a payload (current or legacy format)
    Decrypt {
        /// Encrypted payload
        payload: String,
    },

    /// Re-encrypt a JSON batch of {"id", "payload"} records under the current key
    ReEncrypt {
        /// Path to the JSON batch file
        file: String,

        /// Write results to this file instead of stdout
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Issue a session token signed with the current secret
    Sign {
        /// Subject (user ID)
        #[arg(long)]
        subject: String,
        /// Email claim
        #[arg(long)]
        email: String,
        /// Role claim
        #[arg(long)]
        role: String,
        /// Token lifetime, e.g. 15m, 12h (default: from config)
        #[arg(long)]
        ttl: Option<String>,
    },

    /// Validate a session token against every configured secret
    Verify {
        /// The token to validate
        token: String,
    },
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Load settings from `--config-dir`, overlaid with environment variables.
pub fn load_settings(cli: &Cli) -> Result<Settings> {
    Settings::load(Path::new(&cli.config_dir))?.with_env_overrides()
}

/// Build the service the way an application's startup would.
pub fn load_service(cli: &Cli) -> Result<RotationService> {
    let settings = load_settings(cli)?;
    RotationService::new(&settings)
}
