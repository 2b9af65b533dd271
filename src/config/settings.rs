use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use crate::errors::{RotationError, Result};

/// Environment variable holding the current JWT signing secret.
pub const ENV_JWT_SECRET: &str = "JWT_SECRET";
/// Environment variable holding the previous JWT signing secret.
pub const ENV_JWT_SECRET_PREVIOUS: &str = "JWT_SECRET_PREVIOUS";
/// Environment variable holding the current base64 encryption key.
pub const ENV_ENCRYPTION_KEY: &str = "ENCRYPTION_KEY";
/// Environment variable holding the previous base64 encryption key.
pub const ENV_ENCRYPTION_KEY_PREVIOUS: &str = "ENCRYPTION_KEY_PREVIOUS";
/// Environment variable selecting `production` or `development`.
pub const ENV_ENVIRONMENT: &str = "KEYROTOR_ENVIRONMENT";

/// Deployment environment. Decides whether the insecure placeholder
/// material may ever be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Production,
    Development,
}

impl FromStr for Environment {
    type Err = RotationError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "production" => Ok(Self::Production),
            "development" => Ok(Self::Development),
            other => Err(RotationError::ConfigError(format!(
                "unknown environment '{other}' — expected 'production' or 'development'"
            ))),
        }
    }
}

/// Service configuration, loaded from `.keyrotor.toml`.
///
/// Explicit `jwt_secrets` / `encryption_keys` lists win over the
/// `current` + `previous` pairs. Everything except the secret material
/// has a default.
#[derive(Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub environment: Environment,

    /// Ordered JWT secrets, current first.
    #[serde(default)]
    pub jwt_secrets: Vec<String>,

    #[serde(default)]
    pub jwt_secret: Option<String>,

    #[serde(default)]
    pub jwt_secret_previous: Option<String>,

    /// Ordered base64 encryption keys, current first.
    #[serde(default)]
    pub encryption_keys: Vec<String>,

    #[serde(default)]
    pub encryption_key: Option<String>,

    #[serde(default)]
    pub encryption_key_previous: Option<String>,

    /// Value of the `iss` claim on issued tokens, also required on validation.
    #[serde(default = "default_jwt_issuer")]
    pub jwt_issuer: String,

    /// Default token lifetime (e.g. "15m").
    #[serde(default = "default_jwt_ttl")]
    pub jwt_ttl: String,

    /// Intended rotation window. Reported in status only; never enforced.
    #[serde(default = "default_grace_period_secs")]
    pub grace_period_secs: u64,

    /// How many entries a list keeps after a rotation (current included).
    #[serde(default = "default_max_retained")]
    pub max_retained: usize,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_jwt_issuer() -> String {
    "keyrotor".to_string()
}

fn default_jwt_ttl() -> String {
    "15m".to_string()
}

fn default_grace_period_secs() -> u64 {
    7 * 24 * 60 * 60 // 7 days
}

fn default_max_retained() -> usize {
    2
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            environment: Environment::default(),
            jwt_secrets: Vec::new(),
            jwt_secret: None,
            jwt_secret_previous: None,
            encryption_keys: Vec::new(),
            encryption_key: None,
            encryption_key_previous: None,
            jwt_issuer: default_jwt_issuer(),
            jwt_ttl: default_jwt_ttl(),
            grace_period_secs: default_grace_period_secs(),
            max_retained: default_max_retained(),
        }
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("environment", &self.environment)
            .field("jwt_secrets", &self.jwt_candidates().map_or(0, |c| c.len()))
            .field("encryption_keys", &self.key_candidates().map_or(0, |c| c.len()))
            .field("jwt_issuer", &self.jwt_issuer)
            .field("jwt_ttl", &self.jwt_ttl)
            .field("grace_period_secs", &self.grace_period_secs)
            .field("max_retained", &self.max_retained)
            .finish()
    }
}

impl Settings {
    /// Name of the config file we look for in the config directory.
    pub const FILE_NAME: &'static str = ".keyrotor.toml";

    /// Load settings from `<config_dir>/.keyrotor.toml`.
    ///
    /// A missing file yields defaults; an unparsable one is an error.
    pub fn load(config_dir: &Path) -> Result<Self> {
        let config_path = config_dir.join(Self::FILE_NAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)?;

        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            RotationError::ConfigError(format!("Failed to parse {}: {e}", config_path.display()))
        })?;

        Ok(settings)
    }

    /// Overlay values from the process environment.
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    /// Overlay values from an arbitrary lookup. Empty values are ignored.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.is_empty());

        if let Some(env) = get(ENV_ENVIRONMENT) {
            self.environment = env.parse()?;
        }
        if let Some(v) = get(ENV_JWT_SECRET) {
            self.jwt_secret = Some(v);
        }
        if let Some(v) = get(ENV_JWT_SECRET_PREVIOUS) {
            self.jwt_secret_previous = Some(v);
        }
        if let Some(v) = get(ENV_ENCRYPTION_KEY) {
            self.encryption_key = Some(v);
        }
        if let Some(v) = get(ENV_ENCRYPTION_KEY_PREVIOUS) {
            self.encryption_key_previous = Some(v);
        }

        Ok(self)
    }

    /// JWT secrets in precedence order: the explicit list if present,
    /// otherwise `current` then `previous`.
    ///
    /// A `previous` without a `current` is an error: it would otherwise
    /// slide into index 0 and start signing.
    pub fn jwt_candidates(&self) -> Result<Vec<String>> {
        ordered_candidates(
            &self.jwt_secrets,
            self.jwt_secret.as_deref(),
            self.jwt_secret_previous.as_deref(),
            (ENV_JWT_SECRET, ENV_JWT_SECRET_PREVIOUS),
        )
    }

    /// Base64 encryption keys in precedence order, same rules as
    /// [`Settings::jwt_candidates`].
    pub fn key_candidates(&self) -> Result<Vec<String>> {
        ordered_candidates(
            &self.encryption_keys,
            self.encryption_key.as_deref(),
            self.encryption_key_previous.as_deref(),
            (ENV_ENCRYPTION_KEY, ENV_ENCRYPTION_KEY_PREVIOUS),
        )
    }

    pub fn grace_period(&self) -> Duration {
        Duration::from_secs(self.grace_period_secs)
    }
}

fn ordered_candidates(
    explicit: &[String],
    current: Option<&str>,
    previous: Option<&str>,
    (current_name, previous_name): (&str, &str),
) -> Result<Vec<String>> {
    if !explicit.is_empty() {
        return Ok(explicit.to_vec());
    }

    let current = current.filter(|v| !v.is_empty());
    let previous = previous.filter(|v| !v.is_empty());

    match (current, previous) {
        (None, Some(_)) => Err(RotationError::ConfigError(format!(
            "{previous_name} is set but {current_name} is not; configure the current value first"
        ))),
        (current, previous) => Ok(current
            .into_iter()
            .chain(previous)
            .map(str::to_string)
            .collect()),
    }
}

// ── Tests ────────────────────────────────────────────────────────────
