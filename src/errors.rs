use thiserror::Error;

/// All errors that can occur in keyrotor.
#[derive(Debug, Error)]
pub enum RotationError {
    // --- Configuration errors ---
    #[error("JWT secret at index {index} is {length} characters; at least 32 are required")]
    SecretTooShort { index: usize, length: usize },

    #[error("Encryption key at index {index} decodes to {length} bytes; exactly 32 are required")]
    InvalidKeyLength { index: usize, length: usize },

    #[error("Encryption key at index {index} is not valid base64")]
    InvalidKeyEncoding { index: usize },

    #[error("No JWT secrets configured — set JWT_SECRET (required in production)")]
    MissingSecrets,

    #[error("No encryption keys configured — set ENCRYPTION_KEY (required in production)")]
    MissingEncryptionKeys,

    #[error("Config error: {0}")]
    ConfigError(String),

    // --- Crypto errors ---
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Invalid encrypted payload format: {0}")]
    InvalidPayloadFormat(String),

    #[error("Decryption failed — no configured key could authenticate the payload ({attempts} tried)")]
    DecryptionFailed { attempts: usize },

    // --- Token errors ---
    #[error("Token signing failed: {0}")]
    TokenSigning(String),

    #[error("Invalid token lifetime '{0}' — expected e.g. 30s, 15m, 12h, 7d")]
    InvalidTtl(String),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // --- Serialization errors ---
    #[error("Serialization error: {0}")]
    SerializationError(String),

    // --- CLI errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),
}

impl RotationError {
    /// True for the configuration family: fatal at startup.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::SecretTooShort { .. }
                | Self::InvalidKeyLength { .. }
                | Self::InvalidKeyEncoding { .. }
                | Self::MissingSecrets
                | Self::MissingEncryptionKeys
                | Self::ConfigError(_)
        )
    }
}

/// Convenience type alias for keyrotor results.
pub type Result<T> = std::result::Result<T, RotationError>;
