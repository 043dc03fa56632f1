//! Error types for pass-env
//!
//! All modules use `PassEnvResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for pass-env operations
pub type PassEnvResult<T> = Result<T, PassEnvError>;

/// Exit status for malformed invocations
pub const EXIT_INVALID_ARGS: u8 = 128;

/// Exit status when a requested secret cannot be resolved
pub const EXIT_SECRET_NOT_FOUND: u8 = 129;

/// All errors that can occur in pass-env
#[derive(Error, Debug)]
pub enum PassEnvError {
    // State errors
    #[error("pass-env is not initialized (state directory: {0})")]
    NotInitialized(PathBuf),

    #[error("pass-env is already initialized at {0}")]
    AlreadyInitialized(PathBuf),

    #[error("Could not find pass store: {0}")]
    PassStoreNotFound(String),

    #[error("Unable to find gpg key in '{0}'")]
    GpgIdNotFound(PathBuf),

    // Invocation errors
    #[error("{0}")]
    InvalidArgs(String),

    #[error("Invalid env pair '{0}', expected NAME=PASS_NAME")]
    InvalidEnvPair(String),

    #[error("Invalid alias '{name}': {reason}")]
    InvalidAlias { name: String, reason: String },

    #[error("Invalid cache key '{0}', expected a 64 character hex fingerprint")]
    InvalidFingerprint(String),

    // Secret resolution errors
    #[error("secret '{path}' not found in password store")]
    SecretNotFound {
        path: String,
        #[source]
        source: Box<PassEnvError>,
    },

    #[error("secret '{0}' is not valid UTF-8")]
    SecretNotUtf8(String),

    // Vault backend errors
    #[error("'{0}' is not in the password store")]
    StoreEntryNotFound(String),

    #[error("Cache entry not found: {0}")]
    CacheMiss(String),

    #[error("Failed to store cache entry '{fingerprint}': {reason}")]
    CacheWrite { fingerprint: String, reason: String },

    #[error("errors during clear:\n{}", .failures.join("\n"))]
    Invalidation { failures: Vec<String> },

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Process errors
    #[error("Command failed: {command}")]
    CommandFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Command execution error: {command}, stderr: {stderr}")]
    CommandExecution { command: String, stderr: String },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Index encoding error: {0}")]
    IndexEncoding(#[from] bincode::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    User(String),
}

impl PassEnvError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a command failed error
    pub fn command_failed(command: impl Into<String>, source: std::io::Error) -> Self {
        Self::CommandFailed {
            command: command.into(),
            source,
        }
    }

    /// Create a command execution error
    pub fn command_exec(command: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self::CommandExecution {
            command: command.into(),
            stderr: stderr.into(),
        }
    }

    /// Wrap a backend failure as a resolution failure for `path`
    pub fn secret_not_found(path: impl Into<String>, source: PassEnvError) -> Self {
        Self::SecretNotFound {
            path: path.into(),
            source: Box::new(source),
        }
    }

    /// Whether the backend reported the key as absent
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::StoreEntryNotFound(_))
    }

    /// Process exit status for this error
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::InvalidArgs(_) | Self::InvalidEnvPair(_) => EXIT_INVALID_ARGS,
            Self::SecretNotFound { .. } | Self::SecretNotUtf8(_) => EXIT_SECRET_NOT_FOUND,
            _ => 1,
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::NotInitialized(_) => Some("Run: pass-env init"),
            Self::PassStoreNotFound(_) => Some("Use --pass-store or set PASSWORD_STORE_DIR"),
            Self::GpgIdNotFound(_) => Some("Use --gpg to name the key explicitly"),
            Self::InvalidArgs(_) => Some("Usage: pass-env NAME=PASS_NAME... COMMAND [ARG]..."),
            Self::CommandFailed { .. } => Some("Is pass(1) installed and on PATH?"),
            _ => None,
        }
    }
}
