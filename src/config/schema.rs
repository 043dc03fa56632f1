//! Configuration schema for pass-env
//!
//! Configuration is stored at `~/.config/pass-env/config.toml`

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Vault backend settings
    pub vault: VaultConfig,

    /// Named sets of NAME=PASS_NAME pairs
    pub aliases: BTreeMap<String, Vec<String>>,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log format: "text" or "json"
    pub log_format: String,

    /// Enable audit logging
    pub audit_log: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
            audit_log: true,
        }
    }
}

/// Vault backend configuration, shared by the primary and cache stores
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VaultConfig {
    /// Program implementing the pass(1) command-line contract
    pub program: String,

    /// Arguments placed before every subcommand (e.g. a wrapper script)
    pub args: Vec<String>,

    /// Primary password store used by `init` when no flag or env is given
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_store_dir: Option<PathBuf>,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            program: "pass".to_string(),
            args: vec![],
            password_store_dir: None,
        }
    }
}

impl Config {
    /// Whether structured JSON logging was requested
    pub fn json_logs(&self) -> bool {
        self.general.log_format.eq_ignore_ascii_case("json")
    }
}
