//! Configuration management for pass-env

pub mod schema;

pub use schema::Config;

use crate::error::{PassEnvError, PassEnvResult};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Location of the config file, with load and save
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Config at `path`, or at the default location when `None`
    pub fn new(path: Option<PathBuf>) -> Self {
        Self {
            config_path: path.unwrap_or_else(Self::default_config_path),
        }
    }

    /// Config file at a specific path
    pub fn with_path(path: PathBuf) -> Self {
        Self::new(Some(path))
    }

    /// `<config-dir>/pass-env/config.toml`
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("pass-env")
            .join("config.toml")
    }

    /// `<data-local-dir>/pass-env`
    pub fn default_state_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("pass-env")
    }

    /// Load the config, falling back to defaults when the file is absent
    pub async fn load(&self) -> PassEnvResult<Config> {
        let path = &self.config_path;
        let content = match fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No config at {}, using defaults", path.display());
                return Ok(Config::default());
            }
            Err(e) => {
                return Err(PassEnvError::io(
                    format!("reading config from {}", path.display()),
                    e,
                ))
            }
        };

        toml::from_str(&content).map_err(|e| PassEnvError::ConfigInvalid {
            path: path.clone(),
            reason: e.to_string(),
        })
    }

    /// Write `config`, creating the config directory if needed
    pub async fn save(&self, config: &Config) -> PassEnvResult<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| PassEnvError::ConfigDirCreate {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
        }

        let content = toml::to_string_pretty(config)?;
        fs::write(&self.config_path, content).await.map_err(|e| {
            PassEnvError::io(format!("writing config to {}", self.config_path.display()), e)
        })?;

        info!("Configuration saved to {}", self.config_path.display());
        Ok(())
    }

    /// Config file path
    pub fn path(&self) -> &Path {
        &self.config_path
    }
}
