use crate::domain::{config::CutermConfig, error::{CutermError, CutermResult}};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Configuration manager
pub struct ConfigManager {
    global_config_path: PathBuf,
}

impl ConfigManager {
    /// Create new configuration manager
    pub fn new() -> CutermResult<Self> {
        let global_config_path = Self::get_global_config_path()?;
        Ok(Self { global_config_path })
    }

    /// Manager rooted at an explicit file, e.g. from `--config`
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            global_config_path: path.into(),
        }
    }

    /// Load configuration, falling back to defaults when no file exists
    pub fn load_config(&self) -> CutermResult<CutermConfig> {
        if !self.global_config_path.exists() {
            debug!("No config file at {}", self.global_config_path.display());
            return Ok(CutermConfig::default());
        }
        self.load_config_from_path(&self.global_config_path)
    }

    /// Load configuration from specific path
    pub fn load_config_from_path(&self, path: &Path) -> CutermResult<CutermConfig> {
        let content = fs::read_to_string(path).map_err(|e| CutermError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        toml::from_str(&content).map_err(|e| CutermError::Config {
            message: format!("Failed to parse config file {}: {}", path.display(), e),
        })
    }

    /// Save configuration to specific path
    pub fn save_config_to_path(&self, path: &Path, config: &CutermConfig) -> CutermResult<()> {
        let content = toml::to_string_pretty(config).map_err(|e| CutermError::Config {
            message: format!("Failed to serialize config: {}", e),
        })?;

        fs::write(path, content).map_err(|e| CutermError::Config {
            message: format!("Failed to write config file {}: {}", path.display(), e),
        })
    }

    /// Write a default configuration file, refusing to overwrite one
    pub fn init_config(&self) -> CutermResult<&Path> {
        let path = self.global_config_path.as_path();
        if path.exists() {
            return Err(CutermError::Config {
                message: format!("Configuration already exists at {}", path.display()),
            });
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| CutermError::Config {
                message: format!("Failed to create config directory: {}", e),
            })?;
        }

        self.save_config_to_path(path, &CutermConfig::default())?;
        Ok(path)
    }

    /// Get the config file path
    pub fn config_path(&self) -> &Path {
        &self.global_config_path
    }

    /// Get global configuration path
    fn get_global_config_path() -> CutermResult<PathBuf> {
        let base = dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
            .ok_or_else(|| CutermError::Config {
                message: "Could not determine home directory".to_string(),
            })?;

        Ok(base.join("cuterm").join("config.toml"))
    }
}
