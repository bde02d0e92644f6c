use super::Config;
use crate::error::ConfigError;
use directories::UserDirs;
use std::fs;
use std::path::{Path, PathBuf};

/// `~/.sysgate`, when a home directory can be found.
pub fn default_config_dir() -> Option<PathBuf> {
    UserDirs::new().map(|u| u.home_dir().join(".sysgate"))
}

impl Config {
    /// Build the process config: file (explicit path, or
    /// `~/.sysgate/config.toml` when present), then environment, then
    /// validation.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let config_path = match explicit {
            Some(path) if !path.exists() => {
                return Err(ConfigError::Load(format!(
                    "config file not found: {}",
                    path.display()
                )));
            }
            Some(path) => Some(path.to_path_buf()),
            None => default_config_dir()
                .map(|dir| dir.join("config.toml"))
                .filter(|path| path.is_file()),
        };

        let mut config = match &config_path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.config_path = config_path;
        config.workspace_dir = std::env::current_dir()?;

        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML file without applying the environment.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&contents)
            .map_err(|e| ConfigError::Load(format!("{}: {e}", path.display())))?;
        config.config_path = Some(path.to_path_buf());
        Ok(config)
    }
}
