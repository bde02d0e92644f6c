use super::Config;
use crate::error::ConfigError;
use crate::security::SecurityTier;
use std::path::PathBuf;

/// Split a comma-separated `ALLOWED_PATHS` value, dropping empty entries.
fn parse_allowed_paths(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| shellexpand::tilde(entry).into_owned())
        .collect()
}

impl Config {
    /// Environment wins over the config file. An unparsable
    /// `SECURITY_LEVEL` is an error; other malformed numbers are ignored.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(key) = std::env::var("SYSGATE_API_KEY").or_else(|_| std::env::var("API_KEY"))
            && !key.is_empty()
        {
            self.api_key = Some(key);
        }

        if let Ok(level) = std::env::var("SECURITY_LEVEL")
            && !level.trim().is_empty()
        {
            self.security.level = level.trim().parse::<SecurityTier>().map_err(|_| {
                ConfigError::Validation(format!(
                    "SECURITY_LEVEL must be high, medium or low (got {level:?})"
                ))
            })?;
        }

        if let Ok(paths) = std::env::var("ALLOWED_PATHS")
            && !paths.trim().is_empty()
        {
            self.security.allowed_paths = parse_allowed_paths(&paths);
        }

        if let Ok(host) = std::env::var("SYSGATE_HOST").or_else(|_| std::env::var("HOST"))
            && !host.is_empty()
        {
            self.gateway.host = host;
        }

        if let Ok(port_str) = std::env::var("SYSGATE_PORT").or_else(|_| std::env::var("PORT"))
            && let Ok(port) = port_str.parse::<u16>()
        {
            self.gateway.port = port;
        }

        if let Ok(secs) = std::env::var("SYSGATE_EXEC_TIMEOUT_SECS")
            && let Ok(secs) = secs.parse::<u64>()
        {
            self.exec.timeout_secs = secs;
        }

        if let Ok(db) = std::env::var("SYSGATE_DB_PATH")
            && !db.is_empty()
        {
            self.store.path = Some(PathBuf::from(shellexpand::tilde(&db).as_ref()));
        }

        Ok(())
    }
}
