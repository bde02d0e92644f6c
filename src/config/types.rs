use crate::error::ConfigError;
use crate::security::{SecurityTier, default_allowed_commands};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

// ── Top-level config ──────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base for relative paths and the working directory of commands.
    /// Taken from the process, not serialized.
    #[serde(skip)]
    pub workspace_dir: PathBuf,
    /// Where the config was loaded from, if anywhere.
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
    /// Shared secret expected in `X-API-Key`.
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default)]
    pub security: SecurityConfig,

    #[serde(default)]
    pub gateway: GatewayConfig,

    #[serde(default)]
    pub exec: ExecConfig,

    #[serde(default)]
    pub store: StoreConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            workspace_dir: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_path: None,
            api_key: None,
            security: SecurityConfig::default(),
            gateway: GatewayConfig::default(),
            exec: ExecConfig::default(),
            store: StoreConfig::default(),
        }
    }
}

impl Config {
    /// Reject values the server cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(relative) = self
            .security
            .allowed_paths
            .iter()
            .find(|p| !Path::new(p).is_absolute())
        {
            return Err(ConfigError::Validation(format!(
                "allowed path must be absolute: {relative}"
            )));
        }
        if self.exec.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "exec.timeout_secs must be greater than zero".into(),
            ));
        }
        if self.exec.timeout_secs > MAX_EXEC_TIMEOUT_SECS {
            return Err(ConfigError::Validation(format!(
                "exec.timeout_secs must be at most {MAX_EXEC_TIMEOUT_SECS}"
            )));
        }
        if self.gateway.max_body_bytes == 0 {
            return Err(ConfigError::Validation(
                "gateway.max_body_bytes must be greater than zero".into(),
            ));
        }
        if self.gateway.is_public_bind() && !self.gateway.allow_public_bind {
            return Err(ConfigError::Validation(format!(
                "refusing to bind to {} without [gateway] allow_public_bind = true",
                self.gateway.host
            )));
        }
        Ok(())
    }

    /// Make sure an API key is present, generating one if needed.
    /// Returns `true` when a key was generated.
    pub fn ensure_api_key(&mut self) -> bool {
        if self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty()) {
            return false;
        }
        self.api_key = Some(crate::security::generate_api_key());
        true
    }

    /// The configured API key, or an empty string when none is set.
    pub fn api_key(&self) -> &str {
        self.api_key.as_deref().unwrap_or_default()
    }

    /// SQLite file backing the item store.
    pub fn store_path(&self) -> PathBuf {
        match &self.store.path {
            Some(path) if path.is_absolute() => path.clone(),
            Some(path) => self.workspace_dir.join(path),
            None => crate::config::default_config_dir()
                .unwrap_or_else(|| self.workspace_dir.join(".sysgate"))
                .join("items.sqlite3"),
        }
    }
}

// ── Security ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// `high`, `medium` (default) or `low`
    #[serde(default)]
    pub level: SecurityTier,
    /// Absolute directory prefixes. Empty means the working directory.
    #[serde(default)]
    pub allowed_paths: Vec<String>,
    /// High-tier whitelist of base command names
    #[serde(default = "default_allowed_commands")]
    pub allowed_commands: Vec<String>,
    /// Extra medium-tier substrings to refuse
    #[serde(default)]
    pub blocked_patterns: Vec<String>,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            level: SecurityTier::default(),
            allowed_paths: Vec::new(),
            allowed_commands: default_allowed_commands(),
            blocked_patterns: Vec::new(),
        }
    }
}

// ── Gateway ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Gateway host (default: 127.0.0.1)
    #[serde(default = "default_gateway_host")]
    pub host: String,
    /// Gateway port (default: 8000)
    #[serde(default = "default_gateway_port")]
    pub port: u16,
    /// Allow binding to non-localhost (default: false)
    #[serde(default)]
    pub allow_public_bind: bool,
    /// Maximum request body size in bytes (default: 10 MiB)
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
    /// Origins allowed by CORS. Empty disables the layer.
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_gateway_host() -> String {
    "127.0.0.1".into()
}

fn default_gateway_port() -> u16 {
    8000
}

fn default_max_body_bytes() -> usize {
    10 * 1024 * 1024
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_gateway_host(),
            port: default_gateway_port(),
            allow_public_bind: false,
            max_body_bytes: default_max_body_bytes(),
            cors_origins: Vec::new(),
        }
    }
}

impl GatewayConfig {
    /// True when the bind address is not a loopback address.
    pub fn is_public_bind(&self) -> bool {
        !matches!(
            self.host.as_str(),
            "127.0.0.1" | "localhost" | "::1" | "[::1]" | "0:0:0:0:0:0:0:1"
        )
    }
}

// ── Exec ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecConfig {
    /// Per-command deadline in seconds (default: 60)
    #[serde(default = "default_exec_timeout_secs")]
    pub timeout_secs: u64,
    /// Cap on captured stdout and stderr, each (default: 1 MiB)
    #[serde(default = "default_max_output_bytes")]
    pub max_output_bytes: usize,
}

/// One day. Longer deadlines are almost certainly a typo.
pub const MAX_EXEC_TIMEOUT_SECS: u64 = 86_400;

fn default_exec_timeout_secs() -> u64 {
    60
}

fn default_max_output_bytes() -> usize {
    1_048_576
}

impl Default for ExecConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_exec_timeout_secs(),
            max_output_bytes: default_max_output_bytes(),
        }
    }
}

impl ExecConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

// ── Store ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    /// SQLite file. Relative paths are taken from the workspace;
    /// unset means `~/.sysgate/items.sqlite3`.
    #[serde(default)]
    pub path: Option<PathBuf>,
}
