mod command;
mod path;
mod types;

pub use path::{
    absolute_path, canonicalize_lenient, evaluate_path, is_within_any, resolve_path,
};
pub use types::{Decision, DenyReason, SecurityTier};

use std::path::{Path, PathBuf};

/// Command and path policy, built once at startup and shared read-only.
#[derive(Debug, Clone)]
pub struct SecurityPolicy {
    pub tier: SecurityTier,
    /// Base for relative paths and the working directory of executed commands.
    pub workspace_dir: PathBuf,
    /// Canonicalized allowed prefixes. Never empty.
    pub allowed_paths: Vec<PathBuf>,
    /// High-tier whitelist of base command names.
    pub allowed_commands: Vec<String>,
    /// Medium-tier substrings refused in addition to the built-in list.
    pub extra_blocked_patterns: Vec<String>,
}

impl Default for SecurityPolicy {
    fn default() -> Self {
        let workspace_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::new(SecurityTier::default(), &workspace_dir, &[])
    }
}

impl SecurityPolicy {
    /// Build a policy. An empty `allowed_paths` falls back to `workspace_dir`.
    pub fn new(tier: SecurityTier, workspace_dir: &Path, allowed_paths: &[PathBuf]) -> Self {
        let workspace_dir = canonicalize_lenient(workspace_dir);
        let mut prefixes: Vec<PathBuf> = Vec::with_capacity(allowed_paths.len().max(1));
        for prefix in allowed_paths {
            let absolute = if prefix.is_absolute() {
                prefix.clone()
            } else {
                workspace_dir.join(prefix)
            };
            let canonical = canonicalize_lenient(&absolute);
            if !prefixes.contains(&canonical) {
                prefixes.push(canonical);
            }
        }
        if prefixes.is_empty() {
            prefixes.push(workspace_dir.clone());
        }

        Self {
            tier,
            workspace_dir,
            allowed_paths: prefixes,
            allowed_commands: crate::security::default_allowed_commands(),
            extra_blocked_patterns: Vec::new(),
        }
    }

    /// Build from the `[security]` config section.
    pub fn from_config(config: &crate::config::SecurityConfig, workspace_dir: &Path) -> Self {
        let allowed: Vec<PathBuf> = config.allowed_paths.iter().map(PathBuf::from).collect();
        Self {
            allowed_commands: config.allowed_commands.clone(),
            extra_blocked_patterns: config.blocked_patterns.clone(),
            ..Self::new(config.level, workspace_dir, &allowed)
        }
    }

    #[must_use]
    pub fn with_allowed_commands<I, S>(mut self, commands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_commands = commands.into_iter().map(Into::into).collect();
        self
    }

    /// Decide whether a shell command may run under the active tier.
    pub fn evaluate_command(&self, command: &str) -> Decision {
        if command.trim().is_empty() {
            return Decision::Deny(DenyReason::EmptyInput);
        }
        match self.tier {
            SecurityTier::Low => Decision::Allow,
            SecurityTier::Medium => command::evaluate_blacklist(command, &self.extra_blocked_patterns),
            SecurityTier::High => command::evaluate_whitelist(command, &self.allowed_commands),
        }
    }

    /// Decide whether a filesystem path may be touched under the active tier.
    pub fn evaluate_path(&self, path: &str) -> Decision {
        self.authorize_path(path).map(|_| ()).into()
    }

    /// Resolve `path` and check it against the allowed prefixes. On success
    /// the canonical path is returned; all I/O must go through it.
    pub fn authorize_path(&self, path: &str) -> Result<PathBuf, DenyReason> {
        let resolved = resolve_path(path, &self.workspace_dir)?;
        match self.tier {
            SecurityTier::Low => Ok(resolved),
            SecurityTier::Medium | SecurityTier::High => {
                if is_within_any(&resolved, &self.allowed_paths) {
                    Ok(resolved)
                } else {
                    Err(DenyReason::OutsideAllowedPaths)
                }
            }
        }
    }
}
