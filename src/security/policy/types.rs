use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// How strictly commands and paths are filtered
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum SecurityTier {
    /// Whitelist: only explicitly permitted commands run
    High,
    /// Blacklist: destructive patterns are refused, everything else runs
    #[default]
    Medium,
    /// Pass-through. Development only, no guarantees.
    Low,
}

/// Why a command or path was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
pub enum DenyReason {
    #[strum(serialize = "empty input")]
    EmptyInput,
    #[strum(serialize = "not whitelisted")]
    NotWhitelisted,
    #[strum(serialize = "blocked pattern")]
    BlockedPattern,
    #[strum(serialize = "outside allowed paths")]
    OutsideAllowedPaths,
    #[strum(serialize = "invalid path")]
    InvalidPath,
}

/// Outcome of evaluating a command or path against the active tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", content = "reason", rename_all = "lowercase")]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

impl Decision {
    /// `Ok(())` on allow, the deny reason otherwise.
    pub const fn into_result(self) -> Result<(), DenyReason> {
        match self {
            Self::Allow => Ok(()),
            Self::Deny(reason) => Err(reason),
        }
    }
}

impl From<Result<(), DenyReason>> for Decision {
    fn from(value: Result<(), DenyReason>) -> Self {
        match value {
            Ok(()) => Self::Allow,
            Err(reason) => Self::Deny(reason),
        }
    }
}
