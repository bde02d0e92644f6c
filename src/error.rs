use std::path::PathBuf;

use thiserror::Error;

use crate::security::policy::DenyReason;

// ─── Top-level error hierarchy ───────────────────────────────────────────────

/// Structured error hierarchy for `sysgate`.
///
/// Each subsystem defines its own error variant. The gateway maps these onto
/// HTTP responses; the binary keeps using `anyhow::Result` for context chains.
#[derive(Debug, Error)]
pub enum SysgateError {
    // ── Config ───────────────────────────────────────────────────────────
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    // ── Command execution ───────────────────────────────────────────────
    #[error("exec: {0}")]
    Exec(#[from] ExecError),

    // ── Filesystem ──────────────────────────────────────────────────────
    #[error("fs: {0}")]
    Fs(#[from] FsError),

    // ── Record store ────────────────────────────────────────────────────
    #[error("store: {0}")]
    Store(#[from] StoreError),

    // ── Generic fallthrough (wraps anyhow for interop) ──────────────────
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ─── Config errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load config: {0}")]
    Load(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

// ─── Command execution errors ───────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("failed to spawn command: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("failed to wait for command: {0}")]
    Wait(#[source] std::io::Error),
}

// ─── Filesystem errors ──────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum FsError {
    #[error("blocked by security policy: {0}")]
    Denied(DenyReason),

    #[error("not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("file too large: {size} bytes (limit: {limit} bytes)")]
    TooLarge { size: u64, limit: u64 },

    #[error("file is not valid UTF-8")]
    NotUtf8,

    #[error("refusing to write through symlink: {}", .0.display())]
    Symlink(PathBuf),

    #[error("parent is not a directory: {}", .0.display())]
    ParentNotDirectory(PathBuf),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

// ─── Record store errors ────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("item {0} not found")]
    NotFound(i64),

    #[error("an item named {0:?} already exists")]
    Duplicate(String),

    #[error("schema: {0}")]
    Schema(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("sqlx: {0}")]
    Sqlx(#[from] sqlx::Error),
}

/// Convenience alias used throughout the library.
pub type Result<T, E = SysgateError> = std::result::Result<T, E>;
