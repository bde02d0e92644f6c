//! Policy-gated file reads and writes.

use crate::error::FsError;
use crate::security::policy::{SecurityPolicy, absolute_path, is_within_any};
use crate::security::SecurityTier;
use serde::Serialize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncReadExt;

/// Largest file `read` will return.
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    File,
    Directory,
    Symlink,
    Other,
}

impl From<std::fs::FileType> for EntryType {
    fn from(ft: std::fs::FileType) -> Self {
        if ft.is_symlink() {
            Self::Symlink
        } else if ft.is_dir() {
            Self::Directory
        } else if ft.is_file() {
            Self::File
        } else {
            Self::Other
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirEntryInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub entry_type: EntryType,
    /// Byte size, files only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    File { path: PathBuf, content: String },
    Directory { path: PathBuf, entries: Vec<DirEntryInfo> },
}

impl ReadOutcome {
    pub fn path(&self) -> &Path {
        match self {
            Self::File { path, .. } | Self::Directory { path, .. } => path,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WriteReceipt {
    pub path: PathBuf,
    pub bytes_written: usize,
    /// Directories that did not exist before the write, outermost first.
    pub created_directories: Vec<PathBuf>,
}

/// Reads and writes files on paths the policy approves. No I/O happens
/// before the policy says yes, and all I/O uses the resolved path.
#[derive(Debug, Clone)]
pub struct FileGateway {
    policy: Arc<SecurityPolicy>,
}

impl FileGateway {
    pub const fn new(policy: Arc<SecurityPolicy>) -> Self {
        Self { policy }
    }

    fn authorize(&self, raw: &str) -> Result<PathBuf, FsError> {
        self.policy.authorize_path(raw).map_err(FsError::Denied)
    }

    /// Read a file, or list a directory.
    pub async fn read(&self, raw: &str) -> Result<ReadOutcome, FsError> {
        let path = self.authorize(raw)?;

        let metadata = match tokio::fs::metadata(&path).await {
            Ok(m) => m,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(FsError::NotFound(path)),
            Err(e) => return Err(e.into()),
        };

        if metadata.is_dir() {
            let entries = list_directory(&path).await?;
            return Ok(ReadOutcome::Directory { path, entries });
        }

        if metadata.len() > MAX_FILE_SIZE {
            return Err(FsError::TooLarge {
                size: metadata.len(),
                limit: MAX_FILE_SIZE,
            });
        }

        let file = tokio::fs::File::open(&path).await?;
        let mut bytes = Vec::with_capacity(usize::try_from(metadata.len()).unwrap_or(0));
        // Bounded read in case the file grows after the size check.
        file.take(MAX_FILE_SIZE + 1).read_to_end(&mut bytes).await?;
        if bytes.len() as u64 > MAX_FILE_SIZE {
            return Err(FsError::TooLarge {
                size: bytes.len() as u64,
                limit: MAX_FILE_SIZE,
            });
        }

        let content = String::from_utf8(bytes).map_err(|_| FsError::NotUtf8)?;
        Ok(ReadOutcome::File { path, content })
    }

    /// Write `content` to a file, creating missing parent directories.
    pub async fn write(&self, raw: &str, content: &str) -> Result<WriteReceipt, FsError> {
        let target = self.authorize(raw)?;

        // The resolved path has already followed any link, so look at the
        // path as requested to catch a symlink sitting at the target.
        let requested = absolute_path(raw, &self.policy.workspace_dir);
        for candidate in [&requested, &target] {
            if let Ok(meta) = tokio::fs::symlink_metadata(candidate).await
                && meta.file_type().is_symlink()
            {
                return Err(FsError::Symlink(candidate.clone()));
            }
        }

        let Some(parent) = target.parent() else {
            return Err(FsError::ParentNotDirectory(target));
        };
        let created_directories = missing_ancestors(parent).await;

        match tokio::fs::metadata(parent).await {
            Ok(meta) if !meta.is_dir() => {
                return Err(FsError::ParentNotDirectory(parent.to_path_buf()));
            }
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tokio::fs::create_dir_all(parent).await?;
                tracing::debug!(dir = %parent.display(), "created parent directories");
            }
            Err(e) => return Err(e.into()),
        }

        // Resolve parent AFTER creation to block symlink escapes.
        let resolved_parent = tokio::fs::canonicalize(parent).await?;
        if self.policy.tier != SecurityTier::Low
            && !is_within_any(&resolved_parent, &self.policy.allowed_paths)
        {
            return Err(FsError::Denied(
                crate::security::DenyReason::OutsideAllowedPaths,
            ));
        }
        let Some(file_name) = target.file_name() else {
            return Err(FsError::ParentNotDirectory(target));
        };
        let resolved_target = resolved_parent.join(file_name);

        tokio::fs::write(&resolved_target, content).await?;

        Ok(WriteReceipt {
            path: resolved_target,
            bytes_written: content.len(),
            created_directories,
        })
    }
}

async fn list_directory(path: &Path) -> Result<Vec<DirEntryInfo>, FsError> {
    let mut reader = tokio::fs::read_dir(path).await?;
    let mut entries = Vec::new();
    while let Some(entry) = reader.next_entry().await? {
        let entry_type = entry
            .file_type()
            .await
            .map_or(EntryType::Other, EntryType::from);
        let size = if entry_type == EntryType::File {
            entry.metadata().await.ok().map(|m| m.len())
        } else {
            None
        };
        entries.push(DirEntryInfo {
            name: entry.file_name().to_string_lossy().into_owned(),
            entry_type,
            size,
        });
    }
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

/// Ancestors of `dir` (inclusive) that do not exist yet, outermost first.
async fn missing_ancestors(dir: &Path) -> Vec<PathBuf> {
    let mut missing = Vec::new();
    for ancestor in dir.ancestors() {
        if tokio::fs::try_exists(ancestor).await.unwrap_or(false) {
            break;
        }
        missing.push(ancestor.to_path_buf());
    }
    missing.reverse();
    missing
}
