//! Wraps raw results with explicit location metadata so a consuming agent
//! cannot misplace or invent files. Pure and deterministic; no I/O.

mod command;
mod file;
mod listing;

pub use command::{CommandClass, annotate_command, classify_command, parse_long_listing};
pub use file::{annotate_file_read, guess_file_type};
pub use listing::annotate_directory_listing;

use crate::exec::CommandResult;
use crate::files::{DirEntryInfo, EntryType};
use serde::Serialize;
use std::path::{Component, Path, PathBuf};

pub const ANNOTATOR_VERSION: &str = "1.0.0";

/// Attached to every failure body so the caller can tell a failed operation
/// apart from one that never happened.
pub const FAILURE_WARNING: &str = "The operation did NOT complete. No output, file content or \
     listing exists for this request; do not describe one.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseKind {
    DirectoryListing,
    FileRead,
    CommandListing,
    CommandFileView,
    CommandSearch,
    Command,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListingEntry {
    pub name: String,
    pub absolute_path: PathBuf,
    #[serde(rename = "type")]
    pub entry_type: EntryType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StructuredListing {
    pub directory: PathBuf,
    /// Everything that is not a directory, symlinks included.
    pub files: Vec<ListingEntry>,
    pub directories: Vec<ListingEntry>,
}

impl StructuredListing {
    fn from_entries<I>(directory: &Path, entries: I) -> Self
    where
        I: IntoIterator<Item = (String, EntryType, Option<u64>)>,
    {
        Self::from_resolved(
            directory,
            entries
                .into_iter()
                .map(|(name, entry_type, size)| ListingEntry {
                    absolute_path: directory.join(&name),
                    name,
                    entry_type,
                    size,
                }),
        )
    }

    /// Build from entries whose absolute paths are already known.
    fn from_resolved<I>(directory: &Path, entries: I) -> Self
    where
        I: IntoIterator<Item = ListingEntry>,
    {
        let (directories, files) = entries
            .into_iter()
            .partition(|e| e.entry_type == EntryType::Directory);
        Self {
            directory: directory.to_path_buf(),
            files,
            directories,
        }
    }

    /// True when some entry does not sit directly in `directory`.
    fn is_nested(&self) -> bool {
        self.files
            .iter()
            .chain(&self.directories)
            .any(|e| e.absolute_path.parent() != Some(self.directory.as_path()))
    }

    fn is_empty(&self) -> bool {
        self.files.is_empty() && self.directories.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Meta {
    pub annotator_version: &'static str,
    pub anti_hallucination: bool,
    pub response_format: &'static str,
}

impl Default for Meta {
    fn default() -> Self {
        Self {
            annotator_version: ANNOTATOR_VERSION,
            anti_hallucination: true,
            response_format: "structured",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnotatedResponse {
    pub kind: ResponseKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stderr: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_status: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timed_out: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_directory: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub structured_listing: Option<StructuredListing>,
    pub context: serde_json::Value,
    pub warning: String,
    pub instructions: String,
    pub suggested_response: String,
    #[serde(rename = "_meta")]
    pub meta: Meta,
}

impl AnnotatedResponse {
    fn new(kind: ResponseKind) -> Self {
        Self {
            kind,
            command: None,
            output: None,
            content: None,
            stderr: None,
            exit_status: None,
            timed_out: None,
            target_path: None,
            target_directory: None,
            structured_listing: None,
            context: serde_json::Value::Null,
            warning: String::new(),
            instructions: String::new(),
            suggested_response: String::new(),
            meta: Meta::default(),
        }
    }
}

/// Raw result to annotate.
#[derive(Debug, Clone, Copy)]
pub enum AnnotationInput<'a> {
    /// `target` is the directory the command ran in.
    Command(&'a CommandResult),
    /// `target` is the file that was read.
    FileRead { content: &'a str },
    /// `target` is the directory that was listed.
    DirectoryListing(&'a [DirEntryInfo]),
}

pub fn annotate(input: AnnotationInput<'_>, target: &Path) -> AnnotatedResponse {
    match input {
        AnnotationInput::Command(result) => annotate_command(result, target),
        AnnotationInput::FileRead { content } => annotate_file_read(target, content),
        AnnotationInput::DirectoryListing(entries) => annotate_directory_listing(target, entries),
    }
}

/// Anchor `raw` at `base` and fold `.`/`..` without touching the filesystem.
fn lexical_absolute(raw: &str, base: &Path) -> PathBuf {
    let joined = base.join(raw);
    let mut normalized = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::ParentDir => {
                normalized.pop();
            }
            Component::CurDir => {}
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

/// Cut `text` to at most `max_chars` characters, marking the cut.
fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((index, _)) => format!("{}...", &text[..index]),
        None => text.to_string(),
    }
}

fn bullet_list<'a, I>(names: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let lines: Vec<String> = names.into_iter().map(|n| format!("- {n}")).collect();
    if lines.is_empty() {
        "None".to_string()
    } else {
        lines.join("\n")
    }
}
