use super::{AnnotatedResponse, ListingEntry, ResponseKind, StructuredListing, bullet_list};
use crate::files::DirEntryInfo;
use serde_json::json;
use std::path::Path;

pub(super) fn listing_warning(directory: &Path) -> String {
    format!(
        "IMPORTANT: The files and directories listed exist ONLY in {}, not in a parent \
         or any other directory. Any claim that they exist elsewhere is false.",
        directory.display()
    )
}

pub(super) fn listing_instructions(directory: &Path) -> String {
    let dir = directory.display();
    format!(
        "When reporting this directory listing:\n\
         1. State that these entries are in EXACTLY this directory: `{dir}`\n\
         2. Use the absolute_path of each entry when referring to it\n\
         3. Do not add entries that are not listed\n\
         4. Prefer the suggested_response as a template"
    )
}

/// Entries directly inside the listed directory go by name; anything
/// deeper goes by its absolute path.
fn display_names(directory: &Path, entries: &[ListingEntry]) -> Vec<String> {
    entries
        .iter()
        .map(|e| {
            if e.absolute_path.parent() == Some(directory) {
                e.name.clone()
            } else {
                e.absolute_path.display().to_string()
            }
        })
        .collect()
}

pub(super) fn listing_suggestion(listing: &StructuredListing) -> String {
    let (scope, note) = if listing.is_nested() {
        (
            "in this directory tree",
            "Note: each nested entry exists ONLY at the absolute path shown for it.",
        )
    } else {
        (
            "directly in this directory",
            "Note: these entries exist ONLY in the path shown above.",
        )
    };
    let files = display_names(&listing.directory, &listing.files);
    let directories = display_names(&listing.directory, &listing.directories);
    format!(
        "Directory listing for: {}\n\n\
         Files found {scope} ({}):\n{}\n\n\
         Subdirectories found {scope} ({}):\n{}\n\n\
         {note}",
        listing.directory.display(),
        files.len(),
        bullet_list(files.iter().map(String::as_str)),
        directories.len(),
        bullet_list(directories.iter().map(String::as_str)),
    )
}

/// Annotate entries returned by a directory read of `directory`.
pub fn annotate_directory_listing(directory: &Path, entries: &[DirEntryInfo]) -> AnnotatedResponse {
    let listing = StructuredListing::from_entries(
        directory,
        entries
            .iter()
            .map(|e| (e.name.clone(), e.entry_type, e.size)),
    );

    let mut response = AnnotatedResponse::new(ResponseKind::DirectoryListing);
    response.target_path = Some(directory.to_path_buf());
    response.target_directory = Some(directory.to_path_buf());
    response.context = json!({
        "directory_path": directory,
        "file_count": listing.files.len(),
        "directory_count": listing.directories.len(),
        "is_empty": listing.is_empty(),
    });
    response.warning = listing_warning(directory);
    response.instructions = listing_instructions(directory);
    response.suggested_response = listing_suggestion(&listing);
    response.structured_listing = Some(listing);
    response
}
