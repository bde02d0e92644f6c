use super::{AnnotatedResponse, ResponseKind, truncate_chars};
use serde_json::json;
use std::path::Path;

const PREVIEW_LINES: usize = 5;
const SUGGESTION_CHARS: usize = 1000;

/// Coarse content type from the file extension.
pub fn guess_file_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("json" | "js") => "json/javascript",
        Some("py") => "python",
        Some("md") => "markdown",
        Some("csv" | "tsv") => "csv/tabular data",
        Some("html" | "htm") => "html",
        Some("rs") => "rust",
        Some("toml" | "yaml" | "yml" | "ini") => "configuration",
        Some("sh") => "shell script",
        _ => "text",
    }
}

fn preview(content: &str) -> String {
    let mut lines = content.lines();
    let head: Vec<&str> = lines.by_ref().take(PREVIEW_LINES).collect();
    let mut preview = head.join("\n");
    if lines.next().is_some() {
        preview.push_str("\n[...]");
    }
    preview
}

/// Annotate the content of the file at `path`.
pub fn annotate_file_read(path: &Path, content: &str) -> AnnotatedResponse {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let directory = path.parent().unwrap_or(path);
    let file_type = guess_file_type(path);
    let line_count = content.lines().count();
    let location = path.display();

    let mut response = AnnotatedResponse::new(ResponseKind::FileRead);
    response.target_path = Some(path.to_path_buf());
    response.target_directory = Some(directory.to_path_buf());
    response.context = json!({
        "file_name": file_name,
        "directory": directory,
        "size_bytes": content.len(),
        "line_count": line_count,
        "file_type": file_type,
        "preview": preview(content),
    });
    response.warning = format!(
        "IMPORTANT: This content comes ONLY from {location}. Any claim that it exists \
         in a different file or directory is false."
    );
    response.instructions = format!(
        "When reporting this file:\n\
         1. State the EXACT file path: `{location}`\n\
         2. Present the content without modifications or additions\n\
         3. Do not claim this content exists in any other file\n\
         4. Always use the complete path when referring to this file later"
    );
    response.suggested_response = format!(
        "File: {file_name}\nLocation: {location}\nType: {file_type}\nSize: {} bytes\n\
         Lines: {line_count}\n\nContent of {file_name}:\n```\n{}\n```",
        content.len(),
        truncate_chars(content, SUGGESTION_CHARS),
    );
    response.content = Some(content.to_string());
    response
}
