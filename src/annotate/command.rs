use super::listing::{listing_instructions, listing_suggestion, listing_warning};
use super::{AnnotatedResponse, ListingEntry, ResponseKind, StructuredListing, lexical_absolute};
use crate::exec::CommandResult;
use crate::files::EntryType;
use serde_json::json;
use std::path::{Path, PathBuf};

/// Tokens that end the first simple command.
const STOP_TOKENS: &[&str] = &["|", "||", "&&", ";", "&", ">", ">>", "<", "2>", "2>&1"];

const GENERIC_WARNING: &str = "This is the complete, unaltered output of the command. Do not \
     describe files, directories or content that do not appear in it.";

const SCATTERED_WARNING: &str = "IMPORTANT: These entries come from more than one location. Each \
     entry exists ONLY at its own absolute_path; do not move any of them to another directory.";

const SCATTERED_INSTRUCTIONS: &str = "When reporting this listing:\n\
     1. Refer to every entry by its absolute path\n\
     2. Present the output exactly as shown\n\
     3. Do not assign an entry to a directory unless the output says so";

const TIMEOUT_NOTE: &str = "The command was killed after exceeding its time limit; the output \
     above is partial.";

/// What a command was doing, judged by its base command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandClass {
    /// `operands` are the path arguments as typed, unquoted.
    Listing {
        directory: PathBuf,
        operands: Vec<String>,
    },
    FileView { file: Option<PathBuf> },
    Search { root: PathBuf, pattern: Option<String> },
    Generic { base: String },
}

fn unquote(token: &str) -> &str {
    token.trim_matches(|c| c == '"' || c == '\'')
}

/// Words of the first simple command, with leading `VAR=value` dropped.
fn first_command_words(command: &str) -> Vec<&str> {
    command
        .split_whitespace()
        .skip_while(|w| {
            w.contains('=') && w.chars().next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        })
        .take_while(|w| !STOP_TOKENS.contains(w))
        .collect()
}

pub fn classify_command(command: &str, working_dir: &Path) -> CommandClass {
    let words = first_command_words(command);
    let Some((&first, args)) = words.split_first() else {
        return CommandClass::Generic { base: String::new() };
    };
    let base = first.rsplit('/').next().unwrap_or(first);
    let mut operands = args.iter().map(|a| unquote(a)).filter(|a| !a.starts_with('-'));

    match base {
        "ls" | "dir" => {
            let operands: Vec<String> = operands.map(str::to_string).collect();
            CommandClass::Listing {
                directory: operands
                    .first()
                    .map_or_else(|| working_dir.to_path_buf(), |d| lexical_absolute(d, working_dir)),
                operands,
            }
        }
        "cat" | "head" | "tail" | "more" | "less" => CommandClass::FileView {
            file: operands.last().map(|f| lexical_absolute(f, working_dir)),
        },
        "find" => {
            let pattern = args
                .iter()
                .position(|a| matches!(*a, "-name" | "-iname"))
                .and_then(|i| args.get(i + 1))
                .map(|p| unquote(p).to_string());
            let root = args
                .first()
                .map(|a| unquote(a))
                .filter(|a| !a.starts_with('-'))
                .map_or_else(|| working_dir.to_path_buf(), |r| lexical_absolute(r, working_dir));
            CommandClass::Search { root, pattern }
        }
        other => CommandClass::Generic {
            base: other.to_string(),
        },
    }
}

/// One line of `ls` output.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ListingLine<'a> {
    /// `<dir>:`, opening the entries of that directory.
    Header(&'a str),
    /// `total N`, emitted only when a directory's contents follow.
    Total,
    Long {
        name: String,
        entry_type: EntryType,
        size: Option<u64>,
    },
    Short(&'a str),
    Skip,
}

fn parse_long_line(line: &str) -> Option<(String, EntryType, Option<u64>)> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < 9 {
        return None;
    }
    let entry_type = match fields[0].chars().next() {
        Some('d') => EntryType::Directory,
        Some('-') => EntryType::File,
        Some('l') => EntryType::Symlink,
        _ => return None,
    };
    let mut name = fields[8..].join(" ");
    if entry_type == EntryType::Symlink
        && let Some((link, _target)) = name.split_once(" -> ")
    {
        name = link.to_string();
    }
    let size = (entry_type == EntryType::File)
        .then(|| fields[4].parse::<u64>().ok())
        .flatten();
    Some((name, entry_type, size))
}

fn classify_line(line: &str) -> ListingLine<'_> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed == "." || trimmed == ".." {
        return ListingLine::Skip;
    }
    if let Some((name, entry_type, size)) = parse_long_line(trimmed) {
        if name == "." || name == ".." {
            return ListingLine::Skip;
        }
        return ListingLine::Long {
            name,
            entry_type,
            size,
        };
    }
    if trimmed.starts_with("total ") && trimmed.split_whitespace().count() == 2 {
        return ListingLine::Total;
    }
    match trimmed.strip_suffix(':') {
        Some(dir) if !dir.is_empty() => ListingLine::Header(dir),
        _ => ListingLine::Short(trimmed),
    }
}

/// Parse `ls -l` lines into `(name, type, size)`, ignoring section headers.
/// Lines that are not in long format, `total N` and `.`/`..` are skipped.
pub fn parse_long_listing(output: &str) -> Vec<(String, EntryType, Option<u64>)> {
    output
        .lines()
        .filter_map(|line| match classify_line(line) {
            ListingLine::Long {
                name,
                entry_type,
                size,
            } => Some((name, entry_type, size)),
            _ => None,
        })
        .collect()
}

/// A listed name together with where it actually lives.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ResolvedName {
    path: PathBuf,
    /// `None` for short-format output.
    kind: Option<(EntryType, Option<u64>)>,
}

/// Directory the entries of the current section belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SectionBase<'a> {
    /// Before any header: either the single listed directory or file operands.
    Leading,
    Header(&'a str),
}

/// Resolve every entry of `ls` output in `working_dir` to an absolute path.
///
/// `<dir>:` headers switch the current directory. Entries before the first
/// header are the listed directory's contents when a `total` line says so,
/// and file operands otherwise. Returns `None` when several operands were
/// listed without headers, since entries cannot be placed.
fn resolve_listing(
    output: &str,
    directory: &Path,
    operands: &[String],
    working_dir: &Path,
) -> Option<Vec<ResolvedName>> {
    let lines: Vec<ListingLine<'_>> = output.lines().map(classify_line).collect();
    let has_headers = lines.iter().any(|l| matches!(l, ListingLine::Header(_)));
    if operands.len() > 1 && !has_headers {
        return None;
    }
    let leading_is_contents = !has_headers
        && lines
            .iter()
            .take_while(|l| !matches!(l, ListingLine::Header(_)))
            .any(|l| matches!(l, ListingLine::Total));

    let mut base = SectionBase::Leading;
    let mut resolved = Vec::new();
    for line in lines {
        let (name, kind) = match line {
            ListingLine::Header(dir) => {
                base = SectionBase::Header(dir);
                continue;
            }
            ListingLine::Total | ListingLine::Skip => continue,
            ListingLine::Long {
                name,
                entry_type,
                size,
            } => (name, Some((entry_type, size))),
            ListingLine::Short(name) => (name.to_string(), None),
        };

        let path = match base {
            SectionBase::Header(dir) => lexical_absolute(dir, working_dir).join(&name),
            // A directory entry never contains `/`, and before the first
            // header only file operands appear.
            SectionBase::Leading if name.contains('/') || has_headers => {
                lexical_absolute(&name, working_dir)
            }
            SectionBase::Leading if kind.is_some() => {
                if leading_is_contents {
                    directory.join(&name)
                } else {
                    lexical_absolute(&name, working_dir)
                }
            }
            SectionBase::Leading if operands.contains(&name) => lexical_absolute(&name, working_dir),
            SectionBase::Leading => directory.join(&name),
        };
        resolved.push(ResolvedName { path, kind });
    }
    Some(resolved)
}

fn with_timeout_note(text: String, timed_out: bool) -> String {
    if timed_out {
        format!("{TIMEOUT_NOTE} {text}")
    } else {
        text
    }
}

/// Annotate a command that ran in `working_dir`.
pub fn annotate_command(result: &CommandResult, working_dir: &Path) -> AnnotatedResponse {
    let command = result.executed_command.as_str();
    let class = classify_command(command, working_dir);

    let mut response = match &class {
        CommandClass::Listing {
            directory,
            operands,
        } => listing_response(result, directory, operands, working_dir),
        CommandClass::FileView { file } => file_view_response(result, file.as_deref()),
        CommandClass::Search { root, pattern } => search_response(result, root, pattern.as_deref()),
        CommandClass::Generic { base } => generic_response(result, base),
    };

    if let Some(context) = response.context.as_object_mut() {
        context.insert("command_executed".into(), json!(command));
        context.insert("working_directory".into(), json!(working_dir));
        context.insert("exit_status".into(), json!(result.exit_status));
        context.insert("timed_out".into(), json!(result.timed_out));
        context.insert("duration_ms".into(), json!(result.duration_ms));
    }
    response.warning = with_timeout_note(std::mem::take(&mut response.warning), result.timed_out);
    response.command = Some(result.executed_command.clone());
    response.output = Some(result.stdout.clone());
    response.stderr = Some(result.stderr.clone());
    response.exit_status = Some(result.exit_status);
    response.timed_out = Some(result.timed_out);
    response
}

fn listing_response(
    result: &CommandResult,
    directory: &Path,
    operands: &[String],
    working_dir: &Path,
) -> AnnotatedResponse {
    let mut response = AnnotatedResponse::new(ResponseKind::CommandListing);
    let Some(resolved) = resolve_listing(&result.stdout, directory, operands, working_dir) else {
        return unplaced_listing_response(response, result, operands, working_dir);
    };

    let inside = |p: &Path| p != directory && p.starts_with(directory);
    let (anchor, scattered) = if resolved.iter().all(|r| inside(&r.path)) {
        (directory, false)
    } else if resolved.iter().all(|r| r.path == directory) {
        // The operand itself was listed (a file, or `ls -d`).
        response.target_path = Some(directory.to_path_buf());
        (directory.parent().unwrap_or(working_dir), false)
    } else {
        (working_dir, true)
    };
    if !scattered {
        response.target_directory = Some(anchor.to_path_buf());
    }

    let long: Vec<ListingEntry> = resolved
        .iter()
        .filter_map(|r| {
            let (entry_type, size) = r.kind?;
            Some(ListingEntry {
                name: r.path.file_name().map_or_else(
                    || r.path.display().to_string(),
                    |n| n.to_string_lossy().into_owned(),
                ),
                absolute_path: r.path.clone(),
                entry_type,
                size,
            })
        })
        .collect();

    if long.is_empty() && !result.stdout.trim().is_empty() {
        // Short format: names only, types unknown.
        let entry_paths: Vec<&Path> = resolved.iter().map(|r| r.path.as_path()).collect();
        response.context = json!({
            "directory_path": anchor,
            "entry_count": entry_paths.len(),
            "entry_paths": entry_paths,
        });
        response.suggested_response = format!(
            "Directory listing for: {}\n\n{}\n\nNote: each entry exists ONLY at its path in entry_paths.",
            anchor.display(),
            result.stdout.trim_end()
        );
    } else {
        let listing = StructuredListing::from_resolved(anchor, long);
        response.context = json!({
            "directory_path": anchor,
            "file_count": listing.files.len(),
            "directory_count": listing.directories.len(),
            "is_empty": listing.is_empty(),
        });
        response.suggested_response = listing_suggestion(&listing);
        response.structured_listing = Some(listing);
    }

    response.warning = if scattered {
        SCATTERED_WARNING.to_string()
    } else {
        listing_warning(anchor)
    };
    response.instructions = if scattered {
        SCATTERED_INSTRUCTIONS.to_string()
    } else {
        listing_instructions(anchor)
    };
    response
}

/// Several operands and no headers: report the raw output without guessing
/// where each entry lives.
fn unplaced_listing_response(
    mut response: AnnotatedResponse,
    result: &CommandResult,
    operands: &[String],
    working_dir: &Path,
) -> AnnotatedResponse {
    let listed: Vec<PathBuf> = operands
        .iter()
        .map(|op| lexical_absolute(op, working_dir))
        .collect();
    response.context = json!({
        "listed_paths": listed,
        "note": "Entries could not be attributed to a single directory.",
    });
    response.warning = SCATTERED_WARNING.to_string();
    response.instructions = SCATTERED_INSTRUCTIONS.to_string();
    response.suggested_response = format!(
        "Output of `{}`:\n```\n{}\n```",
        result.executed_command,
        super::truncate_chars(&result.stdout, 1000)
    );
    response
}

fn file_view_response(result: &CommandResult, file: Option<&Path>) -> AnnotatedResponse {
    let mut response = AnnotatedResponse::new(ResponseKind::CommandFileView);
    response.target_path = file.map(Path::to_path_buf);
    response.target_directory = file.and_then(Path::parent).map(Path::to_path_buf);
    response.context = json!({
        "file_read": file,
        "content_length": result.stdout.len(),
    });

    let location = file.map_or_else(|| "standard input".to_string(), |f| f.display().to_string());
    response.warning = format!(
        "IMPORTANT: This output shows content ONLY from {location}. Any claim that it \
         exists in a different file is false."
    );
    response.instructions = format!(
        "When reporting this file content:\n\
         1. State the EXACT file path: `{location}`\n\
         2. Present the content without modifications or additions\n\
         3. Do not claim this content exists in any other file"
    );
    response.suggested_response = format!(
        "The content of `{location}` is:\n```\n{}\n```",
        super::truncate_chars(&result.stdout, 1000)
    );
    response
}

fn search_response(result: &CommandResult, root: &Path, pattern: Option<&str>) -> AnnotatedResponse {
    let items_found = result.stdout.lines().filter(|l| !l.trim().is_empty()).count();
    let mut response = AnnotatedResponse::new(ResponseKind::CommandSearch);
    response.target_directory = Some(root.to_path_buf());
    response.context = json!({
        "search_path": root,
        "search_pattern": pattern,
        "items_found": items_found,
    });
    response.warning = format!(
        "IMPORTANT: Only the {items_found} paths printed above were found under {}. \
         Do not report any other matches.",
        root.display()
    );
    response.instructions = format!(
        "When reporting these search results:\n\
         1. State the search root: `{}`\n\
         2. List only the paths printed in the output\n\
         3. Report zero matches as zero matches",
        root.display()
    );
    response.suggested_response = format!(
        "Search under {}{} found {items_found} item(s):\n{}",
        root.display(),
        pattern.map(|p| format!(" for `{p}`")).unwrap_or_default(),
        result.stdout.trim_end()
    );
    response
}

fn generic_response(result: &CommandResult, base: &str) -> AnnotatedResponse {
    let mut response = AnnotatedResponse::new(ResponseKind::Command);
    response.context = json!({
        "command_type": base,
        "note": "This is the raw output of the command. Interpret with care.",
    });
    response.warning = GENERIC_WARNING.to_string();
    response.instructions = format!(
        "When reporting the results of this command:\n\
         1. Show the exact command executed: `{}`\n\
         2. Present the output exactly as shown, without alteration\n\
         3. Do not make assumptions about files or directories not present in the output",
        result.executed_command
    );
    response.suggested_response = format!(
        "Command `{}` exited with status {}.\nOutput:\n```\n{}\n```",
        result.executed_command,
        result.exit_status,
        super::truncate_chars(&result.stdout, 1000)
    );
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(command: &str, stdout: &str) -> CommandResult {
        CommandResult {
            exit_status: 0,
            stdout: stdout.to_string(),
            stderr: String::new(),
            executed_command: command.to_string(),
            timed_out: false,
            duration_ms: 4,
        }
    }

    const LONG_LISTING: &str = "total 16\n\
        drwxr-xr-x  3 alice staff   96 Jan  1 12:00 .\n\
        drwxr-xr-x 10 alice staff  320 Jan  1 12:00 ..\n\
        -rw-r--r--  1 alice staff 1024 Jan  1 12:00 report final.txt\n\
        drwxr-xr-x  2 alice staff   64 Jan  1 12:00 src\n\
        lrwxr-xr-x  1 alice staff    7 Jan  1 12:00 latest -> src\n";

    #[test]
    fn classification_by_base_command() {
        let wd = Path::new("/work");
        assert_eq!(
            classify_command("ls -la /tmp", wd),
            CommandClass::Listing {
                directory: PathBuf::from("/tmp"),
                operands: vec!["/tmp".into()],
            }
        );
        assert_eq!(
            classify_command("ls", wd),
            CommandClass::Listing {
                directory: PathBuf::from("/work"),
                operands: Vec::new(),
            }
        );
        assert_eq!(
            classify_command("/bin/ls -l ../other | wc -l", wd),
            CommandClass::Listing {
                directory: PathBuf::from("/other"),
                operands: vec!["../other".into()],
            }
        );
        assert_eq!(
            classify_command("tail -n 20 logs/app.log", wd),
            CommandClass::FileView {
                file: Some(PathBuf::from("/work/logs/app.log"))
            }
        );
        assert_eq!(
            classify_command("find src -name '*.rs'", wd),
            CommandClass::Search {
                root: PathBuf::from("/work/src"),
                pattern: Some("*.rs".into())
            }
        );
        assert_eq!(
            classify_command("uname -a", wd),
            CommandClass::Generic { base: "uname".into() }
        );
    }

    #[test]
    fn long_listing_is_parsed() {
        let entries = parse_long_listing(LONG_LISTING);
        assert_eq!(
            entries,
            vec![
                ("report final.txt".to_string(), EntryType::File, Some(1024)),
                ("src".to_string(), EntryType::Directory, None),
                ("latest".to_string(), EntryType::Symlink, None),
            ]
        );
    }

    #[test]
    fn listing_entries_are_prefixed_by_target() {
        let response = annotate_command(&result("ls -la /srv/app", LONG_LISTING), Path::new("/work"));
        let listing = response.structured_listing.as_ref().unwrap();

        assert_eq!(response.kind, ResponseKind::CommandListing);
        assert_eq!(response.target_directory.as_deref(), Some(Path::new("/srv/app")));
        assert!(!listing.files.is_empty());
        for entry in listing.files.iter().chain(&listing.directories) {
            assert!(entry.absolute_path.starts_with("/srv/app"));
        }
        assert_eq!(listing.directories[0].absolute_path, PathBuf::from("/srv/app/src"));
        assert!(response.warning.contains("/srv/app"));
    }

    fn paths(entries: &[ListingEntry]) -> Vec<PathBuf> {
        entries.iter().map(|e| e.absolute_path.clone()).collect()
    }

    #[test]
    fn recursive_listing_places_nested_entries_under_their_header() {
        let output = "/srv/app:\n\
            total 8\n\
            -rw-r--r-- 1 u g 10 Jan 1 00:00 top.txt\n\
            drwxr-xr-x 2 u g 64 Jan 1 00:00 sub\n\
            \n\
            /srv/app/sub:\n\
            total 4\n\
            -rw-r--r-- 1 u g 20 Jan 1 00:00 deep.txt\n";

        let response = annotate_command(&result("ls -lR /srv/app", output), Path::new("/work"));
        let listing = response.structured_listing.as_ref().unwrap();

        assert_eq!(
            paths(&listing.files),
            vec![
                PathBuf::from("/srv/app/top.txt"),
                PathBuf::from("/srv/app/sub/deep.txt")
            ]
        );
        assert_eq!(paths(&listing.directories), vec![PathBuf::from("/srv/app/sub")]);
        assert_eq!(response.target_directory.as_deref(), Some(Path::new("/srv/app")));
        assert!(response.suggested_response.contains("- /srv/app/sub/deep.txt"));
        assert!(response.suggested_response.contains("- top.txt"));
    }

    #[test]
    fn relative_headers_resolve_against_working_dir() {
        let output = ".:\n\
            total 4\n\
            drwxr-xr-x 2 u g 64 Jan 1 00:00 sub\n\
            \n\
            ./sub:\n\
            total 4\n\
            -rw-r--r-- 1 u g 20 Jan 1 00:00 deep.txt\n";

        let response = annotate_command(&result("ls -lR", output), Path::new("/work"));
        let listing = response.structured_listing.as_ref().unwrap();

        assert_eq!(paths(&listing.files), vec![PathBuf::from("/work/sub/deep.txt")]);
        assert_eq!(paths(&listing.directories), vec![PathBuf::from("/work/sub")]);
    }

    #[test]
    fn multiple_directories_keep_their_own_entries() {
        let output = "/a:\n\
            total 4\n\
            -rw-r--r-- 1 u g 1 Jan 1 00:00 one.txt\n\
            \n\
            /b:\n\
            total 4\n\
            -rw-r--r-- 1 u g 2 Jan 1 00:00 two.txt\n";

        let response = annotate_command(&result("ls -l /a /b", output), Path::new("/work"));
        let listing = response.structured_listing.as_ref().unwrap();

        assert_eq!(
            paths(&listing.files),
            vec![PathBuf::from("/a/one.txt"), PathBuf::from("/b/two.txt")]
        );
        assert!(response.target_directory.is_none());
        assert_eq!(response.warning, SCATTERED_WARNING);
    }

    #[test]
    fn multiple_operands_without_headers_fall_back_to_raw_output() {
        let output = "-rw-r--r-- 1 u g 1 Jan 1 00:00 one.txt\n\
            -rw-r--r-- 1 u g 2 Jan 1 00:00 two.txt\n";

        let response = annotate_command(&result("ls -l /a /b", output), Path::new("/work"));

        assert!(response.structured_listing.is_none());
        assert!(response.target_directory.is_none());
        assert_eq!(response.output.as_deref(), Some(output));
        assert_eq!(response.context["listed_paths"][1], "/b");
        assert!(response.suggested_response.contains("two.txt"));
    }

    #[test]
    fn file_operand_is_not_nested_under_itself() {
        let output = "-rw-r--r-- 1 u g 5 Jan 1 00:00 sub/file.txt\n";

        let response = annotate_command(&result("ls -l sub/file.txt", output), Path::new("/work"));
        let listing = response.structured_listing.as_ref().unwrap();

        assert_eq!(paths(&listing.files), vec![PathBuf::from("/work/sub/file.txt")]);
        assert_eq!(listing.files[0].name, "file.txt");
        assert_eq!(response.target_path.as_deref(), Some(Path::new("/work/sub/file.txt")));
        assert_eq!(response.target_directory.as_deref(), Some(Path::new("/work/sub")));
    }

    #[test]
    fn bare_file_operand_resolves_in_working_dir() {
        let output = "-rw-r--r-- 1 u g 5 Jan 1 00:00 notes.txt\n";

        let response = annotate_command(&result("ls -l notes.txt", output), Path::new("/work"));
        let listing = response.structured_listing.as_ref().unwrap();

        assert_eq!(paths(&listing.files), vec![PathBuf::from("/work/notes.txt")]);
    }

    #[test]
    fn directory_entry_named_like_operand_stays_inside() {
        let output = "total 4\n\
            -rw-r--r-- 1 u g 5 Jan 1 00:00 docs\n";

        let response = annotate_command(&result("ls -l docs", output), Path::new("/work"));
        let listing = response.structured_listing.as_ref().unwrap();

        assert_eq!(paths(&listing.files), vec![PathBuf::from("/work/docs/docs")]);
    }

    #[test]
    fn short_listing_reports_entry_paths() {
        let response = annotate_command(&result("ls", "a.txt\nsub\n"), Path::new("/work"));

        assert!(response.structured_listing.is_none());
        assert_eq!(response.context["entry_paths"][0], "/work/a.txt");
        assert_eq!(response.context["entry_count"], 2);
    }

    #[test]
    fn command_fields_are_echoed() {
        let mut raw = result("uname -a", "Linux\n");
        raw.stderr = "warn\n".into();
        raw.exit_status = 2;

        let response = annotate_command(&raw, Path::new("/work"));

        assert_eq!(response.kind, ResponseKind::Command);
        assert_eq!(response.command.as_deref(), Some("uname -a"));
        assert_eq!(response.output.as_deref(), Some("Linux\n"));
        assert_eq!(response.stderr.as_deref(), Some("warn\n"));
        assert_eq!(response.exit_status, Some(2));
        assert_eq!(response.timed_out, Some(false));
        assert_eq!(response.context["command_executed"], "uname -a");
        assert_eq!(response.context["working_directory"], "/work");
        assert!(response.instructions.contains("`uname -a`"));
    }

    #[test]
    fn timed_out_commands_say_so() {
        let mut raw = result("cat big.log", "partial");
        raw.timed_out = true;
        raw.exit_status = crate::exec::TIMEOUT_EXIT_STATUS;

        let response = annotate_command(&raw, Path::new("/work"));

        assert_eq!(response.kind, ResponseKind::CommandFileView);
        assert_eq!(response.target_path.as_deref(), Some(Path::new("/work/big.log")));
        assert!(response.warning.starts_with(TIMEOUT_NOTE));
        assert_eq!(response.timed_out, Some(true));
    }

    #[test]
    fn search_counts_results() {
        let response = annotate_command(
            &result("find . -name '*.md'", "./a.md\n./docs/b.md\n"),
            Path::new("/repo"),
        );

        assert_eq!(response.kind, ResponseKind::CommandSearch);
        assert_eq!(response.context["items_found"], 2);
        assert_eq!(response.context["search_path"], "/repo");
        assert_eq!(response.context["search_pattern"], "*.md");
    }

    #[test]
    fn annotation_is_deterministic() {
        let raw = result("ls -l", LONG_LISTING);
        let wd = Path::new("/w");
        assert_eq!(annotate_command(&raw, wd), annotate_command(&raw, wd));
    }
}
