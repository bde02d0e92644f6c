use super::types::{Decision, DenyReason};
use crate::security::defaults::{
    BLOCKED_PATTERNS, DENIED_BASE_COMMAND_PREFIXES, DENIED_BASE_COMMANDS, SHELL_INTERPRETERS,
};

/// Commands that run their first non-option argument as another command.
const COMMAND_WRAPPERS: &[&str] = &[
    "env", "command", "exec", "nohup", "nice", "xargs", "time", "builtin",
];

/// Skip leading environment variable assignments (e.g. `FOO=bar cmd args`).
/// Returns the remainder starting at the first non-assignment word.
fn skip_env_assignments(s: &str) -> &str {
    let mut rest = s;
    loop {
        let Some(word) = rest.split_whitespace().next() else {
            return rest;
        };
        if word.contains('=')
            && word
                .chars()
                .next()
                .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        {
            rest = rest[word.len()..].trim_start();
        } else {
            return rest;
        }
    }
}

/// `/usr/bin/git` -> `git`, `(rm` -> `rm`.
fn base_name(word: &str) -> &str {
    let word = word.trim_start_matches(['(', '{']);
    word.rsplit('/').next().unwrap_or(word)
}

#[derive(Debug, PartialEq, Eq)]
struct Segment<'a> {
    text: &'a str,
    /// The segment reads the previous segment's output through `|`.
    piped: bool,
}

#[derive(Debug, Default)]
struct SplitCommand<'a> {
    segments: Vec<Segment<'a>>,
    /// A lone `&` was seen.
    background: bool,
}

/// Split on `&&`, `||`, `|`, `&`, `;` and newlines. An escaped `\;` (as used
/// by `find -exec`) stays inside its segment.
fn split_segments(command: &str) -> SplitCommand<'_> {
    let bytes = command.as_bytes();
    let mut split = SplitCommand::default();
    let mut start = 0;
    let mut piped = false;
    let mut i = 0;

    while i < bytes.len() {
        let next = bytes.get(i + 1).copied();
        let (separator_len, pipe) = match bytes[i] {
            b'\\' if next == Some(b';') => {
                i += 2;
                continue;
            }
            b'&' if next == Some(b'&') => (2, false),
            b'|' if next == Some(b'|') => (2, false),
            b'|' => (1, true),
            b'&' => {
                split.background = true;
                (1, false)
            }
            b';' | b'\n' => (1, false),
            _ => {
                i += 1;
                continue;
            }
        };
        split.segments.push(Segment {
            text: &command[start..i],
            piped,
        });
        piped = pipe;
        i += separator_len;
        start = i;
    }
    split.segments.push(Segment {
        text: &command[start..],
        piped,
    });
    split
}

/// Git-specific config keys that enable arbitrary code execution when passed
/// via `git -c <key>=<val>` or `git clone --config <key>=<val>`.
const GIT_BLOCKED_CONFIG_KEYS: &[&str] = &[
    "core.sshcommand",
    "core.fsmonitor",
    "core.pager",
    "core.editor",
    "core.askpass",
    "credential.",
    "diff.external",
    "merge.tool",
    "filter.",
];

fn is_git_config_injection(args: &str) -> bool {
    let lower = args.to_lowercase();
    if !lower.contains("-c ") && !lower.contains("--config ") && !lower.contains("--config=") {
        return false;
    }
    GIT_BLOCKED_CONFIG_KEYS
        .iter()
        .any(|key| lower.contains(key))
}

fn find_exec_terminator(token: &str) -> Option<Option<&str>> {
    if token == "+" || token == r"\;" || token == ";" {
        return Some(None);
    }
    if let Some(stripped) = token.strip_suffix(r"\;") {
        return Some((!stripped.is_empty()).then_some(stripped));
    }
    None
}

/// Collect the `-exec` payload starting at `start_idx`. Returns the payload
/// and the index of its terminator, or `None` when unterminated or empty.
fn extract_find_exec_payload(words: &[&str], start_idx: usize) -> Option<(String, usize)> {
    let mut exec_tokens = Vec::new();

    for (index, token) in words.iter().enumerate().skip(start_idx) {
        if let Some(command_token) = find_exec_terminator(token) {
            if let Some(command_token) = command_token {
                exec_tokens.push(command_token);
            }
            if exec_tokens.is_empty() {
                return None;
            }
            return Some((exec_tokens.join(" "), index));
        }
        exec_tokens.push(token);
    }

    None
}

/// Whitelisted commands whose arguments can still escalate.
fn has_blocked_arguments(base_cmd: &str, full_segment: &str, allowed_commands: &[String]) -> bool {
    let args = full_segment
        .trim()
        .strip_prefix(base_cmd)
        .unwrap_or("")
        .trim_start();

    let words: Vec<&str> = args.split_whitespace().collect();
    let subcommand = words.first().copied().unwrap_or("");

    match base_cmd {
        "git" => {
            if matches!(subcommand, "push" | "send-email" | "request-pull" | "credential") {
                return true;
            }
            if subcommand == "remote" {
                let sub_action = words.get(1).copied().unwrap_or("");
                return !matches!(sub_action, "" | "-v" | "show" | "get-url");
            }
            if subcommand == "config" {
                let has_write_flag = words.iter().any(|w| matches!(*w, "--global" | "--system"));
                let config_args = words.iter().skip(1).filter(|w| !w.starts_with('-')).count();
                return has_write_flag || config_args > 1;
            }
            if words.iter().any(|w| {
                w.starts_with("--upload-pack") || w.starts_with("--receive-pack")
            }) {
                return true;
            }
            is_git_config_injection(args)
        }
        "find" => {
            if words.contains(&"-delete") {
                return true;
            }
            let mut i = 0;
            while i < words.len() {
                if matches!(words[i], "-exec" | "-execdir" | "-ok" | "-okdir") {
                    let Some((exec_payload, terminator_index)) =
                        extract_find_exec_payload(&words, i + 1)
                    else {
                        return true;
                    };

                    let exec_cmd_part = skip_env_assignments(&exec_payload);
                    let Some(exec_cmd) = exec_cmd_part.split_whitespace().next() else {
                        return true;
                    };

                    let exec_base = base_name(exec_cmd);
                    if !allowed_commands.iter().any(|a| a == exec_base) {
                        return true;
                    }
                    let exec_rest = exec_cmd_part
                        .trim_start()
                        .strip_prefix(exec_cmd)
                        .unwrap_or("");
                    let exec_segment = format!("{exec_base}{exec_rest}");
                    if has_blocked_arguments(exec_base, &exec_segment, allowed_commands) {
                        return true;
                    }

                    i = terminator_index;
                }
                i += 1;
            }
            false
        }
        _ => false,
    }
}

/// High tier: every segment must start with a whitelisted command.
///
/// Validates the **entire** command string, not just the first word:
/// - Blocks subshell operators (`` ` ``, `$(`) that hide arbitrary execution
/// - Blocks output redirections (`>`, `>>`)
/// - Blocks backgrounding with a lone `&`
/// - Splits on command separators and validates each sub-command
pub(super) fn evaluate_whitelist(command: &str, allowed_commands: &[String]) -> Decision {
    if command.contains('`')
        || command.contains("$(")
        || command.contains("${")
        || command.contains("<(")
        || command.contains(">(")
        || command.contains('>')
    {
        return Decision::Deny(DenyReason::NotWhitelisted);
    }

    let split = split_segments(command);
    if split.background {
        return Decision::Deny(DenyReason::NotWhitelisted);
    }

    let mut saw_command = false;
    for segment in &split.segments {
        let cmd_part = skip_env_assignments(segment.text.trim());
        let Some(first_word) = cmd_part.split_whitespace().next() else {
            continue;
        };
        saw_command = true;

        let base_cmd = first_word.rsplit('/').next().unwrap_or(first_word);
        if !allowed_commands.iter().any(|allowed| allowed == base_cmd) {
            return Decision::Deny(DenyReason::NotWhitelisted);
        }

        let rest = cmd_part.strip_prefix(first_word).unwrap_or("");
        if has_blocked_arguments(base_cmd, &format!("{base_cmd}{rest}"), allowed_commands) {
            return Decision::Deny(DenyReason::NotWhitelisted);
        }
    }

    if saw_command {
        Decision::Allow
    } else {
        Decision::Deny(DenyReason::EmptyInput)
    }
}

/// Base commands a segment would actually run: the first word plus whatever
/// a wrapper such as `xargs` or `env` hands off to.
fn invoked_commands(segment: &str) -> Vec<&str> {
    let mut words = skip_env_assignments(segment.trim()).split_whitespace();
    let mut invoked = Vec::new();

    let Some(first) = words.next() else {
        return invoked;
    };
    let mut current = base_name(first);
    invoked.push(current);

    while COMMAND_WRAPPERS.contains(&current) {
        let Some(next) = words.find(|w| !w.starts_with('-') && !w.contains('=')) else {
            break;
        };
        current = base_name(next);
        invoked.push(current);
    }

    invoked
}

fn is_denied_base(base: &str) -> bool {
    DENIED_BASE_COMMANDS.contains(&base)
        || DENIED_BASE_COMMAND_PREFIXES
            .iter()
            .any(|prefix| base.starts_with(prefix))
}

fn find_runs_denied_command(segment: &str) -> bool {
    let words: Vec<&str> = segment.split_whitespace().collect();
    if words.first().map(|w| base_name(w)) != Some("find") {
        return false;
    }
    words.contains(&"-delete")
        || words.windows(2).any(|pair| {
            matches!(pair[0], "-exec" | "-execdir" | "-ok" | "-okdir")
                && (is_denied_base(base_name(pair[1])) || SHELL_INTERPRETERS.contains(&base_name(pair[1])))
        })
}

/// Drop shell quoting the way the shell would before running a word:
/// `'rm'`, `"rm"`, `r''m` and `\rm` all become `rm`. An escaped `\;` is
/// kept so `find -exec ... \;` stays one segment.
fn strip_quoting(command: &str) -> String {
    let mut out = String::with_capacity(command.len());
    let mut chars = command.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&';') => out.push(c),
            '\\' | '\'' | '"' => {}
            _ => out.push(c),
        }
    }
    out
}

/// Medium tier: refuse destructive patterns, allow everything else.
pub(super) fn evaluate_blacklist(command: &str, extra_patterns: &[String]) -> Decision {
    let normalized = command.split_whitespace().collect::<Vec<_>>().join(" ");
    let dequoted = strip_quoting(&normalized)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    let pattern_hit = BLOCKED_PATTERNS
        .iter()
        .copied()
        .chain(extra_patterns.iter().map(String::as_str))
        .filter(|pattern| !pattern.trim().is_empty())
        .any(|pattern| normalized.contains(pattern) || dequoted.contains(pattern));
    if pattern_hit {
        return Decision::Deny(DenyReason::BlockedPattern);
    }

    // Treat substitutions and groupings as separators so that commands
    // hidden inside `$(...)` or backticks are checked like any other.
    let flattened: String = dequoted
        .replace("$(", ";")
        .chars()
        .map(|c| if matches!(c, '`' | '(' | ')') { ';' } else { c })
        .collect();

    for segment in split_segments(&flattened).segments {
        let invoked = invoked_commands(segment.text);
        if invoked.iter().any(|base| is_denied_base(base)) {
            return Decision::Deny(DenyReason::BlockedPattern);
        }
        if segment.piped
            && invoked
                .iter()
                .any(|base| SHELL_INTERPRETERS.contains(base))
        {
            return Decision::Deny(DenyReason::BlockedPattern);
        }
        if find_runs_denied_command(skip_env_assignments(segment.text.trim())) {
            return Decision::Deny(DenyReason::BlockedPattern);
        }
    }

    Decision::Allow
}
