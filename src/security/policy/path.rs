use std::path::{Component, Path, PathBuf};

use super::types::{Decision, DenyReason};

/// Expand a leading `~` / `~/` to the home directory.
fn expand_tilde(raw: &str) -> PathBuf {
    if raw == "~" || raw.starts_with("~/") {
        PathBuf::from(shellexpand::tilde(raw).as_ref())
    } else {
        PathBuf::from(raw)
    }
}

/// Canonicalize the deepest existing ancestor of `path` and re-apply the
/// remaining components lexically.
///
/// `..` inside the existing part is resolved by the kernel (so symlinks are
/// followed first); `..` in the non-existent tail pops lexically, which is
/// exact because a missing directory cannot be a symlink.
pub fn canonicalize_lenient(path: &Path) -> PathBuf {
    let components: Vec<Component<'_>> = path.components().collect();

    for split in (1..=components.len()).rev() {
        let head: PathBuf = components[..split].iter().collect();
        let Ok(mut resolved) = head.canonicalize() else {
            continue;
        };
        for component in &components[split..] {
            match component {
                Component::ParentDir => {
                    resolved.pop();
                }
                Component::Normal(segment) => resolved.push(segment),
                Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
            }
        }
        return resolved;
    }

    // Nothing resolved (relative path with a missing first segment, or no
    // filesystem access at all): normalize lexically.
    let mut normalized = PathBuf::new();
    for component in components {
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

/// Turn a requested path into an absolute, symlink-free path.
///
/// Relative paths are anchored at `base`. Never touches the filesystem
/// beyond `canonicalize` on existing ancestors.
pub fn resolve_path(raw: &str, base: &Path) -> Result<PathBuf, DenyReason> {
    if raw.trim().is_empty() {
        return Err(DenyReason::EmptyInput);
    }
    // Null bytes truncate paths in C-backed syscalls
    if raw.contains('\0') {
        return Err(DenyReason::InvalidPath);
    }

    Ok(canonicalize_lenient(&absolute_path(raw, base)))
}

/// Tilde-expand and anchor `raw` at `base` without resolving anything.
pub fn absolute_path(raw: &str, base: &Path) -> PathBuf {
    let expanded = expand_tilde(raw);
    if expanded.is_absolute() {
        expanded
    } else {
        base.join(expanded)
    }
}

/// Component-aware prefix check: `/home/user` covers `/home/user/x` but not
/// `/home/user2`.
pub fn is_within_any(resolved: &Path, prefixes: &[PathBuf]) -> bool {
    prefixes.iter().any(|prefix| resolved.starts_with(prefix))
}

/// Evaluate `path` against a set of already-canonical prefixes.
pub fn evaluate_path(raw: &str, base: &Path, prefixes: &[PathBuf]) -> Decision {
    match resolve_path(raw, base) {
        Ok(resolved) if is_within_any(&resolved, prefixes) => Decision::Allow,
        Ok(_) => Decision::Deny(DenyReason::OutsideAllowedPaths),
        Err(reason) => Decision::Deny(reason),
    }
}
