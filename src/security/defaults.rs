/// Commands permitted under the high tier unless the operator overrides them.
#[must_use]
pub fn default_allowed_commands() -> Vec<String> {
    [
        "ls", "dir", "pwd", "echo", "cat", "head", "tail", "grep", "find", "wc", "date", "ps",
        "df",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

/// Base commands refused under the medium tier, wherever they appear in a
/// pipeline or command list.
pub const DENIED_BASE_COMMANDS: &[&str] = &[
    "rm", "rmdir", "mv", "dd", "mkfs", "sudo", "su", "doas", "shred", "wipefs", "fdisk",
    "parted", "shutdown", "reboot", "halt", "poweroff",
];

/// Interpreters that must never receive piped input under the medium tier.
pub const SHELL_INTERPRETERS: &[&str] = &[
    "sh", "bash", "zsh", "dash", "ksh", "fish", "csh", "tcsh",
];

/// Substrings refused under the medium tier. Matched against the command
/// with runs of whitespace collapsed to a single space.
pub const BLOCKED_PATTERNS: &[&str] = &[
    // Recursive delete
    "rm -rf",
    "rm -fr",
    "rm -r ",
    "rm -R",
    "rm --recursive",
    "--no-preserve-root",
    // Disk formatting / raw device writes
    "mkfs",
    "dd if=",
    "of=/dev/",
    "> /dev/sd",
    ">/dev/sd",
    "> /dev/nvme",
    // Permission escalation
    "sudo ",
    "su -",
    "doas ",
    "chmod -R 777 /",
    "chmod 777 /",
    "chown -R root",
    // Piping into interpreters
    "| sh",
    "|sh",
    "| bash",
    "|bash",
    "| zsh",
    "| /bin/sh",
    "| /bin/bash",
    "| python",
    "| perl",
    // Fork bombs
    ":(){",
    ":|:&",
];

/// Base-command prefixes refused under the medium tier (`mkfs.ext4`, ...).
pub const DENIED_BASE_COMMAND_PREFIXES: &[&str] = &["mkfs."];
