//! Deadline-bound shell execution.

mod shell;

pub use shell::{SAFE_ENV_VARS, ShellExecutor};

use crate::error::ExecError;
use serde::Serialize;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

/// Exit status reported for a command killed at its deadline, as `timeout(1)` does.
pub const TIMEOUT_EXIT_STATUS: i32 = 124;

/// Outcome of one command run. Never mutated once produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandResult {
    pub exit_status: i32,
    pub stdout: String,
    pub stderr: String,
    pub executed_command: String,
    pub timed_out: bool,
    pub duration_ms: u64,
}

impl CommandResult {
    pub const fn success(&self) -> bool {
        self.exit_status == 0 && !self.timed_out
    }
}

/// Anything that can run an already-authorized command.
pub trait CommandRunner: Send + Sync {
    fn run<'a>(
        &'a self,
        command: &'a str,
        timeout: Duration,
    ) -> Pin<Box<dyn Future<Output = Result<CommandResult, ExecError>> + Send + 'a>>;
}
