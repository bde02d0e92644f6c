use super::{CommandResult, CommandRunner, TIMEOUT_EXIT_STATUS};
use crate::error::ExecError;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::process::{ExitStatus, Stdio};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::task::JoinHandle;

/// Environment variables passed through to commands.
/// Only functional variables are included, never API keys or secrets.
pub const SAFE_ENV_VARS: &[&str] = &[
    "PATH", "HOME", "TERM", "LANG", "LC_ALL", "LC_CTYPE", "USER", "SHELL",
];

/// How long to wait for the output pipes to close once the shell is gone.
/// Background grandchildren can keep them open indefinitely.
const PIPE_DRAIN_GRACE: Duration = Duration::from_secs(1);

#[derive(Debug, Default)]
struct Capture {
    bytes: Vec<u8>,
    truncated: bool,
}

/// Read `reader` to EOF, keeping at most `limit` bytes. Reading continues
/// past the limit so the child never blocks on a full pipe.
async fn drain<R>(reader: Option<R>, sink: Arc<Mutex<Capture>>, limit: usize)
where
    R: AsyncRead + Unpin,
{
    let Some(mut reader) = reader else {
        return;
    };
    let mut chunk = [0u8; 8192];
    loop {
        let n = match reader.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => n,
        };
        let mut capture = sink.lock().unwrap_or_else(PoisonError::into_inner);
        let room = limit.saturating_sub(capture.bytes.len());
        if n > room {
            capture.truncated = true;
        }
        capture.bytes.extend_from_slice(&chunk[..n.min(room)]);
    }
}

async fn settle(mut handle: JoinHandle<()>) {
    if tokio::time::timeout(PIPE_DRAIN_GRACE, &mut handle).await.is_err() {
        handle.abort();
    }
}

fn render(sink: &Mutex<Capture>, limit: usize, label: &str) -> String {
    let capture = std::mem::take(&mut *sink.lock().unwrap_or_else(PoisonError::into_inner));
    let mut text = String::from_utf8_lossy(&capture.bytes).into_owned();
    if capture.truncated || text.len() > limit {
        text.truncate(text.floor_char_boundary(limit));
        text.push_str(&format!("\n... [{label} truncated at {limit} bytes]"));
    }
    text
}

#[cfg(unix)]
fn exit_code(status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    status
        .code()
        .or_else(|| status.signal().map(|sig| 128 + sig))
        .unwrap_or(-1)
}

#[cfg(not(unix))]
fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(-1)
}

/// SIGKILL the whole process group led by the shell, so commands it spawned
/// (pipelines, subshells, `sh -c` grandchildren) die with it.
#[cfg(unix)]
fn kill_group(child: &mut tokio::process::Child) {
    let Some(pid) = child.id().and_then(|pid| libc::pid_t::try_from(pid).ok()) else {
        return;
    };
    // SAFETY: killpg has no memory-safety preconditions. The shell leads its
    // own group (process_group(0)) and is not yet reaped, so the id is ours.
    if unsafe { libc::killpg(pid, libc::SIGKILL) } != 0 {
        tracing::debug!(
            error = %std::io::Error::last_os_error(),
            "killing command process group failed"
        );
    }
}

#[cfg(not(unix))]
fn kill_group(_child: &mut tokio::process::Child) {}

/// Runs commands through `sh -c` with a scrubbed environment.
#[derive(Debug, Clone)]
pub struct ShellExecutor {
    working_dir: PathBuf,
    max_output_bytes: usize,
}

impl ShellExecutor {
    pub fn new(working_dir: impl Into<PathBuf>, max_output_bytes: usize) -> Self {
        Self {
            working_dir: working_dir.into(),
            max_output_bytes,
        }
    }

    async fn execute(&self, command: &str, timeout: Duration) -> Result<CommandResult, ExecError> {
        // Clear the environment so the API key and other secrets never reach
        // the child, then re-add only safe, functional variables.
        let mut cmd = tokio::process::Command::new("sh");
        cmd.arg("-c")
            .arg(command)
            .current_dir(&self.working_dir)
            .env_clear()
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        #[cfg(unix)]
        cmd.process_group(0);
        for var in SAFE_ENV_VARS {
            if let Ok(val) = std::env::var(var) {
                cmd.env(var, val);
            }
        }

        let started = Instant::now();
        let mut child = cmd.spawn().map_err(ExecError::Spawn)?;

        let limit = self.max_output_bytes;
        let stdout_sink = Arc::new(Mutex::new(Capture::default()));
        let stderr_sink = Arc::new(Mutex::new(Capture::default()));
        let stdout_task = tokio::spawn(drain(child.stdout.take(), Arc::clone(&stdout_sink), limit));
        let stderr_task = tokio::spawn(drain(child.stderr.take(), Arc::clone(&stderr_sink), limit));

        let exit_status = match tokio::time::timeout(timeout, child.wait()).await {
            Ok(Ok(status)) => Some(exit_code(status)),
            Ok(Err(e)) => return Err(ExecError::Wait(e)),
            Err(_) => {
                tracing::warn!(command, timeout_secs = timeout.as_secs(), "command timed out, killing");
                kill_group(&mut child);
                if let Err(e) = child.start_kill() {
                    tracing::debug!(error = %e, "kill after timeout failed");
                }
                if let Err(e) = child.wait().await {
                    tracing::debug!(error = %e, "reaping killed command failed");
                }
                None
            }
        };

        settle(stdout_task).await;
        settle(stderr_task).await;

        let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        Ok(CommandResult {
            exit_status: exit_status.unwrap_or(TIMEOUT_EXIT_STATUS),
            stdout: render(&stdout_sink, limit, "output"),
            stderr: render(&stderr_sink, limit, "stderr"),
            executed_command: command.to_string(),
            timed_out: exit_status.is_none(),
            duration_ms,
        })
    }
}

impl CommandRunner for ShellExecutor {
    fn run<'a>(
        &'a self,
        command: &'a str,
        timeout: Duration,
    ) -> Pin<Box<dyn Future<Output = Result<CommandResult, ExecError>> + Send + 'a>> {
        Box::pin(self.execute(command, timeout))
    }
}
