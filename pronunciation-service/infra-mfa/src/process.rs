use std::{
    ffi::OsString,
    fmt,
    process::{ExitStatus, Stdio},
    time::Duration,
};

use tokio::process::Command;

const MAX_DIAGNOSTIC_BYTES: usize = 4 * 1024;

/// Command line used to reach the aligner.
///
/// Parsed from a whitespace-separated string so wrappers such as
/// `conda run -n aligner mfa` work as well as a bare `mfa`. On unix the
/// command runs in its own process group, and a timeout kills the whole
/// group so the wrapped `mfa` does not outlive its wrapper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MfaCommand {
    program: String,
    leading_args: Vec<String>,
}

impl MfaCommand {
    pub fn parse(raw: &str) -> Option<Self> {
        let mut parts = raw.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self {
            program,
            leading_args: parts.collect(),
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub(crate) async fn run(
        &self,
        args: Vec<OsString>,
        timeout: Duration,
    ) -> Result<CommandOutput, ProcessError> {
        let mut command = Command::new(&self.program);
        command
            .args(&self.leading_args)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        #[cfg(unix)]
        command.process_group(0);

        tracing::debug!(
            program = %self.program,
            args = ?args,
            timeout_ms = timeout.as_millis() as u64,
            "spawning aligner command"
        );

        let child = command.spawn().map_err(|err| ProcessError::Spawn {
            program: self.program.clone(),
            message: err.to_string(),
        })?;

        let pid = child.id();
        // dropping the child on timeout kills it (kill_on_drop)
        match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => Ok(CommandOutput {
                status: output.status,
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            }),
            Ok(Err(err)) => Err(ProcessError::Wait {
                program: self.program.clone(),
                message: err.to_string(),
            }),
            Err(_) => {
                if let Some(pid) = pid {
                    kill_process_group(pid);
                }
                Err(ProcessError::TimedOut {
                    program: self.program.clone(),
                    timeout,
                })
            }
        }
    }
}

#[cfg(unix)]
fn kill_process_group(pid: u32) {
    use nix::{
        sys::signal::{killpg, Signal},
        unistd::Pid,
    };

    let Ok(raw) = i32::try_from(pid) else {
        return;
    };
    if let Err(err) = killpg(Pid::from_raw(raw), Signal::SIGKILL) {
        tracing::warn!(pid, error = %err, "failed to kill timed-out process group");
    }
}

#[cfg(not(unix))]
fn kill_process_group(_pid: u32) {}

impl fmt::Display for MfaCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.leading_args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

#[derive(Debug)]
pub(crate) struct CommandOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// Stderr, or stdout when stderr is empty, trimmed to its tail.
    pub fn diagnostic(&self) -> String {
        let stderr = self.stderr.trim();
        let text = if stderr.is_empty() {
            self.stdout.trim()
        } else {
            stderr
        };
        if text.is_empty() {
            return "no diagnostic output".to_string();
        }
        tail(text, MAX_DIAGNOSTIC_BYTES).to_string()
    }
}

#[derive(Debug)]
pub(crate) enum ProcessError {
    Spawn { program: String, message: String },
    Wait { program: String, message: String },
    TimedOut { program: String, timeout: Duration },
}

impl fmt::Display for ProcessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessError::Spawn { program, message } => {
                write!(f, "failed to spawn `{program}`: {message}")
            }
            ProcessError::Wait { program, message } => {
                write!(f, "failed waiting for `{program}`: {message}")
            }
            ProcessError::TimedOut { program, timeout } => {
                write!(f, "`{program}` timed out after {}ms", timeout.as_millis())
            }
        }
    }
}

fn tail(text: &str, max_bytes: usize) -> &str {
    if text.len() <= max_bytes {
        return text;
    }
    let mut start = text.len() - max_bytes;
    while !text.is_char_boundary(start) {
        start += 1;
    }
    &text[start..]
}
