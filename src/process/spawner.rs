use super::{Command, ExecutionContext};
use crate::error::{PipelineError, GENERIC_FAILURE};
use crate::platform::Platform;
use std::process::ExitStatus;
use tracing::debug;

/// Starts one process and blocks until it exits
pub trait ProcessSpawner: Send + Sync {
    /// Returns the exit code; an error means the process never started
    fn spawn(
        &self,
        platform: Platform,
        command: &Command,
        context: &ExecutionContext,
    ) -> Result<i32, PipelineError>;
}

/// Spawns real child processes with inherited stdio
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemSpawner;

impl ProcessSpawner for SystemSpawner {
    fn spawn(
        &self,
        platform: Platform,
        command: &Command,
        context: &ExecutionContext,
    ) -> Result<i32, PipelineError> {
        let mut process = if command.needs_shell {
            let (shell, flag) = platform.shell();
            let text = command.shell_text(platform);
            debug!(shell, text = %text, "Dispatching through interpreter");

            let mut process = std::process::Command::new(shell);
            process.arg(flag);
            push_shell_text(&mut process, &text);
            process
        } else {
            let mut process = std::process::Command::new(&command.program);
            process.args(&command.args);
            process
        };

        process
            .current_dir(&command.cwd)
            .env("PATH", context.path_value(platform));
        for (key, value) in context.env_vars() {
            process.env(key, value);
        }

        let status = process.status().map_err(|source| PipelineError::Spawn {
            program: command.program_name(),
            source,
        })?;

        Ok(exit_code(status))
    }
}

#[cfg(windows)]
fn push_shell_text(process: &mut std::process::Command, text: &str) {
    use std::os::windows::process::CommandExt;
    // cmd.exe does its own parsing; re-quoting the line would break it.
    process.raw_arg(text);
}

#[cfg(not(windows))]
fn push_shell_text(process: &mut std::process::Command, text: &str) {
    process.arg(text);
}

/// Exit code of a finished process; signals map to `128 + signal`
pub fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    GENERIC_FAILURE
}
