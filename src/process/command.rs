use crate::platform::{DispatchMode, Platform, Tool};
use serde::Serialize;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

/// What happens when a command or stage fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Abort the run and surface the exit code
    Fatal,
    /// Log the failure and keep going
    BestEffort,
}

/// A command as written at a call site
///
/// Call sites name a [`Tool`]; the runner turns it into a concrete
/// [`Command`] for the platform.
#[derive(Debug, Clone)]
pub struct CommandSpec {
    tool: Tool,
    tool_dir: Option<PathBuf>,
    args: Vec<OsString>,
    cwd: Option<PathBuf>,
    policy: FailurePolicy,
}

impl CommandSpec {
    pub fn new(tool: Tool) -> Self {
        Self {
            tool,
            tool_dir: None,
            args: Vec::new(),
            cwd: None,
            policy: FailurePolicy::Fatal,
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    /// Run the tool from this directory instead of resolving it on the search path
    pub fn located_in(mut self, dir: impl Into<PathBuf>) -> Self {
        self.tool_dir = Some(dir.into());
        self
    }

    pub fn best_effort(mut self) -> Self {
        self.policy = FailurePolicy::BestEffort;
        self
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    /// Resolve against a platform; `default_cwd` applies when none was set
    pub fn resolve(self, platform: Platform, default_cwd: &Path) -> Command {
        let name = platform.tool_name(self.tool);
        let program = match self.tool_dir {
            Some(dir) => dir.join(name),
            None => PathBuf::from(name),
        };

        Command {
            program,
            args: self.args,
            cwd: self.cwd.unwrap_or_else(|| default_cwd.to_path_buf()),
            needs_shell: platform.dispatch_mode(self.tool) == DispatchMode::ShellText,
            policy: self.policy,
        }
    }
}

/// A fully resolved command, built immediately before execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub program: PathBuf,
    pub args: Vec<OsString>,
    pub cwd: PathBuf,
    /// Run through the platform's command interpreter
    pub needs_shell: bool,
    pub policy: FailurePolicy,
}

impl Command {
    /// File name of the program, e.g. `gclient.bat`
    pub fn program_name(&self) -> String {
        self.program
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.program.display().to_string())
    }

    pub fn args_lossy(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|a| a.to_string_lossy().to_string())
            .collect()
    }

    /// Single line for the platform interpreter, each word quoted as needed
    pub fn shell_text(&self, platform: Platform) -> String {
        std::iter::once(self.program.to_string_lossy().to_string())
            .chain(self.args_lossy())
            .map(|word| platform.quote(&word))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Human-readable echo of the command line
    pub fn display(&self) -> String {
        std::iter::once(self.program.display().to_string())
            .chain(self.args_lossy())
            .collect::<Vec<_>>()
            .join(" ")
    }
}
