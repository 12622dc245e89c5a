use super::{Command, CommandSpec, ExecutionContext, FailurePolicy, ProcessSpawner};
use crate::error::PipelineError;
use crate::platform::Platform;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Uniform, logged execution of external commands
///
/// Owns platform dispatch: call sites hand over a [`CommandSpec`] and the
/// runner picks the executable name, the dispatch mode and the environment.
/// The failure policy of the spec decides whether a non-zero exit becomes
/// an error or is only logged.
#[derive(Clone)]
pub struct CommandRunner {
    platform: Platform,
    context: ExecutionContext,
    spawner: Arc<dyn ProcessSpawner>,
}

impl CommandRunner {
    pub fn new(
        platform: Platform,
        context: ExecutionContext,
        spawner: Arc<dyn ProcessSpawner>,
    ) -> Self {
        Self {
            platform,
            context,
            spawner,
        }
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn context(&self) -> &ExecutionContext {
        &self.context
    }

    /// Build the concrete command without running it
    pub fn prepare(&self, spec: CommandSpec) -> Command {
        spec.resolve(self.platform, self.context.working_dir())
    }

    /// Run one command and return its exit code
    ///
    /// Fatal commands that exit non-zero return
    /// [`PipelineError::CommandFailed`] carrying the code unchanged.
    pub fn run(&self, spec: CommandSpec) -> Result<i32, PipelineError> {
        let command = self.prepare(spec);
        info!(cwd = %command.cwd.display(), "+ {}", command.display());

        let code = self
            .spawner
            .spawn(self.platform, &command, &self.context)?;

        match (code, command.policy) {
            (0, _) => Ok(0),
            (code, FailurePolicy::Fatal) => {
                error!(program = %command.program_name(), code, "Command failed");
                Err(PipelineError::CommandFailed {
                    program: command.program_name(),
                    code,
                })
            }
            (code, FailurePolicy::BestEffort) => {
                warn!(
                    program = %command.program_name(),
                    code,
                    "Command failed, continuing"
                );
                Ok(code)
            }
        }
    }
}

impl std::fmt::Debug for CommandRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandRunner")
            .field("platform", &self.platform)
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::Tool;
    use crate::process::ScriptedSpawner;

    fn runner_with(code: i32) -> (CommandRunner, Arc<ScriptedSpawner>) {
        let spawner = Arc::new(ScriptedSpawner::new(move |_| code));
        let runner = CommandRunner::new(
            Platform::Linux,
            ExecutionContext::new("/project", None),
            spawner.clone(),
        );
        (runner, spawner)
    }

    #[test]
    fn test_success() {
        let (runner, spawner) = runner_with(0);
        let code = runner.run(CommandSpec::new(Tool::Gn).arg("gen")).unwrap();
        assert_eq!(code, 0);
        assert_eq!(spawner.invocations(), vec!["gn gen"]);
    }

    #[test]
    fn test_fatal_failure_surfaces_code() {
        let (runner, _) = runner_with(42);
        let err = runner.run(CommandSpec::new(Tool::Ninja)).unwrap_err();
        assert_eq!(err.exit_code(), 42);
        assert!(matches!(
            err,
            PipelineError::CommandFailed { ref program, code: 42 } if program == "ninja"
        ));
    }

    #[test]
    fn test_best_effort_failure_returns_code() {
        let (runner, _) = runner_with(1);
        let code = runner
            .run(CommandSpec::new(Tool::Git).arg("apply").best_effort())
            .unwrap();
        assert_eq!(code, 1);
    }

    #[test]
    fn test_default_cwd_comes_from_context() {
        let (runner, spawner) = runner_with(0);
        runner.run(CommandSpec::new(Tool::Git)).unwrap();
        runner
            .run(CommandSpec::new(Tool::Git).current_dir("/elsewhere"))
            .unwrap();

        let calls = spawner.calls();
        assert_eq!(calls[0].cwd, std::path::PathBuf::from("/project"));
        assert_eq!(calls[1].cwd, std::path::PathBuf::from("/elsewhere"));
    }

    #[test]
    fn test_windows_dispatch_inside_runner() {
        let spawner = Arc::new(ScriptedSpawner::succeeding());
        let runner = CommandRunner::new(
            Platform::Windows,
            ExecutionContext::new("C:/p", None),
            spawner.clone(),
        );

        let cmd = runner.prepare(CommandSpec::new(Tool::Gclient).arg("runhooks"));
        assert_eq!(cmd.program_name(), "gclient.bat");
        assert!(cmd.needs_shell);

        let cmd = runner.prepare(CommandSpec::new(Tool::Git).arg("clone"));
        assert_eq!(cmd.program_name(), "git");
        assert!(!cmd.needs_shell);
    }
}
