use crate::config::ConfigError;
use std::path::PathBuf;
use thiserror::Error;

/// Exit code for failures that did not come from a child process
pub const GENERIC_FAILURE: i32 = 1;

/// Errors that terminate a pipeline run
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A Fatal-policy command exited non-zero
    #[error("`{program}` exited with code {code}")]
    CommandFailed { program: String, code: i32 },

    /// A command could not be started at all
    #[error("Failed to start `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The compiled binary was not where the build leaves it
    #[error("Build artifact not found: {}", .0.display())]
    MissingArtifact(PathBuf),

    /// The overlay location holds content this tool did not put there
    #[error("Refusing to replace {}: not an overlay written by overlaybuild", .0.display())]
    ForeignOverlay(PathBuf),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Filesystem(#[from] anyhow::Error),
}

impl PipelineError {
    /// Process exit code this error surfaces as
    ///
    /// Failed commands pass their own code through unchanged.
    pub fn exit_code(&self) -> i32 {
        match self {
            PipelineError::CommandFailed { code, .. } if *code != 0 => *code,
            _ => GENERIC_FAILURE,
        }
    }
}
