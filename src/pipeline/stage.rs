use super::context::PipelineContext;
use crate::error::PipelineError;
use crate::fs::FileSystem;
use crate::process::FailurePolicy;
use serde::Serialize;
use std::path::PathBuf;

/// Filesystem condition deciding whether a stage runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Precondition {
    Always,
    /// Run only while the path is absent; its existence is the stage's postcondition
    UnlessExists(PathBuf),
    /// Run only when the path exists
    IfExists(PathBuf),
}

/// Result of checking a [`Precondition`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", content = "reason", rename_all = "snake_case")]
pub enum Gate {
    Run,
    Skip(String),
}

impl Precondition {
    pub fn check(&self, fs: &dyn FileSystem) -> Gate {
        match self {
            Precondition::Always => Gate::Run,
            Precondition::UnlessExists(path) if fs.exists(path) => {
                Gate::Skip(format!("{} already exists", path.display()))
            }
            Precondition::IfExists(path) if !fs.exists(path) => {
                Gate::Skip(format!("{} not found", path.display()))
            }
            Precondition::UnlessExists(_) | Precondition::IfExists(_) => Gate::Run,
        }
    }
}

/// One pipeline step
pub trait Stage: Send + Sync {
    fn name(&self) -> &'static str;

    fn precondition(&self, _context: &PipelineContext) -> Precondition {
        Precondition::Always
    }

    fn policy(&self) -> FailurePolicy {
        FailurePolicy::Fatal
    }

    fn execute(&self, context: &mut PipelineContext) -> Result<(), PipelineError>;
}
