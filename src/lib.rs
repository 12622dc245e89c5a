//! overlaybuild - reproducible builds of a launcher inside an upstream source tree
//!
//! The pipeline bootstraps a toolchain, acquires (or reuses) a large upstream
//! source tree, mirrors the local project into it, optionally applies a patch,
//! builds one target and copies the binary to `<project>/artifacts`.
//!
//! # Core Concepts
//!
//! - **Stages**: ordered steps with a filesystem precondition and a failure
//!   policy. A stage whose postcondition already holds is skipped, so an
//!   interrupted run resumes where it stopped.
//! - **Failure policy**: `Fatal` aborts the run with the failing command's
//!   exit code; `BestEffort` (patch application) only logs.
//! - **Execution context**: the search path and environment handed to every
//!   child process, instead of mutating the orchestrator's own environment.
//!
//! # Example Usage
//!
//! ```no_run
//! use overlaybuild::{
//!     BuildConfig, LoggingHandler, PipelineContext, PipelineOrchestrator, Platform,
//!     RealFileSystem, SystemSpawner, WorkspacePaths,
//! };
//! use std::sync::Arc;
//!
//! let paths = WorkspacePaths::from_project_root("/src/launcher");
//! let mut context = PipelineContext::new(
//!     paths,
//!     BuildConfig::from_env(),
//!     Platform::host(),
//!     Arc::new(RealFileSystem::new()),
//!     Arc::new(SystemSpawner),
//! );
//!
//! let orchestrator = PipelineOrchestrator::new(Some(Arc::new(LoggingHandler)));
//! match orchestrator.execute(&mut context) {
//!     Ok(report) => println!("artifact: {:?}", report.artifact),
//!     Err(e) => std::process::exit(e.exit_code()),
//! }
//! ```
//!
//! # Project Structure
//!
//! - [`process`]: command abstraction, runner and process spawning
//! - [`workspace`]: project root resolution and derived paths
//! - [`pin_config`]: pin file synthesis and merge
//! - [`pipeline`]: stage engine and the concrete stages
//! - [`fs`]: filesystem seam with real and in-memory implementations

pub mod cli;
pub mod config;
pub mod error;
pub mod fs;
pub mod pin_config;
pub mod pipeline;
pub mod platform;
pub mod process;
pub mod progress;
pub mod util;
pub mod workspace;

pub use config::{BuildConfig, ConfigError};
pub use error::PipelineError;
pub use fs::{FileSystem, MockFileSystem, RealFileSystem};
pub use pin_config::{PinConfig, PinWrite, Solution};
pub use pipeline::{
    Gate, PipelineContext, PipelineOrchestrator, PlannedStage, Precondition, RunReport, Stage,
    StageOutcome, StageReport,
};
pub use platform::{DispatchMode, Platform, Tool};
pub use process::{
    Command, CommandRunner, CommandSpec, ExecutionContext, FailurePolicy, ProcessSpawner,
    ScriptedSpawner, SystemSpawner,
};
pub use progress::{LoggingHandler, NoOpHandler, PipelineEvent, ProgressHandler};
pub use util::{init_default, init_from_env, init_logging, LoggingConfig};
pub use workspace::{WorkspacePaths, WorkspaceResolver};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
