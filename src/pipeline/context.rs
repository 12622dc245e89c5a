//! Pipeline context shared by every stage

use std::path::PathBuf;
use std::sync::Arc;

use crate::config::BuildConfig;
use crate::fs::FileSystem;
use crate::platform::Platform;
use crate::process::{CommandRunner, ExecutionContext, ProcessSpawner};
use crate::workspace::WorkspacePaths;

use super::stages::toolchain;

/// Context that owns all long-lived pipeline dependencies
pub struct PipelineContext {
    /// Canonical paths of this run
    pub paths: WorkspacePaths,

    /// Immutable build configuration
    pub config: BuildConfig,

    /// File system abstraction
    pub file_system: Arc<dyn FileSystem>,

    /// Runner carrying the toolchain-augmented execution context
    pub runner: CommandRunner,

    /// Set once the artifact has been collected
    pub artifact: Option<PathBuf>,
}

impl PipelineContext {
    /// Context whose child processes inherit the current `PATH`
    pub fn new(
        paths: WorkspacePaths,
        config: BuildConfig,
        platform: Platform,
        file_system: Arc<dyn FileSystem>,
        spawner: Arc<dyn ProcessSpawner>,
    ) -> Self {
        let base = ExecutionContext::inherit(&paths.project_root);
        Self::with_execution_context(paths, config, platform, file_system, spawner, base)
    }

    /// Context built on an explicit base execution context
    ///
    /// The toolchain root is prepended to the base search path here, so it
    /// applies for the whole run even when the bootstrap stage is skipped.
    pub fn with_execution_context(
        paths: WorkspacePaths,
        config: BuildConfig,
        platform: Platform,
        file_system: Arc<dyn FileSystem>,
        spawner: Arc<dyn ProcessSpawner>,
        base: ExecutionContext,
    ) -> Self {
        let execution = toolchain::augment(base, &paths);
        Self {
            runner: CommandRunner::new(platform, execution, spawner),
            paths,
            config,
            file_system,
            artifact: None,
        }
    }

    pub fn fs(&self) -> &dyn FileSystem {
        self.file_system.as_ref()
    }

    pub fn platform(&self) -> Platform {
        self.runner.platform()
    }
}
