//! Subcommand handlers
//!
//! Each handler returns the process exit code.

use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info};

use super::commands::{BuildArgs, OutputFormatArg, PathsArgs, WorkspaceArgs};
use super::output::OutputFormatter;
use crate::config::BuildConfig;
use crate::error::{PipelineError, GENERIC_FAILURE};
use crate::fs::{FileSystem, RealFileSystem};
use crate::pipeline::{PipelineContext, PipelineOrchestrator};
use crate::platform::Platform;
use crate::process::SystemSpawner;
use crate::progress::LoggingHandler;
use crate::workspace::{workspace_signal, WorkspacePaths, WorkspaceResolver};

pub fn handle_build(args: &BuildArgs) -> i32 {
    let mut context = match prepare(args) {
        Ok(context) => context,
        Err(code) => return code,
    };

    let orchestrator = PipelineOrchestrator::new(Some(Arc::new(LoggingHandler)));
    match orchestrator.execute(&mut context) {
        Ok(report) => {
            if let Some(artifact) = &report.artifact {
                info!(artifact = %artifact.display(), "Build complete");
            }
            print_output(args.format, |f| f.format_report(&report))
        }
        Err(e) => {
            error!("Build failed: {}", e);
            e.exit_code()
        }
    }
}

pub fn handle_plan(args: &BuildArgs) -> i32 {
    let context = match prepare(args) {
        Ok(context) => context,
        Err(code) => return code,
    };

    let plan = PipelineOrchestrator::new(None).plan(&context);
    print_output(args.format, |f| f.format_plan(&plan))
}

pub fn handle_paths(args: &PathsArgs) -> i32 {
    let fs = RealFileSystem::new();
    match resolve_paths(&args.workspace, &fs) {
        Ok(paths) => print_output(args.format, |f| f.format_paths(&paths)),
        Err(e) => {
            error!("{:#}", e);
            GENERIC_FAILURE
        }
    }
}

/// Configuration from the environment with CLI overrides applied
pub fn build_config(args: &BuildArgs, base: BuildConfig) -> BuildConfig {
    let mut config = base;
    if let Some(target) = &args.target {
        debug!("Target overridden to: {}", target);
        config.target = target.clone();
    }
    if let Some(os) = &args.target_os {
        config.target_os = os.to_lowercase();
    }
    if let Some(cpu) = &args.target_cpu {
        config.target_cpu = cpu.to_lowercase();
    }
    config
}

/// Workspace paths for this invocation
///
/// `--project-root` stands in for the environment signal; either way the
/// candidate must carry the marker file or the location-relative default
/// is used.
pub fn resolve_paths(args: &WorkspaceArgs, fs: &dyn FileSystem) -> Result<WorkspacePaths> {
    let cwd = env::current_dir().context("Failed to get current directory")?;
    let exe = env::current_exe().context("Failed to locate the running executable")?;

    let resolver = WorkspaceResolver::new(fs);
    let signal: Option<PathBuf> = args
        .project_root
        .clone()
        .or_else(|| workspace_signal(|key| env::var(key).ok()))
        .map(|candidate| absolutize(&cwd, candidate));

    let fallback = resolver.relative_default(&exe, &cwd);
    let paths = resolver.resolve(signal.as_deref(), &fallback);
    debug!("Project root: {}", paths.project_root.display());
    Ok(paths)
}

fn absolutize(cwd: &std::path::Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        cwd.join(path)
    }
}

fn prepare(args: &BuildArgs) -> Result<PipelineContext, i32> {
    let config = build_config(args, BuildConfig::from_env());
    if let Err(e) = config.validate().map_err(PipelineError::from) {
        error!("Configuration error: {}", e);
        eprintln!("\nPlease check your OVERLAYBUILD_* environment variables and command-line arguments.");
        return Err(e.exit_code());
    }
    debug!("{}", config);

    let fs = Arc::new(RealFileSystem::new());
    let paths = match resolve_paths(&args.workspace, fs.as_ref()) {
        Ok(paths) => paths,
        Err(e) => {
            error!("{:#}", e);
            return Err(GENERIC_FAILURE);
        }
    };

    Ok(PipelineContext::new(
        paths,
        config,
        Platform::host(),
        fs,
        Arc::new(SystemSpawner),
    ))
}

fn print_output<F>(format: OutputFormatArg, render: F) -> i32
where
    F: FnOnce(&OutputFormatter) -> Result<String>,
{
    let formatter = OutputFormatter::new(format.into());
    match render(&formatter) {
        Ok(text) => {
            print!("{}", text);
            if !text.ends_with('\n') {
                println!();
            }
            0
        }
        Err(e) => {
            error!("{:#}", e);
            GENERIC_FAILURE
        }
    }
}
