//! Workspace path resolution
//!
//! All paths of a run derive from one project root. Transient state lives
//! under `<project>/build`, so nothing the pipeline writes escapes the
//! project except the artifact directory, which is also inside it.

use crate::fs::FileSystem;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// File whose presence identifies a project root
pub const MARKER_FILE: &str = "BUILD.gn";
pub const WORK_DIR_NAME: &str = "build";
pub const ARTIFACTS_DIR_NAME: &str = "artifacts";
pub const TOOLCHAIN_DIR_NAME: &str = "depot_tools";
pub const SOURCE_PARENT_NAME: &str = "chromium";
pub const SOURCE_DIR_NAME: &str = "src";
pub const PIN_FILE_NAME: &str = ".gclient";
/// Written next to the source tree once sync and hooks have both succeeded
pub const SOURCE_STAMP_NAME: &str = ".overlaybuild-synced";

/// Environment variables consulted for the workspace root, in order
pub const WORKSPACE_SIGNALS: &[&str] = &["OVERLAYBUILD_WORKSPACE", "GITHUB_WORKSPACE"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkspacePaths {
    pub project_root: PathBuf,
    pub work_root: PathBuf,
    pub toolchain_root: PathBuf,
    pub source_tree_root: PathBuf,
    pub artifacts_dir: PathBuf,
}

impl WorkspacePaths {
    pub fn from_project_root(project_root: impl Into<PathBuf>) -> Self {
        let project_root = project_root.into();
        let work_root = project_root.join(WORK_DIR_NAME);

        Self {
            toolchain_root: work_root.join(TOOLCHAIN_DIR_NAME),
            source_tree_root: work_root.join(SOURCE_PARENT_NAME).join(SOURCE_DIR_NAME),
            artifacts_dir: project_root.join(ARTIFACTS_DIR_NAME),
            work_root,
            project_root,
        }
    }

    /// Directory holding the source tree and its pin configuration
    pub fn source_parent(&self) -> PathBuf {
        self.work_root.join(SOURCE_PARENT_NAME)
    }

    pub fn pin_config_file(&self) -> PathBuf {
        self.source_parent().join(PIN_FILE_NAME)
    }

    pub fn source_stamp(&self) -> PathBuf {
        self.source_parent().join(SOURCE_STAMP_NAME)
    }

    pub fn overlay_dir(&self, overlay_name: &str) -> PathBuf {
        self.source_tree_root.join(overlay_name)
    }

    pub fn build_output_dir(&self, output_dir: &str) -> PathBuf {
        self.source_tree_root.join(output_dir)
    }

    pub fn artifact_path(&self, binary_name: &str) -> PathBuf {
        self.artifacts_dir.join(binary_name)
    }
}

/// Picks the project root from an external signal or a fallback location
pub struct WorkspaceResolver<'a> {
    fs: &'a dyn FileSystem,
}

impl<'a> WorkspaceResolver<'a> {
    pub fn new(fs: &'a dyn FileSystem) -> Self {
        Self { fs }
    }

    pub fn has_marker(&self, root: &Path) -> bool {
        self.fs.is_file(&root.join(MARKER_FILE))
    }

    /// Resolve the workspace
    ///
    /// `signal` wins when it carries the marker file; otherwise `fallback`
    /// is used as-is.
    pub fn resolve(&self, signal: Option<&Path>, fallback: &Path) -> WorkspacePaths {
        let root = match signal {
            Some(candidate) if self.has_marker(candidate) => {
                debug!(root = %candidate.display(), "Using signalled workspace root");
                candidate.to_path_buf()
            }
            Some(candidate) => {
                warn!(
                    candidate = %candidate.display(),
                    fallback = %fallback.display(),
                    "No {} at signalled workspace root, using fallback",
                    MARKER_FILE
                );
                fallback.to_path_buf()
            }
            None => fallback.to_path_buf(),
        };

        if !self.has_marker(&root) {
            warn!(root = %root.display(), "Project root has no {}", MARKER_FILE);
        }

        WorkspacePaths::from_project_root(root)
    }

    /// Default root relative to the orchestrator's own location
    ///
    /// The nearest ancestor of `exe` that carries the marker file, or `cwd`
    /// when none does.
    pub fn relative_default(&self, exe: &Path, cwd: &Path) -> PathBuf {
        exe.ancestors()
            .skip(1)
            .find(|dir| self.has_marker(dir))
            .map(Path::to_path_buf)
            .unwrap_or_else(|| cwd.to_path_buf())
    }
}

/// First non-empty workspace signal from `lookup`
pub fn workspace_signal<F>(lookup: F) -> Option<PathBuf>
where
    F: Fn(&str) -> Option<String>,
{
    WORKSPACE_SIGNALS
        .iter()
        .filter_map(|key| lookup(key))
        .map(|v| v.trim().to_string())
        .find(|v| !v.is_empty())
        .map(PathBuf::from)
}
