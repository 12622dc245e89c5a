use crate::error::PipelineError;
use crate::fs::{FileSystem, FileType};
use crate::pipeline::stage::Stage;
use crate::pipeline::PipelineContext;
use crate::workspace::{ARTIFACTS_DIR_NAME, WORK_DIR_NAME};
use std::ffi::OsStr;
use std::path::Path;
use tracing::{debug, info};

/// Directory names never mirrored, wherever they appear
pub const EXCLUDED_NAMES: &[&str] = &[".git", ".github", "__pycache__"];

/// Whether a path relative to the project root stays out of the overlay
///
/// The work and artifacts directories are excluded only at the top level;
/// metadata and byte-code caches are excluded at any depth.
pub fn is_excluded(relative: &Path) -> bool {
    let top_level = relative.components().count() == 1;
    let name = relative.file_name().and_then(OsStr::to_str).unwrap_or_default();

    (top_level && (name == WORK_DIR_NAME || name == ARTIFACTS_DIR_NAME))
        || EXCLUDED_NAMES.contains(&name)
}

/// Written into every overlay this stage creates
pub const OVERLAY_MARKER: &str = ".overlaybuild-overlay";

/// Replaces the overlay inside the source tree with a fresh copy of the project
///
/// An existing directory is only removed when it carries [`OVERLAY_MARKER`]
/// or is empty; anything else at that location belongs to the source tree.
pub struct OverlayMirror;

impl OverlayMirror {
    fn check_replaceable(fs: &dyn FileSystem, overlay: &Path) -> Result<(), PipelineError> {
        if !fs.exists(overlay) {
            return Ok(());
        }
        if fs.is_dir(overlay) {
            if fs.is_file(&overlay.join(OVERLAY_MARKER)) {
                return Ok(());
            }
            let top_level = |relative: &Path| relative.components().count() > 1;
            if fs.walk(overlay, &top_level)?.is_empty() {
                return Ok(());
            }
        }
        Err(PipelineError::ForeignOverlay(overlay.to_path_buf()))
    }
}

impl Stage for OverlayMirror {
    fn name(&self) -> &'static str {
        "mirror-overlay"
    }

    fn execute(&self, context: &mut PipelineContext) -> Result<(), PipelineError> {
        let fs = context.fs();
        let project_root = &context.paths.project_root;
        let overlay = context.paths.overlay_dir(&context.config.overlay_name);

        Self::check_replaceable(fs, &overlay)?;
        fs.remove_dir_all(&overlay)?;
        fs.create_dir_all(&overlay)?;
        fs.write(&overlay.join(OVERLAY_MARKER), "")?;

        let mut files = 0usize;
        let mut bytes = 0u64;

        for entry in fs.walk(project_root, &is_excluded)? {
            let target = overlay.join(entry.relative());
            match entry.file_type {
                FileType::Directory => fs.create_dir_all(&target)?,
                FileType::Symlink if !fs.is_file(entry.path()) => {
                    debug!(path = %entry.relative().display(), "Skipping link to non-file");
                }
                FileType::File | FileType::Symlink => {
                    bytes += fs.copy_file(entry.path(), &target)?;
                    files += 1;
                }
            }
        }

        info!(
            overlay = %overlay.display(),
            files,
            bytes,
            "Mirrored project into source tree"
        );
        Ok(())
    }
}
