use crate::error::PipelineError;
use crate::pipeline::stage::{Precondition, Stage};
use crate::pipeline::PipelineContext;
use crate::platform::Tool;
use crate::process::{CommandSpec, FailurePolicy};
use std::path::PathBuf;

pub const PATCH_DIR_NAME: &str = "patches";
pub const PATCH_FILE_NAME: &str = "upstream.patch";

/// Applies the overlay's patch to the source tree, if there is one
///
/// A patch that does not apply (often because it already is) only produces
/// a warning.
pub struct PatchApplier;

impl PatchApplier {
    pub fn patch_path(context: &PipelineContext) -> PathBuf {
        context
            .paths
            .overlay_dir(&context.config.overlay_name)
            .join(PATCH_DIR_NAME)
            .join(PATCH_FILE_NAME)
    }
}

impl Stage for PatchApplier {
    fn name(&self) -> &'static str {
        "apply-patch"
    }

    fn precondition(&self, context: &PipelineContext) -> Precondition {
        Precondition::IfExists(Self::patch_path(context))
    }

    fn policy(&self) -> FailurePolicy {
        FailurePolicy::BestEffort
    }

    fn execute(&self, context: &mut PipelineContext) -> Result<(), PipelineError> {
        let command = CommandSpec::new(Tool::Git)
            .args(["apply", "--ignore-whitespace", "--whitespace=nowarn"])
            .arg(Self::patch_path(context))
            .current_dir(&context.paths.source_tree_root)
            .best_effort();

        match context.runner.run(command)? {
            0 => Ok(()),
            code => Err(PipelineError::CommandFailed {
                program: Tool::Git.to_string(),
                code,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MockFileSystem;
    use crate::pipeline::stage::Gate;
    use crate::pipeline::stages::testing;
    use crate::platform::Platform;
    use crate::process::ScriptedSpawner;
    use std::sync::Arc;

    const PATCH: &str = "/project/build/chromium/src/overlay/patches/upstream.patch";

    #[test]
    fn test_skipped_without_patch() {
        let fs = Arc::new(MockFileSystem::new());
        let spawner = Arc::new(ScriptedSpawner::succeeding());
        let ctx = testing::context(Platform::Linux, &fs, &spawner);

        assert_eq!(
            PatchApplier.precondition(&ctx).check(ctx.fs()),
            Gate::Skip(format!("{PATCH} not found"))
        );
    }

    #[test]
    fn test_applies_against_source_tree() {
        let fs = Arc::new(MockFileSystem::new());
        fs.add_file(PATCH, "diff\n");
        let spawner = Arc::new(ScriptedSpawner::succeeding());
        let mut ctx = testing::context(Platform::Windows, &fs, &spawner);

        assert_eq!(PatchApplier.precondition(&ctx).check(ctx.fs()), Gate::Run);
        PatchApplier.execute(&mut ctx).unwrap();

        let calls = spawner.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(
            calls[0].args_lossy(),
            vec!["apply", "--ignore-whitespace", "--whitespace=nowarn", PATCH]
        );
        assert_eq!(calls[0].cwd, PathBuf::from("/project/build/chromium/src"));
        assert_eq!(calls[0].policy, FailurePolicy::BestEffort);
        assert!(!calls[0].needs_shell);
    }

    #[test]
    fn test_rejected_patch_reports_code() {
        let fs = Arc::new(MockFileSystem::new());
        fs.add_file(PATCH, "diff\n");
        let spawner = Arc::new(ScriptedSpawner::new(|_| 1));
        let mut ctx = testing::context(Platform::Linux, &fs, &spawner);

        let err = PatchApplier.execute(&mut ctx).unwrap_err();
        assert!(matches!(err, PipelineError::CommandFailed { code: 1, .. }));
        assert_eq!(PatchApplier.policy(), FailurePolicy::BestEffort);
    }
}
