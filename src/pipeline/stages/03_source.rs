use crate::error::PipelineError;
use crate::pipeline::stage::{Precondition, Stage};
use crate::pipeline::PipelineContext;
use crate::platform::Tool;
use crate::process::CommandSpec;
use tracing::info;

/// Shallow acquisition of the upstream tree, then dependency sync and hooks
///
/// The clone goes straight to the mirror with minimal history; the pin file
/// written beforehand drives the sync. The stage is skipped only once the
/// stamp written after a successful `runhooks` exists. A tree left behind by
/// an interrupted run is not cloned again; sync and hooks resume on it.
pub struct SourceAcquirer;

impl SourceAcquirer {
    fn clone_spec(context: &PipelineContext) -> CommandSpec {
        let config = &context.config;
        let mut spec = CommandSpec::new(Tool::Git).args([
            "clone",
            "--depth",
            "1",
            "--filter=blob:none",
            "--single-branch",
        ]);
        if let Some(branch) = &config.source_branch {
            spec = spec.arg("--branch").arg(branch);
        }
        spec.arg(&config.mirror_url)
            .arg(&context.paths.source_tree_root)
            .current_dir(context.paths.source_parent())
    }
}

impl Stage for SourceAcquirer {
    fn name(&self) -> &'static str {
        "acquire-source"
    }

    fn precondition(&self, context: &PipelineContext) -> Precondition {
        Precondition::UnlessExists(context.paths.source_stamp())
    }

    fn execute(&self, context: &mut PipelineContext) -> Result<(), PipelineError> {
        let parent = context.paths.source_parent();
        context.fs().create_dir_all(&parent)?;

        let stamp = context.paths.source_stamp();
        if context.fs().exists(&context.paths.source_tree_root) {
            info!(
                path = %context.paths.source_tree_root.display(),
                "Source tree present, resuming dependency sync"
            );
        } else {
            info!(url = %context.config.mirror_url, "Cloning source tree");
            context.runner.run(Self::clone_spec(context))?;
        }

        info!("Syncing dependencies");
        context.runner.run(
            CommandSpec::new(Tool::Gclient)
                .args(["sync", "--nohooks", "--no-history", "--shallow"])
                .current_dir(&parent),
        )?;

        info!("Running hooks");
        context.runner.run(
            CommandSpec::new(Tool::Gclient)
                .arg("runhooks")
                .current_dir(&parent),
        )?;

        context
            .fs()
            .write(&stamp, &format!("{}\n", context.config.mirror_url))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BuildConfig;
    use crate::fs::{FileSystem, MockFileSystem};
    use crate::pipeline::stage::Gate;
    use crate::pipeline::stages::testing;
    use crate::platform::Platform;
    use crate::process::ScriptedSpawner;
    use std::path::{Path, PathBuf};
    use std::sync::Arc;

    const STAMP: &str = "/project/build/chromium/.overlaybuild-synced";

    #[test]
    fn test_clone_sync_hooks_in_order() {
        let fs = Arc::new(MockFileSystem::new());
        let spawner = Arc::new(ScriptedSpawner::succeeding());
        let mut ctx = testing::context(Platform::Linux, &fs, &spawner);

        SourceAcquirer.execute(&mut ctx).unwrap();

        assert_eq!(
            spawner.invocations(),
            vec![
                "git clone --depth 1 --filter=blob:none --single-branch \
                 https://chromium.googlesource.com/chromium/src.git /project/build/chromium/src",
                "gclient sync --nohooks --no-history --shallow",
                "gclient runhooks",
            ]
        );
        assert!(spawner
            .calls()
            .iter()
            .all(|c| c.cwd == PathBuf::from("/project/build/chromium")));
    }

    #[test]
    fn test_branch_and_mirror() {
        let fs = Arc::new(MockFileSystem::new());
        let spawner = Arc::new(ScriptedSpawner::succeeding());
        let mut ctx = testing::context(Platform::Linux, &fs, &spawner);
        ctx.config = BuildConfig::from_lookup(|key| match key {
            "OVERLAYBUILD_MIRROR_URL" => Some("https://mirror.example/src.git".to_string()),
            "OVERLAYBUILD_SOURCE_BRANCH" => Some("main".to_string()),
            _ => None,
        });

        let cmd = ctx.runner.prepare(SourceAcquirer::clone_spec(&ctx));
        let args = cmd.args_lossy();
        assert_eq!(&args[5..7], &["--branch", "main"]);
        assert_eq!(args[7], "https://mirror.example/src.git");
    }

    #[test]
    fn test_windows_wraps_gclient_only() {
        let fs = Arc::new(MockFileSystem::new());
        let spawner = Arc::new(ScriptedSpawner::succeeding());
        let mut ctx = testing::context(Platform::Windows, &fs, &spawner);

        SourceAcquirer.execute(&mut ctx).unwrap();

        let calls = spawner.calls();
        assert_eq!(calls[0].program_name(), "git");
        assert!(!calls[0].needs_shell);
        assert_eq!(calls[1].program_name(), "gclient.bat");
        assert!(calls[1].needs_shell);
    }

    #[test]
    fn test_sync_failure_stops_before_hooks() {
        let fs = Arc::new(MockFileSystem::new());
        let spawner = Arc::new(ScriptedSpawner::new(|cmd| {
            if cmd.args_lossy().first().map(String::as_str) == Some("sync") {
                3
            } else {
                0
            }
        }));
        let mut ctx = testing::context(Platform::Linux, &fs, &spawner);

        let err = SourceAcquirer.execute(&mut ctx).unwrap_err();

        assert_eq!(err.exit_code(), 3);
        assert_eq!(spawner.calls().len(), 2);
    }

    #[test]
    fn test_hooks_failure_leaves_stage_pending() {
        let fs = Arc::new(MockFileSystem::new());
        let spawner = Arc::new(ScriptedSpawner::new(|cmd| {
            if cmd.args_lossy().first().map(String::as_str) == Some("runhooks") {
                1
            } else {
                0
            }
        }));
        let mut ctx = testing::context(Platform::Linux, &fs, &spawner);

        assert!(SourceAcquirer.execute(&mut ctx).is_err());
        assert!(!fs.exists(Path::new(STAMP)));
        assert!(matches!(
            SourceAcquirer.precondition(&ctx).check(ctx.fs()),
            Gate::Run
        ));
    }

    #[test]
    fn test_existing_tree_resumes_without_clone() {
        let fs = Arc::new(MockFileSystem::new());
        fs.add_dir("/project/build/chromium/src");
        let spawner = Arc::new(ScriptedSpawner::succeeding());
        let mut ctx = testing::context(Platform::Linux, &fs, &spawner);

        assert!(matches!(
            SourceAcquirer.precondition(&ctx).check(ctx.fs()),
            Gate::Run
        ));
        SourceAcquirer.execute(&mut ctx).unwrap();

        assert_eq!(
            spawner.invocations(),
            vec![
                "gclient sync --nohooks --no-history --shallow",
                "gclient runhooks"
            ]
        );
        assert!(fs.is_file(Path::new(STAMP)));
    }

    #[test]
    fn test_skipped_once_stamped() {
        let fs = Arc::new(MockFileSystem::new());
        fs.add_dir("/project/build/chromium/src");
        fs.add_file(STAMP, "https://chromium.googlesource.com/chromium/src.git\n");
        let spawner = Arc::new(ScriptedSpawner::succeeding());
        let ctx = testing::context(Platform::Linux, &fs, &spawner);

        assert!(matches!(
            SourceAcquirer.precondition(&ctx).check(ctx.fs()),
            Gate::Skip(_)
        ));
    }
}
