use super::toolchain::toolchain_command;
use crate::error::PipelineError;
use crate::pipeline::stage::Stage;
use crate::pipeline::PipelineContext;
use crate::platform::Tool;
use crate::process::CommandSpec;
use tracing::info;

/// Generates build files, then compiles the one configured target
pub struct BuildExecutor;

impl BuildExecutor {
    fn generate(context: &PipelineContext) -> CommandSpec {
        CommandSpec::new(Tool::Gn)
            .arg("gen")
            .arg(&context.config.output_dir)
            .arg(format!("--args={}", context.config.generator_args()))
            .current_dir(&context.paths.source_tree_root)
    }

    fn compile(context: &PipelineContext) -> CommandSpec {
        toolchain_command(context, Tool::Ninja)
            .arg("-C")
            .arg(&context.config.output_dir)
            .arg(&context.config.target)
            .current_dir(&context.paths.source_tree_root)
    }
}

impl Stage for BuildExecutor {
    fn name(&self) -> &'static str {
        "build-target"
    }

    fn execute(&self, context: &mut PipelineContext) -> Result<(), PipelineError> {
        info!(output = %context.config.output_dir, "Generating build files");
        context.runner.run(Self::generate(context))?;

        info!(target = %context.config.target, "Compiling");
        context.runner.run(Self::compile(context))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MockFileSystem;
    use crate::pipeline::stages::testing;
    use crate::platform::Platform;
    use crate::process::ScriptedSpawner;
    use std::path::PathBuf;
    use std::sync::Arc;

    #[test]
    fn test_generate_then_compile() {
        let fs = Arc::new(MockFileSystem::new());
        let spawner = Arc::new(ScriptedSpawner::succeeding());
        let mut ctx = testing::context(Platform::Linux, &fs, &spawner);

        BuildExecutor.execute(&mut ctx).unwrap();

        assert_eq!(
            spawner.invocations(),
            vec![
                "gn gen out/Default --args=is_debug=false is_component_build=false",
                "ninja -C out/Default launcher",
            ]
        );
        assert!(spawner
            .calls()
            .iter()
            .all(|c| c.cwd == PathBuf::from("/project/build/chromium/src")));
    }

    #[test]
    fn test_generator_failure_skips_compile() {
        let fs = Arc::new(MockFileSystem::new());
        let spawner = Arc::new(ScriptedSpawner::new(|_| 2));
        let mut ctx = testing::context(Platform::Linux, &fs, &spawner);

        let err = BuildExecutor.execute(&mut ctx).unwrap_err();

        assert_eq!(err.exit_code(), 2);
        assert_eq!(spawner.calls().len(), 1);
    }

    #[test]
    fn test_windows_uses_bootstrapped_driver() {
        let fs = Arc::new(MockFileSystem::new());
        fs.add_file("/project/build/depot_tools/ninja.bat", "");
        let spawner = Arc::new(ScriptedSpawner::succeeding());
        let mut ctx = testing::context(Platform::Windows, &fs, &spawner);

        BuildExecutor.execute(&mut ctx).unwrap();

        let calls = spawner.calls();
        assert_eq!(calls[0].program, PathBuf::from("gn.bat"));
        assert_eq!(
            calls[1].program,
            PathBuf::from("/project/build/depot_tools").join("ninja.bat")
        );
        assert!(calls.iter().all(|c| c.needs_shell));
    }
}
