use crate::error::PipelineError;
use crate::pipeline::stage::{Precondition, Stage};
use crate::pipeline::PipelineContext;
use crate::platform::Tool;
use crate::process::{CommandSpec, ExecutionContext};
use crate::workspace::WorkspacePaths;
use tracing::{debug, info};

/// Set for every child unless the caller already chose a value
pub const WIN_TOOLCHAIN_VAR: &str = "DEPOT_TOOLS_WIN_TOOLCHAIN";

/// Execution context with the bootstrapped toolchain searched first
///
/// Tools missing from the toolchain root still resolve through the
/// inherited search path.
pub fn augment(base: ExecutionContext, paths: &WorkspacePaths) -> ExecutionContext {
    base.with_search_prefix(&paths.toolchain_root)
        .with_env_default(WIN_TOOLCHAIN_VAR, "0")
}

/// Command for `tool`, pointing into the toolchain root when it ships one
pub fn toolchain_command(context: &PipelineContext, tool: Tool) -> CommandSpec {
    let root = &context.paths.toolchain_root;
    let bundled = root.join(context.platform().tool_name(tool));

    if context.fs().is_file(&bundled) {
        debug!(tool = %tool, path = %bundled.display(), "Using bootstrapped tool");
        CommandSpec::new(tool).located_in(root)
    } else {
        debug!(tool = %tool, "No bootstrapped copy, using search path");
        CommandSpec::new(tool)
    }
}

/// Clones the toolchain when it is not present yet
pub struct ToolchainBootstrapper;

impl Stage for ToolchainBootstrapper {
    fn name(&self) -> &'static str {
        "bootstrap-toolchain"
    }

    fn precondition(&self, context: &PipelineContext) -> Precondition {
        Precondition::UnlessExists(context.paths.toolchain_root.clone())
    }

    fn execute(&self, context: &mut PipelineContext) -> Result<(), PipelineError> {
        let paths = &context.paths;
        context.fs().create_dir_all(&paths.work_root)?;

        info!(url = %context.config.toolchain_url, "Cloning toolchain");
        context.runner.run(
            CommandSpec::new(Tool::Git)
                .arg("clone")
                .arg(&context.config.toolchain_url)
                .arg(&paths.toolchain_root)
                .current_dir(&paths.work_root),
        )?;

        Ok(())
    }
}
