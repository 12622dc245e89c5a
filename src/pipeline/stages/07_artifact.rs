use crate::error::PipelineError;
use crate::pipeline::stage::Stage;
use crate::pipeline::PipelineContext;
use tracing::info;

/// Copies the compiled binary to the artifacts directory
pub struct ArtifactCollector;

impl Stage for ArtifactCollector {
    fn name(&self) -> &'static str {
        "collect-artifact"
    }

    fn execute(&self, context: &mut PipelineContext) -> Result<(), PipelineError> {
        let binary = context.config.binary_name();
        let built = context
            .paths
            .build_output_dir(&context.config.output_dir)
            .join(&binary);

        if !context.fs().is_file(&built) {
            return Err(PipelineError::MissingArtifact(built));
        }

        let destination = context.paths.artifact_path(&binary);
        context.fs().create_dir_all(&context.paths.artifacts_dir)?;
        let bytes = context.fs().copy_file(&built, &destination)?;

        info!(artifact = %destination.display(), bytes, "Artifact collected");
        context.artifact = Some(destination);
        Ok(())
    }
}
