use crate::error::PipelineError;
use crate::pin_config::{write_pins, PinConfig, PinWrite};
use crate::pipeline::stage::Stage;
use crate::pipeline::PipelineContext;
use tracing::debug;

/// Synthesises the pin file, or backfills keys an existing one lacks
///
/// Runs on every invocation, including when the source tree already exists.
pub struct PinConfigWriter;

impl Stage for PinConfigWriter {
    fn name(&self) -> &'static str {
        "configure-pins"
    }

    fn execute(&self, context: &mut PipelineContext) -> Result<(), PipelineError> {
        let parent = context.paths.source_parent();
        if !context.fs().is_dir(&parent) {
            context.fs().create_dir_all(&parent)?;
        }

        let pins = PinConfig::for_build(&context.config);
        let outcome = write_pins(context.fs(), &context.paths.pin_config_file(), &pins)?;
        if outcome == PinWrite::Unchanged {
            debug!("No pins to add");
        }
        Ok(())
    }
}
