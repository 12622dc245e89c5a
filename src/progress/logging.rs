//! Logging-based progress handler

use super::{PipelineEvent, ProgressHandler};
use tracing::{debug, error, info, warn};

/// Handler that logs progress events using tracing
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingHandler;

impl ProgressHandler for LoggingHandler {
    fn on_progress(&self, event: &PipelineEvent) {
        match event {
            PipelineEvent::Started { project_root } => {
                info!(project = %project_root, "Starting pipeline");
            }
            PipelineEvent::StageStarted { stage } => {
                info!(stage = %stage, "Stage started");
            }
            PipelineEvent::StageSkipped { stage, reason } => {
                info!(stage = %stage, reason = %reason, "Stage skipped");
            }
            PipelineEvent::StageCompleted { stage, duration } => {
                debug!(
                    stage = %stage,
                    duration_ms = duration.as_millis(),
                    "Stage complete"
                );
            }
            PipelineEvent::StageTolerated { stage, error } => {
                warn!(stage = %stage, error = %error, "Best-effort stage failed");
            }
            PipelineEvent::Completed {
                executed,
                skipped,
                total_time,
            } => {
                info!(
                    executed,
                    skipped,
                    total_time_ms = total_time.as_millis(),
                    "Pipeline complete"
                );
            }
            PipelineEvent::Failed { stage, error } => {
                error!(stage = %stage, error = %error, "Pipeline failed");
            }
        }
    }
}
