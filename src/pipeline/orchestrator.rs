use super::context::PipelineContext;
use super::stage::{Gate, Stage};
use super::stages::{
    ArtifactCollector, BuildExecutor, OverlayMirror, PatchApplier, PinConfigWriter,
    SourceAcquirer, ToolchainBootstrapper,
};
use crate::error::PipelineError;
use crate::process::FailurePolicy;
use crate::progress::{PipelineEvent, ProgressHandler};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// What happened to one stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StageOutcome {
    Executed,
    Skipped { reason: String },
    /// Best-effort stage failed and the run continued
    Tolerated { error: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct StageReport {
    pub name: &'static str,
    #[serde(flatten)]
    pub outcome: StageOutcome,
    pub duration_ms: u64,
}

/// Summary of a successful run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub project_root: PathBuf,
    pub stages: Vec<StageReport>,
    pub artifact: Option<PathBuf>,
}

impl RunReport {
    pub fn executed(&self) -> usize {
        self.count(|o| matches!(o, StageOutcome::Executed))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, StageOutcome::Skipped { .. }))
    }

    pub fn outcome_of(&self, stage: &str) -> Option<&StageOutcome> {
        self.stages
            .iter()
            .find(|s| s.name == stage)
            .map(|s| &s.outcome)
    }

    fn count(&self, pred: impl Fn(&StageOutcome) -> bool) -> usize {
        self.stages.iter().filter(|s| pred(&s.outcome)).count()
    }
}

/// Precondition decision for one stage, without running anything
#[derive(Debug, Clone, Serialize)]
pub struct PlannedStage {
    pub name: &'static str,
    pub policy: FailurePolicy,
    pub gate: Gate,
}

/// Runs stages once each, strictly in order
pub struct PipelineOrchestrator {
    stages: Vec<Box<dyn Stage>>,
    progress_handler: Option<Arc<dyn ProgressHandler>>,
}

impl PipelineOrchestrator {
    pub fn new(progress_handler: Option<Arc<dyn ProgressHandler>>) -> Self {
        Self::with_stages(Self::default_stages(), progress_handler)
    }

    pub fn with_stages(
        stages: Vec<Box<dyn Stage>>,
        progress_handler: Option<Arc<dyn ProgressHandler>>,
    ) -> Self {
        Self {
            stages,
            progress_handler,
        }
    }

    /// Bootstrap, acquire, overlay, patch, build, collect
    pub fn default_stages() -> Vec<Box<dyn Stage>> {
        vec![
            Box::new(ToolchainBootstrapper),
            Box::new(PinConfigWriter),
            Box::new(SourceAcquirer),
            Box::new(OverlayMirror),
            Box::new(PatchApplier),
            Box::new(BuildExecutor),
            Box::new(ArtifactCollector),
        ]
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Evaluate every precondition against the current filesystem state
    ///
    /// Stages are not executed, so effects earlier stages would have are not
    /// reflected in later decisions.
    pub fn plan(&self, context: &PipelineContext) -> Vec<PlannedStage> {
        self.stages
            .iter()
            .map(|stage| PlannedStage {
                name: stage.name(),
                policy: stage.policy(),
                gate: stage.precondition(context).check(context.fs()),
            })
            .collect()
    }

    pub fn execute(&self, context: &mut PipelineContext) -> Result<RunReport, PipelineError> {
        let start = Instant::now();
        let started_at = Utc::now();
        info!(
            "Starting pipeline for: {}",
            context.paths.project_root.display()
        );
        self.emit(PipelineEvent::Started {
            project_root: context.paths.project_root.display().to_string(),
        });

        let mut reports = Vec::with_capacity(self.stages.len());

        for stage in &self.stages {
            let name = stage.name();

            if let Gate::Skip(reason) = stage.precondition(context).check(context.fs()) {
                self.emit(PipelineEvent::StageSkipped {
                    stage: name.to_string(),
                    reason: reason.clone(),
                });
                reports.push(StageReport {
                    name,
                    outcome: StageOutcome::Skipped { reason },
                    duration_ms: 0,
                });
                continue;
            }

            self.emit(PipelineEvent::StageStarted {
                stage: name.to_string(),
            });
            let stage_start = Instant::now();

            let outcome = match (stage.execute(context), stage.policy()) {
                (Ok(()), _) => StageOutcome::Executed,
                (Err(e), FailurePolicy::BestEffort) => {
                    self.emit(PipelineEvent::StageTolerated {
                        stage: name.to_string(),
                        error: e.to_string(),
                    });
                    StageOutcome::Tolerated {
                        error: e.to_string(),
                    }
                }
                (Err(e), FailurePolicy::Fatal) => {
                    self.emit(PipelineEvent::Failed {
                        stage: name.to_string(),
                        error: e.to_string(),
                    });
                    return Err(e);
                }
            };

            let duration = stage_start.elapsed();
            self.emit(PipelineEvent::StageCompleted {
                stage: name.to_string(),
                duration,
            });
            debug!("Stage {} complete", name);

            reports.push(StageReport {
                name,
                outcome,
                duration_ms: u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
            });
        }

        let report = RunReport {
            started_at,
            project_root: context.paths.project_root.clone(),
            stages: reports,
            artifact: context.artifact.clone(),
        };

        self.emit(PipelineEvent::Completed {
            executed: report.executed(),
            skipped: report.skipped(),
            total_time: start.elapsed(),
        });

        Ok(report)
    }

    fn emit(&self, event: PipelineEvent) {
        if let Some(handler) = &self.progress_handler {
            handler.on_progress(&event);
        }
    }
}
