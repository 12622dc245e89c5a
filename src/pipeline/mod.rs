pub mod context;
pub mod orchestrator;
pub mod stage;
pub mod stages;

pub use context::PipelineContext;
pub use orchestrator::{PipelineOrchestrator, PlannedStage, RunReport, StageOutcome, StageReport};
pub use stage::{Gate, Precondition, Stage};
