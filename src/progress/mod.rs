//! Progress reporting for pipeline runs

mod handler;
mod logging;

pub use handler::{NoOpHandler, PipelineEvent, ProgressHandler};
pub use logging::LoggingHandler;
