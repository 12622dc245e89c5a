//! Progress handler trait and events

use std::time::Duration;

/// Events emitted while the pipeline runs
#[derive(Debug, Clone)]
pub enum PipelineEvent {
    /// Run started for a project root
    Started { project_root: String },

    /// Stage precondition held, action starting
    StageStarted { stage: String },

    /// Stage skipped because its postcondition already holds
    StageSkipped { stage: String, reason: String },

    /// Stage action finished
    StageCompleted { stage: String, duration: Duration },

    /// Best-effort stage failed; the run continues
    StageTolerated { stage: String, error: String },

    /// All stages done
    Completed {
        executed: usize,
        skipped: usize,
        total_time: Duration,
    },

    /// A fatal stage failed
    Failed { stage: String, error: String },
}

/// Trait for handling progress events during a run
pub trait ProgressHandler: Send + Sync {
    /// Called when a progress event occurs
    fn on_progress(&self, event: &PipelineEvent);
}

/// No-op handler that ignores all events
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpHandler;

impl ProgressHandler for NoOpHandler {
    fn on_progress(&self, _event: &PipelineEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingHandler {
        count: Arc<AtomicUsize>,
    }

    impl ProgressHandler for CountingHandler {
        fn on_progress(&self, _event: &PipelineEvent) {
            self.count.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_noop_handler() {
        let handler = NoOpHandler;
        handler.on_progress(&PipelineEvent::Started {
            project_root: "/test".to_string(),
        });
    }

    #[test]
    fn test_progress_events() {
        let count = Arc::new(AtomicUsize::new(0));
        let handler = CountingHandler {
            count: count.clone(),
        };

        handler.on_progress(&PipelineEvent::Started {
            project_root: "/test".to_string(),
        });
        handler.on_progress(&PipelineEvent::StageSkipped {
            stage: "bootstrap-toolchain".to_string(),
            reason: "exists".to_string(),
        });
        handler.on_progress(&PipelineEvent::Completed {
            executed: 6,
            skipped: 2,
            total_time: Duration::from_secs(5),
        });

        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_event_debug() {
        let event = PipelineEvent::StageStarted {
            stage: "mirror-overlay".to_string(),
        };
        let debug_str = format!("{:?}", event);
        assert!(debug_str.contains("StageStarted"));
        assert!(debug_str.contains("mirror-overlay"));
    }
}
