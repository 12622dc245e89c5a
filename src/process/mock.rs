use super::{Command, ExecutionContext, ProcessSpawner};
use crate::error::PipelineError;
use crate::platform::Platform;
use std::sync::{Mutex, MutexGuard};

type Responder = Box<dyn Fn(&Command) -> i32 + Send + Sync>;

/// Spawner that records commands instead of running them
///
/// Exit codes come from a responder closure, which may also simulate the
/// command's side effects (e.g. populate a `MockFileSystem`).
pub struct ScriptedSpawner {
    calls: Mutex<Vec<Command>>,
    responder: Responder,
}

impl ScriptedSpawner {
    pub fn new(responder: impl Fn(&Command) -> i32 + Send + Sync + 'static) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            responder: Box::new(responder),
        }
    }

    /// Every command exits 0
    pub fn succeeding() -> Self {
        Self::new(|_| 0)
    }

    pub fn calls(&self) -> Vec<Command> {
        self.lock().clone()
    }

    /// Echo lines of every recorded command, in order
    pub fn invocations(&self) -> Vec<String> {
        self.lock().iter().map(Command::display).collect()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Command>> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl ProcessSpawner for ScriptedSpawner {
    fn spawn(
        &self,
        _platform: Platform,
        command: &Command,
        _context: &ExecutionContext,
    ) -> Result<i32, PipelineError> {
        self.lock().push(command.clone());
        Ok((self.responder)(command))
    }
}
