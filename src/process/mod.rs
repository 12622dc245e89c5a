//! External command execution
//!
//! - `command` - call-site [`CommandSpec`] and resolved [`Command`]
//! - `context` - per-run [`ExecutionContext`] (search path, env, cwd)
//! - `runner` - [`CommandRunner`], echo + failure policy
//! - `spawner` - [`ProcessSpawner`] seam and the real [`SystemSpawner`]
//! - `mock` - [`ScriptedSpawner`] for tests

mod command;
mod context;
mod mock;
mod runner;
mod spawner;

pub use command::{Command, CommandSpec, FailurePolicy};
pub use context::ExecutionContext;
pub use mock::ScriptedSpawner;
pub use runner::CommandRunner;
pub use spawner::{exit_code, ProcessSpawner, SystemSpawner};
