pub mod commands;
pub mod handlers;
pub mod output;

pub use commands::{BuildArgs, CliArgs, Commands, OutputFormatArg, PathsArgs, WorkspaceArgs};
pub use output::{OutputFormat, OutputFormatter};
