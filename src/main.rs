use overlaybuild::cli::commands::{CliArgs, Commands};
use overlaybuild::cli::handlers::{handle_build, handle_paths, handle_plan};
use overlaybuild::util::{init_logging, LoggingConfig};
use overlaybuild::{NAME, VERSION};

use clap::Parser;
use std::env;
use std::process;
use tracing::debug;

fn main() {
    let args = CliArgs::parse();
    init_logging(LoggingConfig::from_args(
        args.log_level.as_deref(),
        args.verbose,
        args.quiet,
        |key| env::var(key).ok(),
    ));

    debug!("{} v{} starting", NAME, VERSION);
    debug!("Arguments: {:?}", args);

    let exit_code = match &args.command {
        Commands::Build(build_args) => handle_build(build_args),
        Commands::Plan(plan_args) => handle_plan(plan_args),
        Commands::Paths(paths_args) => handle_paths(paths_args),
    };

    process::exit(exit_code);
}
