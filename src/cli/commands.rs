use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Reproducible builds of a launcher embedded in a large upstream source tree
#[derive(Parser, Debug)]
#[command(
    name = "overlaybuild",
    about = "Build a launcher binary inside an upstream source tree",
    version,
    author,
    long_about = "overlaybuild bootstraps the toolchain, acquires the upstream source tree, \
                  mirrors the local project into it, applies an optional patch, builds one \
                  target and copies the binary to <project>/artifacts. Completed stages are \
                  skipped on later runs."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, global = true, help = "Enable debug logging")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - suppress non-error output"
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Run the full pipeline",
        long_about = "Runs every stage in order and copies the binary to the artifacts \
                      directory. Exits with the code of the first failing command.\n\n\
                      Examples:\n  \
                      overlaybuild build\n  \
                      overlaybuild build --project-root /src/launcher --target launcher\n  \
                      overlaybuild build --target-os win --target-cpu x64 --format json"
    )]
    Build(BuildArgs),

    #[command(
        about = "Show which stages would run",
        long_about = "Evaluates each stage's precondition against the current workspace \
                      without running any command.\n\n\
                      Examples:\n  \
                      overlaybuild plan\n  \
                      overlaybuild plan --format json"
    )]
    Plan(BuildArgs),

    #[command(about = "Print the resolved workspace paths")]
    Paths(PathsArgs),
}

/// Options shared by `build` and `plan`
#[derive(Args, Debug, Clone)]
pub struct BuildArgs {
    #[command(flatten)]
    pub workspace: WorkspaceArgs,

    #[arg(long, value_name = "NAME", help = "Build target name")]
    pub target: Option<String>,

    #[arg(long, value_name = "OS", help = "Target OS pin (win, mac, linux, ...)")]
    pub target_os: Option<String>,

    #[arg(long, value_name = "CPU", help = "Target CPU pin (x64, x86, arm64, arm)")]
    pub target_cpu: Option<String>,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(Args, Debug, Clone)]
pub struct PathsArgs {
    #[command(flatten)]
    pub workspace: WorkspaceArgs,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(Args, Debug, Clone, Default)]
pub struct WorkspaceArgs {
    #[arg(
        long,
        value_name = "DIR",
        help = "Project root candidate; takes precedence over OVERLAYBUILD_WORKSPACE and GITHUB_WORKSPACE"
    )]
    pub project_root: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    Json,
    Human,
}

impl From<OutputFormatArg> for super::output::OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Json => super::output::OutputFormat::Json,
            OutputFormatArg::Human => super::output::OutputFormat::Human,
        }
    }
}
