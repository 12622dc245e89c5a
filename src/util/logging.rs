//! Structured logging setup for overlaybuild
//!
//! Every log line goes to stderr so that stdout carries only command
//! results (the run report, the plan, the resolved paths).
//!
//! # Example
//!
//! ```no_run
//! use overlaybuild::util::{init_logging, LoggingConfig};
//! use tracing::{info, Level};
//!
//! init_logging(LoggingConfig::with_level(Level::DEBUG));
//! info!(stage = "acquire-source", "Stage started");
//! ```

use std::env;
use std::io;
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const LOG_LEVEL_VAR: &str = "OVERLAYBUILD_LOG_LEVEL";
pub const LOG_JSON_VAR: &str = "OVERLAYBUILD_LOG_JSON";

/// Ensures logging is only initialized once
static INIT: Once = Once::new();

/// Configuration for logging initialization
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Minimum log level to display
    pub level: Level,

    /// Use JSON output format
    pub use_json: bool,

    /// Include the module target (e.g., overlaybuild::process) in logs
    pub include_target: bool,

    /// Include file and line number information
    pub include_location: bool,

    /// Include thread ID and name in logs
    pub include_thread_ids: bool,
}

impl Default for LoggingConfig {
    /// INFO, console output, targets shown, no location or thread ids
    fn default() -> Self {
        Self {
            level: Level::INFO,
            use_json: false,
            include_target: true,
            include_location: false,
            include_thread_ids: false,
        }
    }
}

impl LoggingConfig {
    pub fn with_level(level: Level) -> Self {
        Self {
            level,
            ..Default::default()
        }
    }

    /// JSON output with full metadata, for CI logs
    pub fn production() -> Self {
        Self {
            level: Level::INFO,
            use_json: true,
            include_target: true,
            include_location: true,
            include_thread_ids: true,
        }
    }

    pub fn development() -> Self {
        Self {
            level: Level::DEBUG,
            use_json: false,
            include_target: true,
            include_location: false,
            include_thread_ids: false,
        }
    }

    /// Configuration for a CLI invocation
    ///
    /// An explicit `--log-level` wins, then `-q`, then `-v`, then
    /// `OVERLAYBUILD_LOG_LEVEL`. JSON output follows `OVERLAYBUILD_LOG_JSON`.
    pub fn from_args<F>(log_level: Option<&str>, verbose: bool, quiet: bool, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let level = match (log_level, quiet, verbose) {
            (Some(level), _, _) => parse_level(level),
            (None, true, _) => Level::ERROR,
            (None, false, true) => Level::DEBUG,
            (None, false, false) => lookup(LOG_LEVEL_VAR)
                .map(|v| parse_level(&v))
                .unwrap_or(Level::INFO),
        };

        Self {
            level,
            use_json: json_enabled(lookup(LOG_JSON_VAR).as_deref()),
            ..Default::default()
        }
    }
}

fn json_enabled(value: Option<&str>) -> bool {
    value
        .and_then(|v| v.trim().to_lowercase().parse::<bool>().ok())
        .unwrap_or(false)
}

/// Parses a log level, case-insensitively; unknown values give INFO
///
/// ```
/// use overlaybuild::util::logging::parse_level;
/// use tracing::Level;
///
/// assert_eq!(parse_level("debug"), Level::DEBUG);
/// assert_eq!(parse_level("WARN"), Level::WARN);
/// assert_eq!(parse_level("loud"), Level::INFO);
/// ```
pub fn parse_level(level_str: &str) -> Level {
    match level_str.trim().to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" | "warning" => Level::WARN,
        "error" => Level::ERROR,
        _ => {
            eprintln!(
                "Invalid log level '{}', defaulting to INFO. Valid levels: trace, debug, info, warn, error",
                level_str
            );
            Level::INFO
        }
    }
}

/// Installs the global subscriber; later calls are ignored
///
/// `RUST_LOG` directives are honoured in addition to the configured level
/// for this crate.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut filter = EnvFilter::from_default_env();
        if let Ok(directive) = format!("overlaybuild={}", config.level).parse() {
            filter = filter.add_directive(directive);
        }

        if config.use_json {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .json()
                        .with_writer(io::stderr)
                        .with_target(config.include_target)
                        .with_file(config.include_location)
                        .with_line_number(config.include_location)
                        .with_thread_ids(config.include_thread_ids)
                        .with_thread_names(config.include_thread_ids),
                )
                .init();
        } else {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .with_writer(io::stderr)
                        .with_target(config.include_target)
                        .with_file(config.include_location)
                        .with_line_number(config.include_location)
                        .with_thread_ids(config.include_thread_ids)
                        .with_thread_names(config.include_thread_ids),
                )
                .init();
        }
    });
}

pub fn init_default() {
    init_logging(LoggingConfig::default());
}

/// Initializes logging from `OVERLAYBUILD_LOG_LEVEL` and `OVERLAYBUILD_LOG_JSON`
pub fn init_from_env() {
    init_logging(LoggingConfig::from_args(None, false, false, |key| {
        env::var(key).ok()
    }));
}
