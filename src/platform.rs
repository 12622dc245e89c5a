//! Host platform families and tool name resolution
//!
//! Everything in this module is a pure function of the [`Platform`] value:
//! the concrete executable name of each toolchain tool and whether it has to
//! be dispatched through a command interpreter.

use serde::Serialize;
use std::fmt;

/// Host platform family the orchestrator runs on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Windows,
    MacOs,
    Linux,
}

/// External tools invoked by the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tool {
    /// Version control client
    Git,
    /// Toolchain source-fetch tool
    Fetch,
    /// Toolchain dependency-sync tool
    Gclient,
    /// Build-file generator
    Gn,
    /// Compiler driver
    Ninja,
}

/// How a command reaches the operating system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchMode {
    /// Arguments passed as a vector, no shell reinterpretation
    ArgumentVector,
    /// Rendered to a single line and run by the platform's interpreter
    ShellText,
}

impl Platform {
    /// Platform family of the running process
    pub fn host() -> Self {
        if cfg!(windows) {
            Platform::Windows
        } else if cfg!(target_os = "macos") {
            Platform::MacOs
        } else {
            Platform::Linux
        }
    }

    /// Whether toolchain tools ship as script launchers on this family
    pub fn wraps_tools(self) -> bool {
        matches!(self, Platform::Windows)
    }

    /// Default target OS value for pin configuration and build naming
    pub fn default_target_os(self) -> &'static str {
        match self {
            Platform::Windows => "win",
            Platform::MacOs => "mac",
            Platform::Linux => "linux",
        }
    }

    /// Concrete executable name for `tool`
    pub fn tool_name(self, tool: Tool) -> &'static str {
        match (tool, self.wraps_tools()) {
            (Tool::Git, _) => "git",
            (Tool::Fetch, true) => "fetch.bat",
            (Tool::Fetch, false) => "fetch",
            (Tool::Gclient, true) => "gclient.bat",
            (Tool::Gclient, false) => "gclient",
            (Tool::Gn, true) => "gn.bat",
            (Tool::Gn, false) => "gn",
            (Tool::Ninja, true) => "ninja.bat",
            (Tool::Ninja, false) => "ninja",
        }
    }

    /// Dispatch mode required by `tool`
    ///
    /// Script launchers only resolve through the command interpreter.
    pub fn dispatch_mode(self, tool: Tool) -> DispatchMode {
        if self.wraps_tools() && tool != Tool::Git {
            DispatchMode::ShellText
        } else {
            DispatchMode::ArgumentVector
        }
    }

    /// Interpreter program and the flag that makes it run one line of text
    pub fn shell(self) -> (&'static str, &'static str) {
        match self {
            Platform::Windows => ("cmd", "/C"),
            Platform::MacOs | Platform::Linux => ("sh", "-c"),
        }
    }

    /// Separator between entries of the executable search path
    pub fn path_separator(self) -> char {
        match self {
            Platform::Windows => ';',
            Platform::MacOs | Platform::Linux => ':',
        }
    }

    /// Quote one argument for this platform's interpreter
    pub fn quote(self, arg: &str) -> String {
        match self {
            // cmd.exe has no backslash escape: quotes are doubled, and
            // operators are only literal inside a quoted span
            Platform::Windows => {
                let needs_quotes = arg.is_empty()
                    || arg.contains(|c: char| c.is_whitespace() || "\"&|<>()^".contains(c));
                if needs_quotes {
                    format!("\"{}\"", arg.replace('"', "\"\""))
                } else {
                    arg.to_string()
                }
            }
            Platform::MacOs | Platform::Linux => {
                let safe = !arg.is_empty()
                    && arg
                        .chars()
                        .all(|c| c.is_ascii_alphanumeric() || "-_./=:,+@%".contains(c));
                if safe {
                    arg.to_string()
                } else {
                    format!("'{}'", arg.replace('\'', "'\\''"))
                }
            }
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Platform::Windows => "windows",
            Platform::MacOs => "macos",
            Platform::Linux => "linux",
        };
        write!(f, "{}", name)
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Tool::Git => "git",
            Tool::Fetch => "fetch",
            Tool::Gclient => "gclient",
            Tool::Gn => "gn",
            Tool::Ninja => "ninja",
        };
        write!(f, "{}", name)
    }
}
