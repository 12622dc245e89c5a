//! Build configuration for overlaybuild
//!
//! Configuration is loaded from environment variables with defaults derived
//! from the host platform. CLI flags override individual fields afterwards.
//! The resulting [`BuildConfig`] is immutable for the duration of a run.
//!
//! # Environment Variables
//!
//! - `OVERLAYBUILD_TARGET`: build target name - default: "launcher"
//! - `OVERLAYBUILD_TARGET_OS`: target OS pin - default: host family ("win", "mac", "linux")
//! - `OVERLAYBUILD_TARGET_CPU`: target CPU pin - default: host architecture ("x64", "arm64", "x86")
//! - `OVERLAYBUILD_SOURCE_URL`: canonical source repository URL
//! - `OVERLAYBUILD_MIRROR_URL`: clone mirror - default: the source URL
//! - `OVERLAYBUILD_SOURCE_BRANCH`: branch for the single-branch clone - default: remote HEAD
//! - `OVERLAYBUILD_TOOLCHAIN_URL`: toolchain repository URL
//! - `OVERLAYBUILD_OVERLAY_NAME`: overlay directory inside the source tree - default: "overlay"
//! - `OVERLAYBUILD_OUTPUT_DIR`: build output directory - default: "out/Default"
//!
//! # Example
//!
//! ```
//! use overlaybuild::BuildConfig;
//!
//! let config = BuildConfig::from_lookup(|key| match key {
//!     "OVERLAYBUILD_TARGET" => Some("chrome".to_string()),
//!     _ => None,
//! });
//! assert_eq!(config.target, "chrome");
//! assert!(!config.is_debug);
//! config.validate().unwrap();
//! ```

use crate::platform::Platform;
use serde::Serialize;
use std::env;
use std::ffi::OsStr;
use std::fmt;
use std::path::{Component, Path};
use thiserror::Error;

pub const DEFAULT_TARGET: &str = "launcher";
pub const DEFAULT_SOURCE_URL: &str = "https://chromium.googlesource.com/chromium/src.git";
pub const DEFAULT_TOOLCHAIN_URL: &str =
    "https://chromium.googlesource.com/chromium/tools/depot_tools.git";
pub const DEFAULT_OVERLAY_NAME: &str = "overlay";
pub const DEFAULT_OUTPUT_DIR: &str = "out/Default";
pub const DEFAULT_DEPS_FILE: &str = "DEPS";

const VALID_TARGET_OS: &[&str] = &["win", "mac", "linux", "android", "chromeos", "fuchsia", "ios"];
const VALID_TARGET_CPU: &[&str] = &["x64", "x86", "arm64", "arm"];

/// Configuration errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Build target name must not be empty")]
    EmptyTarget,

    #[error("Invalid {field}: '{value}' ({reason})")]
    InvalidValue {
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("Unknown target OS '{0}'. Valid options: win, mac, linux, android, chromeos, fuchsia, ios")]
    UnknownTargetOs(String),

    #[error("Unknown target CPU '{0}'. Valid options: x64, x86, arm64, arm")]
    UnknownTargetCpu(String),
}

/// Per-run build configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildConfig {
    /// Name of the single target handed to the compiler driver
    pub target: String,

    /// Target OS pin (`target_os` in the pin configuration)
    pub target_os: String,

    /// Target CPU pin (`target_cpu` in the pin configuration)
    pub target_cpu: String,

    /// Always false
    pub is_debug: bool,

    /// Always false
    pub is_component_build: bool,

    pub source_url: String,

    pub mirror_url: String,

    pub source_branch: Option<String>,

    pub toolchain_url: String,

    /// Directory name of the overlay inside the source tree
    pub overlay_name: String,

    /// Build output directory, relative to the source tree root
    pub output_dir: String,
}

impl Default for BuildConfig {
    /// Loads configuration from the process environment with defaults
    fn default() -> Self {
        Self::from_env()
    }
}

impl BuildConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads configuration from an arbitrary key/value source
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let platform = Platform::host();

        let source_url = get("OVERLAYBUILD_SOURCE_URL").unwrap_or_else(|| DEFAULT_SOURCE_URL.to_string());
        let mirror_url = get("OVERLAYBUILD_MIRROR_URL").unwrap_or_else(|| source_url.clone());

        Self {
            target: get("OVERLAYBUILD_TARGET").unwrap_or_else(|| DEFAULT_TARGET.to_string()),
            target_os: get("OVERLAYBUILD_TARGET_OS")
                .unwrap_or_else(|| platform.default_target_os().to_string())
                .to_lowercase(),
            target_cpu: get("OVERLAYBUILD_TARGET_CPU")
                .unwrap_or_else(|| host_target_cpu().to_string())
                .to_lowercase(),
            is_debug: false,
            is_component_build: false,
            source_url,
            mirror_url,
            source_branch: get("OVERLAYBUILD_SOURCE_BRANCH"),
            toolchain_url: get("OVERLAYBUILD_TOOLCHAIN_URL")
                .unwrap_or_else(|| DEFAULT_TOOLCHAIN_URL.to_string()),
            overlay_name: get("OVERLAYBUILD_OVERLAY_NAME")
                .unwrap_or_else(|| DEFAULT_OVERLAY_NAME.to_string()),
            output_dir: get("OVERLAYBUILD_OUTPUT_DIR")
                .unwrap_or_else(|| DEFAULT_OUTPUT_DIR.to_string()),
        }
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.target.is_empty() {
            return Err(ConfigError::EmptyTarget);
        }
        if !is_plain_name(&self.target) {
            return Err(ConfigError::InvalidValue {
                field: "target",
                value: self.target.clone(),
                reason: "may only contain letters, digits, '_', '-', '.' and '+'".to_string(),
            });
        }

        if !VALID_TARGET_OS.contains(&self.target_os.as_str()) {
            return Err(ConfigError::UnknownTargetOs(self.target_os.clone()));
        }
        if !VALID_TARGET_CPU.contains(&self.target_cpu.as_str()) {
            return Err(ConfigError::UnknownTargetCpu(self.target_cpu.clone()));
        }

        let output = Path::new(&self.output_dir);
        let output_ok = !self.output_dir.is_empty()
            && output.components().all(|c| match c {
                Component::Normal(part) => part.to_str().is_some_and(is_plain_name),
                Component::CurDir => true,
                _ => false,
            });
        if !output_ok {
            return Err(ConfigError::InvalidValue {
                field: "output_dir",
                value: self.output_dir.clone(),
                reason: "must be a relative path inside the source tree".to_string(),
            });
        }

        let mut overlay = Path::new(&self.overlay_name).components();
        let overlay_ok = matches!(
            (overlay.next(), overlay.next()),
            (Some(Component::Normal(_)), None)
        ) && is_plain_name(&self.overlay_name);
        if !overlay_ok {
            return Err(ConfigError::InvalidValue {
                field: "overlay_name",
                value: self.overlay_name.clone(),
                reason: "must be a single directory name".to_string(),
            });
        }
        if self.overlay_name.starts_with('.') {
            return Err(ConfigError::InvalidValue {
                field: "overlay_name",
                value: self.overlay_name.clone(),
                reason: "must not be a hidden directory".to_string(),
            });
        }
        let output_root = output
            .components()
            .find_map(|c| match c {
                Component::Normal(part) => Some(part),
                _ => None,
            });
        if output_root == Some(OsStr::new(&self.overlay_name)) {
            return Err(ConfigError::InvalidValue {
                field: "overlay_name",
                value: self.overlay_name.clone(),
                reason: "collides with the build output directory".to_string(),
            });
        }

        Ok(())
    }

    /// File name of the compiled binary for the configured target OS
    pub fn binary_name(&self) -> String {
        if self.target_os == "win" {
            format!("{}.exe", self.target)
        } else {
            self.target.clone()
        }
    }

    /// Argument string handed to the build-file generator
    pub fn generator_args(&self) -> String {
        format!(
            "is_debug={} is_component_build={}",
            self.is_debug, self.is_component_build
        )
    }
}

/// Names passed through the Windows command interpreter stay free of its
/// metacharacters
fn is_plain_name(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '+'))
}

fn host_target_cpu() -> &'static str {
    match env::consts::ARCH {
        "aarch64" => "arm64",
        "x86" => "x86",
        "arm" => "arm",
        _ => "x64",
    }
}

impl fmt::Display for BuildConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Build Configuration:")?;
        writeln!(f, "  Target: {}", self.target)?;
        writeln!(f, "  Target OS: {}", self.target_os)?;
        writeln!(f, "  Target CPU: {}", self.target_cpu)?;
        writeln!(f, "  Source: {}", self.source_url)?;
        if self.mirror_url != self.source_url {
            writeln!(f, "  Mirror: {}", self.mirror_url)?;
        }
        if let Some(branch) = &self.source_branch {
            writeln!(f, "  Branch: {}", branch)?;
        }
        writeln!(f, "  Toolchain: {}", self.toolchain_url)?;
        writeln!(f, "  Overlay: {}", self.overlay_name)?;
        write!(f, "  Output: {}", self.output_dir)
    }
}
