//! Pin configuration for the upstream source tree
//!
//! The pin file is a list of `key = literal` assignments in Python literal
//! syntax. It is synthesised once and afterwards only ever extended: keys a
//! user or an earlier run already wrote are left alone, byte for byte.

use crate::config::{BuildConfig, DEFAULT_DEPS_FILE};
use crate::fs::FileSystem;
use crate::workspace::SOURCE_DIR_NAME;
use anyhow::Result;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;
use std::path::Path;
use tracing::{debug, info, warn};

/// Platform pin keys, in the order they are written
pub const PIN_KEYS: [&str; 5] = [
    "target_os",
    "target_os_only",
    "target_cpu",
    "with_branch_heads",
    "with_tags",
];

pub const SOLUTIONS_KEY: &str = "solutions";

/// One upstream solution entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    pub name: String,
    pub url: String,
    pub deps_file: String,
    pub managed: bool,
    pub custom_deps: BTreeMap<String, String>,
    pub custom_vars: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinConfig {
    pub solutions: Vec<Solution>,
    pub target_os: Vec<String>,
    pub target_os_only: bool,
    pub target_cpu: Vec<String>,
    pub with_branch_heads: bool,
    pub with_tags: bool,
}

/// What [`write_pins`] did to the file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PinWrite {
    Created,
    Appended(Vec<&'static str>),
    Unchanged,
}

impl PinConfig {
    /// Pins for a single source solution built for one OS/CPU pair
    pub fn for_build(config: &BuildConfig) -> Self {
        Self {
            solutions: vec![Solution {
                name: SOURCE_DIR_NAME.to_string(),
                url: config.source_url.clone(),
                deps_file: DEFAULT_DEPS_FILE.to_string(),
                managed: false,
                custom_deps: BTreeMap::new(),
                custom_vars: BTreeMap::new(),
            }],
            target_os: vec![config.target_os.clone()],
            target_os_only: true,
            target_cpu: vec![config.target_cpu.clone()],
            with_branch_heads: false,
            with_tags: false,
        }
    }

    /// Complete file contents
    pub fn render(&self) -> String {
        let mut out = String::from("solutions = [\n");
        for solution in &self.solutions {
            out.push_str("  {\n");
            let _ = writeln!(out, "    \"name\": {},", py_str(&solution.name));
            let _ = writeln!(out, "    \"url\": {},", py_str(&solution.url));
            let _ = writeln!(out, "    \"deps_file\": {},", py_str(&solution.deps_file));
            let _ = writeln!(out, "    \"managed\": {},", py_bool(solution.managed));
            let _ = writeln!(out, "    \"custom_deps\": {},", py_dict(&solution.custom_deps));
            let _ = writeln!(out, "    \"custom_vars\": {},", py_dict(&solution.custom_vars));
            out.push_str("  },\n");
        }
        out.push_str("]\n");

        for key in PIN_KEYS {
            out.push_str(&self.pin_line(key).unwrap_or_default());
        }
        out
    }

    /// `key = value\n` for one of [`PIN_KEYS`]
    pub fn pin_line(&self, key: &str) -> Option<String> {
        let value = match key {
            "target_os" => py_list(&self.target_os),
            "target_os_only" => py_bool(self.target_os_only).to_string(),
            "target_cpu" => py_list(&self.target_cpu),
            "with_branch_heads" => py_bool(self.with_branch_heads).to_string(),
            "with_tags" => py_bool(self.with_tags).to_string(),
            _ => return None,
        };
        Some(format!("{} = {}\n", key, value))
    }

    /// Text to append so that `existing` declares every pin key
    ///
    /// Returns the keys added alongside the text; empty when nothing is missing.
    pub fn missing_pins(&self, existing: &str) -> (Vec<&'static str>, String) {
        let declared = declared_keys(existing);
        let missing: Vec<&'static str> = PIN_KEYS
            .iter()
            .copied()
            .filter(|key| !declared.contains(*key))
            .collect();

        if missing.is_empty() {
            return (missing, String::new());
        }

        let mut text = String::new();
        if !existing.is_empty() && !existing.ends_with('\n') {
            text.push('\n');
        }
        for key in &missing {
            text.push_str(&self.pin_line(key).unwrap_or_default());
        }
        (missing, text)
    }
}

/// Top-level keys assigned in a pin file
///
/// A key counts when a line starts with an identifier followed by `=`.
/// Indented lines belong to a literal spanning several lines and are ignored.
pub fn declared_keys(text: &str) -> BTreeSet<String> {
    text.lines()
        .filter(|line| !line.starts_with(char::is_whitespace))
        .filter_map(|line| {
            let (key, rest) = line.split_once('=')?;
            let key = key.trim_end();
            let is_ident = !key.is_empty()
                && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
                && !key.starts_with(|c: char| c.is_ascii_digit());
            (is_ident && !rest.starts_with('=')).then(|| key.to_string())
        })
        .collect()
}

/// Create the pin file, or append whatever pins it lacks
pub fn write_pins(fs: &dyn FileSystem, path: &Path, pins: &PinConfig) -> Result<PinWrite> {
    if !fs.is_file(path) {
        fs.write(path, &pins.render())?;
        info!(path = %path.display(), "Wrote pin configuration");
        return Ok(PinWrite::Created);
    }

    let existing = fs.read_to_string(path)?;
    if !declared_keys(&existing).contains(SOLUTIONS_KEY) {
        warn!(path = %path.display(), "Pin configuration declares no solutions");
    }

    let (missing, text) = pins.missing_pins(&existing);
    if missing.is_empty() {
        debug!(path = %path.display(), "Pin configuration already complete");
        return Ok(PinWrite::Unchanged);
    }

    fs.append(path, &text)?;
    info!(path = %path.display(), keys = ?missing, "Added missing pins");
    Ok(PinWrite::Appended(missing))
}

fn py_bool(value: bool) -> &'static str {
    if value {
        "True"
    } else {
        "False"
    }
}

fn py_str(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

fn py_list(values: &[String]) -> String {
    let items: Vec<String> = values.iter().map(|v| py_str(v)).collect();
    format!("[{}]", items.join(", "))
}

fn py_dict(values: &BTreeMap<String, String>) -> String {
    if values.is_empty() {
        return "{}".to_string();
    }
    let items: Vec<String> = values
        .iter()
        .map(|(k, v)| format!("{}: {}", py_str(k), py_str(v)))
        .collect();
    format!("{{{}}}", items.join(", "))
}
