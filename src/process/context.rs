use crate::platform::Platform;
use std::collections::BTreeMap;
use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Environment every spawned command runs in
///
/// Replaces mutation of the process-wide environment: the augmented search
/// path and extra variables live here and are applied per child process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionContext {
    working_dir: PathBuf,
    search_prefix: Vec<PathBuf>,
    inherited_path: Option<OsString>,
    env: BTreeMap<String, String>,
}

impl ExecutionContext {
    /// Context that inherits `PATH` from the current process
    pub fn inherit(working_dir: impl Into<PathBuf>) -> Self {
        Self::new(working_dir, env::var_os("PATH"))
    }

    pub fn new(working_dir: impl Into<PathBuf>, inherited_path: Option<OsString>) -> Self {
        Self {
            working_dir: working_dir.into(),
            search_prefix: Vec::new(),
            inherited_path,
            env: BTreeMap::new(),
        }
    }

    /// Put `dir` ahead of every existing search path entry
    pub fn with_search_prefix(mut self, dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        self.search_prefix.retain(|d| d != &dir);
        self.search_prefix.insert(0, dir);
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Set `key` only if the current process does not already define it
    pub fn with_env_default(self, key: &str, value: &str) -> Self {
        if env::var_os(key).is_some() {
            self
        } else {
            self.with_env(key, value)
        }
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    pub fn search_prefix(&self) -> &[PathBuf] {
        &self.search_prefix
    }

    pub fn env_vars(&self) -> impl Iterator<Item = (&str, &str)> {
        self.env.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// `PATH` value for child processes: prefix entries, then the inherited value
    pub fn path_value(&self, platform: Platform) -> OsString {
        let mut value = OsString::new();
        let separator = platform.path_separator().to_string();

        for dir in &self.search_prefix {
            if !value.is_empty() {
                value.push(&separator);
            }
            value.push(dir.as_os_str());
        }

        if let Some(inherited) = self.inherited_path.as_ref().filter(|p| !p.is_empty()) {
            if !value.is_empty() {
                value.push(&separator);
            }
            value.push(inherited);
        }

        value
    }
}
