//! Shared fixtures for pipeline integration tests
//!
//! A [`Simulated`] workspace pairs an in-memory filesystem with a scripted
//! spawner whose responder reproduces the side effects of the real tools:
//! clones create their destination, the compiler driver writes the binary.

#![allow(dead_code)]

use overlaybuild::{
    BuildConfig, Command, ExecutionContext, FileSystem, MockFileSystem, PipelineContext, Platform,
    ScriptedSpawner, WorkspacePaths,
};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;

pub const ROOT: &str = "/work/launcher";

pub struct Simulated {
    pub fs: Arc<MockFileSystem>,
    pub spawner: Arc<ScriptedSpawner>,
    patch_code: Arc<AtomicI32>,
    failing: Arc<std::sync::Mutex<Option<(String, i32)>>>,
}

impl Simulated {
    pub fn new() -> Self {
        let fs = Arc::new(MockFileSystem::new());
        let patch_code = Arc::new(AtomicI32::new(0));
        let failing: Arc<std::sync::Mutex<Option<(String, i32)>>> =
            Arc::new(std::sync::Mutex::new(None));

        let responder_fs = fs.clone();
        let responder_patch = patch_code.clone();
        let responder_failing = failing.clone();
        let spawner = Arc::new(ScriptedSpawner::new(move |cmd| {
            if let Some((first_arg, code)) = responder_failing.lock().unwrap().clone() {
                if cmd.args_lossy().first() == Some(&first_arg) {
                    return code;
                }
            }
            respond(&responder_fs, &responder_patch, cmd)
        }));

        Self {
            fs,
            spawner,
            patch_code,
            failing,
        }
    }

    /// A project with sources, a CI directory and leftovers of earlier runs
    pub fn with_project() -> Self {
        let sim = Self::new();
        sim.fs.add_file(format!("{ROOT}/BUILD.gn"), "executable(\"launcher\") {}\n");
        sim.fs.add_file(format!("{ROOT}/launcher/main.cc"), "int main() { return 0; }\n");
        sim.fs.add_file(format!("{ROOT}/.git/HEAD"), "ref: refs/heads/main\n");
        sim.fs.add_file(format!("{ROOT}/.github/workflows/build.yml"), "on: push\n");
        sim.fs.add_file(format!("{ROOT}/scripts/__pycache__/gen.cpython-311.pyc"), "");
        sim.fs.add_file(format!("{ROOT}/scripts/gen.py"), "print('hi')\n");
        sim
    }

    pub fn add_patch(&self) {
        self.fs.add_file(
            format!("{ROOT}/patches/upstream.patch"),
            "diff --git a/chrome/BUILD.gn b/chrome/BUILD.gn\n",
        );
    }

    /// Exit code `git apply` returns
    pub fn set_patch_code(&self, code: i32) {
        self.patch_code.store(code, Ordering::SeqCst);
    }

    /// Make every command whose first argument is `first_arg` exit with `code`
    pub fn fail_on(&self, first_arg: &str, code: i32) {
        *self.failing.lock().unwrap() = Some((first_arg.to_string(), code));
    }

    pub fn clear_failure(&self) {
        *self.failing.lock().unwrap() = None;
    }

    pub fn paths(&self) -> WorkspacePaths {
        WorkspacePaths::from_project_root(ROOT)
    }

    pub fn context(&self, platform: Platform, config: BuildConfig) -> PipelineContext {
        PipelineContext::with_execution_context(
            self.paths(),
            config,
            platform,
            self.fs.clone(),
            self.spawner.clone(),
            ExecutionContext::new(ROOT, None),
        )
    }

    pub fn read(&self, path: impl AsRef<Path>) -> String {
        self.fs.read_to_string(path.as_ref()).unwrap()
    }

    pub fn exists(&self, path: impl AsRef<Path>) -> bool {
        self.fs.exists(path.as_ref())
    }

    /// Clone commands seen so far
    pub fn clones(&self) -> Vec<String> {
        self.spawner
            .invocations()
            .into_iter()
            .filter(|line| line.starts_with("git clone"))
            .collect()
    }
}

pub fn linux_config() -> BuildConfig {
    config_for("linux", "x64")
}

pub fn config_for(os: &str, cpu: &str) -> BuildConfig {
    let (os, cpu) = (os.to_string(), cpu.to_string());
    BuildConfig::from_lookup(move |key| match key {
        "OVERLAYBUILD_TARGET_OS" => Some(os.clone()),
        "OVERLAYBUILD_TARGET_CPU" => Some(cpu.clone()),
        _ => None,
    })
}

fn respond(fs: &MockFileSystem, patch_code: &AtomicI32, cmd: &Command) -> i32 {
    let args = cmd.args_lossy();
    let name = cmd.program_name();
    let tool = name.trim_end_matches(".bat");

    match (tool, args.first().map(String::as_str)) {
        ("git", Some("clone")) => {
            if let Some(dest) = args.last() {
                fs.add_dir(PathBuf::from(dest));
            }
            0
        }
        ("git", Some("apply")) => patch_code.load(Ordering::SeqCst),
        ("ninja", Some("-C")) => {
            if let [_, out, target] = args.as_slice() {
                let binary = cmd.cwd.join(out).join(target);
                fs.add_file(&binary, "\x7fELF");
                fs.add_file(binary.with_extension("exe"), "MZ");
            }
            0
        }
        _ => 0,
    }
}
