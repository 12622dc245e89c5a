//! CLI integration tests
//!
//! These run the built binary. Only `plan` and `paths` are exercised
//! end to end since `build` would reach the network.

use std::env;
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use tempfile::TempDir;

/// Helper to get the path to the overlaybuild binary
fn overlaybuild_bin() -> PathBuf {
    let mut path = env::current_exe()
        .expect("Failed to get current executable path")
        .parent()
        .expect("No parent")
        .to_path_buf();

    if path.ends_with("deps") {
        path = path.parent().expect("No parent").to_path_buf();
    }

    path.join(format!("overlaybuild{}", env::consts::EXE_SUFFIX))
}

fn create_project(dir: &TempDir) -> PathBuf {
    let root = dir.path().to_path_buf();
    fs::write(root.join("BUILD.gn"), "executable(\"launcher\") {}\n").expect("Failed to write BUILD.gn");
    root
}

fn run(args: &[&str]) -> std::process::Output {
    Command::new(overlaybuild_bin())
        .args(args)
        .env_remove("OVERLAYBUILD_WORKSPACE")
        .env_remove("GITHUB_WORKSPACE")
        .env_remove("OVERLAYBUILD_TARGET_OS")
        .env_remove("OVERLAYBUILD_TARGET_CPU")
        .output()
        .expect("Failed to execute overlaybuild")
}

#[test]
fn test_cli_help() {
    let output = run(&["--help"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("overlaybuild"));
    assert!(stdout.contains("build"));
    assert!(stdout.contains("plan"));
    assert!(stdout.contains("paths"));
}

#[test]
fn test_cli_version() {
    let output = run(&["--version"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_paths_json() {
    let dir = TempDir::new().unwrap();
    let root = create_project(&dir);

    let output = run(&["paths", "--project-root", root.to_str().unwrap(), "--format", "json"]);

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["project_root"], root.to_str().unwrap());
    assert_eq!(
        value["source_tree_root"],
        root.join("build").join("chromium").join("src").to_str().unwrap()
    );
    assert_eq!(value["artifacts_dir"], root.join("artifacts").to_str().unwrap());
}

#[test]
fn test_plan_on_fresh_project() {
    let dir = TempDir::new().unwrap();
    let root = create_project(&dir);

    let output = run(&["-q", "plan", "--project-root", root.to_str().unwrap(), "-f", "json"]);

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let stages = value.as_array().unwrap();
    assert_eq!(stages.len(), 7);
    assert_eq!(stages[0]["name"], "bootstrap-toolchain");
    assert_eq!(stages[0]["gate"]["decision"], "run");
    assert_eq!(stages[4]["name"], "apply-patch");
    assert_eq!(stages[4]["gate"]["decision"], "skip");
    assert_eq!(stages[4]["policy"], "best_effort");

    // planning must not touch the workspace
    assert!(!root.join("build").exists());
}

#[test]
fn test_plan_human_after_bootstrap() {
    let dir = TempDir::new().unwrap();
    let root = create_project(&dir);
    fs::create_dir_all(root.join("build/depot_tools")).unwrap();

    let output = run(&["plan", "--project-root", root.to_str().unwrap()]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("skip  bootstrap-toolchain"));
    assert!(stdout.contains("run   acquire-source"));
}

#[test]
fn test_invalid_target_os_exits_with_failure() {
    let dir = TempDir::new().unwrap();
    let root = create_project(&dir);

    let output = run(&[
        "build",
        "--project-root",
        root.to_str().unwrap(),
        "--target-os",
        "plan9",
    ]);

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("plan9"));
    assert!(!root.join("build").exists());
}

#[test]
fn test_unknown_subcommand() {
    let output = run(&["detect"]);
    assert!(!output.status.success());
}
