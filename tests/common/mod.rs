//! Integration tests for go-replace-sync
//!
//! These tests write real go.mod files into temporary directories and run
//! the binary through its command-line interface.

use assert_cmd::cargo::cargo_bin_cmd;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Source manifest from the documented example.
#[allow(unused)]
pub const SOURCE_GO_MOD: &str = "module example.com/dep

go 1.21

replace (
\texample.com/a v1.0.0 => /local/a
\texample.com/b => example.com/b v2.0.0
)
";

/// Target manifest with one pre-existing replace.
#[allow(unused)]
pub const TARGET_GO_MOD: &str = "// Application module.

module example.com/app

go 1.21

require (
\texample.com/a v1.0.0
\texample.com/b v2.0.0
\texample.com/c v0.3.0 // indirect
)

exclude example.com/a v0.9.0

replace example.com/c => /local/c
";

/// Helper to create a source/target pair under a temp directory
#[allow(unused)]
pub fn create_test_layout(source: &str, target: &str) -> TempDir {
    let temp = TempDir::new().unwrap();

    fs::create_dir(temp.path().join("dep")).unwrap();
    fs::write(temp.path().join("dep/go.mod"), source).unwrap();

    fs::create_dir(temp.path().join("app")).unwrap();
    fs::write(temp.path().join("app/go.mod"), target).unwrap();

    temp
}

#[allow(unused)]
pub fn source_path(root: &Path) -> PathBuf {
    root.join("dep/go.mod")
}

#[allow(unused)]
pub fn target_path(root: &Path) -> PathBuf {
    root.join("app/go.mod")
}

#[allow(unused)]
pub fn read_target(root: &Path) -> String {
    fs::read_to_string(target_path(root)).unwrap()
}

/// Helper to run a sync with explicit manifest paths
#[allow(unused)]
pub fn run_sync(root: &Path, extra_args: &[&str]) -> assert_cmd::assert::Assert {
    let mut cmd = cargo_bin_cmd!("go-replace-sync");
    cmd.arg("--source")
        .arg(source_path(root))
        .arg("--target")
        .arg(target_path(root))
        .args(extra_args)
        .env("NO_COLOR", "1")
        .current_dir(root);

    cmd.assert()
}

/// Helper to run the binary with arbitrary arguments
#[allow(unused)]
pub fn run_raw(root: &Path, args: &[&str]) -> assert_cmd::assert::Assert {
    let mut cmd = cargo_bin_cmd!("go-replace-sync");
    cmd.args(args).env("NO_COLOR", "1").current_dir(root);

    cmd.assert()
}
