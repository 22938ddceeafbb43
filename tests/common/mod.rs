//! Shared integration-test harness for running the `auditrc` binary as a
//! child process and inspecting its output and exit status.

#![allow(dead_code)]

use std::path::PathBuf;
use std::process::{Command, Output};

/// Runs the `auditrc` binary with the given arguments.
///
/// Panics if the binary cannot be spawned.
pub fn run_auditrc(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_auditrc"))
        .args(args)
        .output()
        .expect("failed to run auditrc")
}

/// Runs the `auditrc` binary with extra environment variables set.
pub fn run_auditrc_env(args: &[&str], envs: &[(&str, &str)]) -> Output {
    let mut command = Command::new(env!("CARGO_BIN_EXE_auditrc"));
    command.args(args);
    for (key, value) in envs {
        command.env(key, value);
    }
    command.output().expect("failed to run auditrc")
}

/// Returns the path to a test fixture.
#[must_use]
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

/// Convenience: fixture path as a `&str`-able `String`.
#[must_use]
pub fn fixture(name: &str) -> String {
    fixture_path(name).to_string_lossy().into_owned()
}
