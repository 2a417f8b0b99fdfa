#![allow(clippy::unwrap_used)]

mod common;

use common::gen_readme_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

#[test]
fn no_arguments_prints_help() {
    let root = TempDir::new().unwrap();
    gen_readme_cmd(root.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("--addons-dir"))
        .stdout(predicate::str::contains("--gen-html"));
}

#[test]
fn version_flag() {
    let root = TempDir::new().unwrap();
    gen_readme_cmd(root.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn unknown_flag_is_a_usage_error() {
    let root = TempDir::new().unwrap();
    gen_readme_cmd(root.path()).arg("--frobnicate").assert().code(2);
}
