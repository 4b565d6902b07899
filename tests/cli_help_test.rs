//! CLI help output integration tests

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

#[test]
fn test_root_help() {
    Command::cargo_bin("srcpm")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Source package manager"));
}

#[test]
fn test_install_help() {
    Command::cargo_bin("srcpm")
        .unwrap()
        .args(["install", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--docs-only"))
        .stdout(predicate::str::contains("--examples"))
        .stdout(predicate::str::contains("--vcs"));
}

#[test]
fn test_remove_help() {
    Command::cargo_bin("srcpm")
        .unwrap()
        .args(["remove", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Remove installed packages"));
}

#[test]
fn test_list_help() {
    Command::cargo_bin("srcpm")
        .unwrap()
        .args(["list", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--json"));
}

#[test]
fn test_install_requires_packages() {
    Command::cargo_bin("srcpm")
        .unwrap()
        .arg("install")
        .assert()
        .failure();
}

#[test]
fn test_update_requires_vcs() {
    Command::cargo_bin("srcpm")
        .unwrap()
        .args(["install", "--update", "github.com/a/b"])
        .assert()
        .failure();
}

#[test]
fn test_list_json_reads_registry() {
    let home = tempfile::TempDir::new().unwrap();
    std::fs::write(
        home.path().join("nodes.json"),
        r#"[{"ImportPath":"github.com/a/b","Type":"commit","Value":"abc"}]"#,
    )
    .unwrap();

    Command::cargo_bin("srcpm")
        .unwrap()
        .env("SRCPM_HOME", home.path())
        .env("SRCPM_ROOT", home.path().join("gopath"))
        .args(["list", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"ImportPath\": \"github.com/a/b\""));
}

#[test]
fn test_bundles_empty() {
    let home = tempfile::TempDir::new().unwrap();

    Command::cargo_bin("srcpm")
        .unwrap()
        .env("SRCPM_HOME", home.path())
        .env("SRCPM_ROOT", home.path().join("gopath"))
        .arg("bundles")
        .assert()
        .success()
        .stdout(predicate::str::contains("No bundles defined"));
}

#[test]
fn test_install_invalid_path_is_skipped() {
    let home = tempfile::TempDir::new().unwrap();

    Command::cargo_bin("srcpm")
        .unwrap()
        .env("SRCPM_HOME", home.path())
        .env("SRCPM_ROOT", home.path().join("gopath"))
        .args(["install", "example.net/x/y"])
        .assert()
        .success()
        .stdout(predicate::str::contains("invalid import path"));

    assert!(!home.path().join("nodes.json").exists());
}
