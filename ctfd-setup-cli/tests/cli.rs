use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use predicates::str::contains;
use tempfile::TempDir;

const ENV_VARS: [&str; 12] = [
    "FILE",
    "DIRECTORY",
    "APPEARANCE_NAME",
    "APPEARANCE_DESCRIPTION",
    "ADMIN_NAME",
    "ADMIN_EMAIL",
    "ADMIN_PASSWORD",
    "MODE",
    "CTFD_URL",
    "CTFD_API_KEY",
    "CTFD_SETUP_LOG_LEVEL",
    "RUST_LOG",
];

const MINIMAL: &str = "\
appearance:
  name: Test CTF
  description: d
admin:
  name: admin
  email: a@b.co
  password: p
";

/// Binary with every configuration variable cleared from the environment.
fn ctfd_setup(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("ctfd-setup"));
    cmd.current_dir(dir);
    for var in ENV_VARS {
        cmd.env_remove(var);
    }
    cmd
}

fn write(dir: &TempDir, name: &str, contents: &str) {
    std::fs::write(dir.path().join(name), contents).expect("write fixture");
}

#[test]
fn validate_accepts_minimal_document() {
    let dir = TempDir::new().expect("tempdir");
    write(&dir, ".ctfd.yaml", MINIMAL);

    ctfd_setup(dir.path())
        .args(["validate", "--file", ".ctfd.yaml"])
        .assert()
        .success()
        .stdout(contains("'Test CTF' is valid (users mode, theme core)"));
}

#[test]
fn validate_lists_every_missing_admin_field() {
    let dir = TempDir::new().expect("tempdir");
    write(
        &dir,
        ".ctfd.yaml",
        "appearance: { name: X, description: Y }\nadmin: { password: p }\n",
    );

    ctfd_setup(dir.path())
        .args(["validate", "--file", ".ctfd.yaml"])
        .assert()
        .failure()
        .stderr(contains("admin.name is required").and(contains("admin.email is required")));
}

#[test]
fn validate_without_file_takes_overrides_from_env() {
    let dir = TempDir::new().expect("tempdir");

    ctfd_setup(dir.path())
        .arg("validate")
        .env("APPEARANCE_NAME", "Env CTF")
        .env("APPEARANCE_DESCRIPTION", "from the environment")
        .env("ADMIN_NAME", "admin")
        .env("ADMIN_EMAIL", "a@b.co")
        .env("ADMIN_PASSWORD", "p")
        .env("MODE", "teams")
        .assert()
        .success()
        .stdout(contains("'Env CTF' is valid (teams mode"));
}

#[test]
fn flags_override_the_document() {
    let dir = TempDir::new().expect("tempdir");
    write(&dir, ".ctfd.yaml", MINIMAL);

    ctfd_setup(dir.path())
        .args([
            "validate",
            "--file",
            ".ctfd.yaml",
            "--appearance.name",
            "Flag CTF",
            "--mode",
            "teams",
        ])
        .assert()
        .success()
        .stdout(contains("'Flag CTF' is valid (teams mode"));
}

#[test]
fn validate_prints_declared_pages_and_uploads() {
    let dir = TempDir::new().expect("tempdir");
    write(&dir, "faq.md", "# FAQ\n");
    write(&dir, "rules.txt", "abc");
    write(
        &dir,
        ".ctfd.yaml",
        &format!(
            "{MINIMAL}pages:\n  additional:\n    - title: FAQ\n      route: faq\n      \
             content: {{ from_file: faq.md }}\n      hidden: true\n\
             uploads:\n  - file: {{ from_file: rules.txt }}\n    location: docs/rules.txt\n"
        ),
    );

    ctfd_setup(dir.path())
        .args(["validate", "--file", ".ctfd.yaml"])
        .assert()
        .success()
        .stdout(
            contains("faq")
                .and(contains("hidden"))
                .and(contains("docs/rules.txt"))
                .and(contains("a9993e364706816aba3e25717850c26c9cd0d89d")),
        );
}

#[test]
fn validate_names_the_missing_source_file() {
    let dir = TempDir::new().expect("tempdir");
    write(
        &dir,
        ".ctfd.yaml",
        &format!("{MINIMAL}theme:\n  logo: {{ from_file: missing.png }}\n"),
    );

    ctfd_setup(dir.path())
        .args(["validate", "--file", ".ctfd.yaml"])
        .assert()
        .failure()
        .stderr(contains("missing.png"));
}

#[test]
fn probe_of_unreachable_instance_fails_with_client_error() {
    let dir = TempDir::new().expect("tempdir");

    ctfd_setup(dir.path())
        .args(["probe", "--url", "http://127.0.0.1:1"])
        .assert()
        .failure()
        .stderr(contains("client error"));
}

#[test]
fn setup_stops_at_session_phase_when_unreachable() {
    let dir = TempDir::new().expect("tempdir");
    write(&dir, ".ctfd.yaml", MINIMAL);

    ctfd_setup(dir.path())
        .args(["setup", "--url", "http://127.0.0.1:1", "--file", ".ctfd.yaml"])
        .assert()
        .failure()
        .stderr(contains("getting CTFd nonce and session"));
}

#[test]
fn setup_requires_a_url() {
    let dir = TempDir::new().expect("tempdir");
    write(&dir, ".ctfd.yaml", MINIMAL);

    ctfd_setup(dir.path())
        .args(["setup", "--file", ".ctfd.yaml"])
        .assert()
        .failure()
        .stderr(contains("--url"));
}
