//! Argument parsing, help, version and exit codes.

#![allow(clippy::expect_used)]

use std::io::Write as _;

use assert_cmd::Command;
use predicates::prelude::*;

const CONFIG_VARS: &[&str] = &[
    "DEMOENV_PROXMOX_HOST",
    "DEMOENV_PROXMOX_USER",
    "DEMOENV_PROXMOX_PASSWORD",
    "DEMOENV_CLOUDFLARE_API_TOKEN",
    "DEMOENV_CLOUDFLARE_ACCOUNT_ID",
    "DEMOENV_CLOUDFLARE_ZONE_ID",
    "DEMOENV_FILESERVER_HOST",
    "DEMOENV_DOMAIN",
    "DEMOENV_CLOUDFLARE_API_URL",
    "DEMOENV_FILESERVER_PORT",
];

/// The binary with colors off and no platform configuration inherited.
pub fn demoenv() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("demoenv"));
    cmd.env("NO_COLOR", "1");
    for var in CONFIG_VARS {
        cmd.env_remove(var);
    }
    cmd
}

// --- Help and version tests ---

#[test]
fn test_cli_no_args_shows_help_and_exits_two() {
    demoenv().assert().code(2).stderr(predicate::str::contains(
        "short-lived public demo environments",
    ));
}

#[test]
fn test_cli_help_lists_commands() {
    demoenv()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("provision"))
        .stdout(predicate::str::contains("cleanup"))
        .stdout(predicate::str::contains("check"))
        .stdout(predicate::str::contains("DEMOENV_"));
}

#[test]
fn test_cli_version_flag_shows_version() {
    demoenv()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("demoenv"));
}

#[test]
fn test_version_command_shows_version() {
    demoenv()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(format!(
            "demoenv {}",
            env!("CARGO_PKG_VERSION")
        )));
}

// --- Usage errors (exit 2) ---

#[test]
fn test_provision_without_flags_is_usage_error() {
    demoenv().arg("provision").assert().code(2);
}

#[test]
fn test_provision_request_conflicts_with_flags() {
    demoenv()
        .args(["provision", "--request", "-", "--name", "demo"])
        .assert()
        .code(2);
}

#[test]
fn test_provision_zero_days_is_usage_error() {
    demoenv()
        .args([
            "provision", "--email", "a@b.com", "--kind", "nginx", "--name", "demo", "--days", "0",
        ])
        .assert()
        .code(2);
}

#[test]
fn test_cleanup_requires_numeric_instance_id() {
    demoenv()
        .args([
            "cleanup",
            "--instance-id",
            "abc",
            "--tunnel-id",
            "t1",
            "--name",
            "demo",
        ])
        .assert()
        .code(2);
}

// --- Validation before any external call (exit 1) ---

#[test]
fn test_provision_invalid_name_fails_before_config() {
    demoenv()
        .args([
            "provision", "--email", "a@b.com", "--kind", "nginx", "--name", "-demo", "--days", "7",
        ])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("invalid subdomain"))
        .stderr(predicate::str::contains("DEMOENV_").not());
}

#[test]
fn test_provision_unsupported_kind_fails() {
    demoenv()
        .args([
            "provision", "--email", "a@b.com", "--kind", "wordpress", "--name", "demo", "--days",
            "7",
        ])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("unsupported environment kind"));
}

#[test]
fn test_provision_request_file_is_validated() {
    let mut file = tempfile::NamedTempFile::new().expect("tempfile");
    write!(
        file,
        r#"{{"customer_email":"a@b.com","oss_type":"nginx","subdomain":"much-too-long-name","duration_days":7}}"#
    )
    .expect("write");

    demoenv()
        .args(["provision", "--request"])
        .arg(file.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("invalid subdomain"));
}

#[test]
fn test_provision_request_from_stdin_is_validated() {
    demoenv()
        .args(["provision", "--request", "-"])
        .write_stdin(
            r#"{"customer_email":"a@b.com","oss_type":"nginx","subdomain":"UPPER","duration_days":7}"#,
        )
        .assert()
        .code(1)
        .stderr(predicate::str::contains("invalid subdomain"));
}

#[test]
fn test_check_invalid_name_fails() {
    demoenv()
        .args(["check", "demo_7"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("invalid subdomain"));
}

// --- Missing configuration ---

#[test]
fn test_check_without_config_names_prefix() {
    demoenv()
        .args(["check", "demo7"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("DEMOENV_"));
}

#[test]
fn test_cleanup_without_config_names_prefix() {
    demoenv()
        .args([
            "cleanup",
            "--instance-id",
            "9000",
            "--tunnel-id",
            "t1",
            "--name",
            "demo7",
        ])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("DEMOENV_"));
}
