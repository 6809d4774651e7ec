//! `--json` output: one document on stdout, errors as `{error, message, code}`.

#![allow(clippy::expect_used)]

use crate::cli_tests::demoenv;

fn stdout_json(output: &std::process::Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).expect("stdout is a single JSON document")
}

#[test]
fn test_version_json_is_valid() {
    let output = demoenv()
        .args(["--json", "version"])
        .output()
        .expect("run");
    assert!(output.status.success());
    assert_eq!(stdout_json(&output)["version"], env!("CARGO_PKG_VERSION"));
}

#[test]
fn test_validation_error_json() {
    let output = demoenv()
        .args([
            "--json", "provision", "--email", "a@b.com", "--kind", "nginx", "--name", "DEMO",
            "--days", "7",
        ])
        .output()
        .expect("run");

    assert_eq!(output.status.code(), Some(1));
    let error = stdout_json(&output);
    assert_eq!(error["error"], true);
    assert_eq!(error["code"], "validation");
    assert!(
        error["message"]
            .as_str()
            .expect("message")
            .contains("invalid subdomain")
    );
}

#[test]
fn test_invalid_config_json_has_config_code() {
    let output = demoenv()
        .args(["--json", "check", "demo7"])
        .env("DEMOENV_PROXMOX_HOST", "pve.invalid")
        .env("DEMOENV_PROXMOX_USER", "root@pam")
        .env("DEMOENV_PROXMOX_PASSWORD", "x")
        .env("DEMOENV_CLOUDFLARE_API_TOKEN", "x")
        .env("DEMOENV_CLOUDFLARE_ACCOUNT_ID", "x")
        .env("DEMOENV_CLOUDFLARE_ZONE_ID", "x")
        .env("DEMOENV_FILESERVER_HOST", "files.invalid")
        .env("DEMOENV_DOMAIN", "example.com")
        .env("DEMOENV_INSTANCE_ID_START", "10")
        .env("DEMOENV_INSTANCE_ID_END", "10")
        .output()
        .expect("run");

    assert_eq!(output.status.code(), Some(1));
    let error = stdout_json(&output);
    assert_eq!(error["code"], "config");
    assert!(
        error["message"]
            .as_str()
            .expect("message")
            .contains("10..10")
    );
}

#[test]
fn test_unknown_kind_in_request_document_is_validation() {
    let output = demoenv()
        .args(["--json", "provision", "--request", "-"])
        .write_stdin(
            r#"{"customer_email":"a@b.com","oss_type":"growi","subdomain":"demo7","duration_days":7}"#,
        )
        .output()
        .expect("run");

    assert_eq!(output.status.code(), Some(1));
    let error = stdout_json(&output);
    assert_eq!(error["code"], "validation");
    assert!(
        error["message"]
            .as_str()
            .expect("message")
            .contains("growi")
    );
}

#[test]
fn test_cleanup_attempts_every_step_when_platforms_are_down() {
    let output = demoenv()
        .args([
            "--json",
            "cleanup",
            "--instance-id",
            "9000",
            "--tunnel-id",
            "t1",
            "--name",
            "demo7",
        ])
        .env("DEMOENV_PROXMOX_HOST", "127.0.0.1:1")
        .env("DEMOENV_PROXMOX_USER", "root@pam")
        .env("DEMOENV_PROXMOX_PASSWORD", "x")
        .env("DEMOENV_CLOUDFLARE_API_TOKEN", "x")
        .env("DEMOENV_CLOUDFLARE_ACCOUNT_ID", "x")
        .env("DEMOENV_CLOUDFLARE_ZONE_ID", "x")
        .env("DEMOENV_CLOUDFLARE_API_URL", "http://127.0.0.1:1")
        .env("DEMOENV_FILESERVER_HOST", "127.0.0.1")
        .env("DEMOENV_FILESERVER_PORT", "1")
        .env("DEMOENV_DOMAIN", "example.com")
        .output()
        .expect("run");

    assert_eq!(output.status.code(), Some(1));
    let report = stdout_json(&output);
    let steps = report["steps"].as_array().expect("steps");
    let names: Vec<&str> = steps
        .iter()
        .map(|s| s["step"].as_str().expect("step"))
        .collect();
    assert_eq!(names, ["instance", "metadata", "dns_record", "tunnel"]);
    assert!(steps.iter().all(|s| s["outcome"] == "failed"));
    assert!(
        steps[0]["reason"]
            .as_str()
            .expect("reason")
            .contains("proxmox unreachable")
    );
}
