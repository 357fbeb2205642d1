//! Integration tests for the CLI binary.
//!
//! Runs the `atrust` binary against a temporary trust home.
//!
//! This test is registered as a [[test]] in the agentic-trust-cli crate
//! so that CARGO_BIN_EXE_atrust is available.

use std::path::Path;
use std::process::{Command, Output};

const PASSPHRASE: &str = "cli-test-passphrase";

/// Get a Command pointing to the `atrust` binary.
fn atrust_binary() -> Command {
    Command::new(env!("CARGO_BIN_EXE_atrust"))
}

/// Run `atrust --home HOME --json ARGS...` with the passphrase in the environment.
fn run(home: &Path, args: &[&str]) -> Output {
    atrust_binary()
        .arg("--home")
        .arg(home)
        .arg("--json")
        .args(args)
        .env("ATRUST_PASSPHRASE", PASSPHRASE)
        .env_remove("ATRUST_TRUST_DOMAINS")
        .output()
        .expect("failed to execute atrust")
}

fn json(output: &Output) -> serde_json::Value {
    assert!(
        output.status.success(),
        "atrust failed, stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
}

#[test]
fn cli_responds_to_help() {
    let output = atrust_binary()
        .arg("--help")
        .output()
        .expect("failed to execute atrust --help");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("atrust") || stdout.contains("Usage"),
        "help output should contain usage information, got: {stdout}"
    );
}

#[test]
fn cli_responds_to_version() {
    let output = atrust_binary()
        .arg("--version")
        .output()
        .expect("failed to execute atrust --version");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("0.1"), "got: {stdout}");
}

#[test]
fn cli_exits_with_error_on_unknown_flag() {
    let output = atrust_binary()
        .arg("--nonexistent-flag")
        .output()
        .expect("failed to execute atrust");
    assert!(!output.status.success());
}

#[test]
fn cli_requires_init() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(dir.path(), &["issue", "agent", "--global"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("atrust init"));
}

#[test]
fn cli_issue_verify_connect_revoke() {
    let dir = tempfile::tempdir().unwrap();
    let home = dir.path();

    let init = json(&run(home, &["init"]));
    assert!(init["public_key"].is_string());
    assert!(home.join("issuer.key").exists());
    assert!(home.join("config.json").exists());

    let domains = json(&run(home, &["domains"]));
    assert!(domains
        .as_array()
        .unwrap()
        .iter()
        .any(|d| d == "example.xyz"));

    let blog = json(&run(home, &["issue", "blog-writer", "--global"]));
    let blog_id = blog["id"].as_str().unwrap().to_string();

    let research = json(&run(
        home,
        &[
            "issue",
            "researcher",
            "--domain",
            "example.xyz",
            "--parent",
            &blog_id,
            "--link",
            &blog_id,
        ],
    ));
    let research_id = research["id"].as_str().unwrap().to_string();
    let token = research["credential"]["token"].as_str().unwrap().to_string();

    let verified = json(&run(home, &["verify", "--token", &token]));
    assert_eq!(verified["valid"], true);

    let by_name = json(&run(
        home,
        &["verify", "--name", "researcher", "--domain", "example.xyz"],
    ));
    assert_eq!(by_name["identity"], research_id.as_str());

    let forward = json(&run(home, &["connect", &research_id, &blog_id]));
    assert_eq!(forward["connected"], true);
    let backward = json(&run(home, &["connect", &blog_id, &research_id]));
    assert_eq!(backward["connected"], false);

    let check = json(&run(home, &["policy", "check", &research_id, "read:articles"]));
    assert_eq!(check["allowed"], true);

    json(&run(home, &["reissue", &research_id]));
    let stale = run(home, &["verify", "--token", &token]);
    assert!(!stale.status.success());
    let report: serde_json::Value = serde_json::from_slice(&stale.stdout).unwrap();
    assert_eq!(report["error"], "credential_stale");

    let revoked = json(&run(home, &["revoke", &research_id, "--reason", "compromised"]));
    assert_eq!(revoked["reason"], "Compromised");
    let after = run(home, &["verify", "--id", &research_id]);
    assert!(!after.status.success());

    let listed = json(&run(home, &["show"]));
    assert_eq!(listed.as_array().unwrap().len(), 2);
}

#[test]
fn cli_rejects_unlisted_domain() {
    let dir = tempfile::tempdir().unwrap();
    json(&run(dir.path(), &["init"]));
    let output = run(dir.path(), &["issue", "x", "--domain", "untrusted-domain.com"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("not whitelisted"));
}
