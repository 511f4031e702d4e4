//! CLI integration tests

use std::process::{Command, Output};

fn orch_cli(args: &[&str]) -> Output {
    let mut full = vec!["run", "-q", "-p", "orch-cli", "--"];
    full.extend_from_slice(args);
    Command::new("cargo")
        .args(&full)
        // Keep tests away from the developer's own config and env.
        .env("HOME", std::env::temp_dir().join("orch-cli-tests"))
        .env_remove("ORCH_API_ENDPOINT")
        .env_remove("ORCH_PROJECT")
        .env_remove("ORCH_API_TOKEN")
        .output()
        .expect("Failed to execute command")
}

/// Test that the CLI shows help
#[test]
fn test_cli_help() {
    let output = orch_cli(&["--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI help should succeed");
    assert!(stdout.contains("Edge Orchestrator"), "Should show app name");
    for verb in ["list", "get", "create", "set", "delete", "config"] {
        assert!(stdout.contains(verb), "Should show {} command", verb);
    }
    assert!(stdout.contains("--api-endpoint"), "Should show endpoint flag");
}

/// Test that the CLI shows version
#[test]
fn test_cli_version() {
    let output = orch_cli(&["--version"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI version should succeed");
    assert!(stdout.contains("orch-cli"), "Should show binary name");
}

/// Test list subcommand help
#[test]
fn test_list_help() {
    let output = orch_cli(&["list", "--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "list help should succeed");
    for noun in ["hosts", "deployment-packages", "deployments", "amtprofiles", "amtdomains"] {
        assert!(stdout.contains(noun), "Should show {} noun", noun);
    }
}

/// Test create deployment help shows override and target flags
#[test]
fn test_create_deployment_help() {
    let output = orch_cli(&["create", "deployment", "--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "create deployment help should succeed");
    assert!(stdout.contains("--application-set"));
    assert!(stdout.contains("--application-namespace"));
    assert!(stdout.contains("--application-label"));
    assert!(stdout.contains("--application-cluster-id"));
}

/// Test create profile help shows chart values and templates
#[test]
fn test_create_profile_help() {
    let output = orch_cli(&["create", "profile", "--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "create profile help should succeed");
    assert!(stdout.contains("--chart-values"));
    assert!(stdout.contains("--parameter-template"));
}

/// Test invalid command handling
#[test]
fn test_invalid_command() {
    let output = orch_cli(&["invalid-command"]);
    assert!(!output.status.success(), "Invalid command should fail");
}

/// Test missing required argument
#[test]
fn test_missing_argument() {
    let output = orch_cli(&["get", "deployment"]);
    assert!(!output.status.success(), "Missing deployment ID should fail");
}

/// Test a malformed key=value flag is rejected by the parser
#[test]
fn test_bad_application_set_flag() {
    let output = orch_cli(&[
        "create",
        "deployment",
        "wordpress",
        "0.1.0",
        "--application-set",
        "no-equals-sign",
    ]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success(), "Malformed flag should fail");
    assert!(stderr.contains("expected <key>=<value>"));
}

/// Test a property key without an application prefix fails before any request
#[test]
fn test_property_key_without_app() {
    let output = orch_cli(&[
        "--project",
        "demo",
        "--api-endpoint",
        "http://127.0.0.1:1",
        "create",
        "deployment",
        "wordpress",
        "0.1.0",
        "--application-set",
        "replicas=2",
    ]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success(), "Bad property key should fail");
    assert!(
        stderr.contains("not in format <app-name>.<property-name>"),
        "Should explain the key format, got: {}",
        stderr
    );
}

/// Test project-scoped commands need a project
#[test]
fn test_missing_project() {
    let output = orch_cli(&["--api-endpoint", "http://127.0.0.1:1", "list", "hosts"]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success(), "List without project should fail");
    assert!(stderr.contains("no project set"));
}

/// Test an unreachable endpoint is reported as no response
#[test]
fn test_unreachable_endpoint() {
    let output = orch_cli(&[
        "--project",
        "demo",
        "--api-endpoint",
        "http://127.0.0.1:1",
        "list",
        "deployments",
    ]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success(), "Unreachable endpoint should fail");
    assert!(stderr.contains("no response from backend"), "got: {}", stderr);
}
