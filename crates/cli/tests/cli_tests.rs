//! CLI integration tests

use serde_json::Value;
use std::io::Write;
use std::process::{Command, Output};
use tempfile::{tempdir, NamedTempFile, TempDir};

/// Run costctl in local mode with an isolated config file
fn costctl(config_dir: &TempDir, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_costctl"))
        .args(args)
        .env("COSTCTL_CONFIG", config_dir.path().join("config.json"))
        .env_remove("COSTCTL_API_URL")
        .env("NO_COLOR", "1")
        .output()
        .expect("Failed to execute command")
}

fn json_output(output: &Output) -> Value {
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
}

fn json_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", content).unwrap();
    file
}

#[test]
fn test_cli_help() {
    let dir = tempdir().unwrap();
    let output = costctl(&dir, &["--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI help should succeed");
    for command in ["estimate", "total", "discount", "optimize", "compare", "catalog"] {
        assert!(stdout.contains(command), "Should show {command} command");
    }
    assert!(stdout.contains("--api-url"));
}

#[test]
fn test_cli_version() {
    let dir = tempdir().unwrap();
    let output = costctl(&dir, &["--version"]);

    assert!(output.status.success(), "CLI version should succeed");
    assert!(String::from_utf8_lossy(&output.stdout).contains("costctl"));
}

#[test]
fn test_estimate_json() {
    let dir = tempdir().unwrap();
    let output = costctl(
        &dir,
        &[
            "--format",
            "json",
            "estimate",
            "Amazon EC2",
            "--set",
            "instance_type=t3.xlarge",
            "--set",
            "instances=3",
        ],
    );
    let cost = json_output(&output);

    assert_eq!(cost["service_name"], "Amazon EC2");
    assert_eq!(cost["monthly_cost"], 364.42);
    assert_eq!(cost["pricing_model"], "On-Demand");
}

#[test]
fn test_estimate_table() {
    let dir = tempdir().unwrap();
    let output = costctl(&dir, &["estimate", "Amazon S3", "-s", "storage_gb=500"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    assert!(stdout.contains("Amazon S3"));
    assert!(stdout.contains("$11.50"));
}

#[test]
fn test_estimate_unknown_service_fails() {
    let dir = tempdir().unwrap();
    let output = costctl(&dir, &["estimate", "Amazon Foo"]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr)
        .contains("Pricing data not available for service: Amazon Foo"));
}

#[test]
fn test_total_with_discount_and_onprem() {
    let dir = tempdir().unwrap();
    let architecture = json_file(
        r#"{"services": [
            {"service_name": "Amazon EC2", "configuration": {"instance_type": "t3.xlarge", "instances": 3}},
            {"service_name": "Amazon S3", "configuration": {"storage_gb": 500}}
        ]}"#,
    );
    let path = architecture.path().to_str().unwrap();

    let output = costctl(
        &dir,
        &["-f", "json", "total", path, "--discount", "--onprem", "500"],
    );
    let estimate = json_output(&output);

    assert_eq!(estimate["total_monthly_cost"], 375.92);
    assert_eq!(estimate["anz_discount_applied"], 37.59);
    assert_eq!(estimate["comparison_with_onprem"]["difference"], -124.08);
    assert_eq!(estimate["breakdown"].as_array().unwrap().len(), 2);
}

#[test]
fn test_total_then_optimize_saved_estimate() {
    let dir = tempdir().unwrap();
    let architecture = json_file(
        r#"[{"service_name": "Amazon EC2", "configuration": {"instance_type": "t3.xlarge", "instances": 3}}]"#,
    );

    let output = costctl(
        &dir,
        &["-f", "json", "total", architecture.path().to_str().unwrap()],
    );
    let estimate = json_output(&output);
    let saved = json_file(&estimate.to_string());

    let output = costctl(
        &dir,
        &["-f", "json", "optimize", saved.path().to_str().unwrap()],
    );
    let report = json_output(&output);

    assert_eq!(report["count"], 2);
    assert_eq!(report["optimizations"][0]["potential_savings"], 145.77);
    assert_eq!(report["total_potential_savings"], 236.87);
}

#[test]
fn test_discount_and_compare() {
    let dir = tempdir().unwrap();

    let discount = json_output(&costctl(&dir, &["-f", "json", "discount", "5000"]));
    assert_eq!(discount["final_cost"], 4500.0);
    assert_eq!(discount["discount_type"], "ANZ Enterprise Agreement");

    let comparison = json_output(&costctl(
        &dir,
        &["-f", "json", "compare", "--onprem", "8000", "--aws", "5420"],
    ));
    assert_eq!(comparison["percentage_change"], -32.25);

    let output = costctl(&dir, &["compare", "--onprem", "0", "--aws", "5"]);
    assert!(!output.status.success());
}

#[test]
fn test_catalog_listing_and_detail() {
    let dir = tempdir().unwrap();

    let entries = json_output(&costctl(&dir, &["-f", "json", "catalog"]));
    assert!(entries
        .as_array()
        .unwrap()
        .iter()
        .any(|e| e["service_name"] == "AWS Lambda"));

    let output = costctl(&dir, &["catalog", "Amazon EC2"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert!(stdout.contains("t3.xlarge"));
}

#[test]
fn test_catalog_file_override() {
    let dir = tempdir().unwrap();
    let catalog = json_file(
        r#"[{"service_name": "Internal Tooling", "category": "flat", "unit_cost": 250,
             "unit_label": "per seat", "pricing_model": "On-Demand"}]"#,
    );

    let cost = json_output(&costctl(
        &dir,
        &[
            "--catalog",
            catalog.path().to_str().unwrap(),
            "-f",
            "json",
            "estimate",
            "Internal Tooling",
            "--set",
            "units=4",
        ],
    ));
    assert_eq!(cost["monthly_cost"], 1000.0);
}

#[test]
fn test_config_set_persists_defaults() {
    let dir = tempdir().unwrap();

    let output = costctl(&dir, &["config", "set", "format", "json"]);
    assert!(output.status.success());
    assert!(dir.path().join("config.json").exists());

    // Format now defaults to JSON without the flag
    let discount = json_output(&costctl(&dir, &["discount", "100"]));
    assert_eq!(discount["final_cost"], 90.0);

    let output = costctl(&dir, &["config", "set", "namespace", "prod"]);
    assert!(!output.status.success());
}
