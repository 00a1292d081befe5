//! CLI integration tests
//!
//! Run the built `pkmreport` binary against the fixtures and check exit
//! codes, printed output and the written workbooks.

use std::path::PathBuf;
use std::process::{Command, Output};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
}

fn pkmreport(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_pkmreport"))
        .args(args)
        .env_remove("RUST_LOG")
        .env_remove("PKMREPORT_CONFIG")
        .output()
        .expect("failed to execute pkmreport")
}

fn is_xlsx(path: &std::path::Path) -> bool {
    std::fs::read(path).map(|bytes| bytes.starts_with(b"PK")).unwrap_or(false)
}

// =============================================================================
// export
// =============================================================================

#[test]
fn export_writes_workbook() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("report.xlsx");
    let input = fixture("stats.json");

    let output = pkmreport(&[
        "export",
        "--input",
        input.to_str().unwrap(),
        "--type",
        "monthly",
        "-o",
        out.to_str().unwrap(),
    ]);

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(is_xlsx(&out));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("2 clinics"), "stdout: {stdout}");
}

#[test]
fn export_with_rollup_and_config() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("rollup.xlsx");
    let input = fixture("stats.json");
    let config = fixture("config.toml");

    let output = pkmreport(&[
        "--config",
        config.to_str().unwrap(),
        "export",
        "--input",
        input.to_str().unwrap(),
        "--rollup",
        "-o",
        out.to_str().unwrap(),
    ]);

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(is_xlsx(&out));
}

#[test]
fn export_rejects_unknown_report_type() {
    let input = fixture("stats.json");
    let output = pkmreport(&["export", "--input", input.to_str().unwrap(), "--type", "weekly"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Unknown report type"), "stderr: {stderr}");
}

#[test]
fn export_refuses_template_type() {
    let input = fixture("stats.json");
    let output = pkmreport(&["export", "--input", input.to_str().unwrap(), "--type", "puskesmas"]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("pkmreport template"));
}

#[test]
fn export_reports_missing_input() {
    let output = pkmreport(&["export", "--input", "does/not/exist.json"]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to read dataset"));
}

// =============================================================================
// template
// =============================================================================

#[test]
fn template_writes_workbook() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("template.xlsx");
    let input = fixture("clinics.json");

    let output = pkmreport(&[
        "template",
        "--input",
        input.to_str().unwrap(),
        "--disease",
        "dm",
        "--year",
        "2025",
        "-o",
        out.to_str().unwrap(),
    ]);

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(is_xlsx(&out));
    assert!(String::from_utf8_lossy(&output.stdout).contains("3 clinics"));
}

// =============================================================================
// columns
// =============================================================================

#[test]
fn columns_prints_layout() {
    let output = pkmreport(&["columns", "--type", "quarterly"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("quarterly: A-AB"), "stdout: {stdout}");
    assert!(stdout.contains("TRIWULAN IV"));
    assert!(stdout.contains("X-AB"));
}

#[test]
fn columns_json() {
    let output = pkmreport(&["columns", "--type", "all", "--json"]);

    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["report_type"], "all");
    assert_eq!(json["last_column"], "CJ");
    assert_eq!(json["blocks"].as_array().map(Vec::len), Some(17));
    assert_eq!(json["blocks"][0]["period"]["month"], 1);
}
