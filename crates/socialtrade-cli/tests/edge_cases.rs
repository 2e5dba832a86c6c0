//! Edge case integration tests for socialtrade-cli.
//!
//! Tests 8 edge cases across Configuration, Reports, and Audit.

use std::fs;

use serde_json::Value;

use socialtrade::{ExportLayout, UserLoader};
use socialtrade_cli::config::{Settings, JOBS_ENV, PORTFOLIO_DIR_ENV, SOCIAL_DIR_ENV};
use socialtrade_cli::report::{connections_report, record_summary, users_report, AuditReport};

// ─────────────────────── helpers ───────────────────────

/// Settings pointing at fresh export directories under a temp dir.
fn temp_settings(dir: &tempfile::TempDir) -> Settings {
    let social = dir.path().join("social");
    let portfolio = dir.path().join("portfolio");
    fs::create_dir_all(&social).unwrap();
    fs::create_dir_all(&portfolio).unwrap();
    Settings::resolve_with(social.to_str(), portfolio.to_str(), Some(2), |_| None)
}

fn write_user(layout: &ExportLayout, id: &str, portfolio: Option<&str>) {
    let social = format!("{id}\n@{id}\n{id}\nhello @ann\n5 Likes\n");
    fs::write(layout.social_path(id), social).unwrap();
    if let Some(p) = portfolio {
        fs::write(layout.portfolio_path(id), p).unwrap();
    }
}

fn loader(settings: &Settings) -> UserLoader {
    settings.open_loader().expect("loader opens")
}

// ═══════════════════════════════════════════════════════
// CONFIGURATION TESTS
// ═══════════════════════════════════════════════════════

/// Test 1: Environment fills in what flags leave out
#[test]
fn test_01_env_resolution() {
    let settings = Settings::resolve_with(None, Some("/flag/web3"), None, |key| match key {
        SOCIAL_DIR_ENV => Some("/env/twitter".to_string()),
        PORTFOLIO_DIR_ENV => Some("/env/web3".to_string()),
        JOBS_ENV => Some("12".to_string()),
        _ => None,
    });
    assert_eq!(settings.layout.social_dir.to_str(), Some("/env/twitter"));
    assert_eq!(settings.layout.portfolio_dir.to_str(), Some("/flag/web3"));
    assert_eq!(settings.jobs, 12);

    println!("TEST 01 — Env Resolution: PASS");
}

/// Test 2: Loader inherits the job count
#[test]
fn test_02_jobs_reach_loader() {
    let dir = tempfile::tempdir().unwrap();
    let settings = temp_settings(&dir);
    assert_eq!(loader(&settings).max_parallel(), 2);

    println!("TEST 02 — Jobs: PASS");
}

// ═══════════════════════════════════════════════════════
// REPORT TESTS
// ═══════════════════════════════════════════════════════

/// Test 3: Users report on an empty directory
#[test]
fn test_03_users_report_empty() {
    let dir = tempfile::tempdir().unwrap();
    let settings = temp_settings(&dir);
    let report = users_report(&loader(&settings));
    assert_eq!(report["count"], 0);
    assert_eq!(report["users"], Value::Array(vec![]));

    println!("TEST 03 — Empty Users: PASS");
}

/// Test 4: Record summary is computed from the loaded record
#[test]
fn test_04_record_summary() {
    let dir = tempfile::tempdir().unwrap();
    let settings = temp_settings(&dir);
    write_user(
        &settings.layout,
        "bob",
        Some("Holdings: ETH: 2 ($100.00), Goerli ETH: 5 (Testnet)\nProfit/Loss:\nTotal: -$3.50\n"),
    );

    let record = loader(&settings).load("bob").unwrap();
    let summary = record_summary(&record);
    assert_eq!(summary["id"], "bob");
    assert_eq!(summary["handle"], "@bob");
    assert_eq!(summary["posts"], 1);
    assert_eq!(summary["testnet_holdings"], 1);
    assert_eq!(summary["real_value_usd"], 100.0);
    assert_eq!(summary["profit_loss"]["total"], -3.5);
    assert_eq!(summary["profit_loss"]["realized"], Value::Null);

    println!("TEST 04 — Record Summary: PASS");
}

/// Test 5: Connections report lists skipped ids
#[test]
fn test_05_connections_report_skips() {
    let dir = tempfile::tempdir().unwrap();
    let settings = temp_settings(&dir);
    write_user(&settings.layout, "ann", Some(""));
    write_user(&settings.layout, "bob", Some(""));
    write_user(&settings.layout, "cat", None);

    let loader = loader(&settings);
    let ann = loader.load("ann").unwrap();
    let report = connections_report("ann", &loader.load_connections(&ann), false);

    assert_eq!(report["mode"], "all");
    assert_eq!(report["loaded"].as_array().map(Vec::len), Some(1));
    assert_eq!(report["loaded"][0]["id"], "bob");
    assert_eq!(report["skipped"][0]["id"], "cat");
    assert!(report["generated_at"].is_string());

    println!("TEST 05 — Connections Report: PASS");
}

// ═══════════════════════════════════════════════════════
// AUDIT TESTS
// ═══════════════════════════════════════════════════════

/// Test 6: Clean exports audit to zero drops
#[test]
fn test_06_audit_clean() {
    let dir = tempfile::tempdir().unwrap();
    let settings = temp_settings(&dir);
    write_user(&settings.layout, "ann", Some("Holdings: ETH: 1 ($1.00)\n"));

    let report = AuditReport::collect(&loader(&settings));
    assert_eq!(report.users.len(), 1);
    assert_eq!(report.total_dropped(), 0);
    assert!(!report.has_failures());

    println!("TEST 06 — Clean Audit: PASS");
}

/// Test 7: Failed loads are reported, not fatal
#[test]
fn test_07_audit_failures() {
    let dir = tempfile::tempdir().unwrap();
    let settings = temp_settings(&dir);
    write_user(&settings.layout, "ann", Some("Holdings: ETH: 1 ($1.00), junk\n"));
    write_user(&settings.layout, "bob", None);

    let report = AuditReport::collect(&loader(&settings));
    assert_eq!(report.users.len(), 1);
    assert_eq!(report.users[0].by_kind.get("unrecognized_holding"), Some(&1));
    assert!(report.has_failures());
    assert_eq!(report.failures[0].id, "bob");

    println!("TEST 07 — Audit Failures: PASS");
}

/// Test 8: Audit serializes with per-kind totals
#[test]
fn test_08_audit_json_shape() {
    let dir = tempfile::tempdir().unwrap();
    let settings = temp_settings(&dir);
    write_user(
        &settings.layout,
        "ann",
        Some("Profit/Loss:\nTotal: n/a\nRecent Trades:\nsomething odd\n"),
    );

    let report = AuditReport::collect(&loader(&settings));
    let value = serde_json::to_value(&report).unwrap();
    assert_eq!(value["totals"]["invalid_profit_loss"], 1);
    assert_eq!(value["totals"]["unrecognized_trade"], 1);
    assert!(value["generated_at"].is_string());
    assert_eq!(value["failures"], Value::Array(vec![]));

    println!("TEST 08 — Audit JSON: PASS");
}
