use anyhow::{Context, Result};
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// Disposable copy of the `demos/orders` project.
struct GuardTestEnv {
    _tmp: TempDir,
    root: PathBuf,
}

impl GuardTestEnv {
    fn new() -> Result<Self> {
        let tmp = tempfile::tempdir()?;
        let project_root = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .parent()
            .context("Workspace root not found")?
            .join("demos/orders");

        let dest = tmp.path().join("orders");
        Self::copy_dir(&project_root, &dest)?;

        Ok(Self {
            _tmp: tmp,
            root: dest,
        })
    }

    fn copy_dir(src: &Path, dst: &Path) -> std::io::Result<()> {
        let mut options = fs_extra::dir::CopyOptions::new();
        options.skip_exist = true;
        options.content_only = true;

        fs::create_dir_all(dst)?;
        fs_extra::dir::copy(src, dst, &options)
            .map(|_| ())
            .map_err(|e| std::io::Error::other(e.to_string()))
    }

    fn dqguard(&self) -> Command {
        let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("dqguard"));
        cmd.current_dir(&self.root);
        cmd.env_remove("DQGUARD_HISTORY_WINDOW")
            .env_remove("DQGUARD_AUTO_ACCEPT")
            .env_remove("DQGUARD_OUTPUT_PATH");
        cmd
    }

    fn run(&self) -> Command {
        let mut cmd = self.dqguard();
        cmd.args(["run", "--input", "data/orders_sample.csv"]);
        cmd
    }

    fn reports(&self) -> Result<Vec<serde_json::Value>> {
        let dir = self.root.join("dq/run_reports");
        let mut paths: Vec<PathBuf> = fs::read_dir(&dir)?
            .filter_map(|e| e.ok().map(|e| e.path()))
            .collect();
        paths.sort();
        paths
            .iter()
            .map(|p| Ok(serde_json::from_str(&fs::read_to_string(p)?)?))
            .collect()
    }
}

#[test]
fn test_run_applies_rules_and_writes_artifacts() -> Result<()> {
    let env = GuardTestEnv::new()?;

    env.run()
        .assert()
        .success()
        .stdout(predicate::str::contains("SUCCESS"))
        .stdout(predicate::str::contains("Transform audit"));

    let reports = env.reports()?;
    assert_eq!(reports.len(), 1);
    let report = &reports[0];
    assert_eq!(report["rows"], 10);
    assert_eq!(report["transform_audit"]["assign"]["status"], 2);
    assert_eq!(report["transform_audit"]["impute"]["quantity"], 2);
    assert_eq!(report["transform_audit"]["impute"]["unit_price"], 1);
    assert_eq!(report["transform_audit"]["compute"]["total_amount"], 3);
    assert_eq!(report["transform_audit"]["assign"]["dq_flag"], 2);
    assert_eq!(report["drift"], serde_json::json!({}));
    assert!(report["anomaly_outliers"]["total_amount"]["count"].is_u64());

    let curated: Vec<serde_json::Value> = serde_json::from_str(&fs::read_to_string(
        env.root.join("data/curated/orders_curated.json"),
    )?)?;
    assert_eq!(curated.len(), 10);
    // 1003: no status, no quantity
    assert_eq!(curated[2]["status"], "unknown");
    assert_eq!(curated[2]["total_amount"], 12.0);
    assert_eq!(curated[2]["imputed_flag"], true);
    // 1002: decimal comma price
    assert_eq!(curated[1]["unit_price"], 249.5);
    assert_eq!(curated[0]["imputed_flag"], false);

    let baselines: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(env.root.join("dq/baselines.json"))?)?;
    assert_eq!(baselines["history"].as_array().map(Vec::len), Some(1));
    Ok(())
}

#[test]
fn test_second_run_measures_drift() -> Result<()> {
    let env = GuardTestEnv::new()?;
    env.run().assert().success();
    env.run()
        .assert()
        .success()
        .stdout(predicate::str::contains("Mean Δ total_amount"));

    let reports = env.reports()?;
    assert_eq!(reports.len(), 2);
    let drift = &reports[1]["drift"];
    assert_eq!(drift["mean_delta"]["total_amount"], 0.0);
    assert_eq!(drift["category_share_delta"]["status"]["open"], 0.0);
    assert_eq!(drift["category_share_delta"]["currency"]["EUR"], 0.0);

    env.dqguard()
        .arg("baseline")
        .assert()
        .success()
        .stdout(predicate::str::contains("2 snapshots"));
    Ok(())
}

#[test]
fn test_suggestions_are_reported_and_auto_accepted() -> Result<()> {
    let env = GuardTestEnv::new()?;
    let rules_before = fs::read_to_string(env.root.join("dq/rules.json"))?;

    env.run().assert().success();
    let report = env.reports()?.remove(0);
    let titles: Vec<&str> = report["suggestions"]
        .as_array()
        .context("suggestions missing")?
        .iter()
        .filter_map(|s| s["title"].as_str())
        .collect();
    assert!(titles.contains(&"High missing email ratio"));
    assert!(titles.contains(&"Extreme unit price"));
    assert_eq!(fs::read_to_string(env.root.join("dq/rules.json"))?, rules_before);

    env.run().arg("--auto-accept").assert().success();
    let rules = fs::read_to_string(env.root.join("dq/rules.json"))?;
    assert!(rules.contains("missing_contact"));
    assert!(rules.contains("price_outlier_high"));
    Ok(())
}

#[test]
fn test_input_is_discovered_when_omitted() -> Result<()> {
    let env = GuardTestEnv::new()?;
    env.dqguard()
        .arg("run")
        .assert()
        .success()
        .stdout(predicate::str::contains("orders_sample.csv"));
    Ok(())
}

#[test]
fn test_broken_rules_do_not_fail_the_run() -> Result<()> {
    let env = GuardTestEnv::new()?;
    fs::write(
        env.root.join("dq/rules.json"),
        r#"{"logic": [
            {"if": "status IS NULL", "then": "drop status"},
            {"if": "status IS NULL"},
            {"if": "status IS NULL", "then": "assign status = 'unknown'"}
        ]}"#,
    )?;

    env.run().assert().success();
    let report = env.reports()?.remove(0);
    assert_eq!(report["transform_audit"]["assign"]["status"], 2);
    assert_eq!(report["policy_diagnostics"].as_array().map(Vec::len), Some(2));

    env.dqguard()
        .arg("rules")
        .assert()
        .success()
        .stdout(predicate::str::contains("skipped"));
    Ok(())
}

#[test]
fn test_missing_input_fails() -> Result<()> {
    let env = GuardTestEnv::new()?;
    env.dqguard()
        .args(["run", "--input", "data/nope.csv"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("CRITICAL PIPELINE ERROR"));
    Ok(())
}

#[test]
fn test_missing_config_needs_defaults_flag() -> Result<()> {
    let env = GuardTestEnv::new()?;
    fs::remove_file(env.root.join("dqguard.yaml"))?;

    env.run().assert().failure();
    env.run()
        .arg("--defaults")
        .assert()
        .success()
        .stdout(predicate::str::contains("built-in defaults"));
    assert!(env.root.join("data/curated.json").exists());
    Ok(())
}
