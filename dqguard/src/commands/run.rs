// dqguard/src/commands/run.rs
//
// USE CASE: Run one batch through the quality pipeline.

use anyhow::Context;
use comfy_table::{Table, presets::UTF8_FULL};
use std::path::PathBuf;
use tracing::debug;

use dqguard_core::application::{RunResult, run_pipeline};
use dqguard_core::infrastructure::adapters::{DuckDbReader, HeuristicSuggester};
use dqguard_core::infrastructure::fs::discover_inputs;
use dqguard_core::ports::RuleSuggester;

use super::load_config;

pub struct RunOptions {
    pub input: Option<PathBuf>,
    pub defaults: bool,
    pub auto_accept: bool,
    pub suggestions: bool,
}

pub async fn execute(project_dir: PathBuf, opts: RunOptions) -> anyhow::Result<()> {
    let start = std::time::Instant::now();

    // A. Load the Config (Infra)
    println!("⚙️  Loading configuration...");
    let mut config = load_config(&project_dir, opts.defaults)?;
    if opts.auto_accept {
        config.suggestions.auto_accept = true;
    }
    if !opts.suggestions {
        config.suggestions.enabled = false;
    }
    println!("   Project: {} (v{})", config.name, config.version);

    // B. Pick the batch
    let input = match opts.input {
        Some(p) if p.is_absolute() => p,
        Some(p) => project_dir.join(p),
        None => discover_inputs(&project_dir.join("data"))
            .pop()
            .with_context(|| format!("No CSV batch found under {:?}", project_dir.join("data")))?,
    };
    println!("   Input: {}", input.display());

    // C. Adapters
    let reader = DuckDbReader::new().context("Failed to initialize DuckDB")?;
    let heuristics = HeuristicSuggester::new();
    let suggester: Option<&dyn RuleSuggester> = Some(&heuristics);

    // D. Run the Pipeline (Application Layer)
    println!("🟢 Processing batch...");
    match run_pipeline(&project_dir, &config, &input, &reader, suggester).await {
        Ok(res) => {
            print_summary(&res);
            println!("\n✨ SUCCESS! Run finished in {:.2?}", start.elapsed());
        }
        Err(e) => {
            eprintln!("\n💥 CRITICAL PIPELINE ERROR: {}", e);
            std::process::exit(1);
        }
    }

    Ok(())
}

fn print_summary(res: &RunResult) {
    let report = &res.report;
    println!("   📦 {} rows", report.rows);

    let mut audit = Table::new();
    audit.load_preset(UTF8_FULL);
    audit.set_header(vec!["Action", "Column", "Rows"]);
    for (kind, column, rows) in report.transform_audit.iter() {
        audit.add_row(vec![kind.to_string(), column.to_string(), rows.to_string()]);
    }
    println!("\n📋 Transform audit\n{audit}");

    for d in &report.policy_diagnostics {
        println!("   ⚠️  rule #{}: {}", d.rule_index, d.message);
    }

    for (column, summary) in &report.anomaly_outliers {
        let [lo, hi] = summary.bounds;
        println!(
            "   📊 Outliers in {}: {} (bounds {} .. {})",
            column,
            summary.count,
            fmt_opt(lo),
            fmt_opt(hi)
        );
    }

    if report.drift.is_empty() {
        println!("   📈 Drift: no previous run to compare against");
    } else {
        for (column, delta) in &report.drift.mean_delta {
            println!("   📈 Mean Δ {}: {}", column, fmt_opt(*delta));
        }
        for (column, shares) in &report.drift.category_share_delta {
            for (value, delta) in shares {
                println!("   📈 Share Δ {}={}: {:.4}", column, value, delta);
            }
        }
    }

    for s in &report.suggestions {
        println!(
            "   💡 [{:.2}] {} → if {} then {}",
            s.confidence, s.title, s.rule.condition, s.rule.action
        );
    }
    if !res.accepted_rules.is_empty() {
        println!("   ✅ {} rule(s) auto-accepted", res.accepted_rules.len());
    }

    debug!(baseline_len = res.baseline_len, "Baseline size");
    println!("   💾 Curated output: {}", res.output_path.display());
    println!("   📝 Report: {}", res.report_path.display());
}

fn fmt_opt(v: Option<f64>) -> String {
    v.map(|v| format!("{:.2}", v)).unwrap_or_else(|| "n/a".to_string())
}
