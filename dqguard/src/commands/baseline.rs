// dqguard/src/commands/baseline.rs
//
// USE CASE: Inspect the rolling baseline history.

use comfy_table::{Table, presets::UTF8_FULL};
use std::path::PathBuf;

use dqguard_core::infrastructure::store::BaselineStore;

use super::load_config;

pub fn execute(project_dir: PathBuf, defaults: bool) -> anyhow::Result<()> {
    let config = load_config(&project_dir, defaults)?;
    let store = BaselineStore::new(
        config.resolve(&project_dir, &config.baseline_path),
        config.quality.history_window,
    );
    let history = store.load();

    let window = match store.window() {
        w if w <= 0 => "unbounded".to_string(),
        w => w.to_string(),
    };
    println!(
        "📈 Baseline: {} ({} snapshots, window {})",
        store.path().display(),
        history.len(),
        window
    );
    if history.is_empty() {
        println!("   No snapshot yet. Run 'dqguard run' first.");
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["#", "Captured at", "Means", "Categories"]);
    for (i, snap) in history.snapshots().iter().enumerate() {
        let captured = snap
            .captured_at
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| "-".to_string());
        let means = snap
            .means
            .iter()
            .map(|(col, m)| match m {
                Some(m) => format!("{}={:.2}", col, m),
                None => format!("{}=n/a", col),
            })
            .collect::<Vec<_>>()
            .join(", ");
        let categories = snap
            .value_counts
            .iter()
            .map(|(col, counts)| format!("{}:{}", col, counts.len()))
            .collect::<Vec<_>>()
            .join(", ");
        table.add_row(vec![i.to_string(), captured, means, categories]);
    }
    println!("{table}");
    Ok(())
}
