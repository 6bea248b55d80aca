// dqguard/src/commands/rules.rs
//
// USE CASE: Show how the engine reads the rule file.

use comfy_table::{Table, presets::UTF8_FULL};
use std::path::PathBuf;

use dqguard_core::domain::policy::{Action, RuleSet};
use dqguard_core::infrastructure::store::RuleStore;

use super::load_config;

pub fn execute(project_dir: PathBuf, defaults: bool) -> anyhow::Result<()> {
    let config = load_config(&project_dir, defaults)?;
    let store = RuleStore::new(config.resolve(&project_dir, &config.rules_path));
    let rules = store.load();

    println!("📜 Rule set: {} ({} entries)", store.path().display(), rules.len());
    println!("{}", render(&rules));
    Ok(())
}

fn render(rules: &RuleSet) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["#", "If", "Then", "Parsed as"]);

    for (index, entry) in rules.entries() {
        let row = match entry {
            Ok(rule) => {
                let compiled = rule.compile();
                let mut parsed = match &compiled.action {
                    Action::Unrecognized { reason, .. } => format!("skipped: {}", reason),
                    action => action.reason(),
                };
                let dropped = compiled.condition.unrecognized();
                if !dropped.is_empty() {
                    parsed.push_str(&format!(" (ignored: {})", dropped.join(", ")));
                }
                vec![index.to_string(), rule.condition.clone(), rule.action.clone(), parsed]
            }
            Err(reason) => vec![index.to_string(), String::new(), String::new(), format!("skipped: {}", reason)],
        };
        table.add_row(row);
    }
    table
}
