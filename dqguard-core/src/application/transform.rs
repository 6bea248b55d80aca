// dqguard-core/src/application/transform.rs

use tracing::{debug, info, instrument, warn};

use crate::domain::dataset::{Column, ColumnKind, Dataset, Value};
use crate::domain::policy::{DiagnosticKind, Expression, PolicyOutcome, RuleSet, apply_policies};
use crate::infrastructure::config::QualityConfig;

/// Ingestion clean-up before any rule runs: configured numeric columns are
/// coerced (decimal comma accepted), then derived columns the batch lacks are
/// computed for every row.
#[instrument(skip_all, fields(rows = dataset.len()))]
pub fn prepare_batch(dataset: &mut Dataset, config: &QualityConfig) {
    for name in &config.numeric_columns {
        if dataset.contains(name) {
            dataset.coerce_numeric(name, true);
        }
    }

    for derived in &config.derived {
        if dataset.contains(&derived.column) {
            continue;
        }
        let expr = match Expression::parse(&derived.expr) {
            Ok(expr) => expr,
            Err(e) => {
                warn!(column = %derived.column, error = %e, "Derived column skipped");
                continue;
            }
        };
        if let Some(missing) = expr.columns().into_iter().find(|c| !dataset.contains(c)) {
            debug!(column = %derived.column, missing, "Derived column inputs absent");
            continue;
        }
        let computed = expr.evaluate(dataset);
        let values = (0..dataset.len())
            .map(|row| Value::from_option(computed.at(row)))
            .collect();
        if dataset
            .insert(derived.column.clone(), Column::new(ColumnKind::Numeric, values))
            .is_ok()
        {
            info!(column = %derived.column, expr = %derived.expr, "Derived column added");
        }
    }
}

/// Runs the rule set and surfaces every absorbed degradation in the logs.
#[instrument(skip_all, fields(rows = dataset.len(), rules = rules.len()))]
pub fn transform(dataset: Dataset, rules: &RuleSet) -> PolicyOutcome {
    let outcome = apply_policies(dataset, rules);

    for d in &outcome.diagnostics {
        match d.kind {
            DiagnosticKind::RuleSkipped => {
                warn!(rule = d.rule_index, reason = %d.message, "Rule skipped")
            }
            DiagnosticKind::ClauseDropped => {
                warn!(rule = d.rule_index, reason = %d.message, "Condition fragment dropped")
            }
        }
    }
    for (kind, column, rows) in outcome.audit.iter() {
        debug!(%kind, column, rows, "Policy applied");
    }
    outcome
}
