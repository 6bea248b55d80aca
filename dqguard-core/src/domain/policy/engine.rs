// dqguard-core/src/domain/policy/engine.rs

use super::action::{Action, ActionKind, ImputeSource};
use super::audit::{DiagnosticKind, RuleDiagnostic, TransformAudit};
use super::rule::{CompiledRule, RuleSet};
use crate::domain::dataset::{
    ColumnKind, Dataset, IMPUTED_FLAG, MISSING_REASON, RowMask, Value,
};
use crate::domain::error::DomainError;

/// Result of one policy pass over a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyOutcome {
    pub dataset: Dataset,
    pub audit: TransformAudit,
    pub diagnostics: Vec<RuleDiagnostic>,
}

/// Applies `rules` in order. Later rules see the values written by earlier
/// ones. A rule that cannot be used is skipped and reported in
/// `diagnostics`; it never aborts the pass.
pub fn apply_policies(mut dataset: Dataset, rules: &RuleSet) -> PolicyOutcome {
    let mut audit = TransformAudit::default();
    let mut diagnostics = Vec::new();

    for (index, entry) in rules.entries() {
        let compiled = match entry {
            Ok(rule) => rule.compile(),
            Err(reason) => {
                diagnostics.push(skipped(index, &reason));
                continue;
            }
        };

        for fragment in compiled.condition.unrecognized() {
            diagnostics.push(RuleDiagnostic {
                rule_index: index,
                kind: DiagnosticKind::ClauseDropped,
                message: format!("Ignored condition fragment '{}'", fragment),
            });
        }

        match apply_rule(&mut dataset, &compiled) {
            Ok((kind, column, rows)) => audit.record(kind, &column, rows),
            Err(reason) => diagnostics.push(skipped(index, &reason)),
        }
    }

    PolicyOutcome {
        dataset,
        audit,
        diagnostics,
    }
}

fn skipped(index: usize, reason: &DomainError) -> RuleDiagnostic {
    RuleDiagnostic {
        rule_index: index,
        kind: DiagnosticKind::RuleSkipped,
        message: reason.to_string(),
    }
}

/// Runs one rule; returns what to add to the audit.
fn apply_rule(
    dataset: &mut Dataset,
    rule: &CompiledRule,
) -> Result<(ActionKind, String, usize), DomainError> {
    let (kind, column) = match (&rule.action, rule.action.kind(), rule.action.target()) {
        (Action::Unrecognized { reason, .. }, _, _) => return Err(reason.clone()),
        (_, Some(kind), Some(column)) => (kind, column.to_string()),
        (action, _, _) => return Err(DomainError::UnsupportedAction(action.reason())),
    };

    let mask = rule.condition.evaluate(dataset);

    match &rule.action {
        Action::Assign { value, .. }
        | Action::Impute {
            source: ImputeSource::Literal(value),
            ..
        } => {
            dataset.ensure_column(&column, ColumnKind::for_value(value));
            dataset.write_masked(&column, &mask, |_| value.clone());
        }
        Action::Impute {
            source: ImputeSource::Mean(source),
            ..
        } => {
            let mean = Value::from_option(dataset.mean(source));
            dataset.ensure_column(&column, ColumnKind::Numeric);
            dataset.write_masked(&column, &mask, |_| mean.clone());
        }
        Action::Compute { expr, .. } => {
            let computed = expr.evaluate(dataset);
            dataset.ensure_column(&column, ColumnKind::Numeric);
            dataset.write_masked(&column, &mask, |row| Value::from_option(computed.at(row)));
        }
        Action::Unrecognized { reason, .. } => return Err(reason.clone()),
    }

    mark_provenance(dataset, &mask, &rule.action.reason());
    Ok((kind, column, mask.count()))
}

/// `imputed_flag`/`missing_reason` are created on the first applied action
/// and written for every touched row.
fn mark_provenance(dataset: &mut Dataset, mask: &RowMask, reason: &str) {
    dataset.ensure_column_filled(IMPUTED_FLAG, ColumnKind::Boolean, Value::Bool(false));
    dataset.ensure_column_filled(MISSING_REASON, ColumnKind::Text, Value::text(""));
    if mask.any() {
        dataset.write_masked(IMPUTED_FLAG, mask, |_| Value::Bool(true));
        dataset.write_masked(MISSING_REASON, mask, |_| Value::text(reason));
    }
}
