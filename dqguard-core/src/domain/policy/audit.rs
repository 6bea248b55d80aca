// dqguard-core/src/domain/policy/audit.rs

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::action::ActionKind;

/// Rows affected per action kind and target column, summed over one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformAudit {
    #[serde(default)]
    pub assign: BTreeMap<String, usize>,
    #[serde(default)]
    pub impute: BTreeMap<String, usize>,
    #[serde(default)]
    pub compute: BTreeMap<String, usize>,
}

impl TransformAudit {
    pub fn record(&mut self, kind: ActionKind, column: &str, rows: usize) {
        *self.bucket_mut(kind).entry(column.to_string()).or_insert(0) += rows;
    }

    pub fn count(&self, kind: ActionKind, column: &str) -> usize {
        self.bucket(kind).get(column).copied().unwrap_or(0)
    }

    pub fn bucket(&self, kind: ActionKind) -> &BTreeMap<String, usize> {
        match kind {
            ActionKind::Assign => &self.assign,
            ActionKind::Impute => &self.impute,
            ActionKind::Compute => &self.compute,
        }
    }

    fn bucket_mut(&mut self, kind: ActionKind) -> &mut BTreeMap<String, usize> {
        match kind {
            ActionKind::Assign => &mut self.assign,
            ActionKind::Impute => &mut self.impute,
            ActionKind::Compute => &mut self.compute,
        }
    }

    /// `(kind, column, rows)` triples, for display.
    pub fn iter(&self) -> impl Iterator<Item = (ActionKind, &str, usize)> + '_ {
        [ActionKind::Assign, ActionKind::Impute, ActionKind::Compute]
            .into_iter()
            .flat_map(move |kind| {
                self.bucket(kind)
                    .iter()
                    .map(move |(col, n)| (kind, col.as_str(), *n))
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// The whole rule had no effect.
    RuleSkipped,
    /// One condition fragment was ignored; the rule still ran.
    ClauseDropped,
}

/// Side channel for the degradations the engine absorbs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleDiagnostic {
    pub rule_index: usize,
    pub kind: DiagnosticKind,
    pub message: String,
}
