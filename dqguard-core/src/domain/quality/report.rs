// dqguard-core/src/domain/quality/report.rs

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::drift::Drift;
use super::outliers::OutlierSummary;
use crate::domain::policy::{Rule, RuleDiagnostic, TransformAudit};

/// Everything one run produced, as persisted in `run_<ts>.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_file: Option<String>,
    #[serde(default)]
    pub rows: usize,
    #[serde(default)]
    pub anomaly_outliers: BTreeMap<String, OutlierSummary>,
    #[serde(default)]
    pub drift: Drift,
    #[serde(default)]
    pub transform_audit: TransformAudit,
    #[serde(default)]
    pub policy_diagnostics: Vec<RuleDiagnostic>,
    #[serde(default)]
    pub suggestions: Vec<Suggestion>,
    /// Number of suggestions appended to the rule file by this run.
    #[serde(default)]
    pub auto_applied: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionSource {
    Heuristic,
    Llm,
}

/// A proposed rule with a confidence score in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub id: String,
    pub title: String,
    pub rule: Rule,
    pub reason: String,
    pub confidence: f64,
    pub source: SuggestionSource,
}
