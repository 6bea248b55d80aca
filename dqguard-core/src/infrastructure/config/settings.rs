// dqguard-core/src/infrastructure/config/settings.rs

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use validator::{Validate, ValidationError};

use crate::domain::policy::Expression;
use crate::domain::quality::{DEFAULT_HISTORY_WINDOW, DEFAULT_IQR_MULTIPLIER, WatchedCategory};

#[derive(Debug, Deserialize, Serialize, Clone, Validate)]
pub struct ProjectConfig {
    #[validate(length(min = 1, message = "Project name cannot be empty"))]
    pub name: String,
    #[serde(default = "default_version")]
    pub version: String,

    #[serde(rename = "rules-path", default = "default_rules_path")]
    pub rules_path: String,

    #[serde(rename = "baseline-path", default = "default_baseline_path")]
    pub baseline_path: String,

    #[serde(rename = "reports-path", default = "default_reports_path")]
    pub reports_path: String,

    #[serde(rename = "output-path", default = "default_output_path")]
    pub output_path: String,

    #[validate(nested)]
    #[serde(default)]
    pub quality: QualityConfig,

    #[validate(nested)]
    #[serde(default)]
    pub suggestions: SuggestionConfig,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: "dqguard".to_string(),
            version: default_version(),
            rules_path: default_rules_path(),
            baseline_path: default_baseline_path(),
            reports_path: default_reports_path(),
            output_path: default_output_path(),
            quality: QualityConfig::default(),
            suggestions: SuggestionConfig::default(),
        }
    }
}

impl ProjectConfig {
    /// Paths in the config are relative to the project directory unless absolute.
    pub fn resolve(&self, project_dir: &Path, relative: &str) -> PathBuf {
        let p = Path::new(relative);
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            project_dir.join(p)
        }
    }
}

/// Statistics tracked for every run.
#[derive(Debug, Deserialize, Serialize, Clone, Validate)]
pub struct QualityConfig {
    /// Snapshots kept in the baseline store; `<= 0` keeps all of them.
    #[serde(default = "default_history_window")]
    pub history_window: i64,

    #[validate(range(min = 0.0, message = "Outlier multiplier must be >= 0"))]
    #[serde(default = "default_outlier_multiplier")]
    pub outlier_multiplier: f64,

    #[serde(default = "default_amount_columns")]
    pub outlier_columns: Vec<String>,

    #[serde(default = "default_amount_columns")]
    pub mean_columns: Vec<String>,

    #[serde(default = "default_category_columns")]
    pub category_columns: Vec<String>,

    #[serde(default = "default_watch")]
    pub watch: Vec<WatchedCategory>,

    /// Coerced to numbers at ingestion (decimal comma accepted).
    #[serde(default = "default_numeric_columns")]
    pub numeric_columns: Vec<String>,

    #[validate(nested)]
    #[serde(default = "default_derived")]
    pub derived: Vec<DerivedColumn>,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            history_window: default_history_window(),
            outlier_multiplier: default_outlier_multiplier(),
            outlier_columns: default_amount_columns(),
            mean_columns: default_amount_columns(),
            category_columns: default_category_columns(),
            watch: default_watch(),
            numeric_columns: default_numeric_columns(),
            derived: default_derived(),
        }
    }
}

/// Column filled from an arithmetic expression when the input lacks it.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Validate)]
pub struct DerivedColumn {
    #[validate(length(min = 1, message = "Derived column needs a name"))]
    pub column: String,
    #[validate(custom(function = "validate_expression"))]
    pub expr: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, Validate)]
pub struct SuggestionConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub auto_accept: bool,
    #[validate(range(min = 0.0, max = 1.0, message = "Confidence is a ratio in [0, 1]"))]
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f64,
    /// Upper bound on suggestions carried in one report.
    #[serde(default = "default_keep")]
    pub keep: usize,
}

impl Default for SuggestionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            auto_accept: false,
            min_confidence: default_min_confidence(),
            keep: default_keep(),
        }
    }
}

fn validate_expression(expr: &str) -> Result<(), ValidationError> {
    Expression::parse(expr)
        .map(|_| ())
        .map_err(|_| ValidationError::new("invalid_expression"))
}

fn default_version() -> String {
    "0.1.0".to_string()
}
fn default_rules_path() -> String {
    "dq/rules.json".to_string()
}
fn default_baseline_path() -> String {
    "dq/baselines.json".to_string()
}
fn default_reports_path() -> String {
    "dq/run_reports".to_string()
}
fn default_output_path() -> String {
    "data/curated.json".to_string()
}
fn default_history_window() -> i64 {
    DEFAULT_HISTORY_WINDOW
}
fn default_outlier_multiplier() -> f64 {
    DEFAULT_IQR_MULTIPLIER
}
fn default_amount_columns() -> Vec<String> {
    vec!["total_amount".to_string()]
}
fn default_category_columns() -> Vec<String> {
    vec!["status".to_string()]
}
fn default_watch() -> Vec<WatchedCategory> {
    vec![WatchedCategory::new("status", "open")]
}
fn default_numeric_columns() -> Vec<String> {
    ["quantity", "unit_price", "total_amount"]
        .into_iter()
        .map(String::from)
        .collect()
}
fn default_derived() -> Vec<DerivedColumn> {
    vec![DerivedColumn {
        column: "total_amount".to_string(),
        expr: "quantity * unit_price".to_string(),
    }]
}
fn default_true() -> bool {
    true
}
fn default_min_confidence() -> f64 {
    0.85
}
fn default_keep() -> usize {
    50
}
