// dqguard-core/src/application/pipeline.rs

use chrono::Utc;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

use crate::application::report::build_and_record;
use crate::application::suggestions::auto_accept;
use crate::application::transform::{prepare_batch, transform};
use crate::domain::dataset::Dataset;
use crate::domain::policy::Rule;
use crate::domain::quality::QualityReport;
use crate::error::GuardError;
use crate::infrastructure::config::ProjectConfig;
use crate::infrastructure::fs::write_json_atomic;
use crate::infrastructure::store::{BaselineStore, ReportStore, RuleStore};
use crate::ports::{DatasetReader, RuleSuggester};

#[derive(Debug, Serialize)]
pub struct RunResult {
    pub report: QualityReport,
    pub report_path: PathBuf,
    pub output_path: PathBuf,
    pub baseline_len: usize,
    pub accepted_rules: Vec<Rule>,
}

/// One run end to end:
/// read -> prepare -> policies -> report + baseline -> curated output ->
/// suggestions -> run report.
///
/// Only the input and storage layers can fail the run; rule problems end up
/// in `report.policy_diagnostics`.
#[instrument(skip(config, reader, suggester), fields(project = %config.name))]
pub async fn run_pipeline(
    project_dir: &Path,
    config: &ProjectConfig,
    input: &Path,
    reader: &dyn DatasetReader,
    suggester: Option<&dyn RuleSuggester>,
) -> Result<RunResult, GuardError> {
    let rule_store = RuleStore::new(config.resolve(project_dir, &config.rules_path));
    let baseline_store = BaselineStore::new(
        config.resolve(project_dir, &config.baseline_path),
        config.quality.history_window,
    );
    let report_store = ReportStore::new(config.resolve(project_dir, &config.reports_path));
    let output_path = config.resolve(project_dir, &config.output_path);

    // 1. INGESTION
    let mut rules = rule_store.load();
    let mut dataset = reader.read(input)?;
    info!(rows = dataset.len(), engine = reader.engine_name(), "Batch ingested");
    prepare_batch(&mut dataset, &config.quality);

    // 2. POLICIES
    let outcome = transform(dataset, &rules);
    let dataset = outcome.dataset;

    // 3. QUALITY REPORT (baseline lu puis mis à jour sous verrou)
    let (mut report, baseline_len) = build_and_record(&dataset, &baseline_store, &config.quality)?;
    report.source_file = Some(input.display().to_string());
    report.output_file = Some(output_path.display().to_string());
    report.transform_audit = outcome.audit;
    report.policy_diagnostics = outcome.diagnostics;

    // 4. CURATED OUTPUT
    write_curated(&output_path, &dataset)?;

    // 5. SUGGESTIONS
    let mut accepted_rules = Vec::new();
    if config.suggestions.enabled
        && let Some(suggester) = suggester
    {
        match suggester.suggest(&dataset, &report, &rules).await {
            Ok(mut suggestions) => {
                suggestions.truncate(config.suggestions.keep);
                if config.suggestions.auto_accept {
                    accepted_rules =
                        auto_accept(&mut rules, &suggestions, config.suggestions.min_confidence);
                    if !accepted_rules.is_empty() {
                        rule_store.save(&rules)?;
                    }
                }
                report.suggestions = suggestions;
                report.auto_applied = accepted_rules.len();
            }
            Err(e) => warn!(error = %e, "Suggestion generator failed, report has none"),
        }
    }

    // 6. RUN REPORT
    let report_path = report_store.write(&mut report, Utc::now())?;
    info!(report = ?report_path, "Run complete");

    Ok(RunResult {
        report,
        report_path,
        output_path,
        baseline_len,
        accepted_rules,
    })
}

fn write_curated(path: &Path, dataset: &Dataset) -> Result<(), GuardError> {
    write_json_atomic(path, &dataset.to_records())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::dataset::{Column, IMPUTED_FLAG};
    use crate::domain::policy::{ActionKind, RuleSet};
    use crate::domain::quality::{Suggestion, SuggestionSource};
    use crate::infrastructure::error::InfrastructureError;
    use anyhow::Result;
    use async_trait::async_trait;
    use std::fs;
    use tempfile::tempdir;

    struct FixtureReader(Dataset);

    impl DatasetReader for FixtureReader {
        fn read(&self, _path: &Path) -> Result<Dataset, GuardError> {
            Ok(self.0.clone())
        }
        fn engine_name(&self) -> &str {
            "fixture"
        }
    }

    struct FailingReader;

    impl DatasetReader for FailingReader {
        fn read(&self, path: &Path) -> Result<Dataset, GuardError> {
            Err(InfrastructureError::ConfigNotFound(path.display().to_string()).into())
        }
        fn engine_name(&self) -> &str {
            "failing"
        }
    }

    struct FixedSuggester(Vec<Suggestion>);

    #[async_trait]
    impl RuleSuggester for FixedSuggester {
        async fn suggest(
            &self,
            _dataset: &Dataset,
            _report: &QualityReport,
            _existing: &RuleSet,
        ) -> Result<Vec<Suggestion>, GuardError> {
            Ok(self.0.clone())
        }
    }

    fn orders() -> Result<Dataset> {
        Ok(Dataset::from_columns([
            ("status", Column::text([None, Some("open"), None])),
            ("quantity", Column::text([Some("1"), None, Some("3")])),
            ("unit_price", Column::text([Some("10"), Some("20"), None])),
        ])?)
    }

    fn write_rules(dir: &Path, rules: &[Rule]) -> Result<()> {
        RuleStore::new(dir.join("dq").join("rules.json")).save(&RuleSet::new(rules.to_vec()))?;
        Ok(())
    }

    #[tokio::test]
    async fn test_full_run_writes_all_artifacts() -> Result<()> {
        let dir = tempdir()?;
        write_rules(
            dir.path(),
            &[
                Rule::new("status IS NULL", "assign status = 'unknown'"),
                Rule::new("quantity IS NULL", "impute quantity = 1"),
            ],
        )?;
        let config = ProjectConfig::default();
        let reader = FixtureReader(orders()?);

        let res = run_pipeline(dir.path(), &config, Path::new("orders.csv"), &reader, None).await?;

        assert_eq!(res.report.rows, 3);
        assert_eq!(res.report.transform_audit.count(ActionKind::Assign, "status"), 2);
        assert_eq!(res.report.transform_audit.count(ActionKind::Impute, "quantity"), 1);
        assert!(res.report.drift.is_empty());
        assert_eq!(res.baseline_len, 1);
        assert!(res.report_path.exists());
        assert!(dir.path().join("dq").join("baselines.json").exists());

        let curated: Vec<serde_json::Value> =
            serde_json::from_str(&fs::read_to_string(&res.output_path)?)?;
        assert_eq!(curated.len(), 3);
        assert_eq!(curated[0]["status"], "unknown");
        assert_eq!(curated[0]["total_amount"], 10.0);
        assert_eq!(curated[0][IMPUTED_FLAG], true);
        assert_eq!(curated[1]["quantity"], 1.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_second_run_reports_drift() -> Result<()> {
        let dir = tempdir()?;
        let config = ProjectConfig::default();

        run_pipeline(dir.path(), &config, Path::new("a.csv"), &FixtureReader(orders()?), None).await?;

        let mut bigger = orders()?;
        bigger.insert("total_amount", Column::numeric([Some(100.0), Some(100.0), Some(100.0)]))?;
        let res =
            run_pipeline(dir.path(), &config, Path::new("b.csv"), &FixtureReader(bigger), None).await?;

        // first run: only row 0 has both quantity and price, total 10
        assert_eq!(res.report.drift.mean_delta["total_amount"], Some(90.0));
        assert_eq!(res.baseline_len, 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_auto_accept_updates_rule_file() -> Result<()> {
        let dir = tempdir()?;
        let mut config = ProjectConfig::default();
        config.suggestions.auto_accept = true;

        let rule = Rule::new("status IS NULL", "assign dq_flag = 'no_status'");
        let suggester = FixedSuggester(vec![Suggestion {
            id: "s1".into(),
            title: "Missing status".into(),
            rule: rule.clone(),
            reason: "2 rows".into(),
            confidence: 0.9,
            source: SuggestionSource::Heuristic,
        }]);

        let res = run_pipeline(
            dir.path(),
            &config,
            Path::new("orders.csv"),
            &FixtureReader(orders()?),
            Some(&suggester),
        )
        .await?;

        assert_eq!(res.accepted_rules, vec![rule.clone()]);
        assert_eq!(res.report.auto_applied, 1);
        let stored = RuleStore::new(dir.path().join("dq").join("rules.json")).load();
        assert!(stored.contains(&rule));
        Ok(())
    }

    #[tokio::test]
    async fn test_input_failure_fails_the_run() -> Result<()> {
        let dir = tempdir()?;
        let res = run_pipeline(
            dir.path(),
            &ProjectConfig::default(),
            Path::new("missing.csv"),
            &FailingReader,
            None,
        )
        .await;
        assert!(res.is_err());
        assert!(!dir.path().join("dq").join("baselines.json").exists());
        Ok(())
    }

    #[tokio::test]
    async fn test_curated_rows_keep_column_order() -> Result<()> {
        let dir = tempdir()?;
        let res = run_pipeline(
            dir.path(),
            &ProjectConfig::default(),
            Path::new("orders.csv"),
            &FixtureReader(orders()?),
            None,
        )
        .await?;
        let raw = fs::read_to_string(&res.output_path)?;
        let status = raw.find("\"status\"").unwrap_or(usize::MAX);
        let total = raw.find("\"total_amount\"").unwrap_or(0);
        assert!(status < total);
        Ok(())
    }
}
