// dqguard-core/src/application/report.rs

use std::collections::BTreeMap;
use tracing::{info, instrument};

use crate::domain::dataset::Dataset;
use crate::domain::quality::{
    BaselineSnapshot, Drift, OutlierSummary, QualityReport, iqr_outliers,
};
use crate::infrastructure::config::QualityConfig;
use crate::infrastructure::error::InfrastructureError;
use crate::infrastructure::store::BaselineStore;

/// Outliers and drift of `dataset` against the run before it. Returns the
/// report and the snapshot that describes this run.
#[instrument(skip_all, fields(rows = dataset.len(), has_previous = previous.is_some()))]
pub fn build_report(
    dataset: &Dataset,
    previous: Option<&BaselineSnapshot>,
    config: &QualityConfig,
) -> (QualityReport, BaselineSnapshot) {
    let current = capture(dataset, config);
    let report = assemble(dataset, &current, previous, config);
    (report, current)
}

/// Same as [`build_report`], with the predecessor taken from (and this run
/// appended to) the baseline store in one locked step.
#[instrument(skip_all, fields(rows = dataset.len()))]
pub fn build_and_record(
    dataset: &Dataset,
    store: &BaselineStore,
    config: &QualityConfig,
) -> Result<(QualityReport, usize), InfrastructureError> {
    let current = capture(dataset, config);
    let (previous, history) = store.record(current.clone())?;
    let report = assemble(dataset, &current, previous.as_ref(), config);
    Ok((report, history.len()))
}

fn capture(dataset: &Dataset, config: &QualityConfig) -> BaselineSnapshot {
    BaselineSnapshot::capture(dataset, &config.category_columns, &config.mean_columns)
}

fn assemble(
    dataset: &Dataset,
    current: &BaselineSnapshot,
    previous: Option<&BaselineSnapshot>,
    config: &QualityConfig,
) -> QualityReport {
    let mut anomaly_outliers: BTreeMap<String, OutlierSummary> = BTreeMap::new();
    for column in &config.outlier_columns {
        // Absent column: nothing to measure, but still reported
        let summary = if dataset.contains(column) {
            iqr_outliers(&dataset.numbers(column), config.outlier_multiplier)
        } else {
            OutlierSummary::empty()
        };
        info!(column = %column, count = summary.count, "Outliers measured");
        anomaly_outliers.insert(column.clone(), summary);
    }

    let drift = match previous {
        Some(prev) => Drift::compute(current, prev, &config.watch),
        None => Drift::default(),
    };

    QualityReport {
        rows: dataset.len(),
        anomaly_outliers,
        drift,
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::dataset::Column;
    use anyhow::Result;
    use tempfile::tempdir;

    fn batch(amounts: &[f64], statuses: &[&str]) -> Result<Dataset> {
        Ok(Dataset::from_columns([
            ("total_amount", Column::numeric(amounts.iter().copied().map(Some))),
            ("status", Column::text(statuses.iter().copied().map(Some))),
        ])?)
    }

    #[test]
    fn test_first_run_has_empty_drift() -> Result<()> {
        let ds = batch(&[1.0, 2.0, 3.0, 4.0, 5.0, 100.0], &["open"; 6])?;
        let (report, snapshot) = build_report(&ds, None, &QualityConfig::default());

        assert!(report.drift.is_empty());
        assert_eq!(report.rows, 6);
        assert_eq!(report.anomaly_outliers["total_amount"].count, 1);
        assert_eq!(snapshot.value_counts["status"]["open"], 6);
        Ok(())
    }

    #[test]
    fn test_drift_against_previous_snapshot() -> Result<()> {
        let config = QualityConfig::default();
        let (_, previous) = build_report(&batch(&[5.0, 9.0], &["open", "closed"])?, None, &config);
        let (report, _) = build_report(
            &batch(&[10.0, 10.0], &["open", "open"])?,
            Some(&previous),
            &config,
        );

        assert_eq!(report.drift.mean_delta["total_amount"], Some(3.0));
        assert_eq!(report.drift.category_share_delta["status"]["open"], 0.5);
        Ok(())
    }

    #[test]
    fn test_absent_outlier_column_reports_empty_summary() -> Result<()> {
        let ds = Dataset::from_columns([("status", Column::text([Some("open")]))])?;
        let (report, snapshot) = build_report(&ds, None, &QualityConfig::default());
        assert_eq!(report.anomaly_outliers["total_amount"], OutlierSummary::empty());
        let json = serde_json::to_value(&report)?;
        assert_eq!(
            json["anomaly_outliers"]["total_amount"],
            serde_json::json!({"count": 0, "bounds": [null, null]})
        );
        assert_eq!(snapshot.means["total_amount"], None);
        Ok(())
    }

    #[test]
    fn test_build_and_record_uses_store_predecessor() -> Result<()> {
        let dir = tempdir()?;
        let store = BaselineStore::new(dir.path().join("baselines.json"), 50);
        let config = QualityConfig::default();

        let (first, len) = build_and_record(&batch(&[7.0], &["open"])?, &store, &config)?;
        assert!(first.drift.is_empty());
        assert_eq!(len, 1);

        let (second, len) = build_and_record(&batch(&[10.0], &["closed"])?, &store, &config)?;
        assert_eq!(second.drift.mean_delta["total_amount"], Some(3.0));
        assert_eq!(second.drift.category_share_delta["status"]["open"], 1.0);
        assert_eq!(len, 2);
        Ok(())
    }

    #[test]
    fn test_corrupt_store_degrades_to_no_drift() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("baselines.json");
        std::fs::write(&path, "garbage")?;
        let store = BaselineStore::new(&path, 50);

        let (report, len) =
            build_and_record(&batch(&[1.0], &["open"])?, &store, &QualityConfig::default())?;
        assert!(report.drift.is_empty());
        assert_eq!(len, 1);
        Ok(())
    }
}
