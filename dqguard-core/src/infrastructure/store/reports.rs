// dqguard-core/src/infrastructure/store/reports.rs

use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

use crate::domain::quality::QualityReport;
use crate::infrastructure::error::InfrastructureError;
use crate::infrastructure::fs::write_json_atomic;

/// Directory of `run_<yyyymmddTHHMMSSZ>.json` files.
pub struct ReportStore {
    dir: PathBuf,
}

impl ReportStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes the report and fills in its `report_name`. Two runs within the
    /// same second get a numeric suffix.
    #[instrument(skip(self, report), fields(dir = ?self.dir))]
    pub fn write(
        &self,
        report: &mut QualityReport,
        at: DateTime<Utc>,
    ) -> Result<PathBuf, InfrastructureError> {
        fs::create_dir_all(&self.dir)?;
        let stem = format!("run_{}", at.format("%Y%m%dT%H%M%SZ"));

        let mut name = format!("{stem}.json");
        let mut n = 1;
        while self.dir.join(&name).exists() {
            name = format!("{stem}_{n}.json");
            n += 1;
        }

        report.report_name = Some(name.clone());
        let path = self.dir.join(&name);
        write_json_atomic(&path, report)?;
        info!(report = %name, "Run report written");
        Ok(path)
    }

    /// Report files, oldest first.
    pub fn list(&self) -> Result<Vec<PathBuf>, InfrastructureError> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }
        let mut reports = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            let is_report = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with("run_") && n.ends_with(".json"));
            if is_report {
                reports.push(path);
            }
        }
        reports.sort();
        Ok(reports)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use chrono::TimeZone;
    use tempfile::tempdir;

    #[test]
    fn test_write_names_report_after_timestamp() -> Result<()> {
        let dir = tempdir()?;
        let store = ReportStore::new(dir.path().join("run_reports"));
        let at = Utc
            .with_ymd_and_hms(2024, 3, 9, 14, 5, 7)
            .single()
            .ok_or_else(|| anyhow::anyhow!("bad timestamp"))?;

        let mut report = QualityReport {
            rows: 3,
            ..Default::default()
        };
        let first = store.write(&mut report, at)?;
        assert!(first.ends_with("run_20240309T140507Z.json"));
        assert_eq!(report.report_name.as_deref(), Some("run_20240309T140507Z.json"));

        let second = store.write(&mut report, at)?;
        assert!(second.ends_with("run_20240309T140507Z_1.json"));

        let stored: QualityReport = serde_json::from_str(&fs::read_to_string(&first)?)?;
        assert_eq!(stored.rows, 3);
        assert_eq!(store.list()?.len(), 2);
        Ok(())
    }
}
