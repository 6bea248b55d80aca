// dqguard-core/src/infrastructure/store/baseline.rs

use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};
use tracing::{debug, info, instrument, warn};

use crate::domain::quality::{BaselineHistory, BaselineSnapshot};
use crate::infrastructure::error::InfrastructureError;
use crate::infrastructure::fs::write_json_atomic;

fn re_non_finite() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"([:\[,]\s*)-?(?:NaN|Infinity)\b")
            .unwrap_or_else(|_| Regex::new("$^").unwrap_or_else(|_| unreachable!()))
    })
}

/// Rolling history of run snapshots, persisted as `{"history": [...]}`.
pub struct BaselineStore {
    path: PathBuf,
    window: i64,
    // load -> append -> save must not interleave between runs of this process
    lock: Mutex<()>,
}

impl BaselineStore {
    pub fn new(path: impl Into<PathBuf>, window: i64) -> Self {
        Self {
            path: path.into(),
            window,
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn window(&self) -> i64 {
        self.window
    }

    /// Missing or unreadable store reads as an empty history.
    #[instrument(skip(self), fields(path = ?self.path))]
    pub fn load(&self) -> BaselineHistory {
        let content = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) => {
                debug!(error = %e, "No baseline history yet");
                return BaselineHistory::default();
            }
        };
        let parsed: Result<BaselineHistory, serde_json::Error> = serde_json::from_str(&content).or_else(|e| {
            // Python writers emit bare NaN/Infinity for empty means
            let cleaned = re_non_finite().replace_all(&content, "${1}null");
            if cleaned == content {
                return Err(e);
            }
            debug!("Baseline history holds non-finite literals, reading them as null");
            serde_json::from_str(&cleaned)
        });
        match parsed {
            Ok(history) => history,
            Err(e) => {
                warn!(error = %e, "Corrupt baseline history, starting from scratch");
                BaselineHistory::default()
            }
        }
    }

    /// Pure: returns the history with `snapshot` appended and trimmed to the window.
    pub fn append(&self, mut history: BaselineHistory, snapshot: BaselineSnapshot) -> BaselineHistory {
        history.push(snapshot, self.window);
        history
    }

    pub fn save(&self, history: &BaselineHistory) -> Result<(), InfrastructureError> {
        write_json_atomic(&self.path, history)
    }

    /// Appends one run. Returns the snapshot that preceded it (the drift
    /// reference) and the stored history.
    #[instrument(skip(self, snapshot), fields(path = ?self.path))]
    pub fn record(
        &self,
        snapshot: BaselineSnapshot,
    ) -> Result<(Option<BaselineSnapshot>, BaselineHistory), InfrastructureError> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| InfrastructureError::Io(std::io::Error::other("Baseline lock poisoned")))?;

        let history = self.load();
        let previous = history.latest().cloned();
        let history = self.append(history, snapshot);
        self.save(&history)?;
        info!(snapshots = history.len(), "Baseline history updated");
        Ok((previous, history))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::collections::BTreeMap;
    use std::sync::Arc;
    use tempfile::tempdir;

    fn snap(mean: f64) -> BaselineSnapshot {
        BaselineSnapshot {
            means: BTreeMap::from([("total_amount".to_string(), Some(mean))]),
            ..Default::default()
        }
    }

    #[test]
    fn test_missing_and_corrupt_store_load_empty() -> Result<()> {
        let dir = tempdir()?;
        let store = BaselineStore::new(dir.path().join("baselines.json"), 50);
        assert!(store.load().is_empty());

        fs::write(store.path(), "{ not json")?;
        assert!(store.load().is_empty());
        Ok(())
    }

    #[test]
    fn test_record_returns_predecessor() -> Result<()> {
        let dir = tempdir()?;
        let store = BaselineStore::new(dir.path().join("dq").join("baselines.json"), 50);

        let (prev, _) = store.record(snap(10.0))?;
        assert!(prev.is_none());

        let (prev, history) = store.record(snap(12.0))?;
        assert_eq!(prev, Some(snap(10.0)));
        assert_eq!(history.len(), 2);

        let raw: serde_json::Value = serde_json::from_str(&fs::read_to_string(store.path())?)?;
        assert_eq!(raw["history"].as_array().map(Vec::len), Some(2));
        Ok(())
    }

    #[test]
    fn test_record_keeps_history_with_unparseable_mean() -> Result<()> {
        let dir = tempdir()?;
        let store = BaselineStore::new(dir.path().join("baselines.json"), 50);
        fs::write(
            store.path(),
            r#"{"history": [
                {"value_counts": {"status": {"open": 3}}, "means": {"total_amount": 10.0}},
                {"value_counts": {"status": {"open": 1}}, "means": {"total_amount": "n/a"}}
            ]}"#,
        )?;

        let (prev, history) = store.record(snap(12.0))?;
        let prev = prev.ok_or_else(|| anyhow::anyhow!("predecessor expected"))?;
        assert_eq!(prev.means["total_amount"], None);
        assert_eq!(prev.value_counts["status"]["open"], 1);
        assert_eq!(history.len(), 3);
        assert_eq!(store.load().len(), 3);
        assert_eq!(store.load().snapshots()[0].means["total_amount"], Some(10.0));
        Ok(())
    }

    #[test]
    fn test_load_reads_bare_nan_as_missing_mean() -> Result<()> {
        let dir = tempdir()?;
        let store = BaselineStore::new(dir.path().join("baselines.json"), 50);
        fs::write(
            store.path(),
            r#"{"history": [{"value_counts": {}, "means": {"total_amount": NaN}}, {"means": {"total_amount": 4.0}}]}"#,
        )?;

        let history = store.load();
        assert_eq!(history.len(), 2);
        assert_eq!(history.snapshots()[0].means["total_amount"], None);
        assert_eq!(history.snapshots()[1].means["total_amount"], Some(4.0));
        Ok(())
    }

    #[test]
    fn test_record_respects_window() -> Result<()> {
        let dir = tempdir()?;
        let store = BaselineStore::new(dir.path().join("baselines.json"), 3);
        for i in 0..5 {
            store.record(snap(i as f64))?;
        }
        let means: Vec<Option<f64>> = store
            .load()
            .snapshots()
            .iter()
            .map(|s| s.means["total_amount"])
            .collect();
        assert_eq!(means, vec![Some(2.0), Some(3.0), Some(4.0)]);
        Ok(())
    }

    #[test]
    fn test_concurrent_records_are_not_lost() -> Result<()> {
        let dir = tempdir()?;
        let store = Arc::new(BaselineStore::new(dir.path().join("baselines.json"), 0));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || store.record(snap(i as f64)).map(|_| ()))
            })
            .collect();
        for h in handles {
            h.join().map_err(|_| anyhow::anyhow!("thread panicked"))??;
        }

        assert_eq!(store.load().len(), 8);
        Ok(())
    }
}
