// dqguard-core/src/domain/quality/baseline.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

use crate::domain::dataset::Dataset;

pub const DEFAULT_HISTORY_WINDOW: i64 = 50;

/// Summary statistics of one run, compared against by the next run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BaselineSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub captured_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub value_counts: BTreeMap<String, BTreeMap<String, u64>>,
    /// `None` when the column was absent or had no numeric value.
    #[serde(default, deserialize_with = "lenient_means")]
    pub means: BTreeMap<String, Option<f64>>,
}

impl BaselineSnapshot {
    pub fn capture<C: AsRef<str>, M: AsRef<str>>(
        dataset: &Dataset,
        category_columns: &[C],
        mean_columns: &[M],
    ) -> Self {
        Self {
            captured_at: Some(Utc::now()),
            value_counts: category_columns
                .iter()
                .map(|c| (c.as_ref().to_string(), dataset.value_counts(c.as_ref())))
                .collect(),
            means: mean_columns
                .iter()
                .map(|c| (c.as_ref().to_string(), dataset.mean(c.as_ref())))
                .collect(),
        }
    }
}

/// A stored mean that is not a finite number (`"n/a"`, `null`, an object)
/// reads as `None` instead of rejecting the whole history. Numeric strings
/// are accepted.
fn lenient_means<'de, D>(deserializer: D) -> Result<BTreeMap<String, Option<f64>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = BTreeMap::<String, serde_json::Value>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|(column, v)| {
            let mean = match v {
                serde_json::Value::Number(n) => n.as_f64(),
                serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
                _ => None,
            };
            (column, mean.filter(|m| m.is_finite()))
        })
        .collect())
}

/// Snapshots, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BaselineHistory {
    #[serde(default, alias = "runs")]
    history: Vec<BaselineSnapshot>,
}

impl BaselineHistory {
    pub fn new(history: Vec<BaselineSnapshot>) -> Self {
        Self { history }
    }

    /// Appends, then evicts from the front until at most `window` remain.
    /// `window <= 0` keeps everything.
    pub fn push(&mut self, snapshot: BaselineSnapshot, window: i64) {
        self.history.push(snapshot);
        if window > 0 {
            let window = window as usize;
            if self.history.len() > window {
                let excess = self.history.len() - window;
                self.history.drain(..excess);
            }
        }
    }

    /// The snapshot drift is measured against.
    pub fn latest(&self) -> Option<&BaselineSnapshot> {
        self.history.last()
    }

    pub fn snapshots(&self) -> &[BaselineSnapshot] {
        &self.history
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }
}
