// dqguard-core/src/domain/quality/drift.rs

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::baseline::BaselineSnapshot;
use crate::domain::dataset::Value;

/// A `(column, value)` pair whose share is tracked between runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchedCategory {
    pub column: String,
    pub value: String,
}

impl WatchedCategory {
    pub fn new(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
        }
    }
}

/// Change against the immediately preceding snapshot. Both maps are empty
/// on a first run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Drift {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub mean_delta: BTreeMap<String, Option<f64>>,
    /// column -> tracked value -> absolute share change
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub category_share_delta: BTreeMap<String, BTreeMap<String, f64>>,
}

impl Drift {
    pub fn is_empty(&self) -> bool {
        self.mean_delta.is_empty() && self.category_share_delta.is_empty()
    }

    pub fn compute(
        current: &BaselineSnapshot,
        previous: &BaselineSnapshot,
        watch: &[WatchedCategory],
    ) -> Self {
        let mean_delta = current
            .means
            .iter()
            .map(|(col, curr)| {
                let prev = previous.means.get(col).copied().flatten();
                (
                    col.clone(),
                    mean_delta(&Value::from_option(*curr), &Value::from_option(prev)),
                )
            })
            .collect();

        let mut category_share_delta: BTreeMap<String, BTreeMap<String, f64>> = BTreeMap::new();
        let empty = BTreeMap::new();
        for w in watch {
            let curr = current.value_counts.get(&w.column).unwrap_or(&empty);
            let prev = previous.value_counts.get(&w.column).unwrap_or(&empty);
            category_share_delta
                .entry(w.column.clone())
                .or_default()
                .insert(w.value.clone(), share_delta(curr, prev, &w.value));
        }

        Self {
            mean_delta,
            category_share_delta,
        }
    }
}

/// `current - previous`; `None` when either side is not a number.
pub fn mean_delta(current: &Value, previous: &Value) -> Option<f64> {
    Some(current.as_number()? - previous.as_number()?)
}

/// Share of `value` among all counted values; the denominator is floored at 1.
pub fn category_share(counts: &BTreeMap<String, u64>, value: &str) -> f64 {
    let total: u64 = counts.values().sum();
    counts.get(value).copied().unwrap_or(0) as f64 / total.max(1) as f64
}

/// `|share_now - share_before|`, rounded to 4 decimals.
pub fn share_delta(
    current: &BTreeMap<String, u64>,
    previous: &BTreeMap<String, u64>,
    value: &str,
) -> f64 {
    let delta = (category_share(current, value) - category_share(previous, value)).abs();
    (delta * 10_000.0).round() / 10_000.0
}
