// dqguard-core/src/domain/quality/outliers.rs

use serde::{Deserialize, Serialize};

pub const DEFAULT_IQR_MULTIPLIER: f64 = 1.5;

/// Outlier figure for one column. Bounds are `None` when there was nothing
/// to measure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlierSummary {
    pub count: usize,
    pub bounds: [Option<f64>; 2],
}

impl OutlierSummary {
    pub fn empty() -> Self {
        Self {
            count: 0,
            bounds: [None, None],
        }
    }
}

/// Tukey fences: values strictly outside `[Q1 - k*IQR, Q3 + k*IQR]`.
/// Missing entries are ignored.
pub fn iqr_outliers(values: &[Option<f64>], k: f64) -> OutlierSummary {
    let mut sorted: Vec<f64> = values.iter().flatten().copied().collect();
    if sorted.is_empty() {
        return OutlierSummary::empty();
    }
    sorted.sort_by(f64::total_cmp);

    let q1 = quantile(&sorted, 0.25);
    let q3 = quantile(&sorted, 0.75);
    let iqr = q3 - q1;
    let (lo, hi) = (q1 - k * iqr, q3 + k * iqr);
    let count = sorted.iter().filter(|v| **v < lo || **v > hi).count();

    OutlierSummary {
        count,
        bounds: [Some(lo), Some(hi)],
    }
}

/// Linear interpolation between closest ranks over a sorted, non-empty slice.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = (sorted.len() - 1) as f64 * q;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let frac = pos - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * frac
}
