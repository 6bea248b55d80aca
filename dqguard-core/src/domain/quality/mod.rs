// dqguard-core/src/domain/quality/mod.rs

pub mod baseline;
pub mod drift;
pub mod outliers;
pub mod report;

pub use baseline::{BaselineHistory, BaselineSnapshot, DEFAULT_HISTORY_WINDOW};
pub use drift::{Drift, WatchedCategory, category_share, mean_delta, share_delta};
pub use outliers::{DEFAULT_IQR_MULTIPLIER, OutlierSummary, iqr_outliers};
pub use report::{QualityReport, Suggestion, SuggestionSource};
