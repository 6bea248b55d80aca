// dqguard-core/src/ports/suggester.rs

use async_trait::async_trait;

use crate::domain::dataset::Dataset;
use crate::domain::policy::RuleSet;
use crate::domain::quality::{QualityReport, Suggestion};
use crate::error::GuardError;

/// Rule proposal generator (heuristics, a model behind an HTTP API, ...).
/// `existing` lets implementations avoid proposing rules already in force.
#[async_trait]
pub trait RuleSuggester: Send + Sync {
    async fn suggest(
        &self,
        dataset: &Dataset,
        report: &QualityReport,
        existing: &RuleSet,
    ) -> Result<Vec<Suggestion>, GuardError>;
}
