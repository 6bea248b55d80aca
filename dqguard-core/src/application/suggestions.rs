// dqguard-core/src/application/suggestions.rs

use tracing::{info, instrument};

use crate::domain::policy::{Rule, RuleSet};
use crate::domain::quality::Suggestion;

/// Appends confident suggestions to `rules`, skipping rules already present.
/// Returns what was added, in suggestion order.
#[instrument(skip_all, fields(candidates = suggestions.len(), min_confidence = min_confidence))]
pub fn auto_accept(rules: &mut RuleSet, suggestions: &[Suggestion], min_confidence: f64) -> Vec<Rule> {
    let mut accepted = Vec::new();
    for s in suggestions.iter().filter(|s| s.confidence >= min_confidence) {
        if rules.push_unique(s.rule.clone()) {
            info!(id = %s.id, title = %s.title, "Suggestion auto-accepted");
            accepted.push(s.rule.clone());
        }
    }
    accepted
}
