// dqguard-core/src/infrastructure/store/rules.rs

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument, warn};

use crate::domain::policy::RuleSet;
use crate::infrastructure::error::InfrastructureError;
use crate::infrastructure::fs::write_json_atomic;

/// Rule file `{"logic": [{"if": ..., "then": ...}]}`.
pub struct RuleStore {
    path: PathBuf,
}

impl RuleStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing or corrupt file means "no rules".
    #[instrument(skip(self), fields(path = ?self.path))]
    pub fn load(&self) -> RuleSet {
        let content = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) => {
                debug!(error = %e, "No rule file, running without rules");
                return RuleSet::default();
            }
        };
        match serde_json::from_str::<RuleSet>(&content) {
            Ok(rules) => {
                debug!(rules = rules.len(), "Rule set loaded");
                rules
            }
            Err(e) => {
                warn!(error = %e, "Unreadable rule file, running without rules");
                RuleSet::default()
            }
        }
    }

    pub fn save(&self, rules: &RuleSet) -> Result<(), InfrastructureError> {
        write_json_atomic(&self.path, rules)
    }
}
