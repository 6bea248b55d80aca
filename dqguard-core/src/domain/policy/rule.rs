// dqguard-core/src/domain/policy/rule.rs

use serde::{Deserialize, Serialize};

use super::action::Action;
use super::condition::Condition;
use crate::domain::error::DomainError;

/// `{"if": <condition>, "then": <action>}`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rule {
    #[serde(rename = "if")]
    pub condition: String,
    #[serde(rename = "then")]
    pub action: String,
}

impl Rule {
    pub fn new(condition: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            condition: condition.into(),
            action: action.into(),
        }
    }

    pub fn compile(&self) -> CompiledRule {
        CompiledRule {
            condition: Condition::parse(&self.condition),
            action: Action::parse(&self.action),
        }
    }
}

/// A rule after the parse step. Parsing is total; an unusable action is
/// carried as `Action::Unrecognized`.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledRule {
    pub condition: Condition,
    pub action: Action,
}

/// Entry of a rule file. Entries that are not complete `{if, then}` pairs are
/// kept so that indexes stay stable, and skipped at evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleEntry {
    Complete(Rule),
    Other(serde_json::Value),
}

/// Ordered rule list, persisted as `{"logic": [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleSet {
    #[serde(default)]
    pub logic: Vec<RuleEntry>,
}

impl RuleSet {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self {
            logic: rules.into_iter().map(RuleEntry::Complete).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.logic.len()
    }

    pub fn is_empty(&self) -> bool {
        self.logic.is_empty()
    }

    /// Every entry in order, incomplete ones as `Err`.
    pub fn entries(&self) -> impl Iterator<Item = (usize, Result<&Rule, DomainError>)> + '_ {
        self.logic.iter().enumerate().map(|(i, entry)| match entry {
            RuleEntry::Complete(rule) => (i, Ok(rule)),
            RuleEntry::Other(_) => (i, Err(DomainError::IncompleteRule(i))),
        })
    }

    pub fn contains(&self, rule: &Rule) -> bool {
        self.logic
            .iter()
            .any(|e| matches!(e, RuleEntry::Complete(r) if r == rule))
    }

    /// Appends when not already present. Returns whether it was added.
    pub fn push_unique(&mut self, rule: Rule) -> bool {
        if self.contains(&rule) {
            return false;
        }
        self.logic.push(RuleEntry::Complete(rule));
        true
    }
}
