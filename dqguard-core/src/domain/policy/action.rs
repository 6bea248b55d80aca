// dqguard-core/src/domain/policy/action.rs

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

use super::expression::Expression;
use crate::domain::dataset::{Value, parse_literal};
use crate::domain::error::DomainError;

fn re_action() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^(assign|impute|compute)\s+(\w+)\s*=\s*(.+)$")
            .unwrap_or_else(|_| Regex::new("$^").unwrap_or_else(|_| unreachable!()))
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Assign,
    Impute,
    Compute,
}

impl ActionKind {
    /// Verb prefix check, case-insensitive; the verb must be followed by whitespace.
    fn from_prefix(text: &str) -> Option<Self> {
        let (verb, rest) = text.split_once(char::is_whitespace)?;
        if rest.trim().is_empty() {
            return None;
        }
        match verb.to_lowercase().as_str() {
            "assign" => Some(Self::Assign),
            "impute" => Some(Self::Impute),
            "compute" => Some(Self::Compute),
            _ => None,
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Assign => "assign",
            Self::Impute => "impute",
            Self::Compute => "compute",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ImputeSource {
    Literal(Value),
    /// Mean of a column over the whole dataset at evaluation time.
    Mean(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Assign { column: String, value: Value },
    Impute { column: String, source: ImputeSource },
    Compute { column: String, expr: Expression },
    /// The rule is skipped; `reason` says why.
    Unrecognized { text: String, reason: DomainError },
}

impl Action {
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        match Self::try_parse(text) {
            Ok(action) => action,
            Err(reason) => Action::Unrecognized {
                text: text.to_string(),
                reason,
            },
        }
    }

    fn try_parse(text: &str) -> Result<Self, DomainError> {
        let kind = ActionKind::from_prefix(text)
            .ok_or_else(|| DomainError::UnsupportedAction(text.to_string()))?;
        let caps = re_action()
            .captures(text)
            .ok_or_else(|| DomainError::MalformedAction {
                verb: kind.to_string(),
                text: text.to_string(),
            })?;
        let column = caps[2].to_string();
        let payload = caps[3].trim();

        Ok(match kind {
            ActionKind::Assign => Action::Assign {
                column,
                value: parse_literal(payload).into_value(),
            },
            ActionKind::Impute => {
                let source = match mean_source(payload) {
                    Some(src) => ImputeSource::Mean(src.to_string()),
                    None => ImputeSource::Literal(parse_literal(payload).into_value()),
                };
                Action::Impute { column, source }
            }
            ActionKind::Compute => Action::Compute {
                column,
                expr: Expression::parse(payload)?,
            },
        })
    }

    pub fn kind(&self) -> Option<ActionKind> {
        match self {
            Action::Assign { .. } => Some(ActionKind::Assign),
            Action::Impute { .. } => Some(ActionKind::Impute),
            Action::Compute { .. } => Some(ActionKind::Compute),
            Action::Unrecognized { .. } => None,
        }
    }

    pub fn target(&self) -> Option<&str> {
        match self {
            Action::Assign { column, .. }
            | Action::Impute { column, .. }
            | Action::Compute { column, .. } => Some(column),
            Action::Unrecognized { .. } => None,
        }
    }

    /// Text stored in `missing_reason` for touched rows.
    pub fn reason(&self) -> String {
        match self {
            Action::Assign { column, value } => format!("assign {} = {}", column, value),
            Action::Impute {
                column,
                source: ImputeSource::Mean(src),
            } => format!("impute {} = mean({})", column, src),
            Action::Impute {
                column,
                source: ImputeSource::Literal(value),
            } => format!("impute {} = {}", column, value),
            Action::Compute { column, expr } => format!("compute {} = {}", column, expr.source()),
            Action::Unrecognized { text, .. } => text.clone(),
        }
    }
}

/// `mean(<col>)`, case-insensitive on the function name.
fn mean_source(payload: &str) -> Option<&str> {
    let head = payload.get(..5)?;
    if !head.eq_ignore_ascii_case("mean(") || !payload.ends_with(')') {
        return None;
    }
    let inner = payload[5..payload.len() - 1].trim();
    (!inner.is_empty()).then_some(inner)
}
