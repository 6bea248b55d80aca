// dqguard-core/src/domain/policy/mod.rs

pub mod action;
pub mod audit;
pub mod condition;
pub mod engine;
pub mod expression;
pub mod rule;

pub use action::{Action, ActionKind, ImputeSource};
pub use audit::{DiagnosticKind, RuleDiagnostic, TransformAudit};
pub use condition::{Clause, CompareOp, Condition, Operand};
pub use engine::{PolicyOutcome, apply_policies};
pub use expression::{ExprValue, Expression};
pub use rule::{CompiledRule, Rule, RuleEntry, RuleSet};
