// dqguard-core/src/domain/error.rs

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic, Clone, PartialEq)]
pub enum DomainError {
    #[error("Unsupported action verb in '{0}'")]
    #[diagnostic(
        code(dqguard::domain::policy::verb),
        help("Actions must start with 'assign', 'impute' or 'compute'.")
    )]
    UnsupportedAction(String),

    #[error("Malformed {verb} action: '{text}'")]
    #[diagnostic(
        code(dqguard::domain::policy::action),
        help("Expected '<verb> <column> = <value>'.")
    )]
    MalformedAction { verb: String, text: String },

    #[error("Malformed expression '{expr}': {reason}")]
    #[diagnostic(
        code(dqguard::domain::policy::expression),
        help("Expressions are whitespace separated: operand (+|-|*|/) operand ...")
    )]
    MalformedExpression { expr: String, reason: String },

    #[error("Rule #{0} has no 'if' or no 'then'")]
    #[diagnostic(code(dqguard::domain::policy::incomplete_rule))]
    IncompleteRule(usize),

    #[error("Column '{column}' has {actual} rows, dataset has {expected}")]
    #[diagnostic(code(dqguard::domain::dataset::length))]
    ColumnLength {
        column: String,
        expected: usize,
        actual: usize,
    },
}
