// dqguard-core/src/domain/policy/condition.rs

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

use crate::domain::dataset::{ColumnKind, Dataset, Literal, RowMask, Value, parse_literal};

/// Compiles a hardcoded pattern; falls back to a never-matching regex.
fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|_| Regex::new("$^").unwrap_or_else(|_| unreachable!()))
}

fn re_and() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| compile(r"(?i)\band\b"))
}

fn re_is_null() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| compile(r"(?i)^(\w+)\s+IS\s+NULL$"))
}

fn re_is_not_null() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| compile(r"(?i)^(\w+)\s+IS\s+NOT\s+NULL$"))
}

fn re_compare() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| compile(r"^(\w+)\s*(==|!=|>=|<=|>|<)\s*(.+)$"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
}

impl CompareOp {
    fn parse(symbol: &str) -> Option<Self> {
        match symbol {
            "==" => Some(Self::Eq),
            "!=" => Some(Self::Ne),
            ">" => Some(Self::Gt),
            ">=" => Some(Self::Ge),
            "<" => Some(Self::Lt),
            "<=" => Some(Self::Le),
            _ => None,
        }
    }

    pub fn is_ordering(self) -> bool {
        !matches!(self, Self::Eq | Self::Ne)
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Lt => "<",
            Self::Le => "<=",
        };
        write!(f, "{}", s)
    }
}

/// Right-hand side of a comparison. A bare identifier is a column reference
/// when the dataset has such a column at evaluation time, text otherwise.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Text(String),
    Number(f64),
    Identifier(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    IsNull(String),
    IsNotNull(String),
    Compare {
        column: String,
        op: CompareOp,
        operand: Operand,
    },
    /// Fragment matching no grammar; contributes no constraint.
    Unrecognized(String),
}

/// Parsed condition: a conjunction of clauses.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Always,
    All(Vec<Clause>),
}

impl Condition {
    /// Parsing never fails: unknown fragments become `Clause::Unrecognized`.
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        if text.is_empty() || text.eq_ignore_ascii_case("true") {
            return Condition::Always;
        }
        let clauses = re_and()
            .split(text)
            .map(str::trim)
            .filter(|frag| !frag.is_empty())
            .map(parse_clause)
            .collect();
        Condition::All(clauses)
    }

    pub fn unrecognized(&self) -> Vec<&str> {
        match self {
            Condition::Always => vec![],
            Condition::All(clauses) => clauses
                .iter()
                .filter_map(|c| match c {
                    Clause::Unrecognized(frag) => Some(frag.as_str()),
                    _ => None,
                })
                .collect(),
        }
    }

    /// Evaluates against the current state of `dataset`. Total: absent
    /// columns read as all-missing and are not created.
    pub fn evaluate(&self, dataset: &Dataset) -> RowMask {
        let rows = dataset.len();
        let mut mask = RowMask::all(rows);
        if let Condition::All(clauses) = self {
            for clause in clauses {
                if let Some(clause_mask) = evaluate_clause(dataset, clause) {
                    mask.intersect(&clause_mask);
                }
            }
        }
        mask
    }
}

fn parse_clause(fragment: &str) -> Clause {
    if let Some(caps) = re_is_null().captures(fragment) {
        return Clause::IsNull(caps[1].to_string());
    }
    if let Some(caps) = re_is_not_null().captures(fragment) {
        return Clause::IsNotNull(caps[1].to_string());
    }
    if let Some(caps) = re_compare().captures(fragment)
        && let Some(op) = CompareOp::parse(&caps[2])
    {
        let operand = match parse_literal(&caps[3]) {
            Literal::Quoted(s) => Operand::Text(s),
            Literal::Number(n) => Operand::Number(n),
            Literal::Bare(s) => Operand::Identifier(s),
        };
        return Clause::Compare {
            column: caps[1].to_string(),
            op,
            operand,
        };
    }
    Clause::Unrecognized(fragment.to_string())
}

fn evaluate_clause(dataset: &Dataset, clause: &Clause) -> Option<RowMask> {
    let rows = dataset.len();
    match clause {
        Clause::IsNull(col) => Some(RowMask::from_fn(rows, |i| {
            dataset.value(col, i).is_missing()
        })),
        Clause::IsNotNull(col) => Some(RowMask::from_fn(rows, |i| {
            !dataset.value(col, i).is_missing()
        })),
        Clause::Compare {
            column,
            op,
            operand,
        } => Some(evaluate_compare(dataset, column, *op, operand)),
        Clause::Unrecognized(_) => None,
    }
}

fn evaluate_compare(dataset: &Dataset, column: &str, op: CompareOp, operand: &Operand) -> RowMask {
    let rows = dataset.len();
    let lhs_numeric = dataset
        .column(column)
        .is_some_and(|c| c.kind() == ColumnKind::Numeric);

    match operand {
        Operand::Identifier(other) if dataset.contains(other) => RowMask::from_fn(rows, |i| {
            compare(op, dataset.value(column, i), dataset.value(other, i), true)
        }),
        Operand::Identifier(text) | Operand::Text(text) => {
            let rhs = Value::Text(text.clone());
            RowMask::from_fn(rows, |i| {
                compare(op, dataset.value(column, i), &rhs, lhs_numeric)
            })
        }
        Operand::Number(n) => {
            let rhs = Value::Number(*n);
            RowMask::from_fn(rows, |i| compare(op, dataset.value(column, i), &rhs, true))
        }
    }
}

/// Single coercion rule for every comparison:
/// - ordering operators compare numbers only; anything that does not
///   coerce yields `false`;
/// - `==`/`!=` compare numerically when `numeric_first` holds and both
///   sides coerce, otherwise as exact text. Missing never equals anything,
///   so `!=` holds for it.
pub fn compare(op: CompareOp, lhs: &Value, rhs: &Value, numeric_first: bool) -> bool {
    if op.is_ordering() {
        let (Some(a), Some(b)) = (lhs.as_number(), rhs.as_number()) else {
            return false;
        };
        return match op {
            CompareOp::Gt => a > b,
            CompareOp::Ge => a >= b,
            CompareOp::Lt => a < b,
            CompareOp::Le => a <= b,
            CompareOp::Eq | CompareOp::Ne => false,
        };
    }

    let equal = if numeric_first
        && let (Some(a), Some(b)) = (lhs.as_number(), rhs.as_number())
    {
        a == b
    } else {
        matches!((lhs, rhs), (Value::Text(a), Value::Text(b)) if a == b)
    };

    match op {
        CompareOp::Eq => equal,
        _ => !equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::dataset::Column;
    use anyhow::Result;

    fn sample() -> Result<Dataset> {
        Ok(Dataset::from_columns([
            ("a", Column::numeric([Some(1.0), None, Some(3.0), None])),
            ("b", Column::text([Some("USD"), Some("EUR"), Some("USD"), None])),
            ("x", Column::numeric([Some(10.0), Some(20.0), Some(30.0), Some(40.0)])),
        ])?)
    }

    fn mask(ds: &Dataset, cond: &str) -> Vec<bool> {
        Condition::parse(cond).evaluate(ds).as_slice().to_vec()
    }

    #[test]
    fn test_null_tests() -> Result<()> {
        let ds = sample()?;
        assert_eq!(mask(&ds, "a IS NULL"), [false, true, false, true]);
        assert_eq!(mask(&ds, "a is not null"), [true, false, true, false]);
        Ok(())
    }

    #[test]
    fn test_text_equality_and_missing() -> Result<()> {
        let ds = sample()?;
        assert_eq!(mask(&ds, "b == 'EUR'"), [false, true, false, false]);
        assert_eq!(mask(&ds, "a IS NULL and b == 'EUR'"), [false, true, false, false]);
        // missing is never equal, so it is "not equal"
        assert_eq!(mask(&ds, "b != 'USD'"), [false, true, false, true]);
        Ok(())
    }

    #[test]
    fn test_ordering_is_numeric_only() -> Result<()> {
        let ds = sample()?;
        assert_eq!(mask(&ds, "x >= 30"), [false, false, true, true]);
        assert_eq!(mask(&ds, "a < 2.5"), [true, false, false, false]);
        assert_eq!(mask(&ds, "b > 'AAA'"), [false, false, false, false]);
        Ok(())
    }

    #[test]
    fn test_column_operand_is_elementwise() -> Result<()> {
        let ds = sample()?;
        assert_eq!(mask(&ds, "x > a"), [true, false, true, false]);
        Ok(())
    }

    #[test]
    fn test_quoted_number_against_numeric_column() -> Result<()> {
        let ds = sample()?;
        assert_eq!(mask(&ds, "x == '20'"), [false, true, false, false]);
        Ok(())
    }

    #[test]
    fn test_true_and_empty_select_everything() -> Result<()> {
        let ds = sample()?;
        assert_eq!(mask(&ds, ""), [true; 4]);
        assert_eq!(mask(&ds, "TRUE"), [true; 4]);
        Ok(())
    }

    #[test]
    fn test_unrecognized_fragment_is_dropped() -> Result<()> {
        let ds = sample()?;
        let cond = Condition::parse("a IS NULL AND b LIKE 'E%'");
        assert_eq!(cond.unrecognized(), vec!["b LIKE 'E%'"]);
        assert_eq!(cond.evaluate(&ds).as_slice(), [false, true, false, true]);
        Ok(())
    }

    #[test]
    fn test_absent_column_is_all_missing() -> Result<()> {
        let ds = sample()?;
        assert_eq!(mask(&ds, "ghost IS NULL"), [true; 4]);
        assert_eq!(mask(&ds, "ghost == 'x'"), [false; 4]);
        assert!(!ds.contains("ghost"));
        Ok(())
    }
}
