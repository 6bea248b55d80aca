// dqguard-core/src/domain/policy/expression.rs

use std::fmt;

use crate::domain::dataset::{Dataset, Literal, parse_literal};
use crate::domain::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl ArithOp {
    fn parse(token: &str) -> Option<Self> {
        match token {
            "+" => Some(Self::Add),
            "-" => Some(Self::Sub),
            "*" => Some(Self::Mul),
            "/" => Some(Self::Div),
            _ => None,
        }
    }

    fn binds_tight(self) -> bool {
        matches!(self, Self::Mul | Self::Div)
    }

    /// Missing operands and division by zero give `None`.
    fn apply(self, lhs: Option<f64>, rhs: Option<f64>) -> Option<f64> {
        let (a, b) = (lhs?, rhs?);
        let out = match self {
            Self::Add => a + b,
            Self::Sub => a - b,
            Self::Mul => a * b,
            Self::Div if b == 0.0 => return None,
            Self::Div => a / b,
        };
        out.is_finite().then_some(out)
    }
}

impl fmt::Display for ArithOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Term {
    Number(f64),
    Column(String),
}

/// `operand (op operand)*`, whitespace separated. No parentheses and no
/// unary minus.
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    source: String,
    first: Term,
    rest: Vec<(ArithOp, Term)>,
}

/// Evaluation result: a scalar when no column is referenced.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprValue {
    Scalar(Option<f64>),
    Series(Vec<Option<f64>>),
}

impl ExprValue {
    pub fn at(&self, row: usize) -> Option<f64> {
        match self {
            ExprValue::Scalar(v) => *v,
            ExprValue::Series(values) => values.get(row).copied().flatten(),
        }
    }

    fn combine(self, op: ArithOp, rhs: ExprValue) -> ExprValue {
        match (self, rhs) {
            (ExprValue::Scalar(a), ExprValue::Scalar(b)) => ExprValue::Scalar(op.apply(a, b)),
            (ExprValue::Series(a), ExprValue::Scalar(b)) => {
                ExprValue::Series(a.into_iter().map(|x| op.apply(x, b)).collect())
            }
            (ExprValue::Scalar(a), ExprValue::Series(b)) => {
                ExprValue::Series(b.into_iter().map(|y| op.apply(a, y)).collect())
            }
            (ExprValue::Series(a), ExprValue::Series(b)) => ExprValue::Series(
                a.into_iter()
                    .zip(b)
                    .map(|(x, y)| op.apply(x, y))
                    .collect(),
            ),
        }
    }
}

impl Expression {
    pub fn parse(text: &str) -> Result<Self, DomainError> {
        let malformed = |reason: &str| DomainError::MalformedExpression {
            expr: text.to_string(),
            reason: reason.to_string(),
        };

        let mut tokens = text.split_whitespace();
        let first = tokens
            .next()
            .ok_or_else(|| malformed("empty expression"))
            .and_then(|t| parse_term(t).ok_or_else(|| malformed("expected an operand first")))?;

        let mut rest = Vec::new();
        while let Some(tok) = tokens.next() {
            let op = ArithOp::parse(tok)
                .ok_or_else(|| malformed(&format!("expected an operator, found '{}'", tok)))?;
            let operand = tokens
                .next()
                .ok_or_else(|| malformed(&format!("dangling operator '{}'", op)))?;
            let term = parse_term(operand)
                .ok_or_else(|| malformed(&format!("expected an operand, found '{}'", operand)))?;
            rest.push((op, term));
        }

        Ok(Self {
            source: text.trim().to_string(),
            first,
            rest,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Referenced column names, in order of appearance.
    pub fn columns(&self) -> Vec<&str> {
        std::iter::once(&self.first)
            .chain(self.rest.iter().map(|(_, t)| t))
            .filter_map(|t| match t {
                Term::Column(c) => Some(c.as_str()),
                Term::Number(_) => None,
            })
            .collect()
    }

    /// Two passes, left to right: `*` and `/` first, then `+` and `-`.
    pub fn evaluate(&self, dataset: &Dataset) -> ExprValue {
        let resolve = |term: &Term| match term {
            Term::Number(n) => ExprValue::Scalar(Some(*n)),
            Term::Column(name) => ExprValue::Series(dataset.numbers(name)),
        };

        // First pass: fold `*` and `/` into the operand on their left.
        let mut sums: Vec<(Option<ArithOp>, ExprValue)> = vec![(None, resolve(&self.first))];
        for (op, term) in &self.rest {
            let rhs = resolve(term);
            match sums.pop() {
                Some((lead, lhs)) if op.binds_tight() => sums.push((lead, lhs.combine(*op, rhs))),
                Some(prev) => {
                    sums.push(prev);
                    sums.push((Some(*op), rhs));
                }
                None => sums.push((None, rhs)),
            }
        }

        // Second pass: additive chain.
        let mut iter = sums.into_iter();
        let mut acc = match iter.next() {
            Some((_, v)) => v,
            None => return ExprValue::Scalar(None),
        };
        for (op, value) in iter {
            if let Some(op) = op {
                acc = acc.combine(op, value);
            }
        }
        acc
    }
}

fn parse_term(token: &str) -> Option<Term> {
    if ArithOp::parse(token).is_some() {
        return None;
    }
    match parse_literal(token) {
        Literal::Number(n) => Some(Term::Number(n)),
        Literal::Bare(name) if name.chars().all(|c| c.is_alphanumeric() || c == '_') => {
            Some(Term::Column(name))
        }
        Literal::Bare(_) | Literal::Quoted(_) => None,
    }
}
