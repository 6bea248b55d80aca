// dqguard-core/src/domain/dataset/value.rs

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single cell. `Missing` is the null marker: a column never has holes,
/// only `Missing` entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum Value {
    Number(f64),
    Bool(bool),
    Text(String),
    #[default]
    Missing,
}

impl Value {
    /// Builds a numeric cell, folding NaN into `Missing`.
    pub fn number(n: f64) -> Self {
        if n.is_nan() {
            Value::Missing
        } else {
            Value::Number(n)
        }
    }

    pub fn from_option(n: Option<f64>) -> Self {
        n.map(Value::number).unwrap_or(Value::Missing)
    }

    pub fn text(s: impl Into<String>) -> Self {
        Value::Text(s.into())
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    /// Numeric coercion used by every numeric comparison and by arithmetic.
    /// Text is parsed after trimming; anything unparseable is `None`.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) if !n.is_nan() => Some(*n),
            Value::Number(_) => None,
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Value::Text(s) => parse_number(s),
            Value::Missing => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Category key used by value counts. Missing has no key.
    pub fn category_key(&self) -> Option<String> {
        match self {
            Value::Missing => None,
            other => Some(other.to_string()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{}", n),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Text(s) => write!(f, "{}", s),
            Value::Missing => Ok(()),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

/// Lenient float parsing: surrounding whitespace is ignored, empty is `None`.
pub fn parse_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| !n.is_nan())
}

/// Same as [`parse_number`] but accepts a decimal comma ("12,5").
pub fn parse_number_with_comma(raw: &str) -> Option<f64> {
    parse_number(&raw.replace(',', "."))
}

/// Literal token grammar shared by conditions and actions:
/// `'quoted'` is text, a token containing `.` is a float, anything else is
/// tried as an integer and kept as bare text when that fails.
pub fn parse_literal(token: &str) -> Literal {
    let t = token.trim();
    if t.len() >= 2 && t.starts_with('\'') && t.ends_with('\'') {
        return Literal::Quoted(t[1..t.len() - 1].to_string());
    }
    let parsed = if t.contains('.') {
        t.parse::<f64>().ok()
    } else {
        t.parse::<i64>().ok().map(|i| i as f64)
    };
    match parsed {
        Some(n) if !n.is_nan() => Literal::Number(n),
        _ => Literal::Bare(t.to_string()),
    }
}

/// Result of [`parse_literal`]. `Bare` tokens may name a column.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Quoted(String),
    Number(f64),
    Bare(String),
}

impl Literal {
    pub fn into_value(self) -> Value {
        match self {
            Literal::Quoted(s) | Literal::Bare(s) => Value::Text(s),
            Literal::Number(n) => Value::Number(n),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_grammar() {
        assert_eq!(parse_literal("'EUR'"), Literal::Quoted("EUR".into()));
        assert_eq!(parse_literal(" 30 "), Literal::Number(30.0));
        assert_eq!(parse_literal("2.5"), Literal::Number(2.5));
        assert_eq!(parse_literal("unit_price"), Literal::Bare("unit_price".into()));
        // No '.', not an integer: stays bare text
        assert_eq!(parse_literal("1e3"), Literal::Bare("1e3".into()));
    }

    #[test]
    fn test_numeric_coercion() {
        assert_eq!(Value::text(" 12 ").as_number(), Some(12.0));
        assert_eq!(Value::text("abc").as_number(), None);
        assert_eq!(Value::Missing.as_number(), None);
        assert_eq!(Value::Bool(true).as_number(), Some(1.0));
        assert!(Value::number(f64::NAN).is_missing());
        assert_eq!(parse_number_with_comma("12,5"), Some(12.5));
    }

    #[test]
    fn test_missing_serializes_as_null() -> anyhow::Result<()> {
        let json = serde_json::to_string(&vec![Value::Missing, Value::Number(1.5), Value::text("x")])?;
        assert_eq!(json, r#"[null,1.5,"x"]"#);
        Ok(())
    }
}
