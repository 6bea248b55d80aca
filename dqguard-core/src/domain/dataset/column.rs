// dqguard-core/src/domain/dataset/column.rs

use serde::{Deserialize, Serialize};

use super::value::Value;

/// Logical type of a column. `Object` holds anything (created for writes
/// whose literal type is unknown).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Numeric,
    Text,
    Boolean,
    Object,
}

impl ColumnKind {
    /// Kind a freshly created column gets for a literal write.
    pub fn for_value(value: &Value) -> Self {
        match value {
            Value::Number(_) => ColumnKind::Numeric,
            Value::Text(_) => ColumnKind::Text,
            Value::Bool(_) => ColumnKind::Boolean,
            Value::Missing => ColumnKind::Object,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    kind: ColumnKind,
    values: Vec<Value>,
}

impl Column {
    pub fn new(kind: ColumnKind, values: Vec<Value>) -> Self {
        Self { kind, values }
    }

    pub fn missing(kind: ColumnKind, len: usize) -> Self {
        Self::filled(kind, Value::Missing, len)
    }

    pub fn filled(kind: ColumnKind, value: Value, len: usize) -> Self {
        Self {
            kind,
            values: vec![value; len],
        }
    }

    pub fn numeric<I: IntoIterator<Item = Option<f64>>>(values: I) -> Self {
        Self::new(
            ColumnKind::Numeric,
            values.into_iter().map(Value::from_option).collect(),
        )
    }

    pub fn text<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        Self::new(
            ColumnKind::Text,
            values
                .into_iter()
                .map(|v| v.map(|s| Value::Text(s.into())).unwrap_or(Value::Missing))
                .collect(),
        )
    }

    /// Infers the kind from the first non-missing entry.
    pub fn infer(values: Vec<Value>) -> Self {
        let kind = values
            .iter()
            .find(|v| !v.is_missing())
            .map(ColumnKind::for_value)
            .unwrap_or(ColumnKind::Object);
        Self::new(kind, values)
    }

    pub fn kind(&self) -> ColumnKind {
        self.kind
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, row: usize) -> &Value {
        self.values.get(row).unwrap_or(&Value::Missing)
    }

    pub(crate) fn set(&mut self, row: usize, value: Value) {
        if let Some(slot) = self.values.get_mut(row) {
            *slot = value;
        }
    }

    pub fn numbers(&self) -> Vec<Option<f64>> {
        self.values.iter().map(Value::as_number).collect()
    }

    /// Converts the column so that a write of `kind` fits.
    /// Numeric conversion drops what does not parse; text conversion keeps
    /// the rendered value.
    pub(crate) fn convert_to(&mut self, kind: ColumnKind) {
        if self.kind == kind || kind == ColumnKind::Object {
            return;
        }
        match kind {
            ColumnKind::Numeric => {
                for v in &mut self.values {
                    *v = Value::from_option(v.as_number());
                }
            }
            ColumnKind::Text => {
                for v in &mut self.values {
                    if !v.is_missing() && v.as_text().is_none() {
                        *v = Value::Text(v.to_string());
                    }
                }
            }
            ColumnKind::Boolean | ColumnKind::Object => {}
        }
        self.kind = kind;
    }
}
