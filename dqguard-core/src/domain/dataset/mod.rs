// dqguard-core/src/domain/dataset/mod.rs

pub mod column;
pub mod mask;
pub mod value;

pub use column::{Column, ColumnKind};
pub use mask::RowMask;
pub use value::{Literal, Value, parse_literal, parse_number, parse_number_with_comma};

use serde_json::Map;
use std::collections::{BTreeMap, HashMap};

use crate::domain::error::DomainError;

/// Provenance columns written by every applied policy action.
pub const IMPUTED_FLAG: &str = "imputed_flag";
pub const MISSING_REASON: &str = "missing_reason";

/// In-memory batch: named columns of equal length `len`.
/// Column order is insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    len: usize,
    order: Vec<String>,
    columns: HashMap<String, Column>,
}

impl Dataset {
    pub fn with_rows(len: usize) -> Self {
        Self {
            len,
            ..Default::default()
        }
    }

    /// Builds a dataset from named columns; all of them must have the same length.
    pub fn from_columns<I, S>(columns: I) -> Result<Self, DomainError>
    where
        I: IntoIterator<Item = (S, Column)>,
        S: Into<String>,
    {
        let mut dataset: Option<Dataset> = None;
        for (name, column) in columns {
            let ds = dataset.get_or_insert_with(|| Dataset::with_rows(column.len()));
            ds.insert(name, column)?;
        }
        Ok(dataset.unwrap_or_default())
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn column_names(&self) -> &[String] {
        &self.order
    }

    pub fn contains(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.get(name)
    }

    /// Adds or replaces a column. Fails on a length mismatch.
    pub fn insert(&mut self, name: impl Into<String>, column: Column) -> Result<(), DomainError> {
        let name = name.into();
        if column.len() != self.len {
            return Err(DomainError::ColumnLength {
                column: name,
                expected: self.len,
                actual: column.len(),
            });
        }
        if !self.columns.contains_key(&name) {
            self.order.push(name.clone());
        }
        self.columns.insert(name, column);
        Ok(())
    }

    /// Cell lookup; an absent column reads as all-missing.
    pub fn value(&self, name: &str, row: usize) -> &Value {
        match self.columns.get(name) {
            Some(col) => col.get(row),
            None => &Value::Missing,
        }
    }

    /// Numeric view of a column. Absent columns are all `None`.
    pub fn numbers(&self, name: &str) -> Vec<Option<f64>> {
        match self.columns.get(name) {
            Some(col) => col.numbers(),
            None => vec![None; self.len],
        }
    }

    /// Arithmetic mean over every row, ignoring missing and non-numeric
    /// entries. `None` when nothing is left to average.
    pub fn mean(&self, name: &str) -> Option<f64> {
        let column = self.columns.get(name)?;
        let (sum, count) = column
            .values()
            .iter()
            .filter_map(Value::as_number)
            .fold((0.0, 0usize), |(s, c), n| (s + n, c + 1));
        (count > 0).then(|| sum / count as f64)
    }

    /// Occurrences of each non-missing value of a column.
    pub fn value_counts(&self, name: &str) -> BTreeMap<String, u64> {
        let mut counts = BTreeMap::new();
        if let Some(col) = self.columns.get(name) {
            for key in col.values().iter().filter_map(Value::category_key) {
                *counts.entry(key).or_insert(0) += 1;
            }
        }
        counts
    }

    /// Creates the column (all-missing) when absent, otherwise converts it so
    /// a write of `kind` fits.
    pub fn ensure_column(&mut self, name: &str, kind: ColumnKind) {
        match self.columns.get_mut(name) {
            Some(col) => col.convert_to(kind),
            None => {
                self.order.push(name.to_string());
                self.columns
                    .insert(name.to_string(), Column::missing(kind, self.len));
            }
        }
    }

    /// Like [`Dataset::ensure_column`] but a created column starts filled
    /// with `default` instead of missing.
    pub fn ensure_column_filled(&mut self, name: &str, kind: ColumnKind, default: Value) {
        match self.columns.get_mut(name) {
            Some(col) => col.convert_to(kind),
            None => {
                self.order.push(name.to_string());
                self.columns
                    .insert(name.to_string(), Column::filled(kind, default, self.len));
            }
        }
    }

    /// Writes `value_at(row)` into every selected row of `name`.
    /// The column must exist (see [`Dataset::ensure_column`]).
    pub fn write_masked<F>(&mut self, name: &str, mask: &RowMask, mut value_at: F)
    where
        F: FnMut(usize) -> Value,
    {
        if let Some(col) = self.columns.get_mut(name) {
            for row in mask.selected() {
                col.set(row, value_at(row));
            }
        }
    }

    /// Coerces a column to numbers in place. With `decimal_comma` a value
    /// like "12,5" reads as 12.5.
    pub fn coerce_numeric(&mut self, name: &str, decimal_comma: bool) {
        if let Some(col) = self.columns.get_mut(name) {
            let values = col
                .values()
                .iter()
                .map(|v| match v {
                    Value::Text(s) if decimal_comma => {
                        Value::from_option(parse_number_with_comma(s))
                    }
                    other => Value::from_option(other.as_number()),
                })
                .collect();
            *col = Column::new(ColumnKind::Numeric, values);
        }
    }

    /// Row-oriented view, column order preserved.
    pub fn to_records(&self) -> Vec<Map<String, serde_json::Value>> {
        (0..self.len)
            .map(|row| {
                self.order
                    .iter()
                    .map(|name| {
                        let cell = serde_json::to_value(self.value(name, row))
                            .unwrap_or(serde_json::Value::Null);
                        (name.clone(), cell)
                    })
                    .collect()
            })
            .collect()
    }
}
