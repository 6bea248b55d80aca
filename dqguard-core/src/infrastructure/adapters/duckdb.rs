// dqguard-core/src/infrastructure/adapters/duckdb.rs

use duckdb::{Config, Connection};
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, instrument};

// Imports Hexagonaux
use crate::domain::dataset::{Column, ColumnKind, Dataset, Value};
use crate::error::GuardError;
use crate::infrastructure::error::InfrastructureError;
use crate::ports::reader::DatasetReader;

/// CSV ingestion through DuckDB's `read_csv_auto`. Numeric columns arrive
/// as numbers, booleans as booleans, everything else as text.
pub struct DuckDbReader {
    conn: Mutex<Connection>,
}

/// Column as reported by `PRAGMA table_info`.
#[derive(Debug, Clone, PartialEq)]
struct SourceColumn {
    name: String,
    data_type: String,
}

impl SourceColumn {
    fn kind(&self) -> ColumnKind {
        let ty = self.data_type.to_ascii_uppercase();
        let base = ty.split('(').next().unwrap_or(&ty).trim();
        match base {
            "TINYINT" | "SMALLINT" | "INTEGER" | "BIGINT" | "HUGEINT" | "UTINYINT"
            | "USMALLINT" | "UINTEGER" | "UBIGINT" | "FLOAT" | "REAL" | "DOUBLE" | "DECIMAL" => {
                ColumnKind::Numeric
            }
            "BOOLEAN" => ColumnKind::Boolean,
            _ => ColumnKind::Text,
        }
    }

    fn projection(&self) -> String {
        let quoted = quote_ident(&self.name);
        match self.kind() {
            ColumnKind::Numeric => format!("CAST({quoted} AS DOUBLE)"),
            ColumnKind::Boolean => quoted,
            _ => format!("CAST({quoted} AS VARCHAR)"),
        }
    }
}

impl DuckDbReader {
    pub fn new() -> Result<Self, InfrastructureError> {
        let conn = Connection::open_in_memory_with_flags(Config::default())?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn load(&self, path: &Path) -> Result<Dataset, InfrastructureError> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| InfrastructureError::Io(std::io::Error::other("DuckDB Mutex Poisoned")))?;

        let source = path.to_string_lossy().replace('\'', "''");
        conn.execute(
            &format!("CREATE OR REPLACE TABLE batch AS SELECT * FROM read_csv_auto('{source}')"),
            [],
        )?;

        let columns = fetch_columns(&conn, "batch")?;
        if columns.is_empty() {
            return Ok(Dataset::default());
        }

        let select = format!(
            "SELECT {} FROM batch",
            columns
                .iter()
                .map(SourceColumn::projection)
                .collect::<Vec<_>>()
                .join(", ")
        );
        let mut stmt = conn.prepare(&select)?;
        let mut rows = stmt.query([])?;

        let mut cells: Vec<Vec<Value>> = vec![Vec::new(); columns.len()];
        while let Some(row) = rows.next()? {
            for (i, col) in columns.iter().enumerate() {
                let value = match col.kind() {
                    ColumnKind::Numeric => Value::from_option(row.get::<_, Option<f64>>(i)?),
                    ColumnKind::Boolean => row
                        .get::<_, Option<bool>>(i)?
                        .map(Value::Bool)
                        .unwrap_or(Value::Missing),
                    _ => row
                        .get::<_, Option<String>>(i)?
                        .map(Value::Text)
                        .unwrap_or(Value::Missing),
                };
                cells[i].push(value);
            }
        }

        let dataset = Dataset::from_columns(
            columns
                .iter()
                .zip(cells)
                .map(|(col, values)| (col.name.clone(), Column::new(col.kind(), values))),
        )
        .map_err(|e| InfrastructureError::ConfigError(e.to_string()))?;

        conn.execute("DROP TABLE IF EXISTS batch", [])?;
        Ok(dataset)
    }
}

fn fetch_columns(conn: &Connection, table: &str) -> Result<Vec<SourceColumn>, InfrastructureError> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info('{}')", table))?;
    let rows = stmt.query_map([], |row| {
        Ok(SourceColumn {
            name: row.get("name")?,
            data_type: row.get("type")?,
        })
    })?;

    let mut columns = Vec::new();
    for row in rows {
        columns.push(row?);
    }
    Ok(columns)
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

impl DatasetReader for DuckDbReader {
    #[instrument(skip(self), fields(engine = "duckdb"))]
    fn read(&self, path: &Path) -> Result<Dataset, GuardError> {
        if !path.exists() {
            return Err(InfrastructureError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("Input file not found: {}", path.display()),
            ))
            .into());
        }
        let dataset = self.load(path)?;
        debug!(rows = dataset.len(), columns = dataset.column_names().len(), "Batch loaded");
        Ok(dataset)
    }

    fn engine_name(&self) -> &str {
        "duckdb"
    }
}
