//! Typed cell values.

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::input::DataTable;
use crate::schema::ColumnType;

/// Format used to write and recognize timestamps in the cleaned table.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A present cell value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Integer(i64),
    Float(f64),
    Text(String),
    Timestamp(NaiveDateTime),
}

/// A cell that may be missing.
pub type Cell = Option<Value>;

impl Value {
    pub fn text(s: impl Into<String>) -> Self {
        Value::Text(s.into())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            Value::Float(f) if f.fract() == 0.0 => Some(*f as i64),
            _ => None,
        }
    }

    /// Numeric view; text is parsed leniently.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            Value::Text(s) => s.trim().parse().ok(),
            Value::Timestamp(_) => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        match self {
            Value::Timestamp(ts) => Some(*ts),
            _ => None,
        }
    }

    /// The column type this value belongs to.
    pub fn column_type(&self) -> ColumnType {
        match self {
            Value::Integer(_) => ColumnType::Integer,
            Value::Float(_) => ColumnType::Float,
            Value::Text(_) => ColumnType::String,
            Value::Timestamp(_) => ColumnType::DateTime,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Text(s) => f.write_str(s),
            Value::Timestamp(ts) => write!(f, "{}", ts.format(TIMESTAMP_FORMAT)),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

/// Render a cell for output; missing cells render empty.
pub fn render_cell(cell: &Cell) -> String {
    cell.as_ref().map(|v| v.to_string()).unwrap_or_default()
}

/// Decide a column's type from its raw strings.
///
/// Missing tokens are skipped. A column is numeric or datetime only if every
/// remaining value parses as such; a column with no values is `Unknown`.
pub fn infer_column_type<'a>(values: impl Iterator<Item = &'a str>) -> ColumnType {
    let mut inferred = ColumnType::Unknown;

    for raw in values {
        if DataTable::is_null_value(raw) {
            continue;
        }
        let value = raw.trim();
        let this = if value.parse::<i64>().is_ok() {
            ColumnType::Integer
        } else if value.parse::<f64>().is_ok() {
            ColumnType::Float
        } else if NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT).is_ok() {
            ColumnType::DateTime
        } else {
            return ColumnType::String;
        };

        inferred = match (inferred, this) {
            (ColumnType::Unknown, t) => t,
            (a, b) if a == b => a,
            (ColumnType::Integer, ColumnType::Float) | (ColumnType::Float, ColumnType::Integer) => {
                ColumnType::Float
            }
            _ => return ColumnType::String,
        };
    }

    inferred
}

/// Convert a raw string to a cell of the given column type.
pub fn parse_cell(raw: &str, column_type: ColumnType) -> Cell {
    if DataTable::is_null_value(raw) {
        return None;
    }
    let trimmed = raw.trim();
    match column_type {
        ColumnType::Integer => trimmed.parse().ok().map(Value::Integer),
        ColumnType::Float => trimmed.parse().ok().map(Value::Float),
        ColumnType::DateTime => NaiveDateTime::parse_from_str(trimmed, TIMESTAMP_FORMAT)
            .ok()
            .map(Value::Timestamp),
        ColumnType::String => Some(Value::Text(raw.to_string())),
        ColumnType::Unknown => None,
    }
}
