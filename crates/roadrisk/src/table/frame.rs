//! Column-major table of typed cells.

use std::collections::HashSet;

use chrono::NaiveDateTime;

use super::value::{infer_column_type, parse_cell, Cell, Value};
use crate::input::DataTable;
use crate::schema::ColumnType;

/// A named column of cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<Cell>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<Cell>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// A column of `len` missing cells.
    pub fn missing(name: impl Into<String>, len: usize) -> Self {
        Self::new(name, vec![None; len])
    }

    /// Type observed across present cells.
    ///
    /// Integers and floats together count as float; any other mix is string.
    pub fn observed_type(&self) -> ColumnType {
        let mut observed = ColumnType::Unknown;
        for value in self.values.iter().flatten() {
            let this = value.column_type();
            observed = match (observed, this) {
                (ColumnType::Unknown, t) => t,
                (a, b) if a == b => a,
                (ColumnType::Integer, ColumnType::Float)
                | (ColumnType::Float, ColumnType::Integer) => ColumnType::Float,
                _ => return ColumnType::String,
            };
        }
        observed
    }

    pub fn missing_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_none()).count()
    }

    pub fn is_all_missing(&self) -> bool {
        self.values.iter().all(|v| v.is_none())
    }
}

/// A rectangular table with named columns.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<Column>,
    row_count: usize,
}

/// Hashable view of a cell used for exact-row comparison.
#[derive(PartialEq, Eq, Hash)]
enum CellKey<'a> {
    Missing,
    Integer(i64),
    Float(u64),
    Text(&'a str),
    Timestamp(NaiveDateTime),
}

impl<'a> From<&'a Cell> for CellKey<'a> {
    fn from(cell: &'a Cell) -> Self {
        match cell {
            None => CellKey::Missing,
            Some(Value::Integer(i)) => CellKey::Integer(*i),
            Some(Value::Float(f)) => CellKey::Float(f.to_bits()),
            Some(Value::Text(s)) => CellKey::Text(s),
            Some(Value::Timestamp(ts)) => CellKey::Timestamp(*ts),
        }
    }
}

impl Table {
    /// An empty table with `row_count` rows and no columns.
    pub fn with_rows(row_count: usize) -> Self {
        Self {
            columns: Vec::new(),
            row_count,
        }
    }

    /// Build a table from columns of equal length.
    ///
    /// # Panics
    ///
    /// Panics if the columns differ in length.
    pub fn from_columns(columns: Vec<Column>) -> Self {
        let row_count = columns.first().map(|c| c.values.len()).unwrap_or(0);
        assert!(
            columns.iter().all(|c| c.values.len() == row_count),
            "all columns must have the same length"
        );
        Self { columns, row_count }
    }

    /// Type every column of a raw table by inspecting its values.
    pub fn from_raw(raw: &DataTable) -> Self {
        let columns = raw
            .headers
            .iter()
            .enumerate()
            .map(|(idx, header)| {
                let column_type = infer_column_type(raw.column_values(idx));
                let values = raw
                    .column_values(idx)
                    .map(|v| parse_cell(v, column_type))
                    .collect();
                Column::new(header.clone(), values)
            })
            .collect();

        Self {
            columns,
            row_count: raw.row_count(),
        }
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn columns_mut(&mut self) -> impl Iterator<Item = &mut Column> {
        self.columns.iter_mut()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index_of(name).is_some()
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_mut(&mut self, name: &str) -> Option<&mut Column> {
        self.columns.iter_mut().find(|c| c.name == name)
    }

    /// Cell at `row` in the named column.
    pub fn get(&self, row: usize, name: &str) -> Option<&Value> {
        self.column(name)?.values.get(row)?.as_ref()
    }

    /// Replace a column's values, or append it if absent.
    ///
    /// # Panics
    ///
    /// Panics if `values` does not match the row count.
    pub fn set_column(&mut self, name: &str, values: Vec<Cell>) {
        assert_eq!(values.len(), self.row_count, "column '{}' has wrong length", name);
        match self.column_mut(name) {
            Some(column) => column.values = values,
            None => self.columns.push(Column::new(name, values)),
        }
    }

    /// Rename a column in place. Returns false if `from` is absent.
    pub fn rename_column(&mut self, from: &str, to: &str) -> bool {
        match self.column_mut(from) {
            Some(column) => {
                column.name = to.to_string();
                true
            }
            None => false,
        }
    }

    /// Keep only rows whose flag is true.
    pub fn retain_rows(&mut self, keep: &[bool]) {
        debug_assert_eq!(keep.len(), self.row_count);
        for column in &mut self.columns {
            let mut flags = keep.iter();
            column.values.retain(|_| *flags.next().unwrap_or(&false));
        }
        self.row_count = keep.iter().filter(|k| **k).count();
    }

    /// A new table holding the listed rows, in the given order.
    pub fn take_rows(&self, rows: &[usize]) -> Table {
        let columns = self
            .columns
            .iter()
            .map(|c| Column::new(c.name.clone(), rows.iter().map(|&r| c.values[r].clone()).collect()))
            .collect();
        Table {
            columns,
            row_count: rows.len(),
        }
    }

    /// Remove exact duplicate rows, keeping the first occurrence.
    ///
    /// Returns the number of rows removed.
    pub fn drop_duplicates(&mut self) -> usize {
        let mut seen: HashSet<Vec<CellKey<'_>>> = HashSet::with_capacity(self.row_count);
        let keep: Vec<bool> = (0..self.row_count)
            .map(|row| {
                let key = self
                    .columns
                    .iter()
                    .map(|c| CellKey::from(&c.values[row]))
                    .collect();
                seen.insert(key)
            })
            .collect();
        drop(seen);

        let removed = keep.iter().filter(|k| !**k).count();
        if removed > 0 {
            self.retain_rows(&keep);
        }
        removed
    }

    /// Cells of one row, in column order.
    pub fn row(&self, row: usize) -> Vec<&Cell> {
        self.columns.iter().map(|c| &c.values[row]).collect()
    }
}
