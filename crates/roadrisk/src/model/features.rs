//! Single-record feature input for prediction.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::schema::columns;
use crate::table::{Cell, Table, Value};

/// Feature values keyed by canonical column name.
///
/// A key mapped to `None` is a known-missing value; an absent key is an
/// error at prediction time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureRow {
    values: IndexMap<String, Cell>,
}

impl FeatureRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert of a present value.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(name.into(), Some(value.into()));
        self
    }

    /// Builder-style insert of a missing value.
    pub fn with_missing(mut self, name: impl Into<String>) -> Self {
        self.values.insert(name.into(), None);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, cell: Cell) {
        self.values.insert(name.into(), cell);
    }

    /// `None` if the key is absent, `Some(None)` if present but missing.
    pub fn get(&self, name: &str) -> Option<&Cell> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Cell)> {
        self.values.iter()
    }

    /// Row `row` of a table restricted to `features`; absent columns are skipped.
    pub fn from_table_row(table: &Table, row: usize, features: &[String]) -> Self {
        let mut values = IndexMap::with_capacity(features.len());
        for name in features {
            if let Some(column) = table.column(name) {
                values.insert(name.clone(), column.values[row].clone());
            }
        }
        Self { values }
    }

    /// Copy with text values trimmed and lower-cased, as the cleaned table
    /// stores them. Derived temporal labels such as `weekday` are left as is.
    pub fn normalized(&self) -> Self {
        let values = self
            .values
            .iter()
            .map(|(name, cell)| {
                let cell = match cell {
                    Some(Value::Text(s)) if !columns::DERIVED.contains(&name.as_str()) => {
                        Some(Value::Text(s.trim().to_lowercase()))
                    }
                    other => other.clone(),
                };
                (name.clone(), cell)
            })
            .collect();
        Self { values }
    }
}

impl FromIterator<(String, Cell)> for FeatureRow {
    fn from_iter<I: IntoIterator<Item = (String, Cell)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}
