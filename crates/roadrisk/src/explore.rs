//! Filtering and group counts over the cleaned table.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{Result, RoadriskError};
use crate::schema::columns;
use crate::table::{Cell, Column, Table, Value, render_cell};

/// Row filter; `None` fields match every row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExploreFilter {
    pub state: Option<String>,
    pub year: Option<i64>,
    pub vehicle_type: Option<String>,
}

impl ExploreFilter {
    pub fn is_empty(&self) -> bool {
        self.state.is_none() && self.year.is_none() && self.vehicle_type.is_none()
    }

    fn matches(&self, table: &Table, row: usize) -> bool {
        let text_matches = |column: &str, wanted: &Option<String>| match wanted {
            None => true,
            Some(w) => table.get(row, column).and_then(Value::as_text) == Some(w.as_str()),
        };
        let year_matches = match self.year {
            None => true,
            Some(y) => table
                .get(row, columns::YEAR)
                .and_then(Value::as_f64)
                .is_some_and(|v| v == y as f64),
        };

        text_matches(columns::STATE, &self.state)
            && year_matches
            && text_matches(columns::VEHICLE_TYPE, &self.vehicle_type)
    }
}

/// Number of rows sharing one value of the grouping column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupCount {
    /// `None` collects rows where the grouping value is missing.
    pub key: Cell,
    pub count: usize,
}

impl GroupCount {
    pub fn label(&self) -> String {
        match &self.key {
            Some(_) => render_cell(&self.key),
            None => "(missing)".to_string(),
        }
    }
}

/// Ordering for group keys: numbers numerically, everything else by its
/// rendered text, missing last.
fn compare_cells(a: &Cell, b: &Cell) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(x), Some(y)) => match (x, y) {
            (Value::Integer(_) | Value::Float(_), Value::Integer(_) | Value::Float(_)) => {
                let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
                x.total_cmp(&y)
            }
            (Value::Timestamp(x), Value::Timestamp(y)) => x.cmp(y),
            _ => x.to_string().cmp(&y.to_string()),
        },
    }
}

fn require_column<'a>(table: &'a Table, name: &str) -> Result<&'a Column> {
    table
        .column(name)
        .ok_or_else(|| RoadriskError::Config(format!("Unknown column '{}'", name)))
}

/// Rows matching the filter.
pub fn filter_rows(table: &Table, filter: &ExploreFilter) -> Table {
    if filter.is_empty() {
        return table.clone();
    }
    let rows: Vec<usize> = (0..table.row_count())
        .filter(|&row| filter.matches(table, row))
        .collect();
    table.take_rows(&rows)
}

/// Count rows per distinct value of `column`, sorted by value.
pub fn group_counts(table: &Table, column: &str) -> Result<Vec<GroupCount>> {
    let column = require_column(table, column)?;

    let mut groups: HashMap<Option<String>, GroupCount> = HashMap::new();
    for cell in &column.values {
        let key = cell.as_ref().map(|v| v.to_string());
        groups
            .entry(key)
            .or_insert_with(|| GroupCount {
                key: cell.clone(),
                count: 0,
            })
            .count += 1;
    }

    let mut counts: Vec<GroupCount> = groups.into_values().collect();
    counts.sort_by(|a, b| compare_cells(&a.key, &b.key));
    Ok(counts)
}

/// Filter, then count rows per value of `group_by`.
pub fn explore(table: &Table, filter: &ExploreFilter, group_by: &str) -> Result<Vec<GroupCount>> {
    let filtered = filter_rows(table, filter);
    group_counts(&filtered, group_by)
}

/// Accident count per state.
pub fn state_counts(table: &Table) -> Result<Vec<GroupCount>> {
    group_counts(table, columns::STATE)
}

/// Sorted distinct present values of a column.
pub fn distinct_values(table: &Table, column: &str) -> Result<Vec<Value>> {
    Ok(group_counts(table, column)?
        .into_iter()
        .filter_map(|g| g.key)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Cell {
        Some(Value::text(s))
    }

    fn int(i: i64) -> Cell {
        Some(Value::Integer(i))
    }

    fn table() -> Table {
        Table::from_columns(vec![
            Column::new("state", vec![text("goa"), text("kerala"), text("goa"), text("goa")]),
            Column::new("year", vec![int(2022), int(2023), int(2023), None]),
            Column::new("vehicle_type", vec![text("car"), text("bus"), text("bus"), text("car")]),
            Column::new("month", vec![int(10), int(2), None, int(2)]),
        ])
    }

    #[test]
    fn test_group_counts_sorted_numerically_missing_last() {
        let counts = group_counts(&table(), "month").unwrap();
        let keys: Vec<String> = counts.iter().map(GroupCount::label).collect();
        assert_eq!(keys, vec!["2", "10", "(missing)"]);
        assert_eq!(counts[0].count, 2);
    }

    #[test]
    fn test_filter_combines_fields() {
        let filter = ExploreFilter {
            state: Some("goa".to_string()),
            year: Some(2023),
            ..ExploreFilter::default()
        };
        let filtered = filter_rows(&table(), &filter);
        assert_eq!(filtered.row_count(), 1);
        assert_eq!(filtered.get(0, "vehicle_type"), Some(&Value::text("bus")));
    }

    #[test]
    fn test_explore_and_state_counts() {
        let filter = ExploreFilter {
            vehicle_type: Some("car".to_string()),
            ..ExploreFilter::default()
        };
        let counts = explore(&table(), &filter, "state").unwrap();
        assert_eq!(counts, vec![GroupCount { key: text("goa"), count: 2 }]);

        let states = state_counts(&table()).unwrap();
        assert_eq!(states.len(), 2);
        assert_eq!(states[1].count, 1);
    }

    #[test]
    fn test_distinct_values_excludes_missing() {
        let years = distinct_values(&table(), "year").unwrap();
        assert_eq!(years, vec![Value::Integer(2022), Value::Integer(2023)]);
        assert!(distinct_values(&table(), "weather").is_err());
    }
}
