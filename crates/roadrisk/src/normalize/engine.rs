//! Normalizer that turns a raw accident table into the canonical cleaned table.

use chrono::{Datelike, NaiveDateTime, Timelike};
use tracing::{debug, warn};

use crate::schema::{SchemaMapping, columns};
use crate::table::{Cell, Table, Value};

use super::operations::{NormalizeReport, NormalizeStep, StepChange};
use super::temporal::{reconstruct, time_of_day, weekday_name};

/// Applies the fixed normalization steps under a schema mapping.
///
/// `normalize` is a pure function of the input table and the mapping.
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    mapping: SchemaMapping,
}

impl Normalizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mapping(mapping: SchemaMapping) -> Self {
        Self { mapping }
    }

    pub fn mapping(&self) -> &SchemaMapping {
        &self.mapping
    }

    /// Normalize a table, returning the cleaned table and a step report.
    pub fn normalize(&self, mut table: Table) -> (Table, NormalizeReport) {
        let mut report = NormalizeReport {
            rows_in: table.row_count(),
            ..NormalizeReport::default()
        };

        let change = self.normalize_text(&mut table);
        report.add_change(change);

        let change = self.rename_columns(&mut table);
        report.add_change(change);

        let change = self.derive_temporal(&mut table, &mut report);
        report.add_change(change);

        let change = self.relabel_severity(&mut table, &mut report);
        report.add_change(change);

        let removed = table.drop_duplicates();
        report.add_change(StepChange {
            step: NormalizeStep::DropDuplicates,
            description: format!("Removed {} duplicate row(s)", removed),
            columns: Vec::new(),
            values_changed: removed,
        });

        let change = self.backfill_columns(&mut table);
        report.add_change(change);

        report.rows_out = table.row_count();
        for change in &report.changes {
            debug!(step = change.step.name(), changed = change.values_changed, "{}", change.description);
        }

        (table, report)
    }

    /// Trim and lower-case every text value in every column.
    fn normalize_text(&self, table: &mut Table) -> StepChange {
        let mut changed = 0;
        let mut touched = Vec::new();

        for column in table.columns_mut() {
            let mut column_changed = 0;
            for cell in column.values.iter_mut() {
                if let Some(Value::Text(s)) = cell {
                    let normalized = s.trim().to_lowercase();
                    if normalized != *s {
                        *s = normalized;
                        column_changed += 1;
                    }
                }
            }
            if column_changed > 0 {
                touched.push(column.name.clone());
                changed += column_changed;
            }
        }

        StepChange {
            step: NormalizeStep::NormalizeText,
            description: format!("Normalized {} text value(s)", changed),
            columns: touched,
            values_changed: changed,
        }
    }

    /// Rename alias headers to canonical names without overwriting.
    ///
    /// Headers that already spell a canonical name (up to case) claim it
    /// before any alias is considered.
    fn rename_columns(&self, table: &mut Table) -> StepChange {
        let mut renamed = Vec::new();
        let names = table.column_names();
        let (exact, aliases): (Vec<_>, Vec<_>) = names.iter().partition(|name| {
            self.mapping
                .canonical_name(name)
                .is_some_and(|canonical| canonical == name.trim().to_lowercase())
        });

        for name in exact.into_iter().chain(aliases) {
            let Some(canonical) = self.mapping.canonical_name(name) else {
                continue;
            };
            if canonical == name.as_str() || table.contains(canonical) {
                continue;
            }
            table.rename_column(name, canonical);
            renamed.push(format!("{} → {}", name, canonical));
        }

        StepChange {
            step: NormalizeStep::RenameColumns,
            description: format!("Renamed {} column(s): {}", renamed.len(), renamed.join(", ")),
            values_changed: renamed.len(),
            columns: renamed,
        }
    }

    /// Rebuild `datetime` and derive year, month, day, hour, weekday and time of day.
    fn derive_temporal(&self, table: &mut Table, report: &mut NormalizeReport) -> StepChange {
        let names = table.column_names();
        let date_source = self
            .mapping
            .find_date_column(&names)
            .map(str::to_string)
            .or_else(|| {
                table
                    .contains(columns::DATETIME)
                    .then(|| columns::DATETIME.to_string())
            });
        let time_source = self.mapping.find_time_column(&names).map(str::to_string);

        if date_source.is_none() {
            warn!("No date column found; temporal features will be missing");
        }

        let mut unparsed = 0;
        let stamps: Vec<Option<NaiveDateTime>> = (0..table.row_count())
            .map(|row| {
                let date = date_source.as_deref().and_then(|c| table.get(row, c));
                let time = time_source.as_deref().and_then(|c| table.get(row, c));
                let stamp = reconstruct(date, time);
                if date.is_some() && stamp.is_none() {
                    unparsed += 1;
                }
                stamp
            })
            .collect();

        table.set_column(columns::DATETIME, derive_column(&stamps, |ts| Value::Timestamp(*ts)));
        table.set_column(columns::YEAR, derive_column(&stamps, |ts| Value::Integer(ts.year() as i64)));
        table.set_column(columns::MONTH, derive_column(&stamps, |ts| Value::Integer(ts.month() as i64)));
        table.set_column(columns::DAY, derive_column(&stamps, |ts| Value::Integer(ts.day() as i64)));
        table.set_column(columns::HOUR, derive_column(&stamps, |ts| Value::Integer(ts.hour() as i64)));
        table.set_column(columns::WEEKDAY, derive_column(&stamps, |ts| Value::text(weekday_name(ts))));
        table.set_column(
            columns::TIME_OF_DAY,
            stamps
                .iter()
                .map(|ts| time_of_day(ts.as_ref()).map(|b| Value::text(b.label())))
                .collect(),
        );

        let parsed = stamps.iter().filter(|ts| ts.is_some()).count();
        report.date_column = date_source.clone();
        report.time_column = time_source.clone();
        report.unparsed_dates = unparsed;

        StepChange {
            step: NormalizeStep::DeriveTemporal,
            description: format!(
                "Reconstructed {} timestamp(s) from {} ({} unparseable)",
                parsed,
                date_source.as_deref().unwrap_or("no date column"),
                unparsed
            ),
            columns: vec![
                columns::DATETIME.to_string(),
                columns::YEAR.to_string(),
                columns::MONTH.to_string(),
                columns::DAY.to_string(),
                columns::HOUR.to_string(),
                columns::WEEKDAY.to_string(),
                columns::TIME_OF_DAY.to_string(),
            ],
            values_changed: parsed,
        }
    }

    /// Collapse severity synonyms; anything outside low/medium/high becomes missing.
    fn relabel_severity(&self, table: &mut Table, report: &mut NormalizeReport) -> StepChange {
        let target = self.mapping.target_column.clone();
        let mut relabeled = 0;
        let mut dropped = 0;

        if let Some(column) = table.column_mut(&target) {
            for cell in column.values.iter_mut() {
                let (token, current) = match cell.as_ref() {
                    None => continue,
                    Some(Value::Text(s)) => (s.trim().to_lowercase(), Some(s.clone())),
                    Some(other) => (other.to_string(), None),
                };
                match self.mapping.resolve_severity(&token) {
                    Some(severity) if current.as_deref() == Some(severity.as_str()) => {}
                    Some(severity) => {
                        *cell = Some(Value::text(severity.as_str()));
                        relabeled += 1;
                    }
                    None => {
                        *cell = None;
                        dropped += 1;
                    }
                }
            }
        }

        report.dropped_severity = dropped;

        StepChange {
            step: NormalizeStep::RelabelSeverity,
            description: format!(
                "Relabeled {} severity value(s), {} unknown value(s) set missing",
                relabeled, dropped
            ),
            columns: vec![target],
            values_changed: relabeled + dropped,
        }
    }

    /// Create required columns that are still absent, filled with missing.
    fn backfill_columns(&self, table: &mut Table) -> StepChange {
        let mut created = Vec::new();
        for name in &self.mapping.required_columns {
            if !table.contains(name) {
                table.set_column(name, vec![None; table.row_count()]);
                created.push(name.clone());
            }
        }

        StepChange {
            step: NormalizeStep::BackfillColumns,
            description: format!("Backfilled {} missing column(s)", created.len()),
            values_changed: created.len(),
            columns: created,
        }
    }
}

fn derive_column(stamps: &[Option<NaiveDateTime>], f: impl Fn(&NaiveDateTime) -> Value) -> Vec<Cell> {
    stamps.iter().map(|ts| ts.as_ref().map(&f)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Column;

    fn text(s: &str) -> Cell {
        Some(Value::text(s))
    }

    fn raw_table() -> Table {
        Table::from_columns(vec![
            Column::new("State/UT", vec![text(" Kerala "), text("GOA"), text("Goa")]),
            Column::new("Date", vec![text("15/01/2023"), text("garbage"), text("garbage")]),
            Column::new("Time", vec![text("19:30"), text("10:00"), text("10:00")]),
            Column::new("Severity", vec![text("Fatal"), text("Property"), text("property")]),
        ])
    }

    #[test]
    fn test_pipeline_steps() {
        let (table, report) = Normalizer::new().normalize(raw_table());

        assert_eq!(report.rows_in, 3);
        // rows 2 and 3 are identical after lower-casing
        assert_eq!(report.rows_out, 2);
        assert_eq!(report.duplicates_removed(), 1);
        assert_eq!(report.date_column.as_deref(), Some("Date"));
        assert_eq!(report.unparsed_dates, 2);

        assert_eq!(table.get(0, "state"), Some(&Value::text("kerala")));
        assert_eq!(table.get(0, "severity"), Some(&Value::text("high")));
        assert_eq!(table.get(1, "severity"), None);
        assert_eq!(table.get(0, "hour"), Some(&Value::Integer(19)));
        assert_eq!(table.get(0, "weekday"), Some(&Value::text("Sunday")));
        assert_eq!(table.get(0, "time_of_day"), Some(&Value::text("Evening (18-21)")));
        assert_eq!(table.get(1, "time_of_day"), Some(&Value::text("Night (0-5)")));
        assert_eq!(table.get(1, "year"), None);
    }

    #[test]
    fn test_iso_timestamp_survives_text_normalization() {
        let table = Table::from_columns(vec![
            Column::new("State/UT", vec![text("Kerala")]),
            Column::new("Date", vec![text("2023-01-15T14:30:00")]),
        ]);
        let (table, report) = Normalizer::new().normalize(table);

        assert_eq!(report.unparsed_dates, 0);
        assert_eq!(table.get(0, "year"), Some(&Value::Integer(2023)));
        assert_eq!(table.get(0, "hour"), Some(&Value::Integer(14)));
        assert_eq!(table.get(0, "weekday"), Some(&Value::text("Sunday")));
        assert_eq!(table.get(0, "time_of_day"), Some(&Value::text("Afternoon (12-17)")));
    }

    #[test]
    fn test_rename_does_not_overwrite() {
        let table = Table::from_columns(vec![
            Column::new("state", vec![text("kerala")]),
            Column::new("State/UT", vec![text("goa")]),
        ]);
        let (table, _) = Normalizer::new().normalize(table);

        assert_eq!(table.get(0, "state"), Some(&Value::text("kerala")));
        assert!(table.contains("State/UT"));
    }

    #[test]
    fn test_canonical_header_wins_over_alias() {
        let table = Table::from_columns(vec![
            Column::new("State/UT", vec![text("Goa")]),
            Column::new("State", vec![text("Kerala")]),
        ]);
        let (table, report) = Normalizer::new().normalize(table);

        assert_eq!(table.get(0, "state"), Some(&Value::text("kerala")));
        assert!(table.contains("State/UT"));
        assert!(!table.contains("State"));
        assert_eq!(
            report.change(NormalizeStep::RenameColumns).unwrap().values_changed,
            1
        );
    }

    #[test]
    fn test_backfill_required_columns() {
        let table = Table::from_columns(vec![Column::new("speed", vec![Some(Value::Integer(40))])]);
        let (table, report) = Normalizer::new().normalize(table);

        for name in ["state", "city", "vehicle_type", "weather", "road_type", "severity"] {
            assert!(table.column(name).unwrap().is_all_missing(), "{} should be backfilled", name);
        }
        assert_eq!(
            report.change(NormalizeStep::BackfillColumns).unwrap().values_changed,
            6
        );
        assert!(report.date_column.is_none());
    }

    #[test]
    fn test_numeric_severity_becomes_missing() {
        let table = Table::from_columns(vec![Column::new(
            "severity",
            vec![Some(Value::Integer(3)), text("Minor")],
        )]);
        let (table, report) = Normalizer::new().normalize(table);

        assert_eq!(table.get(0, "severity"), None);
        assert_eq!(table.get(1, "severity"), Some(&Value::text("low")));
        assert_eq!(report.dropped_severity, 1);
    }

    #[test]
    fn test_canonical_datetime_reused_as_date_source() {
        let ts = crate::normalize::temporal::parse_date_str("2023-03-01 07:15:00").unwrap();
        let table = Table::from_columns(vec![Column::new("datetime", vec![Some(Value::Timestamp(ts))])]);
        let (table, report) = Normalizer::new().normalize(table);

        assert_eq!(report.date_column.as_deref(), Some("datetime"));
        assert_eq!(table.get(0, "hour"), Some(&Value::Integer(7)));
        assert_eq!(table.get(0, "time_of_day"), Some(&Value::text("Morning (6-11)")));
    }
}
