//! Declarative mapping from raw source naming to the canonical schema.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::types::Severity;

/// Canonical column names of the cleaned table.
pub mod columns {
    pub const STATE: &str = "state";
    pub const CITY: &str = "city";
    pub const VEHICLE_TYPE: &str = "vehicle_type";
    pub const WEATHER: &str = "weather";
    pub const ROAD_TYPE: &str = "road_type";
    pub const SEVERITY: &str = "severity";
    pub const DATETIME: &str = "datetime";
    pub const YEAR: &str = "year";
    pub const MONTH: &str = "month";
    pub const DAY: &str = "day";
    pub const HOUR: &str = "hour";
    pub const WEEKDAY: &str = "weekday";
    pub const TIME_OF_DAY: &str = "time_of_day";

    /// Columns rebuilt from the accident timestamp; their labels keep their case.
    pub const DERIVED: &[&str] = &[DATETIME, YEAR, MONTH, DAY, HOUR, WEEKDAY, TIME_OF_DAY];
}

/// Column aliases, label synonyms and the canonical column lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaMapping {
    /// Header names recognized as the accident date (case-insensitive).
    pub date_aliases: Vec<String>,
    /// Header names recognized as the accident time (case-insensitive).
    pub time_aliases: Vec<String>,
    /// Raw header (lower-case) to canonical column name.
    pub renames: IndexMap<String, String>,
    /// Fine-grained severity label to its collapsed class.
    pub severity_synonyms: IndexMap<String, Severity>,
    /// Columns guaranteed to exist in the cleaned table.
    pub required_columns: Vec<String>,
    /// Candidate feature columns, in encoding order.
    pub feature_columns: Vec<String>,
    /// Label column.
    pub target_column: String,
}

impl Default for SchemaMapping {
    fn default() -> Self {
        let strings = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();

        let renames = [
            ("state/ut", columns::STATE),
            ("district", columns::CITY),
            ("vehicle", columns::VEHICLE_TYPE),
            ("light", "light_conditions"),
            ("road", columns::ROAD_TYPE),
            ("weather_condition", columns::WEATHER),
            ("severity_of_accident", columns::SEVERITY),
        ]
        .into_iter()
        .map(|(from, to)| (from.to_string(), to.to_string()))
        .collect();

        let severity_synonyms = [
            ("fatal", Severity::High),
            ("grievous", Severity::Medium),
            ("serious", Severity::Medium),
            ("minor", Severity::Low),
            ("slight", Severity::Low),
        ]
        .into_iter()
        .map(|(from, to)| (from.to_string(), to))
        .collect();

        Self {
            date_aliases: strings(&["date", "accident_date", "crash_date"]),
            time_aliases: strings(&["time", "accident_time", "crash_time"]),
            renames,
            severity_synonyms,
            required_columns: strings(&[
                columns::STATE,
                columns::CITY,
                columns::VEHICLE_TYPE,
                columns::WEATHER,
                columns::ROAD_TYPE,
                columns::SEVERITY,
            ]),
            feature_columns: strings(&[
                columns::STATE,
                columns::CITY,
                columns::VEHICLE_TYPE,
                columns::WEATHER,
                columns::ROAD_TYPE,
                columns::YEAR,
                columns::MONTH,
                columns::WEEKDAY,
                columns::TIME_OF_DAY,
            ]),
            target_column: columns::SEVERITY.to_string(),
        }
    }
}

impl SchemaMapping {
    /// First header matching a date alias.
    pub fn find_date_column<'a>(&self, headers: &'a [String]) -> Option<&'a str> {
        find_alias(headers, &self.date_aliases)
    }

    /// First header matching a time alias.
    pub fn find_time_column<'a>(&self, headers: &'a [String]) -> Option<&'a str> {
        find_alias(headers, &self.time_aliases)
    }

    /// Canonical name for a raw header.
    ///
    /// Known aliases map to their target; a header that differs from a
    /// canonical name only in case or padding maps to that name.
    pub fn canonical_name(&self, header: &str) -> Option<&str> {
        let key = header.trim().to_lowercase();
        if let Some(target) = self.renames.get(&key) {
            return Some(target.as_str());
        }
        self.renames
            .values()
            .chain(self.required_columns.iter())
            .find(|name| **name == key)
            .map(|s| s.as_str())
    }

    /// Collapse a normalized severity token to a class.
    ///
    /// Canonical labels pass through; unknown tokens yield `None`.
    pub fn resolve_severity(&self, token: &str) -> Option<Severity> {
        self.severity_synonyms
            .get(token)
            .copied()
            .or_else(|| token.parse().ok())
    }
}

fn find_alias<'a>(headers: &'a [String], aliases: &[String]) -> Option<&'a str> {
    headers
        .iter()
        .find(|h| {
            let lower = h.trim().to_lowercase();
            aliases.iter().any(|a| a.eq_ignore_ascii_case(&lower))
        })
        .map(|h| h.as_str())
}
