//! Core type definitions shared by the normalizer and the classifier.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Runtime type of a column, decided by inspecting its non-missing cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    /// Whole numbers (no decimal point).
    Integer,
    /// Floating-point numbers.
    Float,
    /// Text/string values.
    String,
    /// Date and time values.
    DateTime,
    /// Every cell is missing.
    #[default]
    Unknown,
}

impl ColumnType {
    /// Returns true if this type is numeric.
    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnType::Integer | ColumnType::Float)
    }
}

/// Accident severity class.
///
/// Ordered from least to most severe; the declaration order is also the
/// class index used by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub const ALL: [Severity; 3] = [Severity::Low, Severity::Medium, Severity::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    /// Parses a canonical label only; synonyms are resolved by the schema mapping.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Severity::Low),
            "medium" => Ok(Severity::Medium),
            "high" => Ok(Severity::High),
            other => Err(format!("Unknown severity: {}", other)),
        }
    }
}

/// Time-of-day bucket derived from the accident hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TimeOfDay {
    Night,
    Morning,
    Afternoon,
    Evening,
    Late,
}

impl TimeOfDay {
    /// Hour used when no hour is known. It lands in the lowest bucket.
    pub const MISSING_HOUR: i64 = -1;

    pub const ALL: [TimeOfDay; 5] = [
        TimeOfDay::Night,
        TimeOfDay::Morning,
        TimeOfDay::Afternoon,
        TimeOfDay::Evening,
        TimeOfDay::Late,
    ];

    /// Bucket an hour in `-1..=24`; anything outside that range has no bucket.
    pub fn from_hour(hour: i64) -> Option<Self> {
        match hour {
            -1..=5 => Some(TimeOfDay::Night),
            6..=11 => Some(TimeOfDay::Morning),
            12..=17 => Some(TimeOfDay::Afternoon),
            18..=21 => Some(TimeOfDay::Evening),
            22..=24 => Some(TimeOfDay::Late),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TimeOfDay::Night => "Night (0-5)",
            TimeOfDay::Morning => "Morning (6-11)",
            TimeOfDay::Afternoon => "Afternoon (12-17)",
            TimeOfDay::Evening => "Evening (18-21)",
            TimeOfDay::Late => "Late (22-24)",
        }
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_edges() {
        assert_eq!(TimeOfDay::from_hour(-1), Some(TimeOfDay::Night));
        assert_eq!(TimeOfDay::from_hour(5), Some(TimeOfDay::Night));
        assert_eq!(TimeOfDay::from_hour(6), Some(TimeOfDay::Morning));
        assert_eq!(TimeOfDay::from_hour(11), Some(TimeOfDay::Morning));
        assert_eq!(TimeOfDay::from_hour(12), Some(TimeOfDay::Afternoon));
        assert_eq!(TimeOfDay::from_hour(17), Some(TimeOfDay::Afternoon));
        assert_eq!(TimeOfDay::from_hour(18), Some(TimeOfDay::Evening));
        assert_eq!(TimeOfDay::from_hour(21), Some(TimeOfDay::Evening));
        assert_eq!(TimeOfDay::from_hour(22), Some(TimeOfDay::Late));
        assert_eq!(TimeOfDay::from_hour(24), Some(TimeOfDay::Late));
        assert_eq!(TimeOfDay::from_hour(25), None);
        assert_eq!(TimeOfDay::from_hour(-2), None);
    }

    #[test]
    fn test_severity_labels() {
        assert_eq!("  High ".parse::<Severity>(), Ok(Severity::High));
        assert!("fatal".parse::<Severity>().is_err());
        assert_eq!(Severity::from_index(1), Some(Severity::Medium));
        assert_eq!(Severity::Medium.index(), 1);
        assert!(Severity::Low < Severity::High);
    }
}
