//! Normalization steps and the report they produce.

use serde::{Deserialize, Serialize};

/// A normalization step, in the order the normalizer applies them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalizeStep {
    /// Trim and lower-case every text value.
    NormalizeText,
    /// Map known header aliases to canonical names.
    RenameColumns,
    /// Rebuild `datetime` and derive calendar features.
    DeriveTemporal,
    /// Collapse severity synonyms into low/medium/high.
    RelabelSeverity,
    /// Remove exact duplicate rows.
    DropDuplicates,
    /// Create required columns that are still absent.
    BackfillColumns,
}

impl NormalizeStep {
    pub fn name(&self) -> &'static str {
        match self {
            NormalizeStep::NormalizeText => "normalize_text",
            NormalizeStep::RenameColumns => "rename_columns",
            NormalizeStep::DeriveTemporal => "derive_temporal",
            NormalizeStep::RelabelSeverity => "relabel_severity",
            NormalizeStep::DropDuplicates => "drop_duplicates",
            NormalizeStep::BackfillColumns => "backfill_columns",
        }
    }
}

/// What a single step changed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepChange {
    pub step: NormalizeStep,
    /// Human-readable summary.
    pub description: String,
    /// Columns touched by the step.
    pub columns: Vec<String>,
    /// Values (or rows, for deduplication) changed.
    pub values_changed: usize,
}

/// Summary of one normalization run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NormalizeReport {
    pub rows_in: usize,
    pub rows_out: usize,
    /// Header used as the date source, if any.
    pub date_column: Option<String>,
    /// Header used as the time source, if any.
    pub time_column: Option<String>,
    /// Present date values that could not be parsed.
    pub unparsed_dates: usize,
    /// Severity values that were not a known label and became missing.
    pub dropped_severity: usize,
    pub changes: Vec<StepChange>,
}

impl NormalizeReport {
    pub fn add_change(&mut self, change: StepChange) {
        self.changes.push(change);
    }

    pub fn change(&self, step: NormalizeStep) -> Option<&StepChange> {
        self.changes.iter().find(|c| c.step == step)
    }

    /// Rows removed as duplicates.
    pub fn duplicates_removed(&self) -> usize {
        self.change(NormalizeStep::DropDuplicates)
            .map_or(0, |c| c.values_changed)
    }
}
