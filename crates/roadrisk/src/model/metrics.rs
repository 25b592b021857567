//! Evaluation metrics for the severity classifier.

use std::path::Path;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{Result, RoadriskError};
use crate::schema::Severity;
use crate::table::ensure_parent_dir;

/// Precision, recall, F1 and support for one class or average.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    #[serde(rename = "f1-score")]
    pub f1_score: f64,
    pub support: usize,
}

/// Fraction of predictions equal to the truth; 0 for empty input.
pub fn accuracy(y_true: &[usize], y_pred: &[usize]) -> f64 {
    if y_true.is_empty() {
        return 0.0;
    }
    let correct = y_true.iter().zip(y_pred).filter(|(t, p)| t == p).count();
    correct as f64 / y_true.len() as f64
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 { 0.0 } else { num as f64 / den as f64 }
}

/// Per-class report followed by `macro avg` and `weighted avg` entries.
///
/// Classes absent from both truth and predictions are omitted. Undefined
/// ratios are reported as 0.
pub fn classification_report(y_true: &[usize], y_pred: &[usize]) -> IndexMap<String, ClassMetrics> {
    let mut report = IndexMap::new();
    let mut per_class = Vec::new();

    for severity in Severity::ALL {
        let class = severity.index();
        let tp = y_true.iter().zip(y_pred).filter(|&(&t, &p)| t == class && p == class).count();
        let predicted = y_pred.iter().filter(|&&p| p == class).count();
        let support = y_true.iter().filter(|&&t| t == class).count();
        if support == 0 && predicted == 0 {
            continue;
        }

        let precision = ratio(tp, predicted);
        let recall = ratio(tp, support);
        let f1_score = if precision + recall == 0.0 {
            0.0
        } else {
            2.0 * precision * recall / (precision + recall)
        };
        let metrics = ClassMetrics {
            precision,
            recall,
            f1_score,
            support,
        };
        per_class.push(metrics);
        report.insert(severity.as_str().to_string(), metrics);
    }

    let n = per_class.len() as f64;
    let total: usize = per_class.iter().map(|m| m.support).sum();
    let mean = |f: fn(&ClassMetrics) -> f64| {
        if n == 0.0 { 0.0 } else { per_class.iter().map(f).sum::<f64>() / n }
    };
    let weighted = |f: fn(&ClassMetrics) -> f64| {
        if total == 0 {
            0.0
        } else {
            per_class.iter().map(|m| f(m) * m.support as f64).sum::<f64>() / total as f64
        }
    };

    report.insert(
        "macro avg".to_string(),
        ClassMetrics {
            precision: mean(|m| m.precision),
            recall: mean(|m| m.recall),
            f1_score: mean(|m| m.f1_score),
            support: total,
        },
    );
    report.insert(
        "weighted avg".to_string(),
        ClassMetrics {
            precision: weighted(|m| m.precision),
            recall: weighted(|m| m.recall),
            f1_score: weighted(|m| m.f1_score),
            support: total,
        },
    );

    report
}

/// Metrics written next to the model after training.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsReport {
    pub accuracy: f64,
    pub report: IndexMap<String, ClassMetrics>,
    pub features: Vec<String>,
    pub train_rows: usize,
    pub test_rows: usize,
    pub trained_at: DateTime<Utc>,
}

impl MetricsReport {
    pub fn evaluate(y_true: &[usize], y_pred: &[usize], features: Vec<String>, train_rows: usize) -> Self {
        Self {
            accuracy: accuracy(y_true, y_pred),
            report: classification_report(y_true, y_pred),
            features,
            train_rows,
            test_rows: y_true.len(),
            trained_at: Utc::now(),
        }
    }

    /// Write as pretty JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        ensure_parent_dir(path)?;
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|source| RoadriskError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(RoadriskError::MissingArtifact {
                kind: "metrics",
                path: path.to_path_buf(),
            });
        }
        let json = std::fs::read_to_string(path).map_err(|source| RoadriskError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&json)?)
    }
}
