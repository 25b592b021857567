//! Fitted model bundle: encoder plus forest, saved as one JSON artifact.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::encoder::FeatureEncoder;
use super::features::FeatureRow;
use super::forest::RandomForest;
use crate::error::{Result, RoadriskError};
use crate::schema::Severity;
use crate::table::ensure_parent_dir;

/// Bumped when the serialized layout changes incompatibly.
pub const BUNDLE_FORMAT_VERSION: u32 = 1;

/// Whether prediction inputs get the same text normalization as the cleaned table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextPolicy {
    /// Values are used exactly as given.
    #[default]
    AsIs,
    /// Text values are trimmed and lower-cased first.
    Normalize,
}

/// A trained severity classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelBundle {
    pub format_version: u32,
    pub created_at: DateTime<Utc>,
    pub target: String,
    encoder: FeatureEncoder,
    forest: RandomForest,
}

impl ModelBundle {
    pub fn new(target: impl Into<String>, encoder: FeatureEncoder, forest: RandomForest) -> Self {
        Self {
            format_version: BUNDLE_FORMAT_VERSION,
            created_at: Utc::now(),
            target: target.into(),
            encoder,
            forest,
        }
    }

    /// Features the model was trained on, in order.
    pub fn features(&self) -> &[String] {
        self.encoder.features()
    }

    pub fn encoder(&self) -> &FeatureEncoder {
        &self.encoder
    }

    pub fn forest(&self) -> &RandomForest {
        &self.forest
    }

    /// Predict the severity of one record, using values as given.
    pub fn predict(&self, row: &FeatureRow) -> Result<Severity> {
        self.predict_with(row, TextPolicy::AsIs)
    }

    pub fn predict_with(&self, row: &FeatureRow, policy: TextPolicy) -> Result<Severity> {
        let proba = self.predict_proba_with(row, policy)?;
        let mut best = Severity::Low;
        let mut best_p = f64::NEG_INFINITY;
        for (severity, p) in proba {
            if p > best_p {
                best = severity;
                best_p = p;
            }
        }
        Ok(best)
    }

    /// Class probabilities in low, medium, high order.
    pub fn predict_proba_with(&self, row: &FeatureRow, policy: TextPolicy) -> Result<Vec<(Severity, f64)>> {
        let encoded = match policy {
            TextPolicy::AsIs => self.encoder.transform_row(row)?,
            TextPolicy::Normalize => self.encoder.transform_row(&row.normalized())?,
        };
        let proba = self.forest.predict_proba_row(&encoded);
        Ok(Severity::ALL
            .iter()
            .map(|s| (*s, proba.get(s.index()).copied().unwrap_or(0.0)))
            .collect())
    }

    /// Save as JSON. The file is written beside the target and renamed into
    /// place, so an existing bundle is never left half-written.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        ensure_parent_dir(path)?;

        let tmp = temp_sibling(path);
        let file = File::create(&tmp).map_err(|e| {
            RoadriskError::Persistence(format!("Failed to create file '{}': {}", tmp.display(), e))
        })?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, self).map_err(|e| {
            RoadriskError::Persistence(format!("Failed to serialize model bundle: {}", e))
        })?;
        writer.flush().map_err(|source| RoadriskError::Io {
            path: tmp.clone(),
            source,
        })?;
        drop(writer);

        fs::rename(&tmp, path).map_err(|e| {
            let _ = fs::remove_file(&tmp);
            RoadriskError::Persistence(format!(
                "Failed to move model bundle into '{}': {}",
                path.display(),
                e
            ))
        })?;

        debug!(path = %path.display(), trees = self.forest.trees().len(), "Saved model bundle");
        Ok(())
    }

    /// Load a bundle written by [`ModelBundle::save`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(RoadriskError::MissingArtifact {
                kind: "model bundle",
                path: path.to_path_buf(),
            });
        }

        let file = File::open(path).map_err(|e| {
            RoadriskError::Persistence(format!("Failed to open file '{}': {}", path.display(), e))
        })?;
        let bundle: ModelBundle = serde_json::from_reader(BufReader::new(file)).map_err(|e| {
            RoadriskError::Persistence(format!(
                "Failed to parse model bundle '{}': {}",
                path.display(),
                e
            ))
        })?;

        if bundle.format_version != BUNDLE_FORMAT_VERSION {
            return Err(RoadriskError::Persistence(format!(
                "Model bundle '{}' has format version {}, expected {}",
                path.display(),
                bundle.format_version,
                BUNDLE_FORMAT_VERSION
            )));
        }

        Ok(bundle)
    }
}

fn temp_sibling(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(format!(".tmp-{}", std::process::id()));
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{Column, Table, Value};
    use tempfile::TempDir;

    fn fitted() -> ModelBundle {
        let states = ["goa", "goa", "goa", "kerala", "kerala", "kerala"];
        let table = Table::from_columns(vec![Column::new(
            "state",
            states.iter().map(|s| Some(Value::text(*s))).collect(),
        )]);
        let features = vec!["state".to_string()];
        let encoder = FeatureEncoder::fit(&table, &features).unwrap();
        let x = encoder.transform(&table).unwrap();
        let mut forest = RandomForest::new(10).with_seed(42);
        forest.fit(&x, &[0, 0, 0, 2, 2, 2], 3).unwrap();
        ModelBundle::new("severity", encoder, forest)
    }

    #[test]
    fn test_predict_policies() {
        let bundle = fitted();
        let row = FeatureRow::new().with("state", " Kerala ");

        assert_eq!(
            bundle.predict_with(&row, TextPolicy::Normalize).unwrap(),
            Severity::High
        );
        let goa = FeatureRow::new().with("state", "goa");
        assert_eq!(bundle.predict(&goa).unwrap(), Severity::Low);

        let proba = bundle.predict_proba_with(&goa, TextPolicy::AsIs).unwrap();
        let order: Vec<Severity> = proba.iter().map(|(s, _)| *s).collect();
        assert_eq!(order, Severity::ALL.to_vec());
        assert_eq!(proba[1].1, 0.0);
        assert!((proba.iter().map(|(_, p)| p).sum::<f64>() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("models").join("severity_model.json");
        let bundle = fitted();

        bundle.save(&path).unwrap();
        let loaded = ModelBundle::load(&path).unwrap();

        assert_eq!(loaded.features(), &["state".to_string()]);
        assert_eq!(loaded.forest().trees().len(), 10);
        let row = FeatureRow::new().with("state", "kerala");
        assert_eq!(loaded.predict(&row).unwrap(), bundle.predict(&row).unwrap());
        let leftovers: Vec<_> = fs::read_dir(path.parent().unwrap()).unwrap().collect();
        assert_eq!(leftovers.len(), 1);
    }

    #[test]
    fn test_load_missing_is_missing_artifact() {
        let dir = TempDir::new().unwrap();
        let err = ModelBundle::load(dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, RoadriskError::MissingArtifact { .. }));
    }
}
