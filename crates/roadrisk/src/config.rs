//! Pipeline configuration: artifact paths, schema mapping, training and
//! prediction settings.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, RoadriskError};
use crate::model::TextPolicy;
use crate::schema::SchemaMapping;

/// Locations of the pipeline's input and output artifacts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactPaths {
    /// Raw accident table.
    pub raw: PathBuf,
    /// Cleaned table written by preprocessing.
    pub clean: PathBuf,
    /// Model bundle written by training.
    pub model: PathBuf,
    /// Metrics written by training.
    pub metrics: PathBuf,
}

impl Default for ArtifactPaths {
    fn default() -> Self {
        Self {
            raw: PathBuf::from("data/raw/accidents_raw.csv"),
            clean: PathBuf::from("data/processed/accidents_clean.csv"),
            model: PathBuf::from("models/severity_model.json"),
            metrics: PathBuf::from("models/metrics.json"),
        }
    }
}

impl ArtifactPaths {
    /// Default layout rooted at `root` instead of the working directory.
    pub fn under(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        let defaults = Self::default();
        Self {
            raw: root.join(defaults.raw),
            clean: root.join(defaults.clean),
            model: root.join(defaults.model),
            metrics: root.join(defaults.metrics),
        }
    }
}

/// Classifier training settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Fraction of each class held out for evaluation.
    pub test_size: f64,
    pub seed: u64,
    pub n_estimators: usize,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    /// Labeled rows each present class needs before training is attempted.
    pub min_samples_per_class: usize,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            test_size: 0.2,
            seed: 42,
            n_estimators: 200,
            max_depth: None,
            min_samples_split: 2,
            min_samples_per_class: 2,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictionConfig {
    /// Trim and lower-case text inputs before encoding.
    pub normalize_text: bool,
}

impl PredictionConfig {
    pub fn text_policy(&self) -> TextPolicy {
        if self.normalize_text {
            TextPolicy::Normalize
        } else {
            TextPolicy::AsIs
        }
    }
}

/// Complete pipeline configuration.
///
/// Every field has a default, so a partial JSON document is valid.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub paths: ArtifactPaths,
    pub schema: SchemaMapping,
    pub training: TrainingConfig,
    pub prediction: PredictionConfig,
}

impl PipelineConfig {
    /// Default configuration with artifacts under `root`.
    pub fn rooted_at(root: impl AsRef<Path>) -> Self {
        Self {
            paths: ArtifactPaths::under(root),
            ..Self::default()
        }
    }

    /// Read a JSON configuration file and validate it.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(RoadriskError::MissingArtifact {
                kind: "configuration file",
                path: path.to_path_buf(),
            });
        }
        let content = fs::read_to_string(path).map_err(|e| RoadriskError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: PipelineConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings no training run could satisfy.
    pub fn validate(&self) -> Result<()> {
        let training = &self.training;
        if !(training.test_size > 0.0 && training.test_size < 1.0) {
            return Err(RoadriskError::Config(format!(
                "training.test_size must be between 0 and 1 (exclusive), got {}",
                training.test_size
            )));
        }
        if training.n_estimators == 0 {
            return Err(RoadriskError::Config(
                "training.n_estimators must be at least 1".to_string(),
            ));
        }
        if training.min_samples_per_class < 2 {
            return Err(RoadriskError::Config(format!(
                "training.min_samples_per_class must be at least 2, got {}",
                training.min_samples_per_class
            )));
        }
        if self.schema.target_column.trim().is_empty() {
            return Err(RoadriskError::Config("schema.target_column is empty".to_string()));
        }
        Ok(())
    }
}
