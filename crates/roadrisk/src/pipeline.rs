//! Pipeline facade: preprocess, train and predict against configured artifacts.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::PipelineConfig;
use crate::error::{Result, RoadriskError};
use crate::input::{Parser, ParserConfig, SourceMetadata};
use crate::model::{self, FeatureRow, MetricsReport, ModelBundle};
use crate::normalize::{NormalizeReport, Normalizer};
use crate::schema::Severity;
use crate::table::Table;

/// Outcome of a preprocessing run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreprocessSummary {
    pub source: SourceMetadata,
    pub output: PathBuf,
    pub rows: usize,
    pub columns: usize,
    pub report: NormalizeReport,
}

/// Outcome of a training run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingSummary {
    pub input: PathBuf,
    pub model_path: PathBuf,
    pub metrics_path: PathBuf,
    pub metrics: MetricsReport,
}

/// Runs the pipeline stages under one configuration.
pub struct Pipeline {
    config: PipelineConfig,
    parser: Parser,
    normalizer: Normalizer,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Pipeline {
    /// Pipeline with the default configuration.
    pub fn new() -> Self {
        Self::build(PipelineConfig::default())
    }

    /// Pipeline with a validated custom configuration.
    pub fn with_config(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: PipelineConfig) -> Self {
        let normalizer = Normalizer::with_mapping(config.schema.clone());
        Self {
            config,
            parser: Parser::with_config(ParserConfig {
                allow_empty: true,
                ..ParserConfig::default()
            }),
            normalizer,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Normalize an in-memory table.
    pub fn normalize(&self, table: Table) -> (Table, NormalizeReport) {
        self.normalizer.normalize(table)
    }

    /// Normalize the configured raw table into the configured clean path.
    pub fn preprocess(&self) -> Result<PreprocessSummary> {
        self.preprocess_file(&self.config.paths.raw, &self.config.paths.clean)
    }

    /// Normalize `input` and write the cleaned table to `output`.
    pub fn preprocess_file(&self, input: &Path, output: &Path) -> Result<PreprocessSummary> {
        require_artifact("raw accident table", input)?;

        let (raw, source) = self.parser.parse_file(input)?;
        let table = Table::from_raw(&raw);
        let (clean, report) = self.normalize(table);
        clean.write_csv(output)?;

        info!(
            input = %input.display(),
            output = %output.display(),
            rows_in = report.rows_in,
            rows_out = report.rows_out,
            columns = clean.column_count(),
            "Preprocessed accident table"
        );

        Ok(PreprocessSummary {
            source,
            output: output.to_path_buf(),
            rows: clean.row_count(),
            columns: clean.column_count(),
            report,
        })
    }

    /// Train on an in-memory cleaned table without writing artifacts.
    pub fn train_table(&self, table: &Table) -> Result<(ModelBundle, MetricsReport)> {
        model::train(table, &self.config.schema, &self.config.training)
    }

    /// Train from the configured clean path and write the configured artifacts.
    pub fn train(&self) -> Result<TrainingSummary> {
        let paths = &self.config.paths;
        self.train_file(&paths.clean, &paths.model, &paths.metrics)
    }

    /// Train from `input`, writing the bundle to `model_path` and metrics to `metrics_path`.
    pub fn train_file(&self, input: &Path, model_path: &Path, metrics_path: &Path) -> Result<TrainingSummary> {
        require_artifact("cleaned accident table", input)?;

        let table = Table::read_csv(input)?;
        let (bundle, metrics) = self.train_table(&table)?;
        bundle.save(model_path)?;
        metrics.save(metrics_path)?;

        info!(
            model = %model_path.display(),
            metrics = %metrics_path.display(),
            features = metrics.features.len(),
            "Saved model artifacts"
        );

        Ok(TrainingSummary {
            input: input.to_path_buf(),
            model_path: model_path.to_path_buf(),
            metrics_path: metrics_path.to_path_buf(),
            metrics,
        })
    }

    /// Load the bundle at the configured model path.
    pub fn load_model(&self) -> Result<ModelBundle> {
        ModelBundle::load(&self.config.paths.model)
    }

    /// Load the cleaned table at the configured path.
    pub fn load_clean(&self) -> Result<Table> {
        let path = &self.config.paths.clean;
        require_artifact("cleaned accident table", path)?;
        Table::read_csv(path)
    }

    /// Predict under the configured text policy.
    pub fn predict(&self, bundle: &ModelBundle, row: &FeatureRow) -> Result<Severity> {
        bundle.predict_with(row, self.config.prediction.text_policy())
    }
}

fn require_artifact(kind: &'static str, path: &Path) -> Result<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(RoadriskError::MissingArtifact {
            kind,
            path: path.to_path_buf(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_preprocess_missing_raw() {
        let dir = TempDir::new().unwrap();
        let pipeline = Pipeline::with_config(PipelineConfig::rooted_at(dir.path())).unwrap();

        match pipeline.preprocess() {
            Err(RoadriskError::MissingArtifact { kind, path }) => {
                assert_eq!(kind, "raw accident table");
                assert!(path.ends_with("data/raw/accidents_raw.csv"));
            }
            other => panic!("expected MissingArtifact, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_train_missing_clean() {
        let dir = TempDir::new().unwrap();
        let pipeline = Pipeline::with_config(PipelineConfig::rooted_at(dir.path())).unwrap();
        assert!(matches!(
            pipeline.train(),
            Err(RoadriskError::MissingArtifact { .. })
        ));
        assert!(matches!(
            pipeline.load_model(),
            Err(RoadriskError::MissingArtifact { .. })
        ));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = PipelineConfig::default();
        config.training.n_estimators = 0;
        assert!(Pipeline::with_config(config).is_err());
    }
}
