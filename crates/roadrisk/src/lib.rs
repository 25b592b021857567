//! Roadrisk: road-accident record normalization and severity classification.
//!
//! Roadrisk turns heterogeneous accident tables into one canonical cleaned
//! table, then trains a random-forest classifier that predicts accident
//! severity (`low`, `medium`, `high`) from location, vehicle, road, weather
//! and time-of-occurrence attributes.
//!
//! # Core Principles
//!
//! - **Explicit configuration**: artifact paths, schema mapping and training
//!   settings travel in one [`PipelineConfig`] value
//! - **Missing is a value**: absent cells are `None`, never sentinels
//! - **Reproducible**: fixed seeds give identical splits and forests
//!
//! # Example
//!
//! ```no_run
//! use roadrisk::{FeatureRow, Pipeline};
//!
//! let pipeline = Pipeline::new();
//! pipeline.preprocess().unwrap();
//! let summary = pipeline.train().unwrap();
//! println!("Accuracy: {:.3}", summary.metrics.accuracy);
//!
//! let bundle = pipeline.load_model().unwrap();
//! let row = FeatureRow::new()
//!     .with("state", "maharashtra")
//!     .with_missing("city")
//!     .with("vehicle_type", "car")
//!     .with("weather", "clear")
//!     .with("road_type", "highway")
//!     .with("year", 2023i64)
//!     .with("month", 6i64)
//!     .with("weekday", "Monday")
//!     .with("time_of_day", "Afternoon (12-17)");
//! println!("Severity: {}", pipeline.predict(&bundle, &row).unwrap());
//! ```

pub mod config;
pub mod error;
pub mod explore;
pub mod input;
pub mod model;
pub mod normalize;
pub mod schema;
pub mod table;

mod pipeline;

pub use config::{ArtifactPaths, PipelineConfig, PredictionConfig, TrainingConfig};
pub use error::{Result, RoadriskError};
pub use explore::{ExploreFilter, GroupCount};
pub use input::{DataTable, SourceMetadata};
pub use model::{FeatureRow, MetricsReport, ModelBundle, TextPolicy};
pub use normalize::{NormalizeReport, Normalizer};
pub use pipeline::{Pipeline, PreprocessSummary, TrainingSummary};
pub use schema::{ColumnType, SchemaMapping, Severity, TimeOfDay};
pub use table::{Cell, Column, Table, Value};
