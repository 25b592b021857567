//! CLI command implementations.

pub mod explore;
pub mod predict;
pub mod preprocess;
pub mod train;

use std::path::Path;

use roadrisk::PipelineConfig;

pub type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Configuration from `--config`, or the defaults.
pub fn load_config(path: Option<&Path>) -> Result<PipelineConfig, Box<dyn std::error::Error>> {
    match path {
        Some(path) => Ok(PipelineConfig::load(path)?),
        None => Ok(PipelineConfig::default()),
    }
}
