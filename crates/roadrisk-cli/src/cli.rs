//! CLI argument definitions using clap.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Roadrisk: road-accident normalization and severity prediction
#[derive(Parser)]
#[command(name = "roadrisk")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Pipeline configuration file (JSON)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Normalize a raw accident table into the cleaned table
    Preprocess {
        /// Raw accident table (default: paths.raw)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Cleaned table output (default: paths.clean)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Train the severity classifier on the cleaned table
    Train {
        /// Cleaned table (default: paths.clean)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Model bundle output (default: paths.model)
        #[arg(short, long)]
        model: Option<PathBuf>,

        /// Metrics output (default: paths.metrics)
        #[arg(long)]
        metrics: Option<PathBuf>,
    },

    /// Predict the severity of a single accident record
    Predict(PredictArgs),

    /// Count accidents in the cleaned table
    Explore {
        /// Only rows for this state
        #[arg(long)]
        state: Option<String>,

        /// Only rows for this year
        #[arg(long)]
        year: Option<i64>,

        /// Only rows for this vehicle type
        #[arg(long)]
        vehicle_type: Option<String>,

        /// Column to group counts by
        #[arg(long, default_value = "month")]
        by: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Feature values for a prediction. Omitted fields are sent as missing.
#[derive(Args, Default)]
pub struct PredictArgs {
    #[arg(long)]
    pub state: Option<String>,

    #[arg(long)]
    pub city: Option<String>,

    #[arg(long)]
    pub vehicle_type: Option<String>,

    #[arg(long)]
    pub weather: Option<String>,

    #[arg(long)]
    pub road_type: Option<String>,

    #[arg(long)]
    pub year: Option<i64>,

    #[arg(long)]
    pub month: Option<i64>,

    #[arg(long)]
    pub weekday: Option<String>,

    #[arg(long)]
    pub time_of_day: Option<String>,

    /// Full feature row as a JSON object (overrides the field flags)
    #[arg(long, value_name = "ROW")]
    pub json: Option<String>,

    /// Trim and lower-case text values before predicting
    #[arg(long)]
    pub normalize: bool,

    /// Model bundle (default: paths.model)
    #[arg(short, long)]
    pub model: Option<PathBuf>,
}
