//! Preprocess command - normalize the raw table into the cleaned table.

use std::path::PathBuf;

use colored::Colorize;
use roadrisk::{Pipeline, PipelineConfig};

use super::CommandResult;

pub fn run(
    config: PipelineConfig,
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    verbose: bool,
) -> CommandResult {
    let input = input.unwrap_or_else(|| config.paths.raw.clone());
    let output = output.unwrap_or_else(|| config.paths.clean.clone());
    let pipeline = Pipeline::with_config(config)?;

    println!(
        "{} {}",
        "Preprocessing".cyan().bold(),
        input.display().to_string().white()
    );

    let summary = pipeline.preprocess_file(&input, &output)?;
    println!(
        "Read {} rows x {} columns ({})",
        summary.source.row_count,
        summary.source.column_count,
        summary.source.format.cyan()
    );

    if verbose {
        println!();
        println!("{}", "Steps:".yellow().bold());
        for change in &summary.report.changes {
            println!("  {:18} {}", change.step.name(), change.description);
        }
        println!();
    }

    if summary.report.date_column.is_none() {
        println!(
            "{}",
            "No date column found; temporal columns are empty".yellow()
        );
    }
    if summary.report.unparsed_dates > 0 {
        println!(
            "{} date value(s) could not be parsed",
            summary.report.unparsed_dates.to_string().yellow()
        );
    }

    println!(
        "{} {} with shape ({}, {})",
        "Saved cleaned table to".green().bold(),
        summary.output.display().to_string().white(),
        summary.rows,
        summary.columns
    );

    Ok(())
}
