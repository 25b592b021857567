//! Train command - fit the severity classifier and write model artifacts.

use std::path::PathBuf;

use colored::Colorize;
use roadrisk::{Pipeline, PipelineConfig};

use super::CommandResult;

pub fn run(
    config: PipelineConfig,
    input: Option<PathBuf>,
    model: Option<PathBuf>,
    metrics: Option<PathBuf>,
    verbose: bool,
) -> CommandResult {
    let input = input.unwrap_or_else(|| config.paths.clean.clone());
    let model = model.unwrap_or_else(|| config.paths.model.clone());
    let metrics = metrics.unwrap_or_else(|| config.paths.metrics.clone());
    let trees = config.training.n_estimators;
    let pipeline = Pipeline::with_config(config)?;

    println!(
        "{} {} ({} trees)",
        "Training on".cyan().bold(),
        input.display().to_string().white(),
        trees
    );

    let summary = pipeline.train_file(&input, &model, &metrics)?;
    let report = &summary.metrics;

    println!(
        "Accuracy: {}",
        format!("{:.3}", report.accuracy).white().bold()
    );

    if verbose {
        println!();
        println!(
            "{:14} {:>9} {:>9} {:>9} {:>9}",
            "", "precision", "recall", "f1-score", "support"
        );
        for (label, m) in &report.report {
            println!(
                "{:14} {:>9.2} {:>9.2} {:>9.2} {:>9}",
                label, m.precision, m.recall, m.f1_score, m.support
            );
        }
        println!();
        println!("Features: {}", report.features.join(", "));
    }

    println!(
        "{} {}",
        "Saved model to".green().bold(),
        summary.model_path.display().to_string().white()
    );
    println!(
        "{} {}",
        "Saved metrics to".green().bold(),
        summary.metrics_path.display().to_string().white()
    );

    Ok(())
}
