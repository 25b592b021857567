//! Predict command - classify a single accident record.

use colored::Colorize;
use roadrisk::schema::columns;
use roadrisk::{FeatureRow, ModelBundle, PipelineConfig, Severity, TextPolicy, Value};

use super::CommandResult;
use crate::cli::PredictArgs;

/// Feature row from the field flags; every bundle feature not given is missing.
fn row_from_flags(args: &PredictArgs, bundle: &ModelBundle) -> FeatureRow {
    let text = |v: &Option<String>| v.clone().map(Value::Text);
    let int = |v: Option<i64>| v.map(Value::Integer);

    let mut row = FeatureRow::new();
    row.insert(columns::STATE, text(&args.state));
    row.insert(columns::CITY, text(&args.city));
    row.insert(columns::VEHICLE_TYPE, text(&args.vehicle_type));
    row.insert(columns::WEATHER, text(&args.weather));
    row.insert(columns::ROAD_TYPE, text(&args.road_type));
    row.insert(columns::YEAR, int(args.year));
    row.insert(columns::MONTH, int(args.month));
    row.insert(columns::WEEKDAY, text(&args.weekday));
    row.insert(columns::TIME_OF_DAY, text(&args.time_of_day));

    for name in bundle.features() {
        if !row.contains(name) {
            row.insert(name.clone(), None);
        }
    }
    row
}

fn colored_label(severity: Severity) -> colored::ColoredString {
    match severity {
        Severity::Low => severity.as_str().green().bold(),
        Severity::Medium => severity.as_str().yellow().bold(),
        Severity::High => severity.as_str().red().bold(),
    }
}

pub fn run(config: PipelineConfig, args: PredictArgs, verbose: bool) -> CommandResult {
    let model_path = args.model.clone().unwrap_or_else(|| config.paths.model.clone());
    let policy = if args.normalize || config.prediction.normalize_text {
        TextPolicy::Normalize
    } else {
        TextPolicy::AsIs
    };
    config.validate()?;

    let bundle = ModelBundle::load(&model_path)?;

    let row = match &args.json {
        Some(json) => serde_json::from_str::<FeatureRow>(json)?,
        None => row_from_flags(&args, &bundle),
    };

    if verbose {
        for (name, cell) in row.iter() {
            let shown = cell.as_ref().map(|v| v.to_string()).unwrap_or_else(|| "(missing)".into());
            println!("  {:14} {}", name, shown);
        }
        for (severity, p) in bundle.predict_proba_with(&row, policy)? {
            println!("  p({:6}) = {:.3}", severity.as_str(), p);
        }
        println!();
    }

    let severity = bundle.predict_with(&row, policy)?;
    println!("Predicted severity: {}", colored_label(severity));

    Ok(())
}
