//! Explore command - filtered accident counts from the cleaned table.

use colored::Colorize;
use roadrisk::explore::{self, ExploreFilter};
use roadrisk::{Pipeline, PipelineConfig};

use super::CommandResult;

pub fn run(
    config: PipelineConfig,
    state: Option<String>,
    year: Option<i64>,
    vehicle_type: Option<String>,
    by: String,
    json: bool,
) -> CommandResult {
    let pipeline = Pipeline::with_config(config)?;
    let table = pipeline.load_clean()?;

    let filter = ExploreFilter {
        state,
        year,
        vehicle_type,
    };
    let filtered = explore::filter_rows(&table, &filter);
    let counts = explore::group_counts(&filtered, &by)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&counts)?);
        return Ok(());
    }

    println!(
        "{} {} of {}",
        "Rows".cyan().bold(),
        filtered.row_count().to_string().white().bold(),
        table.row_count()
    );
    println!();
    println!("{:>16}  {}", by.yellow().bold(), "count".yellow().bold());
    for group in &counts {
        println!("{:>16}  {}", group.label(), group.count);
    }

    Ok(())
}
