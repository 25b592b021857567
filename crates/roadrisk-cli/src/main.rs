//! Roadrisk CLI - accident normalization and severity prediction.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "roadrisk=debug" } else { "roadrisk=info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = commands::load_config(cli.config.as_deref()).and_then(|config| match cli.command {
        Commands::Preprocess { input, output } => {
            commands::preprocess::run(config, input, output, cli.verbose)
        }

        Commands::Train {
            input,
            model,
            metrics,
        } => commands::train::run(config, input, model, metrics, cli.verbose),

        Commands::Predict(args) => commands::predict::run(config, args, cli.verbose),

        Commands::Explore {
            state,
            year,
            vehicle_type,
            by,
            json,
        } => commands::explore::run(config, state, year, vehicle_type, by, json),
    });

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
