//! maintenance-ml - Main Entry Point

use clap::Parser;
use maintenance_ml::cli::{cmd_evaluate, cmd_info, cmd_train, Cli, Commands};

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "maintenance_ml=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Train { data, model, config, output_dir, save, plot } => {
            cmd_train(&data, &model, config.as_deref(), &output_dir, save, plot.as_deref())?;
        }
        Commands::Evaluate { model, data, config } => {
            cmd_evaluate(&model, &data, config.as_deref())?;
        }
        Commands::Info { data, config } => {
            cmd_info(&data, config.as_deref())?;
        }
    }

    Ok(())
}
