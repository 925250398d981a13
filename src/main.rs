//! Obesity classifier - Main Entry Point
//!
//! Trains the model offline or serves predictions over HTTP.

use clap::Parser;
use obesity_classifier::cli::{cmd_predict, cmd_serve, cmd_train, Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "obesity_classifier=info,tower_http=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Train { data, output } => {
            cmd_train(&data, &output)?;
        }
        Commands::Serve { host, port, model, error_policy } => {
            cmd_serve(host, port, model, error_policy).await?;
        }
        Commands::Predict { model, record } => {
            cmd_predict(&model, record.as_deref())?;
        }
    }

    Ok(())
}
