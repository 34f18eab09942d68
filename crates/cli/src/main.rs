//! Age-proof submission client entry point.
mod address_book;
mod app;
mod artifact;
mod config;

use anyhow::Result;
use clap::Parser;

use app::{App, Cli};
use config::CliConfig;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = CliConfig::from_env();

    App::start(config).await?.run(cli.command).await
}
