#![warn(clippy::all, clippy::pedantic)]

use anyhow::Result;
use clap::Parser;
use sysgate::Config;
use sysgate::app::{Cli, dispatch};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is normal.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Initialize logging
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = Config::load(cli.config.as_deref())?;
    dispatch(cli, config).await
}
