use anyhow::Result;
use clap::Parser;
use std::time::Duration;

use vmdeck::app::{init_tracing, run_console_mode, run_guest_mode};
use vmdeck::{render, Cli, Commands};
use vmdeck_session::GuestProfile;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file if it exists
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let config = cli.resolve_config()?;
    tracing::debug!(?config, "configuration resolved");

    match cli.command() {
        Commands::Guests => {
            for guest in GuestProfile::catalog() {
                println!("{}", render::guest(&guest));
            }
        }
        Commands::Run {
            guest,
            duration_secs,
            json,
        } => run_guest_mode(&config, &guest, Duration::from_secs(duration_secs), json).await?,
        Commands::Console => run_console_mode(&config).await?,
    }

    Ok(())
}
