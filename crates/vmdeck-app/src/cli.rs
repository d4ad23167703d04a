use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::AppConfig;

/// CLI arguments for vmdeck
#[derive(Parser, Debug)]
#[command(name = "vmdeck")]
#[command(about = "Simulated virtual machine session with live telemetry and debug log")]
#[command(version = "0.1.0")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to a TOML config file
    #[arg(long, value_name = "PATH", global = true, env = "VMDECK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Fix the RNG seed so runs are reproducible
    #[arg(long, global = true, env = "VMDECK_SEED")]
    pub seed: Option<u64>,

    /// Runner tick in milliseconds
    #[arg(long, value_name = "MS", global = true, env = "VMDECK_TICK_MS")]
    pub tick_ms: Option<u64>,

    /// Number of debug log entries kept
    #[arg(long, value_name = "N", global = true)]
    pub log_capacity: Option<usize>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// List the guest operating systems that can be booted
    Guests,
    /// Boot a guest, stream its console for a while, then stop it
    Run {
        /// Guest id (see `vmdeck guests`)
        #[arg(short = 'g', long)]
        guest: String,
        /// How long to let the guest run
        #[arg(short = 'd', long, default_value = "20")]
        duration_secs: u64,
        /// Print the final session snapshot as JSON
        #[arg(long)]
        json: bool,
    },
    /// Interactive operator console (default)
    Console,
}

impl Cli {
    /// Config file values overlaid by whatever was given on the command line
    pub fn resolve_config(&self) -> anyhow::Result<AppConfig> {
        let mut config = AppConfig::load(self.config.as_deref())?;
        if let Some(seed) = self.seed {
            config.session.seed = Some(seed);
        }
        if let Some(tick_ms) = self.tick_ms {
            config.tick_ms = tick_ms;
        }
        if let Some(capacity) = self.log_capacity {
            config.session.log_capacity = capacity;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Console)
    }
}
