use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use vmdeck_session::Session;

use crate::config::AppConfig;

/// Install the stderr subscriber. `RUST_LOG` wins; otherwise only warnings
/// are shown so stdout stays readable.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
    if installed.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}

pub fn build_session(config: &AppConfig) -> Result<Session> {
    let session = Session::new(config.session.clone()).context("Failed to create session")?;
    tracing::info!(
        binding = session.binding_name(),
        log_capacity = config.session.log_capacity,
        seed = ?config.session.seed,
        "session created"
    );
    Ok(session)
}
