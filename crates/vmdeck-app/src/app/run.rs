use anyhow::{Context, Result};
use colored::Colorize;
use std::time::Duration;

use vmdeck_session::{GuestProfile, SessionSnapshot};

use crate::config::AppConfig;
use crate::render;
use crate::runner::{self, Command};

use super::setup::build_session;

/// Number of log entries printed after a run
const LOG_TAIL: usize = 10;

/// Boot `guest`, stream its console for `duration`, stop it and report
pub async fn run_guest_mode(config: &AppConfig, guest: &str, duration: Duration, json: bool) -> Result<()> {
    let profile = GuestProfile::from_catalog(guest)?;
    let handle = runner::spawn(build_session(config)?, config.tick());
    let mut updates = handle.subscribe();

    handle.execute(Command::Select(profile)).await?;
    let started = handle.execute(Command::Start).await.context("Failed to start guest")?;

    let deadline = tokio::time::Instant::now() + duration;
    let mut printed = if json { 0 } else { print_new_lines(&started, 0) };
    loop {
        tokio::select! {
            _ = tokio::time::sleep_until(deadline) => break,
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = updates.borrow_and_update().clone();
                if !json {
                    printed = print_new_lines(&snapshot, printed);
                }
            }
        }
    }

    // metrics drop back to baseline on stop
    let last_running = handle.snapshot().await?;
    let final_snapshot = handle.execute(Command::Stop).await?;
    handle.shutdown().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&final_snapshot)?);
        return Ok(());
    }

    print_new_lines(&final_snapshot, printed);
    println!();
    println!("{}", "Final metrics".bold());
    for line in render::metrics(&last_running.metrics) {
        println!("  {}", line);
    }
    println!();
    println!("{}", format!("Last {} log entries", LOG_TAIL).bold());
    let skip = final_snapshot.logs.len().saturating_sub(LOG_TAIL);
    for entry in &final_snapshot.logs[skip..] {
        println!("  {}", render::log_entry(entry));
    }
    Ok(())
}

/// Print transcript lines not yet shown; returns the new count
fn print_new_lines(snapshot: &SessionSnapshot, printed: usize) -> usize {
    // a restart clears the transcript
    let from = if snapshot.terminal.len() < printed { 0 } else { printed };
    for line in &snapshot.terminal[from..] {
        println!("{}", render::terminal_line(line));
    }
    snapshot.terminal.len()
}
