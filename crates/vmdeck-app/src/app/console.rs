use anyhow::{Context, Result};
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::sync::mpsc as std_mpsc;
use thiserror::Error;
use tokio::sync::mpsc;

use vmdeck_session::GuestProfile;

use crate::config::AppConfig;
use crate::render;
use crate::runner::{self, Command, RunnerError, RunnerHandle};

use super::setup::build_session;

/// Entries shown by `logs` without an argument
const DEFAULT_LOG_TAIL: usize = 20;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown command '{0}'. Type 'help' for the list")]
    Unknown(String),

    #[error("'{command}' needs {what}")]
    MissingArgument { command: &'static str, what: &'static str },

    #[error("'{value}' is not a valid count")]
    InvalidCount { value: String },
}

/// One line typed at the console
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Select(String),
    Start,
    Pause,
    Reset,
    Stop,
    Clear,
    Status,
    Metrics,
    Logs(usize),
    Terminal,
    Guests,
    Help,
    Quit,
}

impl std::str::FromStr for ConsoleCommand {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let Some(head) = words.next() else {
            return Err(CommandError::Unknown(String::new()));
        };

        let command = match head.to_lowercase().as_str() {
            "select" => match words.next() {
                Some(id) => ConsoleCommand::Select(id.to_string()),
                None => {
                    return Err(CommandError::MissingArgument {
                        command: "select",
                        what: "a guest id",
                    })
                }
            },
            "start" | "resume" => ConsoleCommand::Start,
            "pause" => ConsoleCommand::Pause,
            "reset" => ConsoleCommand::Reset,
            "stop" => ConsoleCommand::Stop,
            "clear" => ConsoleCommand::Clear,
            "status" => ConsoleCommand::Status,
            "metrics" => ConsoleCommand::Metrics,
            "logs" => match words.next() {
                Some(n) => ConsoleCommand::Logs(n.parse().map_err(|_| CommandError::InvalidCount {
                    value: n.to_string(),
                })?),
                None => ConsoleCommand::Logs(DEFAULT_LOG_TAIL),
            },
            "terminal" | "term" => ConsoleCommand::Terminal,
            "guests" => ConsoleCommand::Guests,
            "help" | "?" => ConsoleCommand::Help,
            "quit" | "exit" => ConsoleCommand::Quit,
            other => return Err(CommandError::Unknown(other.to_string())),
        };
        Ok(command)
    }
}

const HELP: &[(&str, &str)] = &[
    ("select <id>", "choose the guest operating system"),
    ("start", "boot the selected guest, or resume after pause"),
    ("pause", "suspend the running guest"),
    ("reset", "restart the guest from the first boot line"),
    ("stop", "power the guest off"),
    ("clear", "empty the debug log"),
    ("status", "show lifecycle state and counters"),
    ("metrics", "show the latest resource sample"),
    ("logs [n]", "show the last n debug log entries"),
    ("terminal", "show the guest console transcript"),
    ("guests", "list available guests"),
    ("quit", "leave the console"),
];

/// Run the interactive operator console
pub async fn run_console_mode(config: &AppConfig) -> Result<()> {
    println!("{}", "vmdeck - simulated virtual machine console".bright_cyan().bold());
    println!("{}", "Type 'help' for commands, 'quit' to exit\n".bright_black());

    let handle = runner::spawn(build_session(config)?, config.tick());
    let (prompts, mut lines) = spawn_reader();

    loop {
        if prompts.send(prompt_for(&handle).await).is_err() {
            break;
        }
        let Some(line) = lines.recv().await else {
            break;
        };

        let line = match line {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e).context("Failed to read console input"),
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match line.parse::<ConsoleCommand>() {
            Ok(ConsoleCommand::Quit) => break,
            Ok(command) => {
                if let Err(e) = dispatch(&handle, command).await {
                    println!("{} {}", "error:".red().bold(), e);
                }
            }
            Err(e) => println!("{} {}", "error:".red().bold(), e),
        }
    }

    let session = handle.shutdown().await?;
    tracing::info!(state = %session.state(), "console closed");
    println!("{}", "Goodbye".bright_black());
    Ok(())
}

/// Read lines on a dedicated thread, since the line editor blocks.
///
/// The thread waits for a prompt before each read, so output of the
/// previous command is printed before the next prompt appears.
fn spawn_reader() -> (std_mpsc::Sender<String>, mpsc::Receiver<rustyline::Result<String>>) {
    let (prompt_tx, prompt_rx) = std_mpsc::channel::<String>();
    let (line_tx, line_rx) = mpsc::channel(1);

    std::thread::spawn(move || {
        let mut editor = match DefaultEditor::new() {
            Ok(editor) => editor,
            Err(e) => {
                let _ = line_tx.blocking_send(Err(e));
                return;
            }
        };

        while let Ok(prompt) = prompt_rx.recv() {
            let line = editor.readline(&prompt);
            if let Ok(text) = &line {
                if let Err(e) = editor.add_history_entry(text.as_str()) {
                    tracing::debug!(error = %e, "could not record history");
                }
            }
            let finished = line.is_err();
            if line_tx.blocking_send(line).is_err() || finished {
                break;
            }
        }
    });

    (prompt_tx, line_rx)
}

async fn prompt_for(handle: &RunnerHandle) -> String {
    let snapshot = match handle.snapshot().await {
        Ok(snapshot) => snapshot,
        Err(_) => handle.latest(),
    };
    match &snapshot.guest {
        Some(guest) => format!("vmdeck[{}:{}]> ", guest.id, snapshot.state),
        None => format!("vmdeck[{}]> ", snapshot.state),
    }
}

async fn dispatch(handle: &RunnerHandle, command: ConsoleCommand) -> Result<()> {
    match command {
        ConsoleCommand::Select(id) => {
            let guest = GuestProfile::from_catalog(&id)?;
            let snapshot = handle.execute(Command::Select(guest)).await?;
            println!("{}", render::status(&snapshot));
        }
        ConsoleCommand::Start => report(handle.execute(Command::Start).await)?,
        ConsoleCommand::Pause => report(handle.execute(Command::Pause).await)?,
        ConsoleCommand::Reset => report(handle.execute(Command::Reset).await)?,
        ConsoleCommand::Stop => report(handle.execute(Command::Stop).await)?,
        ConsoleCommand::Clear => {
            handle.execute(Command::ClearLogs).await?;
            println!("{}", "Debug log cleared".bright_black());
        }
        ConsoleCommand::Status => println!("{}", render::status(&handle.snapshot().await?)),
        ConsoleCommand::Metrics => {
            for line in render::metrics(&handle.snapshot().await?.metrics) {
                println!("{}", line);
            }
        }
        ConsoleCommand::Logs(n) => {
            let snapshot = handle.snapshot().await?;
            let skip = snapshot.logs.len().saturating_sub(n);
            if snapshot.logs.is_empty() {
                println!("{}", "(debug log is empty)".bright_black());
            }
            for entry in &snapshot.logs[skip..] {
                println!("{}", render::log_entry(entry));
            }
        }
        ConsoleCommand::Terminal => {
            let snapshot = handle.snapshot().await?;
            if snapshot.terminal.is_empty() {
                println!("{}", "(no console output)".bright_black());
            }
            for line in &snapshot.terminal {
                println!("{}", render::terminal_line(line));
            }
        }
        ConsoleCommand::Guests => {
            for guest in GuestProfile::catalog() {
                println!("{}", render::guest(&guest));
            }
        }
        ConsoleCommand::Help => {
            for (usage, what) in HELP {
                println!("  {:<14} {}", usage.bright_cyan(), what);
            }
        }
        ConsoleCommand::Quit => {}
    }
    Ok(())
}

/// A rejected transition is an operator mistake, not a console failure
fn report(result: Result<vmdeck_session::SessionSnapshot, RunnerError>) -> Result<()> {
    match result {
        Ok(snapshot) => {
            println!("{}", render::status(&snapshot));
            Ok(())
        }
        Err(RunnerError::Session(e)) => {
            println!("{} {}", "rejected:".yellow().bold(), e);
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!("select ubuntu".parse(), Ok(ConsoleCommand::Select("ubuntu".to_string())));
        assert_eq!("  START ".parse(), Ok(ConsoleCommand::Start));
        assert_eq!("resume".parse(), Ok(ConsoleCommand::Start));
        assert_eq!("logs".parse(), Ok(ConsoleCommand::Logs(DEFAULT_LOG_TAIL)));
        assert_eq!("logs 5".parse(), Ok(ConsoleCommand::Logs(5)));
        assert_eq!("exit".parse(), Ok(ConsoleCommand::Quit));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            "select".parse::<ConsoleCommand>(),
            Err(CommandError::MissingArgument {
                command: "select",
                what: "a guest id"
            })
        );
        assert_eq!(
            "logs many".parse::<ConsoleCommand>(),
            Err(CommandError::InvalidCount {
                value: "many".to_string()
            })
        );
        let err = "boot".parse::<ConsoleCommand>().unwrap_err();
        assert_eq!(err.to_string(), "unknown command 'boot'. Type 'help' for the list");
    }

    #[test]
    fn test_help_covers_every_command() {
        for (usage, _) in HELP {
            let word = usage.split_whitespace().next().unwrap();
            let line = if word == "select" { "select ubuntu" } else { word };
            assert!(line.parse::<ConsoleCommand>().is_ok(), "{} does not parse", line);
        }
    }
}
