// vmdeck application library
//
// Configuration, the real-time session runner and the console front end. The
// binary in main.rs only parses arguments and picks a mode.

pub mod app;
pub mod cli;
pub mod config;
pub mod render;
pub mod runner;

pub use cli::{Cli, Commands};
pub use config::AppConfig;
pub use runner::{Command, RunnerError, RunnerHandle};
