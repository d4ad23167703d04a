pub mod console;
pub mod run;
pub mod setup;

pub use console::{run_console_mode, CommandError, ConsoleCommand};
pub use run::run_guest_mode;
pub use setup::{build_session, init_tracing};
