// Terminal event stream module
//
// This module produces the simulated guest console: a scripted boot transcript
// replayed on every start, followed by periodic randomized system activity and
// the occasional synthetic shell command.

mod pools;
mod stream;
mod transcript;

// Re-export public API
pub use pools::{ACTIVITY_POOL, COMMAND_POOL};
pub use stream::{TerminalEvent, TerminalStream, TerminalTiming};
pub use transcript::{announcement, boot_transcript, shell_prompt};

// Constants
pub const BOOT_LINE_COUNT: usize = 10;
pub const TERMINAL_SOURCE: &str = "Terminal";
