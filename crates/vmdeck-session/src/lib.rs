//! Session lifecycle for the simulated machine.
//!
//! [`Session`] is the single owner of lifecycle state, guest selection, the
//! scheduler and both generators. Operator actions go through it; timers are
//! delivered back to it by [`Session::advance_to`], which dispatches each
//! event only while the session is running.

pub mod binding;
pub mod config;
pub mod error;
pub mod session;
pub mod snapshot;
pub mod transition;

pub use binding::{EmulatorBinding, NullBinding, SimulatedDisplay};
pub use config::{ConfigError, SessionConfig};
pub use error::SessionError;
pub use session::{Session, SessionEvent};
pub use snapshot::SessionSnapshot;
pub use transition::{transition, Action};

// Re-export the data model so front ends need a single dependency
pub use vmdeck_terminal::TERMINAL_SOURCE;
pub use vmdeck_types::{
    GuestProfile, LogEntry, LogLevel, MetricsSample, SessionState, TerminalLine,
};

/// Log source used for operator actions
pub const CONTROLS_SOURCE: &str = "EmulatorControls";
/// Log source used for guest selection
pub const SELECTOR_SOURCE: &str = "OSSelector";
