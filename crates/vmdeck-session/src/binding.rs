use vmdeck_logging::LogSink;
use vmdeck_types::GuestProfile;

/// Source name used by [`SimulatedDisplay`]
pub const DISPLAY_SOURCE: &str = "EmulatorDisplay";

/// Outbound seam to whatever renders the machine.
///
/// The session only reports start and stop intent; a binding may write to
/// the debug log through the sink it is handed.
pub trait EmulatorBinding: Send {
    fn name(&self) -> &str;

    /// The session entered `Running` with `guest`
    fn on_start(&mut self, guest: &GuestProfile, log: &mut dyn LogSink);

    /// The session left `Running`
    fn on_stop(&mut self, log: &mut dyn LogSink);
}

/// Default binding: a display that only reports what it would do
#[derive(Debug, Default)]
pub struct SimulatedDisplay {
    current: Option<String>,
}

impl SimulatedDisplay {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EmulatorBinding for SimulatedDisplay {
    fn name(&self) -> &str {
        "simulated-display"
    }

    fn on_start(&mut self, guest: &GuestProfile, log: &mut dyn LogSink) {
        log.info(DISPLAY_SOURCE, &format!("Starting emulation for {}", guest.display_name));
        log.info(DISPLAY_SOURCE, "Canvas context created successfully");
        log.info(DISPLAY_SOURCE, "Emulator display initialized");
        self.current = Some(guest.id.clone());
    }

    fn on_stop(&mut self, log: &mut dyn LogSink) {
        if self.current.take().is_some() {
            log.info(DISPLAY_SOURCE, "Emulator stopped");
        }
    }
}

/// Binding that does nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NullBinding;

impl EmulatorBinding for NullBinding {
    fn name(&self) -> &str {
        "null"
    }

    fn on_start(&mut self, _guest: &GuestProfile, _log: &mut dyn LogSink) {}

    fn on_stop(&mut self, _log: &mut dyn LogSink) {}
}
