/// Simulation loop and run summary.
pub mod driver;

/// Assembly source loader.
pub mod loader;

/// `tracing` subscriber setup.
pub mod logging;

/// Retirement trace sinks.
pub mod trace;

/// VCD waveform output.
pub mod vcd;

pub use driver::{RunSummary, Simulator, Termination};
