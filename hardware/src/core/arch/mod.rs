//! Architectural state.

/// Named register file with hazard reservations.
pub mod gpr;

pub use gpr::RegisterFile;
