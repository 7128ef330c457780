//! Functional units used by the execute stage.

/// Arithmetic Logic Unit.
pub mod alu;

/// Load/Store Unit.
pub mod lsu;

pub use alu::Alu;
pub use lsu::Lsu;
