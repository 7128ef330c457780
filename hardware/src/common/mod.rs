//! Common types shared across the simulator.
//!
//! Holds the error type and the integer width used for register, memory and
//! immediate values.

/// Error types.
pub mod error;

pub use error::{SimError, SimResult};

/// Value held by a register, a memory word, or an immediate operand.
pub type Word = i64;
