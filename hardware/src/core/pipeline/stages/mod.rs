//! Pipeline stage implementations.
//!
//! Each stage has a negedge half that moves an instruction into its input
//! latch and a posedge half that processes it:
//! - Fetch: admission with hazard check, then operand resolution
//! - Execute: ALU work and LSU accesses
//! - Write-back: register/pc commit and retirement

/// Instruction execute stage.
pub mod execute;

/// Instruction fetch stage.
pub mod fetch;

/// Write-back stage.
pub mod write_back;

pub use execute::{execute_latch, execute_stage};
pub use fetch::{fetch_admit, fetch_stage};
pub use write_back::{wb_latch, wb_stage};
