//! CPU core: architectural state, functional units, program storage and the
//! pipeline controller.

/// Architectural register file.
pub mod arch;

/// Pipeline controller.
pub mod cpu;

/// Program storage and label resolution.
pub mod inst_buffer;

/// Pipeline latches, hazards and stages.
pub mod pipeline;

/// Functional units (ALU, LSU).
pub mod units;

pub use cpu::Cpu;
pub use inst_buffer::InstructionBuffer;
