//! Instruction set model.
//!
//! The modelled ISA is a handful of RISC-V mnemonics in textual form. There is
//! no binary encoding: instructions carry their operand tokens and the
//! pipeline resolves them against the register file and label map.

/// Decoded instruction record.
pub mod instruction;

/// Opcode enum and behavior table.
pub mod opcode;

/// Operand token classification.
pub mod operand;

pub use instruction::Instruction;
pub use opcode::{AluOp, OpBehavior, Opcode};
pub use operand::OperandKind;
