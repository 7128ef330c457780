//! Arithmetic Logic Unit.
//!
//! Computes the write-back value of the register-writing opcodes. All
//! arithmetic wraps; shift amounts use their low six bits.

use crate::common::Word;
use crate::isa::AluOp;

/// Stateless ALU.
#[derive(Debug)]
pub struct Alu;

impl Alu {
    /// Evaluates `op` over the resolved operand values.
    ///
    /// `li` ignores `b`. `slri` shifts arithmetically, keeping the sign.
    pub fn execute(op: AluOp, a: Word, b: Word) -> Word {
        match op {
            AluOp::Li => a,
            AluOp::Add | AluOp::Addi => a.wrapping_add(b),
            AluOp::Sub => a.wrapping_sub(b),
            AluOp::Slli => a.wrapping_shl(b as u32),
            AluOp::Slri => a.wrapping_shr(b as u32),
        }
    }
}
