//! Pipeline latch structures.
//!
//! Each of the three stages owns an input and an output latch holding at
//! most one in-flight instruction. The payload refers to its program
//! instruction by buffer address; the instruction itself stays owned by the
//! instruction buffer.

use crate::common::Word;

/// In-flight instruction state carried between stages.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DecodedInst {
    /// Buffer address of the instruction.
    pub addr: usize,
    /// Value of the `dst` operand (memory instructions only).
    pub dst_value: Word,
    /// Resolved value of `op1`.
    pub op1_value: Word,
    /// Resolved value of `op2`.
    pub op2_value: Word,
    /// Value moved through the LSU.
    pub lsu_value: Word,
    /// Value written to `dst` at write-back.
    pub resultant: Word,
    /// Registers reserved at admission, released at retirement.
    pub reserved: Vec<String>,
    /// Admission redirected control flow (`jal`, taken branch); the target is
    /// committed at write-back.
    pub taken: bool,
    /// Waiting on the LSU in the execute stage.
    pub stalled: bool,
}

impl DecodedInst {
    /// Creates the payload for an instruction admitted at `addr`.
    pub fn new(addr: usize, reserved: Vec<String>, taken: bool) -> Self {
        Self {
            addr,
            reserved,
            taken,
            ..Default::default()
        }
    }

    /// Clears the runtime results once the instruction has retired.
    pub fn reset(&mut self) {
        self.reserved.clear();
        self.resultant = 0;
        self.lsu_value = 0;
        self.stalled = false;
    }
}

/// Input/output latch pair of one stage.
#[derive(Clone, Debug, Default)]
pub struct StageLatch {
    /// Instruction being processed by the stage.
    pub input: Option<DecodedInst>,
    /// Instruction the stage has finished with, waiting for the next stage.
    pub output: Option<DecodedInst>,
}
