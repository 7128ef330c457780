//! Opcode definitions and the per-opcode behavior table.

/// ALU operation performed by a register write-back instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum AluOp {
    /// `li rd, imm`: `rd = op1`.
    #[default]
    Li,
    /// `add rd, rs1, rs2`.
    Add,
    /// `addi rd, rs1, imm`.
    Addi,
    /// `sub rd, rs1, rs2`.
    Sub,
    /// `slli rd, rs1, shamt`.
    Slli,
    /// `slri rd, rs1, shamt` (arithmetic right shift).
    Slri,
}

/// Static behavior flags of an opcode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct OpBehavior {
    /// Writes a result into its `dst` register at write-back.
    pub writes_back: bool,
    /// Issues a store to the LSU in the execute stage.
    pub mem_store: bool,
    /// Issues a load to the LSU in the execute stage.
    pub mem_load: bool,
}

/// Decoded opcode of an instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Opcode {
    /// Register-to-register or register-immediate arithmetic.
    Alu(AluOp),
    /// `lw rd, off(base)`.
    Load,
    /// `sw rs, off(base)`.
    Store,
    /// `jal rd, target`.
    Jump,
    /// `bge rs, imm, label`.
    BranchGe,
    /// `ble rs, imm, label`.
    BranchLe,
    /// Any mnemonic the model does not give special behavior.
    #[default]
    Other,
}

impl Opcode {
    /// Maps a mnemonic (any case) to its opcode.
    pub fn from_mnemonic(mnemonic: &str) -> Self {
        match mnemonic.to_ascii_lowercase().as_str() {
            "li" => Opcode::Alu(AluOp::Li),
            "add" => Opcode::Alu(AluOp::Add),
            "addi" => Opcode::Alu(AluOp::Addi),
            "sub" => Opcode::Alu(AluOp::Sub),
            "slli" => Opcode::Alu(AluOp::Slli),
            "slri" => Opcode::Alu(AluOp::Slri),
            "lw" => Opcode::Load,
            "sw" => Opcode::Store,
            "jal" => Opcode::Jump,
            "bge" => Opcode::BranchGe,
            "ble" => Opcode::BranchLe,
            _ => Opcode::Other,
        }
    }

    /// Behavior table entry for this opcode.
    pub const fn behavior(self) -> OpBehavior {
        match self {
            Opcode::Alu(_) => OpBehavior {
                writes_back: true,
                mem_store: false,
                mem_load: false,
            },
            Opcode::Load => OpBehavior {
                writes_back: true,
                mem_store: false,
                mem_load: true,
            },
            Opcode::Store => OpBehavior {
                writes_back: false,
                mem_store: true,
                mem_load: false,
            },
            Opcode::Jump | Opcode::BranchGe | Opcode::BranchLe | Opcode::Other => OpBehavior {
                writes_back: false,
                mem_store: false,
                mem_load: false,
            },
        }
    }

    /// `true` for opcodes that touch the LSU.
    pub const fn is_memory(self) -> bool {
        matches!(self, Opcode::Load | Opcode::Store)
    }
}
