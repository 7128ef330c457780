//! Decoded program instruction.
//!
//! An `Instruction` is built once by the loader from the substrings of one
//! assembly line and never changes afterwards, apart from the sequence id the
//! instruction buffer stamps on it when it is appended.

use std::fmt;

use super::opcode::{OpBehavior, Opcode};
use super::operand;

/// One program line after tokenizing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Instruction {
    id: usize,
    assembly: String,
    label: String,
    mnemonic: String,
    opcode: Opcode,
    dst: String,
    op1: String,
    op2: String,
    hazard_regs: Vec<String>,
}

fn fold(field: Option<&str>) -> String {
    field.map(|s| s.trim().to_ascii_lowercase()).unwrap_or_default()
}

impl Instruction {
    /// Builds an instruction from raw line text and its tokenized fields.
    ///
    /// Every field is lowercased; absent fields become empty strings.
    pub fn new(
        assembly: &str,
        label: Option<&str>,
        mnemonic: &str,
        dst: Option<&str>,
        op1: Option<&str>,
        op2: Option<&str>,
    ) -> Self {
        let mnemonic = mnemonic.trim().to_ascii_lowercase();
        let opcode = Opcode::from_mnemonic(&mnemonic);
        let dst = fold(dst);
        let op1 = fold(op1);
        let op2 = fold(op2);

        let mut hazard_regs = Vec::new();
        if !opcode.behavior().writes_back && operand::is_register(&dst) {
            hazard_regs.push(dst.clone());
        }
        for op in [&op1, &op2] {
            if operand::is_register(op) {
                hazard_regs.push(op.clone());
            } else if let Some((_, base)) = operand::parse_register_offset(op) {
                hazard_regs.push(base);
            }
        }

        Self {
            id: 0,
            assembly: assembly.trim().to_ascii_lowercase(),
            label: fold(label),
            mnemonic,
            opcode,
            dst,
            op1,
            op2,
            hazard_regs,
        }
    }

    pub(crate) fn set_id(&mut self, id: usize) {
        self.id = id;
    }

    /// 1-based sequence id; 0 until appended to a buffer.
    pub fn id(&self) -> usize {
        self.id
    }

    /// Original source text.
    pub fn assembly(&self) -> &str {
        &self.assembly
    }

    /// Label declared on this line, or empty.
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn mnemonic(&self) -> &str {
        &self.mnemonic
    }

    pub fn opcode(&self) -> Opcode {
        self.opcode
    }

    pub fn dst(&self) -> &str {
        &self.dst
    }

    pub fn op1(&self) -> &str {
        &self.op1
    }

    pub fn op2(&self) -> &str {
        &self.op2
    }

    pub fn behavior(&self) -> OpBehavior {
        self.opcode.behavior()
    }

    pub fn writes_back(&self) -> bool {
        self.behavior().writes_back
    }

    pub fn is_mem_store(&self) -> bool {
        self.behavior().mem_store
    }

    pub fn is_mem_load(&self) -> bool {
        self.behavior().mem_load
    }

    /// Registers read as sources; a fetch stalls while any of them is
    /// reserved.
    pub fn hazard_regs(&self) -> &[String] {
        &self.hazard_regs
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.label.is_empty() {
            write!(f, "       {}, {}, {}, {}", self.mnemonic, self.dst, self.op1, self.op2)
        } else {
            write!(
                f,
                "{}:   {}, {}, {}, {}",
                self.label, self.mnemonic, self.dst, self.op1, self.op2
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_counts_value_register_as_read() {
        let sw = Instruction::new("sw t1, 4(t0)", None, "SW", Some("T1"), Some("4(T0)"), None);
        assert_eq!(sw.hazard_regs(), ["t1", "t0"]);
        assert!(sw.is_mem_store());
        assert!(!sw.writes_back());
    }

    #[test]
    fn write_back_dst_is_not_a_read() {
        let add = Instruction::new("add t2, t0, t1", None, "add", Some("t2"), Some("t0"), Some("t1"));
        assert_eq!(add.hazard_regs(), ["t0", "t1"]);
        let li = Instruction::new("li t0, 5", None, "li", Some("t0"), Some("5"), None);
        assert!(li.hazard_regs().is_empty());
    }

    #[test]
    fn fields_are_case_folded() {
        let i = Instruction::new("LOOP: BGE T0, 0, LOOP", Some("LOOP"), "BGE", Some("T0"), Some("0"), Some("LOOP"));
        assert_eq!(i.label(), "loop");
        assert_eq!(i.opcode(), Opcode::BranchGe);
        assert_eq!(i.op2(), "loop");
        assert_eq!(i.assembly(), "loop: bge t0, 0, loop");
    }
}
