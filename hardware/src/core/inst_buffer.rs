//! Instruction buffer.
//!
//! Program storage for a run: the ordered list of instructions (the address of
//! an instruction is its index) and the label map used by jumps, branches and
//! label operands.

use std::collections::HashMap;
use std::fmt::Write;

use crate::isa::Instruction;

/// Ordered program storage with label resolution.
#[derive(Debug, Default)]
pub struct InstructionBuffer {
    instructions: Vec<Instruction>,
    labels: HashMap<String, usize>,
}

impl InstructionBuffer {
    /// Creates an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an instruction and binds its label.
    ///
    /// Records with an empty mnemonic are dropped. A reused label is rebound
    /// to the newest occurrence.
    pub fn append(&mut self, mut instruction: Instruction) {
        if instruction.mnemonic().is_empty() {
            return;
        }
        let addr = self.instructions.len();
        instruction.set_id(addr + 1);
        let label = instruction.label().to_string();
        self.instructions.push(instruction);
        if !label.is_empty() {
            self.bind_label(label, addr);
        }
    }

    /// Binds `label` to the stored instruction at `addr`, replacing any
    /// earlier binding. Returns `false` and leaves the map untouched when
    /// `addr` is past the end of the program.
    pub(crate) fn bind_label(&mut self, label: String, addr: usize) -> bool {
        let label = label.to_ascii_lowercase();
        if addr >= self.instructions.len() {
            tracing::warn!(
                target: "inst_buffer",
                "label [{}] not bound: address [{}] is past the end of the program",
                label,
                addr
            );
            return false;
        }
        tracing::info!(target: "inst_buffer", "label [{}] set at address [{}]", label, addr);
        self.labels.insert(label, addr);
        true
    }

    /// Instruction at `addr`, or `None` past the end of the program.
    pub fn fetch(&self, addr: usize) -> Option<&Instruction> {
        self.instructions.get(addr)
    }

    /// Address bound to `label` (case-insensitive).
    pub fn label_address(&self, label: &str) -> Option<usize> {
        self.labels.get(&label.to_ascii_lowercase()).copied()
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Instruction> {
        self.instructions.iter()
    }

    /// Renders the loaded program, one source line per row.
    pub fn listing(&self) -> String {
        let rule = "-".repeat(83);
        let mut out = String::new();
        let _ = writeln!(out, "{rule}");
        let _ = writeln!(out, "{:^83}", "ASSEMBLY");
        let _ = writeln!(out, "{rule}");
        for (addr, inst) in self.iter().enumerate() {
            let _ = writeln!(out, "{:4}  {}", addr, inst.assembly());
        }
        let _ = write!(out, "{rule}");
        out
    }
}
