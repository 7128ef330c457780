//! Fetch stage (stage 1).
//!
//! On the negedge the stage admits the instruction at `pc` unless a hazard
//! holds it back, claims the registers it will write, and advances `pc` (or
//! leaves it reserved for a jump or taken branch to commit later). On the
//! posedge it resolves operand values from the current register contents and
//! hands the instruction to its output latch.

use crate::common::Word;
use crate::core::arch::RegisterFile;
use crate::core::inst_buffer::InstructionBuffer;
use crate::core::pipeline::hazards;
use crate::core::pipeline::latches::DecodedInst;
use crate::core::Cpu;
use crate::isa::operand::{self, OperandKind};
use crate::isa::{Instruction, Opcode};

/// Resolves an operand token to a value.
///
/// Registers read their current value, `off(base)` adds the offset to the
/// base register, literals (including negative decimals) parse, and labels
/// resolve to their address.
///
/// # Arguments
///
/// * `regs` - Register file supplying register and base values
/// * `program` - Buffer holding the label map
/// * `tok` - Operand token as written in the source
///
/// # Returns
///
/// The operand value. An empty token is 0; an unknown label is logged and
/// reads as 0.
pub fn resolve_operand(regs: &RegisterFile, program: &InstructionBuffer, tok: &str) -> Word {
    match operand::classify(tok) {
        OperandKind::None => 0,
        OperandKind::Register => regs.read(tok),
        OperandKind::RegisterOffset => match operand::parse_register_offset(tok) {
            Some((offset, base)) => regs.read(&base).wrapping_add(offset),
            None => 0,
        },
        OperandKind::Hex | OperandKind::Decimal => operand::parse_immediate(tok).unwrap_or(0),
        OperandKind::Label => {
            if let Some(addr) = program.label_address(tok) {
                addr as Word
            } else if let Some(value) = operand::parse_immediate(tok) {
                value
            } else {
                tracing::warn!(target: "stage1", "unresolved label [{}]", tok);
                0
            }
        }
    }
}

fn branch_bound(regs: &RegisterFile, program: &InstructionBuffer, tok: &str) -> Word {
    operand::parse_immediate(tok).unwrap_or_else(|| resolve_operand(regs, program, tok))
}

fn register_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    names
        .into_iter()
        .filter(|n| operand::is_register(n))
        .map(str::to_string)
        .collect()
}

/// Decides the admission of `inst`: which registers it reserves, whether it
/// redirects control flow, and whether `pc` advances now.
fn admission(regs: &RegisterFile, program: &InstructionBuffer, inst: &Instruction) -> (Vec<String>, bool) {
    match inst.opcode() {
        Opcode::Jump => (register_names([inst.dst(), "pc"]), true),
        Opcode::BranchGe | Opcode::BranchLe => {
            let value = regs.read(inst.dst());
            let bound = branch_bound(regs, program, inst.op1());
            let taken = if inst.opcode() == Opcode::BranchGe {
                value >= bound
            } else {
                value <= bound
            };
            if taken {
                tracing::debug!(target: "stage1", "{} branch condition met", inst.mnemonic());
                (register_names([inst.dst(), "pc"]), true)
            } else {
                (Vec::new(), false)
            }
        }
        _ if inst.writes_back() => (register_names([inst.dst()]), false),
        _ => (Vec::new(), false),
    }
}

/// Negedge: admits the next instruction into the stage-1 input latch.
///
/// # Arguments
///
/// * `cpu` - The pipeline; `pc`, the reservations and the stage-1 input
///   latch are updated when the instruction is admitted
pub fn fetch_admit(cpu: &mut Cpu) {
    if cpu.fetch.input.is_some() {
        return;
    }
    let pc = cpu.regs.pc();
    let Some(addr) = usize::try_from(pc).ok() else {
        return;
    };
    let Some(inst) = cpu.program.fetch(addr) else {
        return;
    };
    tracing::debug!(target: "stage1", "pre-fetch next instruction @PC={}", pc);

    if let Some(reason) = hazards::fetch_stall(&cpu.regs, inst) {
        tracing::debug!(target: "stage1", "STALL - write-back hazard ({:?}) [{}]", reason, inst.assembly());
        cpu.stats.stalls_data += 1;
        return;
    }

    let (reserved, taken) = admission(&cpu.regs, &cpu.program, inst);
    if !taken {
        cpu.regs.increment("pc", 1_i64);
    }
    cpu.regs.reserve(&reserved, inst.id());
    cpu.fetch.input = Some(DecodedInst::new(addr, reserved, taken));
}

/// Posedge: resolves operand values and moves the instruction to the stage-1
/// output latch if it is free.
///
/// # Arguments
///
/// * `cpu` - The pipeline whose stage-1 latches are updated
pub fn fetch_stage(cpu: &mut Cpu) {
    if cpu.fetch.output.is_some() {
        return;
    }
    let Some(mut entry) = cpu.fetch.input.take() else {
        return;
    };
    if let Some(inst) = cpu.program.fetch(entry.addr) {
        if inst.opcode().is_memory() {
            entry.dst_value = resolve_operand(&cpu.regs, &cpu.program, inst.dst());
        }
        entry.op1_value = resolve_operand(&cpu.regs, &cpu.program, inst.op1());
        entry.op2_value = resolve_operand(&cpu.regs, &cpu.program, inst.op2());
        tracing::trace!(
            target: "stage1",
            "operands [{}] dst={} op1={} op2={}",
            inst.assembly(),
            entry.dst_value,
            entry.op1_value,
            entry.op2_value
        );
    }
    cpu.fetch.output = Some(entry);
}
