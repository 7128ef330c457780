//! Execute stage (stage 2).
//!
//! ALU instructions complete in the cycle they arrive. Loads and stores first
//! issue their request to the LSU and hold the stage until the access
//! countdown expires; while waiting, the instruction stays in the input latch
//! and is re-evaluated every cycle, and a copy is left in the output latch so
//! the stage reports as occupied.

use crate::core::units::Alu;
use crate::core::Cpu;
use crate::isa::Opcode;

/// Negedge: pulls the stage-1 output into the execute input latch.
///
/// # Arguments
///
/// * `cpu` - The pipeline whose stage-2 input latch is filled
pub fn execute_latch(cpu: &mut Cpu) {
    if cpu.exec.input.is_some() {
        return;
    }
    if let Some(entry) = cpu.fetch.output.take() {
        if let Some(inst) = cpu.program.fetch(entry.addr) {
            tracing::debug!(target: "stage2", "latch decoded instruction from STAGE1 [{}]", inst.mnemonic());
        }
        cpu.exec.input = Some(entry);
    }
}

/// Posedge: performs the ALU operation or advances the LSU access.
///
/// A memory instruction stays in the input latch until the access completes;
/// meanwhile the output latch holds a copy marked `stalled`.
///
/// # Arguments
///
/// * `cpu` - The pipeline; the LSU countdown, memory and stage-2 latches are
///   updated
pub fn execute_stage(cpu: &mut Cpu) {
    let Some(mut entry) = cpu.exec.input.take() else {
        return;
    };
    let Some(inst) = cpu.program.fetch(entry.addr) else {
        return;
    };

    let mut complete = false;
    if cpu.lsu_wait > 0 {
        cpu.lsu_wait -= 1;
        complete = cpu.lsu_wait == 0;
    }

    match inst.opcode() {
        Opcode::Store => {
            if complete {
                cpu.lsu.write(entry.op1_value, entry.dst_value);
                entry.lsu_value = entry.dst_value;
                tracing::debug!(target: "stage2", "STORE request to LSU completed [addr={:#x}]", entry.op1_value);
            } else if cpu.lsu_wait == 0 {
                tracing::debug!(
                    target: "stage2",
                    "sending STORE request to LSU [addr={:#x},value={:#x}]",
                    entry.op1_value,
                    entry.dst_value
                );
                cpu.lsu_wait = cpu.lsu_delay;
            }
        }
        Opcode::Load => {
            if complete {
                entry.lsu_value = cpu.lsu.read(entry.op1_value);
                tracing::debug!(
                    target: "stage2",
                    "LOAD request to LSU completed [addr={:#x},value={:#x}]",
                    entry.op1_value,
                    entry.lsu_value
                );
            } else if cpu.lsu_wait == 0 {
                tracing::debug!(target: "stage2", "sending LOAD request to LSU [addr={:#x}]", entry.op1_value);
                cpu.lsu_wait = cpu.lsu_delay;
            }
        }
        _ => complete = true,
    }

    if complete && inst.writes_back() {
        entry.resultant = match inst.opcode() {
            Opcode::Alu(op) => Alu::execute(op, entry.op1_value, entry.op2_value),
            Opcode::Load => entry.lsu_value,
            _ => 0,
        };
        tracing::debug!(
            target: "stage2",
            "resultant calculated [{} :: resultant={}]",
            inst.assembly(),
            entry.resultant
        );
    }

    if complete {
        entry.stalled = false;
        cpu.exec.output = Some(entry);
    } else {
        tracing::debug!(target: "stage2", "STALL pipeline for LSU response [addr={:#x}]", entry.op1_value);
        cpu.stats.stalls_mem += 1;
        entry.stalled = true;
        cpu.exec.output = Some(entry.clone());
        cpu.exec.input = Some(entry);
    }
}
