//! Write-back stage (stage 3).
//!
//! Commits results to the register file, commits the target of jumps and
//! taken branches to `pc`, releases the instruction's reservations, and
//! retires it.

use crate::common::{SimResult, Word};
use crate::core::arch::RegisterFile;
use crate::core::inst_buffer::InstructionBuffer;
use crate::core::pipeline::RetireSink;
use crate::core::Cpu;
use crate::isa::operand::{self, OperandKind};
use crate::isa::Opcode;

/// Negedge: pulls the execute output into the write-back input latch.
///
/// Nothing moves while an LSU access is outstanding.
///
/// # Arguments
///
/// * `cpu` - The pipeline whose stage-3 input latch is filled
pub fn wb_latch(cpu: &mut Cpu) {
    if cpu.wb.input.is_some() || cpu.lsu_wait != 0 {
        return;
    }
    cpu.wb.output = None;
    if let Some(entry) = cpu.exec.output.take() {
        tracing::debug!(target: "stage3", "latch decoded instruction from STAGE2");
        cpu.wb.input = Some(entry);
    }
}

fn write_target_register(regs: &mut RegisterFile, name: &str, value: Word) {
    if operand::is_register(name) {
        regs.write_back(name, value);
    } else if !name.is_empty() {
        tracing::debug!(target: "stage3", "target slot [{}] is not a register; not written", name);
    }
}

/// Address named by a label token, or the literal it spells.
fn label_target(program: &InstructionBuffer, tok: &str) -> Option<Word> {
    program
        .label_address(tok)
        .map(|addr| addr as Word)
        .or_else(|| operand::parse_immediate(tok))
}

/// Posedge: commits and retires the instruction in the write-back latch.
///
/// A jump or taken branch whose target label is undefined is logged as an
/// error and falls through to the next instruction.
///
/// # Arguments
///
/// * `cpu` - The pipeline to update
/// * `cycle` - Current cycle number, reported to `sink`
/// * `sink` - Observer notified of the retirement
///
/// # Returns
///
/// The error from `sink`, if any. The retirement is fully committed (latch,
/// registers and statistics) before `sink` is notified.
pub fn wb_stage(cpu: &mut Cpu, cycle: u64, sink: &mut dyn RetireSink) -> SimResult<()> {
    let Some(mut entry) = cpu.wb.input.take() else {
        return Ok(());
    };
    let Some(inst) = cpu.program.fetch(entry.addr) else {
        return Ok(());
    };
    let opcode = inst.opcode();
    let fall_through = entry.addr as Word + 1;

    match opcode {
        Opcode::Jump if entry.taken => {
            let target = if inst.op1().is_empty() {
                label_target(&cpu.program, inst.dst())
            } else if operand::classify(inst.op1()) == OperandKind::Label {
                label_target(&cpu.program, inst.op1())
            } else {
                Some(entry.op1_value)
            };
            match target {
                Some(target) => {
                    tracing::debug!(target: "stage3", "performing JAL instruction - jump to address={}", target);
                    write_target_register(&mut cpu.regs, inst.dst(), target);
                    cpu.regs.write_back("pc", target);
                }
                None => {
                    tracing::error!(target: "stage3", "jump target of [{}] is not defined; continuing", inst.assembly());
                    entry.taken = false;
                    cpu.regs.write_back("pc", fall_through);
                }
            }
        }
        Opcode::BranchGe | Opcode::BranchLe if entry.taken => {
            let label = inst.op2();
            match label_target(&cpu.program, label) {
                Some(target) => {
                    tracing::debug!(
                        target: "stage3",
                        "performing {} instruction - jump to address={}, label={}",
                        inst.mnemonic().to_ascii_uppercase(),
                        target,
                        label
                    );
                    write_target_register(&mut cpu.regs, inst.op1(), target);
                    cpu.regs.write_back("pc", target);
                }
                None => {
                    tracing::error!(
                        target: "stage3",
                        "branch label [{}] is not defined; [{}] treated as not taken",
                        label,
                        inst.assembly()
                    );
                    entry.taken = false;
                    cpu.regs.write_back("pc", fall_through);
                }
            }
        }
        _ if inst.writes_back() => {
            tracing::debug!(
                target: "stage3",
                "performing register write-back [{}=>{}]",
                entry.resultant,
                inst.dst()
            );
            cpu.regs.write_back(inst.dst(), entry.resultant);
        }
        _ => {}
    }
    cpu.regs.release(&entry.reserved);
    cpu.stats.record_retire(opcode, entry.taken);

    entry.reset();
    cpu.wb.output = Some(entry);

    tracing::info!(target: "stage3", "CYCLE={:5} - {}", cycle, inst.assembly());
    sink.retire(cycle, inst.assembly())?;
    Ok(())
}
