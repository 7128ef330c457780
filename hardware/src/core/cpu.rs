//! Pipeline controller.
//!
//! `Cpu` owns the program, the architectural state and the three stage
//! latches, and clocks the stages in two phases per cycle:
//!
//! * **negedge** moves instructions forward between latches and admits a new
//!   instruction at `pc`;
//! * **posedge** does the work of each stage: write-back and retirement,
//!   execution and LSU access, operand resolution.
//!
//! Both phases walk the stages from 3 down to 1 so a stage only ever pulls
//! from the stage ahead of it and never observes a neighbour that has already
//! been updated in the same phase.

use std::fmt::Write;

use crate::common::SimResult;
use crate::config::Config;
use crate::core::arch::RegisterFile;
use crate::core::inst_buffer::InstructionBuffer;
use crate::core::pipeline::stages;
use crate::core::pipeline::{RetireSink, StageLatch};
use crate::core::units::Lsu;
use crate::stats::SimStats;

/// Default LSU access latency in cycles.
pub const DEFAULT_LSU_DELAY: u64 = 1;

/// The three-stage pipeline and the state it operates on.
#[derive(Debug)]
pub struct Cpu {
    pub program: InstructionBuffer,
    pub regs: RegisterFile,
    pub lsu: Lsu,

    pub fetch: StageLatch,
    pub exec: StageLatch,
    pub wb: StageLatch,

    /// Cycles left on the outstanding LSU access; 0 when idle.
    pub lsu_wait: u64,
    /// Latency applied to every LSU access.
    pub lsu_delay: u64,

    pub stats: SimStats,
}

impl Cpu {
    /// Creates a pipeline over `program` using the configured LSU latency.
    pub fn new(program: InstructionBuffer, config: &Config) -> Self {
        Self::with_lsu_delay(program, config.pipeline.lsu_delay)
    }

    /// Creates a pipeline with an explicit LSU latency (at least 1).
    pub fn with_lsu_delay(program: InstructionBuffer, lsu_delay: u64) -> Self {
        Self {
            program,
            regs: RegisterFile::new(),
            lsu: Lsu::new(),
            fetch: StageLatch::default(),
            exec: StageLatch::default(),
            wb: StageLatch::default(),
            lsu_wait: 0,
            lsu_delay: lsu_delay.max(1),
            stats: SimStats::default(),
        }
    }

    /// Latch phase: stage 3, 2, then 1 pull from the stage ahead; stage 1
    /// admits from the instruction buffer.
    pub fn negedge(&mut self, cycle: u64) {
        tracing::trace!(target: "simulator", "negedge cycle={}", cycle);
        stages::wb_latch(self);
        stages::execute_latch(self);
        stages::fetch_admit(self);
    }

    /// Work phase: write-back, execute, then operand fetch.
    ///
    /// `sink` is notified of every retirement; an error from it is returned
    /// after the write-back has been committed.
    pub fn posedge(&mut self, cycle: u64, sink: &mut dyn RetireSink) -> SimResult<()> {
        tracing::trace!(target: "simulator", "posedge cycle={}", cycle);
        let retired = stages::wb_stage(self, cycle, sink);
        stages::execute_stage(self);
        stages::fetch_stage(self);
        retired
    }

    /// `true` once `pc` is past the program and stages 1 and 2 have nothing
    /// left to hand on. Stage 3 may still be draining.
    pub fn empty_pipe(&self) -> bool {
        let past_end = usize::try_from(self.regs.pc()).is_ok_and(|pc| pc >= self.program.len());
        past_end && self.fetch.output.is_none() && self.exec.output.is_none()
    }

    /// Instructions retired so far.
    pub fn retired(&self) -> u64 {
        self.stats.instructions_retired
    }

    fn slot_mnemonic(&self, latch: &StageLatch) -> String {
        let Some(entry) = latch.output.as_ref() else {
            return "X".to_string();
        };
        let mnemonic = self.program.fetch(entry.addr).map_or("X", |i| i.mnemonic());
        if entry.stalled {
            format!("{mnemonic} (LSU WAIT)")
        } else {
            mnemonic.to_string()
        }
    }

    fn slot_assembly(&self, latch: &StageLatch) -> &str {
        latch
            .output
            .as_ref()
            .and_then(|e| self.program.fetch(e.addr))
            .map_or("X", |i| i.assembly())
    }

    /// Mnemonic in the stage-1 output latch, if any.
    pub fn stage1_mnemonic(&self) -> Option<&str> {
        self.fetch
            .output
            .as_ref()
            .and_then(|e| self.program.fetch(e.addr))
            .map(|i| i.mnemonic())
    }

    /// Renders the output latch of every stage as a table.
    pub fn diagram(&self) -> String {
        let rule = "-".repeat(82);
        let mut out = String::new();
        let _ = writeln!(out, "{rule}");
        let _ = writeln!(out, "|  {:22}  |  {:22}  |  {:22}  |", "FETCH", "EXEC", "WB");
        let _ = writeln!(out, "{rule}");
        let _ = writeln!(
            out,
            "|  {:22}  |  {:22}  |  {:22}  |",
            self.slot_mnemonic(&self.fetch),
            self.slot_mnemonic(&self.exec),
            self.slot_mnemonic(&self.wb)
        );
        let _ = writeln!(out, "{rule}");
        let _ = writeln!(out, "[STAGE1] inst=[{}]", self.slot_assembly(&self.fetch));
        let _ = writeln!(out, "[STAGE2] inst=[{}]", self.slot_assembly(&self.exec));
        let _ = writeln!(out, "[STAGE3] inst=[{}]", self.slot_assembly(&self.wb));
        let _ = write!(out, "{rule}");
        out
    }
}
