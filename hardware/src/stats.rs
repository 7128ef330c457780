//! Simulation statistics collection and reporting.
//!
//! Tracks cycle and retirement counts, the retired instruction mix, stall
//! cycles and host execution time.

use std::fmt;
use std::time::Instant;

use serde::Serialize;

use crate::common::{SimError, SimResult};
use crate::isa::Opcode;

/// Simulation statistics structure tracking all performance metrics.
///
/// Serializes to JSON for `--stats-json`; host timing is not part of the
/// serialized form.
#[derive(Debug, Clone, Serialize)]
pub struct SimStats {
    #[serde(skip)]
    start_time: Instant,
    pub cycles: u64,
    pub instructions_retired: u64,

    pub inst_alu: u64,
    pub inst_load: u64,
    pub inst_store: u64,
    pub inst_branch: u64,
    pub inst_jump: u64,
    pub inst_other: u64,

    pub branches_taken: u64,

    pub stalls_data: u64,
    pub stalls_mem: u64,
}

impl Default for SimStats {
    /// Returns the default value.
    fn default() -> Self {
        Self {
            start_time: Instant::now(),
            cycles: 0,
            instructions_retired: 0,
            inst_alu: 0,
            inst_load: 0,
            inst_store: 0,
            inst_branch: 0,
            inst_jump: 0,
            inst_other: 0,
            branches_taken: 0,
            stalls_data: 0,
            stalls_mem: 0,
        }
    }
}

impl SimStats {
    /// Counts one retirement against the instruction mix.
    pub fn record_retire(&mut self, opcode: Opcode, taken: bool) {
        self.instructions_retired += 1;
        match opcode {
            Opcode::Alu(_) => self.inst_alu += 1,
            Opcode::Load => self.inst_load += 1,
            Opcode::Store => self.inst_store += 1,
            Opcode::Jump => self.inst_jump += 1,
            Opcode::BranchGe | Opcode::BranchLe => {
                self.inst_branch += 1;
                if taken {
                    self.branches_taken += 1;
                }
            }
            Opcode::Other => self.inst_other += 1,
        }
    }

    /// Cycles per retired instruction.
    ///
    /// # Errors
    ///
    /// `SimError::NoRetiredInstructions` when nothing has retired.
    pub fn cpi(&self) -> SimResult<f64> {
        if self.instructions_retired == 0 {
            return Err(SimError::NoRetiredInstructions);
        }
        Ok(self.cycles as f64 / self.instructions_retired as f64)
    }

    /// Retired instructions per cycle; 0 before the first cycle.
    pub fn ipc(&self) -> f64 {
        if self.cycles == 0 {
            0.0
        } else {
            self.instructions_retired as f64 / self.cycles as f64
        }
    }

    /// Prints the report to stdout.
    pub fn print(&self) {
        println!("{self}");
    }

    fn pct(part: u64, whole: u64) -> f64 {
        if whole == 0 {
            0.0
        } else {
            (part as f64 / whole as f64) * 100.0
        }
    }
}

impl fmt::Display for SimStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let seconds = self.start_time.elapsed().as_secs_f64();
        let cyc = self.cycles;
        let instr = self.instructions_retired;

        writeln!(f, "==========================================================")?;
        writeln!(f, "KINDRED PIPELINE SIMULATION STATISTICS")?;
        writeln!(f, "==========================================================")?;
        writeln!(f, "host_seconds             {:.4} s", seconds)?;
        writeln!(f, "sim_cycles               {}", cyc)?;
        writeln!(f, "sim_insts                {}", instr)?;
        writeln!(f, "sim_ipc                  {:.4}", self.ipc())?;
        match self.cpi() {
            Ok(cpi) => writeln!(f, "sim_cpi                  {:.4}", cpi)?,
            Err(e) => writeln!(f, "sim_cpi                  {}", e)?,
        }
        writeln!(f, "----------------------------------------------------------")?;
        writeln!(f, "STALLS")?;
        writeln!(
            f,
            "  stalls.data            {} ({:.2}%)",
            self.stalls_data,
            Self::pct(self.stalls_data, cyc)
        )?;
        writeln!(
            f,
            "  stalls.memory          {} ({:.2}%)",
            self.stalls_mem,
            Self::pct(self.stalls_mem, cyc)
        )?;
        writeln!(f, "----------------------------------------------------------")?;
        writeln!(f, "INSTRUCTION MIX")?;
        for (name, count) in [
            ("op.alu", self.inst_alu),
            ("op.load", self.inst_load),
            ("op.store", self.inst_store),
            ("op.branch", self.inst_branch),
            ("op.jump", self.inst_jump),
            ("op.other", self.inst_other),
        ] {
            writeln!(f, "  {:<22} {} ({:.2}%)", name, count, Self::pct(count, instr))?;
        }
        writeln!(
            f,
            "  branches.taken         {} of {}",
            self.branches_taken, self.inst_branch
        )?;
        write!(f, "==========================================================")
    }
}
