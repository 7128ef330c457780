//! Fetch-time hazard detection.
//!
//! There is no forwarding in this pipeline. An instruction is admitted into
//! stage 1 only when none of the registers it depends on is reserved by an
//! instruction still in flight.

use crate::core::arch::RegisterFile;
use crate::isa::Instruction;

/// Why a fetch was held back.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StallReason {
    /// A jump or taken branch ahead has not committed its target.
    PcReserved,
    /// The candidate's destination is still owed a write-back.
    WriteBackReserved,
    /// One of the candidate's source registers is still owed a write-back.
    SourceReserved,
}

/// Returns the reason `inst` cannot be admitted this cycle, if any.
pub fn fetch_stall(regs: &RegisterFile, inst: &Instruction) -> Option<StallReason> {
    if regs.is_reserved(["pc"]) {
        Some(StallReason::PcReserved)
    } else if inst.writes_back() && regs.is_reserved([inst.dst()]) {
        Some(StallReason::WriteBackReserved)
    } else if regs.is_reserved(inst.hazard_regs()) {
        Some(StallReason::SourceReserved)
    } else {
        None
    }
}
