//! Three-stage instruction pipeline.
//!
//! Stage 1 fetches and resolves operands, stage 2 executes (including LSU
//! accesses), stage 3 writes back and retires. The controller in
//! `core::cpu` clocks the stages in two phases per cycle.

/// Fetch-time hazard detection.
pub mod hazards;

/// Stage input/output latches.
pub mod latches;

/// Stage implementations (fetch, execute, write-back).
pub mod stages;

/// Observer interfaces.
pub mod traits;

pub use latches::{DecodedInst, StageLatch};
pub use traits::{NullSink, RetireSink};
