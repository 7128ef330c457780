//! Simulator error definitions.
//!
//! Most conditions the pipeline meets while running are recovered locally
//! (unknown register names degrade to zero, malformed assembly lines are
//! skipped). `SimError` covers what is reported to a caller: run-level
//! failures such as an empty program, the strict register accessors, and
//! I/O from the loader and trace sinks.

use std::io;

use thiserror::Error;

/// Errors produced by the simulator library.
#[derive(Debug, Error)]
pub enum SimError {
    /// A register name that is not part of the register file.
    #[error("unknown register `{0}`")]
    UnknownRegister(String),

    /// A textual value that could not be parsed as an integer.
    #[error("invalid numeric value `{0}`")]
    InvalidValue(String),

    /// The instruction buffer is empty, so there is nothing to simulate.
    #[error("no instructions were loaded")]
    NoProgram,

    /// CPI was requested for a run that retired nothing.
    #[error("no instructions retired")]
    NoRetiredInstructions,

    /// An assembly line that does not match the instruction syntax.
    #[error("line {line}: could not parse `{text}`")]
    Parse {
        /// 1-based line number in the source file.
        line: usize,
        /// The offending line, trimmed.
        text: String,
    },

    /// Invalid configuration file or option combination.
    #[error("configuration error: {0}")]
    Config(String),

    /// Underlying I/O failure (workload file, trace files).
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Convenience alias used across the crate.
pub type SimResult<T> = Result<T, SimError>;
