//! Kindred three-stage pipeline simulator library.
//!
//! This crate implements a cycle-level simulator for a small in-order
//! pipeline executing a textual subset of RISC-V assembly. It models register
//! reservations as the only hazard mechanism (no forwarding), a load-store
//! unit with configurable latency, and branch resolution at fetch.
//!
//! # Architecture
//!
//! * **Core**: 3-stage in-order pipeline (Fetch, Execute, Write-back) clocked
//!   in two phases per cycle.
//! * **Memory**: sparse word-addressed data memory behind the LSU.
//! * **Tracing**: retirement trace, VCD waveform and `tracing` diagnostics.
//!
//! # Modules
//!
//! * `common`: Shared types and error handling.
//! * `config`: Configuration loading and parsing.
//! * `core`: CPU core implementation.
//! * `isa`: Instruction and operand model.
//! * `sim`: Loader, simulation driver and trace outputs.
//! * `stats`: Performance statistics collection.

/// Shared types and error handling.
pub mod common;

/// Configuration system for run limits, pipeline timing and trace outputs.
///
/// Loads and validates TOML configuration files; command-line flags override
/// individual values.
pub mod config;

/// CPU core implementation including pipeline stages and execution units.
///
/// Implements the 3-stage pipeline, the register file with its reservation
/// map, the instruction buffer and the ALU/LSU.
pub mod core;

/// Instruction and operand model for the supported mnemonics.
pub mod isa;

/// Simulation harness, assembly loader and trace outputs.
pub mod sim;

/// Performance statistics collection and reporting.
pub mod stats;
