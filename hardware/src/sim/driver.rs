//! Simulation driver.
//!
//! Owns the [`Cpu`] and steps it one cycle at a time (negedge then posedge)
//! until the pipeline drains or the cycle cap is hit, feeding retirements to
//! the registered trace sinks and clock/stage activity to an optional
//! waveform.

use crate::common::{SimError, SimResult};
use crate::config::Config;
use crate::core::pipeline::{NullSink, RetireSink};
use crate::core::{Cpu, InstructionBuffer};
use crate::sim::vcd::{SignalId, SignalKind, SignalValue, WaveformSink};

/// Why a run stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Termination {
    /// All instructions left stages 1 and 2 and `pc` is past the program.
    Drained,
    /// The configured cycle limit was reached first.
    CycleCap,
}

/// Result of [`Simulator::run`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunSummary {
    pub cycles: u64,
    pub retired: u64,
    pub termination: Termination,
}

struct Waveform {
    sink: Box<dyn WaveformSink>,
    clk: SignalId,
    inst: SignalId,
}

/// Forwards each retirement to the owned sinks and a caller-supplied one.
struct Tee<'a> {
    owned: &'a mut Vec<Box<dyn RetireSink>>,
    extra: &'a mut dyn RetireSink,
}

impl RetireSink for Tee<'_> {
    fn retire(&mut self, cycle: u64, assembly: &str) -> std::io::Result<()> {
        self.owned.retire(cycle, assembly)?;
        self.extra.retire(cycle, assembly)
    }
}

/// Cycle loop around a [`Cpu`].
pub struct Simulator {
    cpu: Cpu,
    max_cycles: u64,
    retire_sinks: Vec<Box<dyn RetireSink>>,
    waveform: Option<Waveform>,
    edge: u64,
}

impl Simulator {
    pub fn new(program: InstructionBuffer, config: &Config) -> Self {
        Self {
            cpu: Cpu::new(program, config),
            max_cycles: config.general.max_cycles.max(1),
            retire_sinks: Vec::new(),
            waveform: None,
            edge: 0,
        }
    }

    /// Adds a sink notified of every retirement.
    pub fn with_retire_sink(mut self, sink: Box<dyn RetireSink>) -> Self {
        self.retire_sinks.push(sink);
        self
    }

    /// Attaches a waveform and registers the clock and stage-1 signals on it.
    pub fn with_waveform(mut self, mut sink: Box<dyn WaveformSink>) -> SimResult<Self> {
        let clk = sink.register(
            "kindred",
            "clk",
            SignalKind::Integer { width: 2 },
            SignalValue::Integer(0),
        )?;
        let inst = sink.register(
            "kindred.stage1",
            "inst",
            SignalKind::String,
            SignalValue::String(String::new()),
        )?;
        self.waveform = Some(Waveform { sink, clk, inst });
        Ok(self)
    }

    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    pub fn cpu_mut(&mut self) -> &mut Cpu {
        &mut self.cpu
    }

    pub fn into_cpu(self) -> Cpu {
        self.cpu
    }

    fn clock(&mut self, level: i64) -> SimResult<()> {
        self.edge += 1;
        if let Some(wave) = self.waveform.as_mut() {
            wave.sink.change(wave.clk, self.edge, SignalValue::Integer(level))?;
        }
        Ok(())
    }

    /// Runs one full cycle: negedge, then posedge.
    pub fn step(&mut self, cycle: u64, extra: &mut dyn RetireSink) -> SimResult<()> {
        tracing::debug!(target: "simulator", "stepping cycle [{}], pc [{}]", cycle, self.cpu.regs.pc());

        self.clock(0)?;
        self.cpu.negedge(cycle);

        self.clock(1)?;
        let mut tee = Tee {
            owned: &mut self.retire_sinks,
            extra,
        };
        self.cpu.posedge(cycle, &mut tee)?;

        if let Some(wave) = self.waveform.as_mut() {
            let mnemonic = self.cpu.stage1_mnemonic().unwrap_or("");
            wave.sink.change(wave.inst, self.edge, SignalValue::from(mnemonic))?;
        }

        if cfg!(feature = "always-trace") {
            tracing::info!(target: "simulator", "\n{}", self.cpu.diagram());
        } else {
            tracing::debug!(target: "simulator", "\n{}", self.cpu.diagram());
        }
        tracing::trace!(target: "registers", "\n{}", self.cpu.regs);
        Ok(())
    }

    /// Flushes every trace sink and the waveform.
    fn flush_sinks(&mut self, extra: &mut dyn RetireSink) -> SimResult<()> {
        self.retire_sinks.flush()?;
        extra.flush()?;
        if let Some(wave) = self.waveform.as_mut() {
            wave.sink.flush()?;
        }
        Ok(())
    }

    /// Runs until the pipeline drains or the cycle cap is reached.
    pub fn run(&mut self) -> SimResult<RunSummary> {
        self.run_with(&mut NullSink)
    }

    /// Like [`run`](Self::run), additionally notifying `sink` of each
    /// retirement.
    ///
    /// All sinks and the waveform are flushed before the summary is returned.
    pub fn run_with(&mut self, sink: &mut dyn RetireSink) -> SimResult<RunSummary> {
        if self.cpu.program.is_empty() {
            return Err(SimError::NoProgram);
        }

        let mut cycle = 0;
        let termination = loop {
            cycle += 1;
            self.step(cycle, sink)?;
            self.cpu.stats.cycles = cycle;

            if self.cpu.empty_pipe() {
                break Termination::Drained;
            }
            if cycle >= self.max_cycles {
                tracing::warn!(target: "simulator", "cycle limit [{}] reached", self.max_cycles);
                break Termination::CycleCap;
            }
        };

        self.flush_sinks(sink)?;

        let summary = RunSummary {
            cycles: cycle,
            retired: self.cpu.retired(),
            termination,
        };
        tracing::info!(
            target: "simulator",
            "run finished after {} cycles, {} retired ({:?})",
            summary.cycles,
            summary.retired,
            summary.termination
        );
        Ok(summary)
    }
}
