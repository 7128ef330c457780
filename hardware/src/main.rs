//! Kindred pipeline simulator CLI.
//!
//! Loads an assembly workload, runs it through the three-stage pipeline and
//! prints the program listing, the final architectural state and the run
//! statistics.

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;

use kindred_sim::common::SimError;
use kindred_sim::config::Config;
use kindred_sim::core::InstructionBuffer;
use kindred_sim::sim::loader;
use kindred_sim::sim::logging::logging_setup;
use kindred_sim::sim::trace::InstTrace;
use kindred_sim::sim::vcd::VcdWriter;
use kindred_sim::sim::{Simulator, Termination};

/// Command-line arguments for the pipeline simulator.
#[derive(Parser, Debug)]
#[command(author, version, about = "Kindred 3-Stage Pipeline Simulator")]
struct Args {
    /// Assembly workload to simulate
    #[arg(short, long)]
    workload: PathBuf,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write a VCD waveform of the clock and stage 1
    #[arg(short = 'v', long)]
    vcd_trace: Option<PathBuf>,

    /// Write one line per retired instruction
    #[arg(short, long)]
    inst_trace: Option<PathBuf>,

    /// Stop after this many cycles
    #[arg(long)]
    max_cycles: Option<u64>,

    /// LSU access latency in cycles (at least 1)
    #[arg(long)]
    lsu_delay: Option<u64>,

    /// Write the statistics as JSON to this file
    #[arg(long)]
    stats_json: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(short, long, default_value = "info")]
    log_level: tracing::Level,
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging_setup(args.log_level);

    let mut config = match &args.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("could not load config `{}`", path.display()))?,
        None => Config::default(),
    };
    if let Some(n) = args.max_cycles {
        config.general.max_cycles = n;
    }
    if let Some(d) = args.lsu_delay {
        config.pipeline.lsu_delay = d;
    }
    if let Some(p) = &args.vcd_trace {
        config.trace.vcd = Some(p.display().to_string());
    }
    if let Some(p) = &args.inst_trace {
        config.trace.inst_trace = Some(p.display().to_string());
    }
    config.validate()?;

    let mut program = InstructionBuffer::new();
    let report = loader::load_file(&args.workload, &mut program)
        .with_context(|| format!("could not read workload `{}`", args.workload.display()))?;
    if !report.skipped.is_empty() {
        eprintln!("[!] {} line(s) skipped while loading", report.skipped.len());
    }
    if program.is_empty() {
        bail!(SimError::NoProgram);
    }

    println!("Program");
    println!("--------------------");
    println!("{}", program.listing());
    println!("--------------------");
    println!("Pipeline:");
    println!("  LSU Delay:          {}", config.pipeline.lsu_delay);
    println!("  Max Cycles:         {}", config.general.max_cycles);
    println!("--------------------");

    let mut sim = Simulator::new(program, &config);
    if let Some(path) = &config.trace.inst_trace {
        let trace = InstTrace::create(path)
            .with_context(|| format!("could not create instruction trace `{}`", path))?;
        sim = sim.with_retire_sink(Box::new(trace));
    }
    if let Some(path) = &config.trace.vcd {
        let vcd = VcdWriter::create(path)
            .with_context(|| format!("could not create VCD trace `{}`", path))?;
        sim = sim.with_waveform(Box::new(vcd))?;
    }

    let summary = sim.run()?;
    if summary.termination == Termination::CycleCap {
        println!("\n[!] Stopped at the cycle limit ({} cycles)", summary.cycles);
    }

    let cpu = sim.into_cpu();
    println!("\nRegisters");
    println!("--------------------");
    println!("{}", cpu.regs);
    if !cpu.lsu.is_empty() {
        println!("Memory");
        println!("--------------------");
        for (addr, value) in cpu.lsu.iter() {
            println!("  [{:#010x}] = {:#x}", addr, value);
        }
    }

    cpu.stats.print();
    if let Err(e @ SimError::NoRetiredInstructions) = cpu.stats.cpi() {
        eprintln!("[!] {}", e);
    }

    if let Some(path) = &args.stats_json {
        let json = serde_json::to_string_pretty(&cpu.stats)?;
        fs::write(path, json)
            .with_context(|| format!("could not write statistics `{}`", path.display()))?;
    }
    Ok(())
}
