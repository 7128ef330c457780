//! Cycle-level tests for the three-stage pipeline.

use std::io;

use kindred_sim::common::SimError;
use kindred_sim::config::Config;
use kindred_sim::core::pipeline::{NullSink, RetireSink};
use kindred_sim::core::{Cpu, InstructionBuffer};
use kindred_sim::sim::loader;
use kindred_sim::sim::trace::Retirement;
use kindred_sim::sim::{RunSummary, Simulator, Termination};

fn program(src: &str) -> InstructionBuffer {
    let mut buf = InstructionBuffer::new();
    let report = loader::load_str(src, &mut buf);
    assert!(report.skipped.is_empty(), "{:?}", report.skipped);
    buf
}

fn run(src: &str, config: &Config) -> (RunSummary, Cpu, Vec<Retirement>) {
    let mut sim = Simulator::new(program(src), config);
    let mut log: Vec<Retirement> = Vec::new();
    let summary = sim.run_with(&mut log).unwrap();
    (summary, sim.into_cpu(), log)
}

fn with_lsu_delay(delay: u64) -> Config {
    let mut config = Config::default();
    config.pipeline.lsu_delay = delay;
    config
}

/// Tests that independent ALU instructions retire one per cycle after a
/// two-cycle fill.
#[test]
fn test_independent_alu_throughput() {
    let (summary, cpu, log) = run("li t0, 1\nli t1, 2\nli t2, 3\nli t3, 4\n", &Config::default());
    assert_eq!(summary.termination, Termination::Drained);
    assert_eq!(summary.cycles, 6);
    assert_eq!(summary.retired, 4);
    let cycles: Vec<u64> = log.iter().map(|r| r.cycle).collect();
    assert_eq!(cycles, vec![3, 4, 5, 6]);
    assert_eq!(cpu.regs.read("t3"), 4);
    assert_eq!(cpu.stats.stalls_data, 0);
}

/// Tests that a single instruction takes three cycles end to end.
#[test]
fn test_single_instruction_latency() {
    let (summary, cpu, _) = run("li s0, 0x10", &Config::default());
    assert_eq!(summary.cycles, 3);
    assert_eq!(cpu.regs.read("s0"), 16);
}

/// Tests that a consumer is held at fetch until its producer retires.
#[test]
fn test_raw_dependency_stalls_until_retire() {
    let (summary, cpu, log) = run("li t0, 1\nadd t1, t0, t0\n", &Config::default());
    assert_eq!(cpu.regs.read("t1"), 2);
    assert_eq!(log[0].cycle, 3);
    // admitted on cycle 4, retired two cycles later
    assert_eq!(log[1].cycle, 6);
    assert_eq!(summary.cycles, 6);
    assert_eq!(cpu.stats.stalls_data, 2);
}

/// Tests that the add is not admitted while its source is reserved.
#[test]
fn test_raw_dependency_cycle_by_cycle() {
    let mut cpu = Cpu::with_lsu_delay(program("li t0, 1\nadd t1, t0, t0\n"), 1);
    let mut sink = NullSink;
    for cycle in 1..=3 {
        cpu.negedge(cycle);
        assert_eq!(cpu.regs.pc(), 1, "add admitted early on cycle {cycle}");
        cpu.posedge(cycle, &mut sink).unwrap();
    }
    assert_eq!(cpu.retired(), 1);
    assert!(!cpu.regs.is_reserved(["t0"]));
    cpu.negedge(4);
    assert_eq!(cpu.regs.pc(), 2);
    assert_eq!(cpu.regs.owner_of("t1"), Some(2));
}

/// Tests the two-producer dependency sequence and its total cycle count.
#[test]
fn test_two_producers_one_consumer() {
    let (summary, cpu, _) = run("li t0, 5\nli t1, 10\nadd t2, t0, t1\n", &Config::default());
    assert_eq!(cpu.regs.read("t2"), 15);
    assert_eq!(summary.cycles, 7);
    assert_eq!(summary.retired, 3);
}

/// Tests every ALU mnemonic through the pipeline.
#[test]
fn test_alu_mnemonics() {
    let src = "li t0, 12\naddi t1, t0, 3\nsub t2, t1, t0\nslli t3, t2, 4\nslri t4, t3, 2\nli t5, -8\nslri s0, t5, 1\n";
    let (_, cpu, _) = run(src, &Config::default());
    assert_eq!(cpu.regs.read("t1"), 15);
    assert_eq!(cpu.regs.read("t2"), 3);
    assert_eq!(cpu.regs.read("t3"), 48);
    assert_eq!(cpu.regs.read("t4"), 12);
    assert_eq!(cpu.regs.read("s0"), -4);
}

/// Tests that a store followed by a load round-trips through the LSU.
#[test]
fn test_store_then_load() {
    let src = "li t0, 7\nli t1, 16\nsw t0, 4(t1)\nlw t2, 4(t1)\n";
    let (summary, cpu, log) = run(src, &Config::default());
    assert_eq!(cpu.lsu.read(20), 7);
    assert_eq!(cpu.regs.read("t2"), 7);
    assert_eq!(summary.cycles, 10);
    assert_eq!(log.last().map(|r| r.assembly.as_str()), Some("lw t2, 4(t1)"));
    assert_eq!(cpu.stats.stalls_mem, 2);
    assert_eq!(cpu.stats.inst_store, 1);
    assert_eq!(cpu.stats.inst_load, 1);
}

/// Tests that each memory access adds exactly the configured LSU delay.
#[test]
fn test_lsu_delay_scales_memory_latency() {
    let src = "li t0, 7\nli t1, 16\nsw t0, 4(t1)\nlw t2, 4(t1)\n";
    let (fast, _, _) = run(src, &with_lsu_delay(1));
    let (slow, cpu, _) = run(src, &with_lsu_delay(3));
    assert_eq!(slow.cycles - fast.cycles, 4);
    assert_eq!(cpu.regs.read("t2"), 7);
    assert_eq!(cpu.stats.stalls_mem, 6);
}

/// Tests that a load of an untouched address reads zero.
#[test]
fn test_load_unwritten_address() {
    let (_, cpu, _) = run("li t0, 99\nlw t0, 0x40\n", &Config::default());
    assert_eq!(cpu.regs.read("t0"), 0);
}

/// Tests a taken branch: pc and the tested register stay reserved until the
/// branch writes back, and the skipped instruction never executes.
#[test]
fn test_branch_taken() {
    let src = "li t0, 5\nbge t0, 3, skip\nli t1, 1\nskip: li t2, 2\n";
    let mut cpu = Cpu::with_lsu_delay(program(src), 1);
    let mut sink = Vec::<Retirement>::new();

    for cycle in 1..=5 {
        cpu.negedge(cycle);
        cpu.posedge(cycle, &mut sink).unwrap();
    }
    assert!(cpu.regs.is_reserved(["pc"]));
    assert_eq!(cpu.regs.owner_of("t0"), Some(2));
    assert_eq!(cpu.regs.pc(), 1);

    cpu.negedge(6);
    cpu.posedge(6, &mut sink).unwrap();
    assert_eq!(cpu.regs.reserved_count(), 0);
    assert_eq!(cpu.regs.pc(), 3);

    let mut cycle = 6;
    while !cpu.empty_pipe() {
        cycle += 1;
        cpu.negedge(cycle);
        cpu.posedge(cycle, &mut sink).unwrap();
    }
    assert_eq!(cpu.regs.read("t1"), 0);
    assert_eq!(cpu.regs.read("t2"), 2);
    let retired: Vec<&str> = sink.iter().map(|r| r.assembly.as_str()).collect();
    assert_eq!(retired, vec!["li t0, 5", "bge t0, 3, skip", "skip: li t2, 2"]);
    assert_eq!(cpu.stats.branches_taken, 1);
}

/// Tests a not-taken branch: pc advances at fetch and is never reserved.
#[test]
fn test_branch_not_taken() {
    let src = "li t0, 1\nbge t0, 3, skip\nli t1, 1\nskip: li t2, 2\n";
    let mut cpu = Cpu::with_lsu_delay(program(src), 1);
    let mut sink = NullSink;
    let mut cycle = 0;
    loop {
        cycle += 1;
        cpu.negedge(cycle);
        assert!(!cpu.regs.is_reserved(["pc"]));
        cpu.posedge(cycle, &mut sink).unwrap();
        if cpu.empty_pipe() {
            break;
        }
    }
    assert_eq!(cpu.regs.read("t1"), 1);
    assert_eq!(cpu.regs.read("t2"), 2);
    assert_eq!(cpu.retired(), 4);
    assert_eq!(cpu.stats.inst_branch, 1);
    assert_eq!(cpu.stats.branches_taken, 0);
}

/// Tests `ble` with a negative bound.
#[test]
fn test_ble_negative_bound() {
    let src = "li t0, -5\nble t0, -2, out\nli t1, 1\nout: li t2, 2\n";
    let (_, cpu, _) = run(src, &Config::default());
    assert_eq!(cpu.regs.read("t1"), 0);
    assert_eq!(cpu.regs.read("t2"), 2);
}

/// Tests that a jump with only a label operand lands on the label.
#[test]
fn test_jump_to_label() {
    let (_, cpu, log) = run("jal end\nli t0, 1\nend: li t1, 2\n", &Config::default());
    assert_eq!(cpu.regs.read("t0"), 0);
    assert_eq!(cpu.regs.read("t1"), 2);
    assert_eq!(log.len(), 2);
}

/// Tests that a taken branch to an undefined label falls through instead of
/// jumping to address 0.
#[test]
fn test_branch_to_undefined_label_falls_through() {
    let src = "li t0, 1\nbge t0, 0, nowhere\nli t1, 7\n";
    let (summary, cpu, log) = run(src, &Config::default());
    assert_eq!(summary.termination, Termination::Drained);
    assert_eq!(cpu.regs.read("t1"), 7);
    assert_eq!(log.len(), 3);
    assert_eq!(cpu.stats.inst_branch, 1);
    assert_eq!(cpu.stats.branches_taken, 0);
    assert_eq!(cpu.regs.reserved_count(), 0);
}

/// Tests that a jump to an undefined label continues with the next
/// instruction.
#[test]
fn test_jump_to_undefined_label_falls_through() {
    let (summary, cpu, log) = run("jal nowhere\nli t1, 7\n", &Config::default());
    assert_eq!(summary.termination, Termination::Drained);
    assert_eq!(cpu.regs.read("t1"), 7);
    assert_eq!(log.len(), 2);
    assert_eq!(cpu.regs.pc(), 2);
}

/// Tests a counted loop built from `addi` and `ble`.
#[test]
fn test_counted_loop() {
    let src = "li t0, 0\nloop: addi t0, t0, 1\nble t0, 3, loop\nli t1, 9\n";
    let (summary, cpu, _) = run(src, &Config::default());
    assert_eq!(summary.termination, Termination::Drained);
    assert_eq!(cpu.regs.read("t0"), 4);
    assert_eq!(cpu.regs.read("t1"), 9);
    assert_eq!(cpu.stats.branches_taken, 3);
}

/// Tests that a program that never terminates stops at the default cycle cap.
#[test]
fn test_infinite_loop_hits_cycle_cap() {
    let (summary, cpu, _) = run("loop: jal x1, loop\n", &Config::default());
    assert_eq!(summary.termination, Termination::CycleCap);
    assert_eq!(summary.cycles, 10_000);
    assert_eq!(cpu.stats.cycles, 10_000);
    assert!(summary.retired > 0);
}

/// Tests a configured cycle cap smaller than the program.
#[test]
fn test_custom_cycle_cap() {
    let mut config = Config::default();
    config.general.max_cycles = 2;
    let (summary, _, log) = run("li t0, 1\nli t1, 2\n", &config);
    assert_eq!(summary.termination, Termination::CycleCap);
    assert_eq!(summary.cycles, 2);
    assert!(log.is_empty());
}

/// Tests that an empty program is refused.
#[test]
fn test_empty_program_is_refused() {
    let mut sim = Simulator::new(InstructionBuffer::new(), &Config::default());
    assert!(matches!(sim.run(), Err(SimError::NoProgram)));
}

/// Tests that unknown mnemonics flow through and retire without effect.
#[test]
fn test_unknown_mnemonic_retires() {
    let (summary, cpu, _) = run("nop\nli t0, 3\n", &Config::default());
    assert_eq!(summary.retired, 2);
    assert_eq!(cpu.stats.inst_other, 1);
    assert_eq!(cpu.regs.read("t0"), 3);
}

/// Tests the per-cycle diagram contents.
#[test]
fn test_diagram_shows_stage_outputs() {
    let mut cpu = Cpu::with_lsu_delay(program("li t0, 1\naddi t1, t2, 1\n"), 1);
    let mut sink = NullSink;
    cpu.negedge(1);
    cpu.posedge(1, &mut sink).unwrap();
    cpu.negedge(2);
    cpu.posedge(2, &mut sink).unwrap();
    let diagram = cpu.diagram();
    assert!(diagram.contains("FETCH"));
    assert!(diagram.contains("[STAGE1] inst=[addi t1, t2, 1]"));
    assert!(diagram.contains("[STAGE2] inst=[li t0, 1]"));
    assert!(diagram.contains("[STAGE3] inst=[X]"));
}

/// Tests that a memory instruction waiting on the LSU is marked in the
/// diagram.
#[test]
fn test_diagram_marks_lsu_wait() {
    let mut cpu = Cpu::with_lsu_delay(program("lw t0, 0x40\n"), 1);
    let mut sink = NullSink;
    for cycle in 1..=2 {
        cpu.negedge(cycle);
        cpu.posedge(cycle, &mut sink).unwrap();
    }
    assert!(cpu.diagram().contains("lw (LSU WAIT)"));

    cpu.negedge(3);
    cpu.posedge(3, &mut sink).unwrap();
    assert!(!cpu.diagram().contains("LSU WAIT"));
}

struct FailingSink;

impl RetireSink for FailingSink {
    fn retire(&mut self, _cycle: u64, _assembly: &str) -> io::Result<()> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "trace closed"))
    }
}

/// Tests that a sink error is reported after the retirement is committed.
#[test]
fn test_sink_error_after_commit() {
    let mut cpu = Cpu::with_lsu_delay(program("li t0, 1\n"), 1);
    let mut sink = FailingSink;
    for cycle in 1..=2 {
        cpu.negedge(cycle);
        cpu.posedge(cycle, &mut sink).unwrap();
    }
    cpu.negedge(3);
    let err = cpu.posedge(3, &mut sink).unwrap_err();
    assert!(matches!(err, SimError::Io(_)));
    assert_eq!(cpu.retired(), 1);
    assert_eq!(cpu.regs.read("t0"), 1);
    assert_eq!(cpu.regs.reserved_count(), 0);
    assert!(cpu.wb.output.is_some());
    assert!(cpu.empty_pipe());
}

/// Tests that a run stops with the sink's error.
#[test]
fn test_run_reports_sink_error() {
    let mut sim = Simulator::new(program("li t0, 1\n"), &Config::default());
    assert!(matches!(sim.run_with(&mut FailingSink), Err(SimError::Io(_))));
}

/// Tests the bundled sample workload end to end.
#[test]
fn test_sample_workload() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/workloads/sum_loop.s");
    let mut buf = InstructionBuffer::new();
    let report = loader::load_file(path, &mut buf).unwrap();
    assert_eq!(report.loaded, 8);
    let config = Config::load(concat!(env!("CARGO_MANIFEST_DIR"), "/configs/default.toml")).unwrap();
    let mut sim = Simulator::new(buf, &config);
    let summary = sim.run().unwrap();
    assert_eq!(summary.termination, Termination::Drained);
    let cpu = sim.into_cpu();
    assert_eq!(cpu.regs.read("t1"), 15);
    assert_eq!(cpu.lsu.read(0x40), 15);
    assert_eq!(cpu.regs.read("t2"), 15);
}
