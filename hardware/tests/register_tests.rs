//! Tests for the named register file and its reservations.

use kindred_sim::common::SimError;
use kindred_sim::core::arch::gpr::REGISTER_NAMES;
use kindred_sim::core::arch::RegisterFile;

/// Tests that every register starts at zero and unreserved.
#[test]
fn test_initial_state() {
    let regs = RegisterFile::new();
    assert_eq!(REGISTER_NAMES.len(), 19);
    for (_, value) in regs.iter() {
        assert_eq!(value, 0);
    }
    assert_eq!(regs.reserved_count(), 0);
}

/// Tests numeric and textual write-back values.
#[test]
fn test_write_back_values() {
    let mut regs = RegisterFile::new();
    regs.write_back("t0", 5_i64);
    regs.write_back("T1", "0x20");
    regs.write_back("s2", "-7");
    assert_eq!(regs.read("t0"), 5);
    assert_eq!(regs.read("t1"), 32);
    assert_eq!(regs.read("S2"), -7);
}

/// Tests that an unparsable value leaves the register unchanged.
#[test]
fn test_invalid_value_dropped() {
    let mut regs = RegisterFile::new();
    regs.write_back("t0", 3_i64);
    regs.write_back("t0", "abc");
    assert_eq!(regs.read("t0"), 3);
}

/// Tests that unknown registers degrade instead of failing.
#[test]
fn test_unknown_register() {
    let mut regs = RegisterFile::new();
    regs.write_back("a7", 1_i64);
    regs.increment("a7", 1_i64);
    assert_eq!(regs.read("a7"), 0);
    assert!(matches!(regs.try_read("a7"), Err(SimError::UnknownRegister(_))));
    assert!(!regs.is_reserved(["a7"]));
}

/// Tests pc increment.
#[test]
fn test_increment_pc() {
    let mut regs = RegisterFile::new();
    regs.increment("pc", 1_i64);
    regs.increment("pc", "2");
    assert_eq!(regs.pc(), 3);
}

/// Tests reserving, re-reserving and releasing registers.
#[test]
fn test_reservations() {
    let mut regs = RegisterFile::new();
    regs.reserve(["t0", "pc"], 4);
    assert!(regs.is_reserved(["t0"]));
    assert!(regs.is_reserved(["t5", "pc"]));
    assert!(!regs.is_reserved(["t1"]));
    assert_eq!(regs.owner_of("t0"), Some(4));

    // same owner again is a no-op, another owner does not steal it
    regs.reserve(["t0"], 4);
    regs.reserve(["t0"], 9);
    assert_eq!(regs.owner_of("t0"), Some(4));
    assert_eq!(regs.reserved_count(), 2);

    regs.release(["t0", "pc", "t3"]);
    assert_eq!(regs.reserved_count(), 0);
    assert_eq!(regs.owner_of("t0"), None);
}

/// Tests that the dump marks reserved registers.
#[test]
fn test_display_marks_reserved() {
    let mut regs = RegisterFile::new();
    regs.write_back("t2", 255_i64);
    regs.reserve(["t2"], 1);
    let dump = regs.to_string();
    assert!(dump.contains("T2 = 0xff :: WB STALL"));
    assert!(dump.contains("PC = 0x0\n"));
}
