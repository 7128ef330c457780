//! Unit tests for the load/store unit memory.

use kindred_sim::core::units::lsu::Lsu;

/// Tests that unwritten addresses read as zero.
#[test]
fn test_default_zero() {
    let lsu = Lsu::new();
    assert_eq!(lsu.read(0x100), 0);
    assert!(lsu.is_empty());
}

/// Tests that the last write to an address wins.
#[test]
fn test_overwrite() {
    let mut lsu = Lsu::new();
    lsu.write(8, 1);
    lsu.write(8, 2);
    assert_eq!(lsu.read(8), 2);
    assert_eq!(lsu.len(), 1);
}

/// Tests negative addresses and values are stored as given.
#[test]
fn test_signed_words() {
    let mut lsu = Lsu::new();
    lsu.write(-4, -99);
    assert_eq!(lsu.read(-4), -99);
}

/// Tests that the dump iterator is ordered by address.
#[test]
fn test_iter_sorted() {
    let mut lsu = Lsu::new();
    lsu.write(30, 3);
    lsu.write(10, 1);
    lsu.write(20, 2);
    let dump: Vec<(i64, i64)> = lsu.iter().collect();
    assert_eq!(dump, vec![(10, 1), (20, 2), (30, 3)]);
}
