//! Load/Store Unit.
//!
//! Sparse data memory behind the execute stage. Every address holds one
//! word; reads of an address never written return 0. The unit is
//! instantaneous: access latency is modelled by the pipeline, which holds a
//! memory instruction in the execute stage until its countdown expires.

use std::collections::HashMap;

use crate::common::Word;

/// Sparse word-addressed memory.
#[derive(Debug, Default, Clone)]
pub struct Lsu {
    memory: HashMap<Word, Word>,
}

impl Lsu {
    /// Creates an empty memory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` at `addr`.
    pub fn write(&mut self, addr: Word, value: Word) {
        tracing::trace!(target: "lsu", "write [{:#x}] <= {:#x}", addr, value);
        self.memory.insert(addr, value);
    }

    /// Loads the word at `addr`, or 0 if it was never written.
    pub fn read(&self, addr: Word) -> Word {
        self.memory.get(&addr).copied().unwrap_or(0)
    }

    /// Number of addresses that have been written.
    pub fn len(&self) -> usize {
        self.memory.len()
    }

    pub fn is_empty(&self) -> bool {
        self.memory.is_empty()
    }

    /// Written locations sorted by address.
    pub fn iter(&self) -> impl Iterator<Item = (Word, Word)> {
        let mut cells: Vec<_> = self.memory.iter().map(|(&a, &v)| (a, v)).collect();
        cells.sort_unstable_by_key(|&(a, _)| a);
        cells.into_iter()
    }
}
