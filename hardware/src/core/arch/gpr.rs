//! Named register file with write-back reservations.
//!
//! Registers are addressed by name (`pc`, `x0`..`x5`, `t0`..`t5`,
//! `s0`..`s5`), case-insensitively. Alongside the values the file keeps a
//! reservation map: a register is reserved from the moment an in-flight
//! instruction claims it at fetch until that instruction retires. The
//! pipeline uses reservations as its only hazard primitive; there is no
//! forwarding.
//!
//! Unknown register names never abort a run. The permissive accessors log the
//! name and degrade to zero or to a no-op; `try_read` reports
//! `SimError::UnknownRegister` for callers that want the strict form.

use std::collections::BTreeMap;
use std::fmt;

use crate::common::{SimError, SimResult, Word};
use crate::isa::operand;

/// Architectural register names, in display order.
pub const REGISTER_NAMES: [&str; 19] = [
    "pc", "x0", "x1", "x2", "x3", "x4", "x5", "t0", "t1", "t2", "t3", "t4", "t5", "s0", "s1",
    "s2", "s3", "s4", "s5",
];

/// Index of the program counter in `REGISTER_NAMES`.
pub const PC: usize = 0;

/// A value accepted by `write_back` and `increment`: a number, or a string
/// holding a decimal or `0x` hex number.
pub trait IntoWord {
    /// Converts to a register value.
    fn into_word(self) -> SimResult<Word>;
}

impl IntoWord for Word {
    fn into_word(self) -> SimResult<Word> {
        Ok(self)
    }
}

impl IntoWord for &str {
    fn into_word(self) -> SimResult<Word> {
        operand::parse_immediate(self.trim()).ok_or_else(|| SimError::InvalidValue(self.to_string()))
    }
}

impl IntoWord for &String {
    fn into_word(self) -> SimResult<Word> {
        self.as_str().into_word()
    }
}

/// Register values plus the reservation map.
#[derive(Debug, Clone)]
pub struct RegisterFile {
    regs: [Word; REGISTER_NAMES.len()],
    /// Register index -> sequence id of the reserving instruction.
    reserved: BTreeMap<usize, usize>,
}

impl Default for RegisterFile {
    fn default() -> Self {
        Self::new()
    }
}

impl RegisterFile {
    /// Creates a register file with every register zeroed and nothing
    /// reserved.
    pub fn new() -> Self {
        Self {
            regs: [0; REGISTER_NAMES.len()],
            reserved: BTreeMap::new(),
        }
    }

    /// Index of a register name, case-insensitive.
    pub fn index_of(name: &str) -> Option<usize> {
        REGISTER_NAMES
            .iter()
            .position(|r| r.eq_ignore_ascii_case(name.trim()))
    }

    fn lookup(name: &str) -> Option<usize> {
        let idx = Self::index_of(name);
        if idx.is_none() {
            tracing::error!(target: "registers", "invalid register [{}]", name);
        }
        idx
    }

    /// Reads a register, reporting unknown names as an error.
    pub fn try_read(&self, name: &str) -> SimResult<Word> {
        Self::index_of(name)
            .map(|idx| self.regs[idx])
            .ok_or_else(|| SimError::UnknownRegister(name.to_string()))
    }

    /// Reads a register; an unknown name is logged and reads as 0.
    pub fn read(&self, name: &str) -> Word {
        Self::lookup(name).map_or(0, |idx| self.regs[idx])
    }

    /// Current program counter.
    pub fn pc(&self) -> Word {
        self.regs[PC]
    }

    /// Sets a register. Unknown names and unparsable values are logged and
    /// leave the file unchanged.
    pub fn write_back(&mut self, name: &str, value: impl IntoWord) {
        let Some(idx) = Self::lookup(name) else {
            return;
        };
        match value.into_word() {
            Ok(v) => self.regs[idx] = v,
            Err(e) => tracing::error!(target: "registers", "write-back to [{}] dropped: {}", name, e),
        }
    }

    /// Adds `delta` to a register (wrapping).
    pub fn increment(&mut self, name: &str, delta: impl IntoWord) {
        let Some(idx) = Self::lookup(name) else {
            return;
        };
        match delta.into_word() {
            Ok(d) => self.regs[idx] = self.regs[idx].wrapping_add(d),
            Err(e) => tracing::error!(target: "registers", "increment of [{}] dropped: {}", name, e),
        }
    }

    /// Reserves each named register for write-back by instruction `owner`.
    ///
    /// Reserving an already reserved register is a no-op; the first owner is
    /// kept.
    pub fn reserve<I, S>(&mut self, names: I, owner: usize)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in names {
            let name = name.as_ref();
            let Some(idx) = Self::lookup(name) else {
                continue;
            };
            match self.reserved.get(&idx) {
                None => {
                    tracing::debug!(target: "registers", "reserving register [{}] for stage3 write-back", REGISTER_NAMES[idx]);
                    self.reserved.insert(idx, owner);
                }
                Some(&held) if held != owner => {
                    tracing::warn!(
                        target: "registers",
                        "register [{}] already reserved by #{}, request from #{} ignored",
                        REGISTER_NAMES[idx],
                        held,
                        owner
                    );
                }
                Some(_) => {
                    tracing::debug!(target: "registers", "register [{}] already reserved for stage3 write-back", REGISTER_NAMES[idx]);
                }
            }
        }
    }

    /// Drops any reservation on the named registers.
    pub fn release<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in names {
            if let Some(idx) = Self::index_of(name.as_ref()) {
                if self.reserved.remove(&idx).is_some() {
                    tracing::debug!(target: "registers", "releasing register [{}]", REGISTER_NAMES[idx]);
                }
            }
        }
    }

    /// `true` if any of the named registers is reserved.
    pub fn is_reserved<I, S>(&self, names: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        names.into_iter().any(|name| {
            Self::index_of(name.as_ref()).is_some_and(|idx| self.reserved.contains_key(&idx))
        })
    }

    /// Sequence id of the instruction holding a reservation on `name`.
    pub fn owner_of(&self, name: &str) -> Option<usize> {
        Self::index_of(name).and_then(|idx| self.reserved.get(&idx).copied())
    }

    /// Number of registers currently reserved.
    pub fn reserved_count(&self) -> usize {
        self.reserved.len()
    }

    /// Iterates over `(name, value)` in display order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, Word)> + '_ {
        REGISTER_NAMES.iter().copied().zip(self.regs.iter().copied())
    }
}

impl fmt::Display for RegisterFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, (name, value)) in self.iter().enumerate() {
            let stall = if self.reserved.contains_key(&idx) {
                " :: WB STALL"
            } else {
                ""
            };
            writeln!(f, "{} = {:#x}{}", name.to_ascii_uppercase(), value, stall)?;
        }
        Ok(())
    }
}
