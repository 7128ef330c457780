//! Retirement traces.
//!
//! Two [`RetireSink`] implementations: an in-memory log for tests and tools,
//! and a line-oriented text trace written to any `Write`.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

pub use crate::core::pipeline::RetireSink;

/// One retired instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Retirement {
    pub cycle: u64,
    pub assembly: String,
}

impl RetireSink for Vec<Retirement> {
    fn retire(&mut self, cycle: u64, assembly: &str) -> io::Result<()> {
        self.push(Retirement {
            cycle,
            assembly: assembly.to_string(),
        });
        Ok(())
    }
}

/// Text trace with one `CYCLE=<n> :: <assembly>` line per retirement.
#[derive(Debug)]
pub struct InstTrace<W: Write> {
    out: W,
}

impl<W: Write> InstTrace<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl InstTrace<BufWriter<File>> {
    /// Creates (or truncates) the trace file at `path`.
    pub fn create(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = File::create(path)?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> RetireSink for InstTrace<W> {
    fn retire(&mut self, cycle: u64, assembly: &str) -> io::Result<()> {
        writeln!(self.out, "CYCLE={:5} :: {}", cycle, assembly)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trace_line_format() {
        let mut t = InstTrace::new(Vec::new());
        t.retire(3, "li t0, 5").unwrap();
        let text = String::from_utf8(t.into_inner()).unwrap();
        assert_eq!(text, "CYCLE=    3 :: li t0, 5\n");
    }
}
