//! Interfaces between the pipeline and its observers.

use std::io;

/// Receives one notification per retired instruction.
///
/// The pipeline calls `retire` from the write-back stage with the cycle
/// number and the instruction's source text.
pub trait RetireSink {
    /// Records a retirement.
    fn retire(&mut self, cycle: u64, assembly: &str) -> io::Result<()>;

    /// Pushes buffered output to the destination. Called once at the end of
    /// a run.
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Sink that discards every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl RetireSink for NullSink {
    fn retire(&mut self, _cycle: u64, _assembly: &str) -> io::Result<()> {
        Ok(())
    }
}

impl<T: RetireSink + ?Sized> RetireSink for Box<T> {
    fn retire(&mut self, cycle: u64, assembly: &str) -> io::Result<()> {
        (**self).retire(cycle, assembly)
    }

    fn flush(&mut self) -> io::Result<()> {
        (**self).flush()
    }
}

impl RetireSink for Vec<Box<dyn RetireSink>> {
    fn retire(&mut self, cycle: u64, assembly: &str) -> io::Result<()> {
        for sink in self.iter_mut() {
            sink.retire(cycle, assembly)?;
        }
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        for sink in self.iter_mut() {
            sink.flush()?;
        }
        Ok(())
    }
}
