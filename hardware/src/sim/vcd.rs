//! Value change dump output.
//!
//! VCD output for the handful of signals the driver exposes: the clock and
//! the mnemonic held in stage 1. Signals are registered up front; the header
//! is emitted on the first value change (or flush), after which no further
//! signals can be added.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use vcd::{IdCode, SimulationCommand, TimescaleUnit, Value, VarType};

/// Handle returned by [`WaveformSink::register`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SignalId(usize);

/// Variable type and width.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SignalKind {
    Integer { width: u32 },
    String,
}

/// A value written to a signal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SignalValue {
    Integer(i64),
    String(String),
}

impl From<i64> for SignalValue {
    fn from(v: i64) -> Self {
        SignalValue::Integer(v)
    }
}

impl From<&str> for SignalValue {
    fn from(v: &str) -> Self {
        SignalValue::String(v.to_string())
    }
}

/// Destination for signal changes over time.
pub trait WaveformSink {
    /// Declares a signal under a dotted `scope` path.
    fn register(
        &mut self,
        scope: &str,
        name: &str,
        kind: SignalKind,
        init: SignalValue,
    ) -> io::Result<SignalId>;

    /// Records `value` on `id` at `time`. Times must not decrease.
    fn change(&mut self, id: SignalId, time: u64, value: SignalValue) -> io::Result<()>;

    /// Pushes buffered output to the destination.
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[derive(Debug)]
struct Signal {
    scope: Vec<String>,
    name: String,
    kind: SignalKind,
    init: SignalValue,
    code: Option<IdCode>,
}

/// Writes VCD to `W` through [`vcd::Writer`].
pub struct VcdWriter<W: Write> {
    out: vcd::Writer<W>,
    signals: Vec<Signal>,
    header_done: bool,
    last_time: Option<u64>,
}

fn bits(value: i64, width: u32) -> Vec<Value> {
    let width = width.clamp(1, 64);
    (0..width)
        .rev()
        .map(|bit| if (value >> bit) & 1 == 1 { Value::V1 } else { Value::V0 })
        .collect()
}

fn escape(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect()
}

fn write_value<W: Write>(
    out: &mut vcd::Writer<W>,
    code: IdCode,
    kind: SignalKind,
    value: &SignalValue,
) -> io::Result<()> {
    match (kind, value) {
        (SignalKind::Integer { width }, SignalValue::Integer(v)) => {
            out.change_vector(code, bits(*v, width))
        }
        (_, SignalValue::String(s)) => out.change_string(code, &escape(s)),
        (SignalKind::String, SignalValue::Integer(v)) => out.change_string(code, &v.to_string()),
    }
}

impl<W: Write> VcdWriter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: vcd::Writer::new(out),
            signals: Vec::new(),
            header_done: false,
            last_time: None,
        }
    }

    fn write_header(&mut self) -> io::Result<()> {
        self.out.date("today")?;
        self.out.timescale(1, TimescaleUnit::NS)?;

        let mut order: Vec<usize> = (0..self.signals.len()).collect();
        order.sort_by(|a, b| self.signals[*a].scope.cmp(&self.signals[*b].scope));

        let mut open: Vec<String> = Vec::new();
        for idx in order {
            let common = open
                .iter()
                .zip(self.signals[idx].scope.iter())
                .take_while(|(a, b)| a == b)
                .count();
            while open.len() > common {
                self.out.upscope()?;
                open.pop();
            }
            for part in &self.signals[idx].scope[common..] {
                self.out.add_module(part)?;
                open.push(part.clone());
            }
            let sig = &self.signals[idx];
            let (var_type, width) = match sig.kind {
                SignalKind::Integer { width } => (VarType::Integer, width),
                SignalKind::String => (VarType::String, 1),
            };
            let code = self.out.add_var(var_type, width, &sig.name, None)?;
            self.signals[idx].code = Some(code);
        }
        for _ in open {
            self.out.upscope()?;
        }
        self.out.enddefinitions()?;

        self.out.timestamp(0)?;
        self.out.begin(SimulationCommand::Dumpvars)?;
        for sig in &self.signals {
            if let Some(code) = sig.code {
                write_value(&mut self.out, code, sig.kind, &sig.init)?;
            }
        }
        self.out.end()?;
        self.last_time = Some(0);
        self.header_done = true;
        Ok(())
    }

    /// Writes the header if no change has been recorded yet, then flushes.
    pub fn flush(&mut self) -> io::Result<()> {
        if !self.header_done {
            self.write_header()?;
        }
        self.out.flush()
    }
}
impl VcdWriter<BufWriter<File>> {
    /// Creates (or truncates) the dump file at `path`.
    pub fn create(path: impl AsRef<Path>) -> io::Result<Self> {
        Ok(Self::new(BufWriter::new(File::create(path)?)))
    }
}

impl<W: Write> WaveformSink for VcdWriter<W> {
    fn register(
        &mut self,
        scope: &str,
        name: &str,
        kind: SignalKind,
        init: SignalValue,
    ) -> io::Result<SignalId> {
        if self.header_done {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "cannot register signals after the first value change",
            ));
        }
        let id = SignalId(self.signals.len());
        self.signals.push(Signal {
            scope: scope.split('.').map(str::to_string).collect(),
            name: name.to_string(),
            kind,
            init,
            code: None,
        });
        Ok(id)
    }

    fn change(&mut self, id: SignalId, time: u64, value: SignalValue) -> io::Result<()> {
        if !self.header_done {
            self.write_header()?;
        }
        let Some((code, kind)) = self.signals.get(id.0).and_then(|s| s.code.map(|c| (c, s.kind)))
        else {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "unknown signal"));
        };
        match self.last_time {
            Some(last) if time < last => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("time {} is before {}", time, last),
                ));
            }
            Some(last) if time == last => {}
            _ => self.out.timestamp(time)?,
        }
        self.last_time = Some(time);
        write_value(&mut self.out, code, kind, &value)
    }

    fn flush(&mut self) -> io::Result<()> {
        VcdWriter::flush(self)
    }
}
