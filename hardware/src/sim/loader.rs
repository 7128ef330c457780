//! Assembly loader.
//!
//! Reads a workload file line by line into an [`InstructionBuffer`]. The
//! accepted syntax is
//!
//! ```text
//! [label:] mnemonic [dst] [, op1] [, op2]   # comment
//! ```
//!
//! Blank lines and lines starting with `#` are ignored. A label on a line of
//! its own is attached to the next instruction; one with nothing after it
//! is dropped. Lines that do not match are
//! logged and skipped so one typo does not abort a whole run.

use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::common::{SimError, SimResult};
use crate::core::InstructionBuffer;
use crate::isa::Instruction;

static LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:(?P<label>\w+)?:)?\s*(?P<inst>\w+)?\s*(?P<dst>\w+)?\s*(?:,\s*(?P<op1>[-\w()]+))?\s*(?:,\s*(?P<op2>[-\w]+))?\s*$",
    )
    .expect("assembly line pattern")
});

/// Outcome of loading one source.
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Instructions appended to the buffer.
    pub loaded: usize,
    /// Lines that could not be parsed, as `SimError::Parse`.
    pub skipped: Vec<SimError>,
}

fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(pos) => &line[..pos],
        None => line,
    }
    .trim()
}

/// Parses assembly text and appends every instruction to `buffer`.
///
/// Labels on lines of their own are held until the next instruction is
/// stored and then bound to its address. A label with no instruction after
/// it is dropped with a warning.
pub fn load_str(source: &str, buffer: &mut InstructionBuffer) -> LoadReport {
    let mut report = LoadReport::default();
    let mut pending: Vec<String> = Vec::new();

    for (idx, raw) in source.lines().enumerate() {
        let text = strip_comment(raw);
        if text.is_empty() {
            continue;
        }

        let Some(caps) = LINE_RE.captures(text) else {
            let err = SimError::Parse {
                line: idx + 1,
                text: text.to_string(),
            };
            tracing::warn!(target: "loader", "skipping: {}", err);
            report.skipped.push(err);
            continue;
        };

        let label = caps.name("label").map(|m| m.as_str());
        let Some(mnemonic) = caps.name("inst").map(|m| m.as_str()) else {
            // label on a line of its own
            pending.extend(label.map(str::to_string));
            continue;
        };

        let own_label = label.map(str::to_string).or_else(|| pending.first().cloned());
        let inst = Instruction::new(
            text,
            own_label.as_deref(),
            mnemonic,
            caps.name("dst").map(|m| m.as_str()),
            caps.name("op1").map(|m| m.as_str()),
            caps.name("op2").map(|m| m.as_str()),
        );
        tracing::debug!(target: "loader", "line {}: {}", idx + 1, inst);
        let before = buffer.len();
        buffer.append(inst);
        if buffer.len() > before {
            for held in pending.drain(..) {
                buffer.bind_label(held, before);
            }
        }
        report.loaded += 1;
    }

    for label in pending {
        tracing::warn!(target: "loader", "label [{}] has no instruction after it; dropped", label);
    }

    tracing::info!(
        target: "loader",
        "loaded {} instructions, skipped {} lines",
        report.loaded,
        report.skipped.len()
    );
    report
}

/// Reads `path` and loads it with [`load_str`].
pub fn load_file(path: impl AsRef<Path>, buffer: &mut InstructionBuffer) -> SimResult<LoadReport> {
    let path = path.as_ref();
    tracing::info!(target: "loader", "reading workload {}", path.display());
    let source = fs::read_to_string(path)?;
    Ok(load_str(&source, buffer))
}
