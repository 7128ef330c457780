use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::common::{SimError, SimResult};

const DEFAULT_MAX_CYCLES: u64 = 10_000;
const DEFAULT_LSU_DELAY: u64 = 1;

/// Simulator configuration, normally read from a TOML file.
///
/// Every section and key is optional:
///
/// ```toml
/// [general]
/// max_cycles = 10000
///
/// [pipeline]
/// lsu_delay = 1
///
/// [trace]
/// inst_trace = "inst.trace"
/// vcd = "pipeline.vcd"
/// ```
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub trace: TraceConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GeneralConfig {
    #[serde(default = "default_max_cycles")]
    pub max_cycles: u64,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            max_cycles: default_max_cycles(),
        }
    }
}

fn default_max_cycles() -> u64 {
    DEFAULT_MAX_CYCLES
}

#[derive(Debug, Deserialize, Clone)]
pub struct PipelineConfig {
    /// Cycles an LSU access occupies stage 2.
    #[serde(default = "default_lsu_delay")]
    pub lsu_delay: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            lsu_delay: default_lsu_delay(),
        }
    }
}

fn default_lsu_delay() -> u64 {
    DEFAULT_LSU_DELAY
}

/// Output files; absent keys disable the corresponding trace.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct TraceConfig {
    #[serde(default)]
    pub inst_trace: Option<String>,
    #[serde(default)]
    pub vcd: Option<String>,
}

impl Config {
    /// Parses and validates a TOML document.
    pub fn from_toml(text: &str) -> SimResult<Self> {
        let config: Config = toml::from_str(text).map_err(|e| SimError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    pub fn load(path: impl AsRef<Path>) -> SimResult<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    /// Rejects values the pipeline cannot run with.
    pub fn validate(&self) -> SimResult<()> {
        if self.pipeline.lsu_delay == 0 {
            return Err(SimError::Config("pipeline.lsu_delay must be at least 1".into()));
        }
        if self.general.max_cycles == 0 {
            return Err(SimError::Config("general.max_cycles must be at least 1".into()));
        }
        Ok(())
    }
}
