//! Shared CLI helpers used across multiple commands.

use std::fmt;
use std::path::Path;

use anyhow::Context;
use icst_analysis::AnalysisConfig;
use icst_core::vector::{getmaxabs, mean, rms};

/// Load the analysis configuration from `path`, or the defaults.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<AnalysisConfig> {
    match path {
        Some(path) => AnalysisConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(AnalysisConfig::default()),
    }
}

/// Level statistics of a rendered or synthesized signal.
#[derive(Debug, Clone, Copy)]
pub struct SignalStats {
    pub samples: usize,
    pub peak: f32,
    pub rms: f32,
    pub dc: f32,
}

impl SignalStats {
    pub fn of(d: &[f32]) -> Self {
        Self {
            samples: d.len(),
            peak: getmaxabs(d),
            rms: rms(d),
            dc: mean(d),
        }
    }
}

/// Level in dBFS, floored at -120.
pub fn db(level: f32) -> f32 {
    if level > 1e-6 {
        20.0 * level.log10()
    } else {
        -120.0
    }
}

impl fmt::Display for SignalStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  samples: {}", self.samples)?;
        writeln!(f, "  peak:    {:.4} ({:.1} dBFS)", self.peak, db(self.peak))?;
        writeln!(f, "  rms:     {:.4} ({:.1} dBFS)", self.rms, db(self.rms))?;
        write!(f, "  dc:      {:+.5}", self.dc)
    }
}
