//! Analysis parameters loaded from TOML.
//!
//! ```toml
//! sample_rate = 44100.0
//!
//! [spectrum]
//! size = 2048
//!
//! [pitch]
//! size = 1024
//! scheme = "yin"
//!
//! [mfcc]
//! bands = 24
//! coefficients = 13
//! low = 50.0
//! high = 8000.0
//!
//! [lpc]
//! order = 12
//! grid = 256
//!
//! [tracking]
//! size = 2048
//! ```
//!
//! Every section and field is optional; missing values take their
//! [`Default`].

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;
use crate::pitch::Normalization;

/// Reassigned spectrum settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpectrumConfig {
    /// Analysis frame length, a power of two of at least 16.
    pub size: usize,
}

impl Default for SpectrumConfig {
    fn default() -> Self {
        Self { size: 2048 }
    }
}

/// Fundamental frequency detector settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PitchConfig {
    /// Frame length in samples.
    pub size: usize,
    /// Lag normalization.
    pub scheme: Normalization,
}

impl Default for PitchConfig {
    fn default() -> Self {
        Self {
            size: 1024,
            scheme: Normalization::McLeod,
        }
    }
}

/// Mel cepstrum settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MfccConfig {
    /// Number of triangular mel bands.
    pub bands: usize,
    /// Number of cepstral coefficients kept, at most `bands`.
    pub coefficients: usize,
    /// Lower band edge in Hz.
    pub low: f32,
    /// Upper band edge in Hz, below Nyquist.
    pub high: f32,
}

impl Default for MfccConfig {
    fn default() -> Self {
        Self {
            bands: 24,
            coefficients: 13,
            low: 50.0,
            high: 8000.0,
        }
    }
}

/// Linear prediction settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LpcConfig {
    /// Prediction order, even for LSF conversion.
    pub order: usize,
    /// Zero search grid for LSF conversion.
    pub grid: usize,
}

impl Default for LpcConfig {
    fn default() -> Self {
        Self { order: 12, grid: 256 }
    }
}

/// Partial tracker settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    /// Analysis frame length; at most half as many tracks run at once.
    pub size: usize,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self { size: 2048 }
    }
}

/// Complete analysis configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Sample rate in Hz.
    pub sample_rate: f32,
    /// `[spectrum]` section.
    pub spectrum: SpectrumConfig,
    /// `[pitch]` section.
    pub pitch: PitchConfig,
    /// `[mfcc]` section.
    pub mfcc: MfccConfig,
    /// `[lpc]` section.
    pub lpc: LpcConfig,
    /// `[tracking]` section.
    pub tracking: TrackingConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100.0,
            spectrum: SpectrumConfig::default(),
            pitch: PitchConfig::default(),
            mfcc: MfccConfig::default(),
            lpc: LpcConfig::default(),
            tracking: TrackingConfig::default(),
        }
    }
}

impl AnalysisConfig {
    /// Parse and validate a TOML string.
    pub fn from_toml_str(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!(path = %path.display(), "loaded analysis config");
        Ok(config)
    }

    /// Write the configuration as TOML.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let content = self.to_toml_string()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))
    }

    /// Serialize to pretty TOML.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check sizes and ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.sample_rate.is_finite() && self.sample_rate > 0.0) {
            return Err(ConfigError::invalid("sample_rate", "must be positive"));
        }
        let nyquist = 0.5 * self.sample_rate;

        let s = self.spectrum.size;
        if s < 16 || !s.is_power_of_two() {
            return Err(ConfigError::invalid(
                "spectrum.size",
                format!("{s} is not a power of two of at least 16"),
            ));
        }

        if self.pitch.size < 4 {
            return Err(ConfigError::invalid("pitch.size", "must be at least 4"));
        }

        let m = &self.mfcc;
        if m.bands == 0 {
            return Err(ConfigError::invalid("mfcc.bands", "must be at least 1"));
        }
        if m.coefficients == 0 || m.coefficients > m.bands {
            return Err(ConfigError::invalid(
                "mfcc.coefficients",
                format!("must be between 1 and {}", m.bands),
            ));
        }
        if !(m.low >= 0.0 && m.low < m.high) {
            return Err(ConfigError::invalid("mfcc.low", "must be non-negative and below high"));
        }
        if m.high > nyquist {
            return Err(ConfigError::invalid(
                "mfcc.high",
                format!("{} Hz exceeds Nyquist ({nyquist} Hz)", m.high),
            ));
        }

        if self.lpc.order < 2 || self.lpc.order % 2 != 0 {
            return Err(ConfigError::invalid("lpc.order", "must be even and at least 2"));
        }
        if self.lpc.grid <= self.lpc.order / 2 {
            return Err(ConfigError::invalid("lpc.grid", "must exceed half the order"));
        }

        if self.tracking.size < 4 {
            return Err(ConfigError::invalid("tracking.size", "must be at least 4"));
        }
        Ok(())
    }
}
