//! Error types for analysis and configuration.
//!
//! Numerically expected failures of the analysis routines are typed results
//! rather than sentinels; the caller is expected to branch on them.

use std::path::PathBuf;
use thiserror::Error;

/// Failures of linear prediction.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum LpcError {
    /// A reflection coefficient reached magnitude 1. The predictor
    /// coefficients have been zeroed.
    #[error("unstable predictor (residual ratio {residual_ratio})")]
    Unstable {
        /// Residual energy relative to the input energy at the point of
        /// failure.
        residual_ratio: f32,
    },

    /// The frequency grid could not separate all line spectral frequencies,
    /// or they came out not strictly ascending.
    #[error("resolved {found} of {order} line spectral frequencies")]
    UnresolvedLsf {
        /// Number of frequencies found on the grid.
        found: usize,
        /// Prediction order.
        order: usize,
    },
}

/// Errors loading or validating an [`AnalysisConfig`](crate::AnalysisConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a file
    #[error("failed to read file '{path}': {source}")]
    ReadFile {
        /// Path of the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a file
    #[error("failed to write file '{path}': {source}")]
    WriteFile {
        /// Path of the file that could not be written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Failed to serialize TOML
    #[error("failed to serialize TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// A field is out of range
    #[error("invalid value for '{field}': {reason}")]
    Invalid {
        /// Dotted path of the field, e.g. `pitch.size`.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

impl ConfigError {
    /// Create a read file error.
    pub fn read_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::ReadFile {
            path: path.into(),
            source,
        }
    }

    /// Create a write file error.
    pub fn write_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::WriteFile {
            path: path.into(),
            source,
        }
    }

    /// Create a validation error.
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Any error raised by this crate.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Linear prediction failure
    #[error(transparent)]
    Lpc(#[from] LpcError),

    /// Configuration failure
    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    fn mock_io_err() -> std::io::Error {
        std::io::Error::new(std::io::ErrorKind::NotFound, "mock")
    }

    // ========================================================================
    // Display
    // ========================================================================

    #[test]
    fn lpc_error_display() {
        let err = LpcError::Unstable { residual_ratio: 0.25 };
        assert_eq!(err.to_string(), "unstable predictor (residual ratio 0.25)");
        let err = LpcError::UnresolvedLsf { found: 7, order: 10 };
        assert_eq!(err.to_string(), "resolved 7 of 10 line spectral frequencies");
    }

    #[test]
    fn invalid_display() {
        let err = ConfigError::invalid("lpc.order", "must be at least 1");
        assert_eq!(err.to_string(), "invalid value for 'lpc.order': must be at least 1");
    }

    #[test]
    fn read_file_display_and_source() {
        let err = ConfigError::read_file("/a/b.toml", mock_io_err());
        let msg = err.to_string();
        assert!(msg.contains("failed to read file"), "got: {msg}");
        assert!(msg.contains("/a/b.toml"), "got: {msg}");
        assert!(err.source().is_some(), "ReadFile must expose I/O source");
    }

    // ========================================================================
    // Conversion
    // ========================================================================

    #[test]
    fn umbrella_is_transparent() {
        let err: AnalysisError = LpcError::UnresolvedLsf { found: 1, order: 2 }.into();
        assert_eq!(err.to_string(), "resolved 1 of 2 line spectral frequencies");
        assert!(matches!(err, AnalysisError::Lpc(_)));

        let err: AnalysisError = ConfigError::invalid("mfcc.bands", "zero").into();
        assert!(matches!(err, AnalysisError::Config(ConfigError::Invalid { .. })));
    }

    #[test]
    fn toml_parse_error_converts() {
        let parse: Result<toml::Value, _> = toml::from_str("not = [valid");
        let err: ConfigError = parse.unwrap_err().into();
        assert!(err.to_string().starts_with("failed to parse TOML"));
    }
}
