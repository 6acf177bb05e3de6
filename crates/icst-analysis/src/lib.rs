//! ICST Analysis - spectral and model-based audio analysis
//!
//! Built on the block primitives of [`icst_core`], this crate provides:
//!
//! - [`transform`] - FFT, real and symmetric FFTs, DCT/DST, fast convolution
//!   and correlation, Goertzel and Haar wavelet
//! - [`spectrum`] - reassigned spectral analysis with window amplitude
//!   correction
//! - [`pitch`] - autocorrelation pitch detection with four normalization
//!   schemes, fundamental verification and harmonic search
//! - [`lpc`] - Levinson-Durbin recursion and line spectral frequencies
//! - [`cepstrum`] - real cepstrum and MFCCs
//! - [`tracking`] - McAulay-Quatieri partial tracking and resynthesis
//! - [`features`] - envelope followers, zero crossings, spectral shape and
//!   transient detectors
//! - [`pursuit`] - matching pursuit over a vector dictionary
//! - [`adaptive`] - normalized LMS and a Costas tracking demodulator
//! - [`config`] - TOML analysis settings
//!
//! ## Example Workflow
//!
//! ```rust
//! use icst_analysis::{Normalization, PitchDetector};
//!
//! let fs = 44100.0;
//! let d: Vec<f32> = (0..1024)
//!     .map(|n| (2.0 * std::f32::consts::PI * 220.0 / fs * n as f32).sin())
//!     .collect();
//!
//! let mut detector = PitchDetector::new(d.len());
//! let (f, tonality) = detector.detect(&d, Normalization::McLeod);
//! assert!((f * fs - 220.0).abs() < 4.0);
//! assert!(tonality > 0.9);
//! ```
//!
//! ## Linear Prediction
//!
//! ```rust
//! use icst_analysis::lpc::{lp_durbin, lpc_to_lsf};
//! use icst_analysis::FftProcessor;
//! use icst_core::vector::{NoiseGen, bacorr};
//!
//! let mut x = vec![0.0f32; 2048];
//! NoiseGen::new(1).unoise(&mut x);
//!
//! let mut rm = [0.0f32; 9];
//! bacorr(&mut rm, &x);
//! let (mut a, mut k) = ([0.0f64; 9], [0.0f64; 8]);
//! lp_durbin(&mut a, &mut k, &rm).unwrap();
//!
//! let mut lsf = [0.0f32; 8];
//! lpc_to_lsf(&mut lsf, &a, 512, &mut FftProcessor::new()).unwrap();
//! assert!(lsf.windows(2).all(|w| w[0] < w[1]));
//! ```

pub mod adaptive;
pub mod cepstrum;
pub mod config;
pub mod error;
pub mod features;
pub mod lpc;
pub mod pitch;
pub mod pursuit;
pub mod spectrum;
pub mod tracking;
pub mod transform;

pub use adaptive::{Costas, nlms};
pub use cepstrum::Mfcc;
pub use config::AnalysisConfig;
pub use error::{AnalysisError, ConfigError, LpcError};
pub use features::{EnvelopeKind, TransientState};
pub use lpc::Prediction;
pub use pitch::{Normalization, PitchDetector};
pub use pursuit::matching_pursuit;
pub use spectrum::{Reassignment, SpectralAnalyzer};
pub use tracking::{Breakpoint, PartialTracker};
pub use transform::{FftBackend, FftProcessor, Radix2Backend, RustFftBackend};
