//! Block filters with explicit continuation state.
//!
//! Every filter works in place on a sample block and carries its memory in a
//! caller-owned state argument that starts zeroed. Processing a signal in
//! blocks of any size gives the same result as one call on the whole signal,
//! up to the anti-denormal excitation of the recursive sections.
//!
//! - [`fir`] - FIR, static delay, 3 and 5 point medians
//! - [`iir`] - all-pole direct form, first order, biquad
//! - [`lattice`] - linear prediction analysis and synthesis
//! - [`response`] - frequency response and group delay
//!
//! # Example
//!
//! ```rust
//! use icst_core::filter::biquad;
//! use icst_core::math::AntiDenormal;
//! use icst_core::special::{FilterType, Resonance, eqzbiquad};
//!
//! let (a, b) = eqzbiquad(1000.0 / 48000.0, Resonance::Q(0.7071), FilterType::Highpass, 0.0);
//! let mut state = [0.0f64; 2];
//! let mut adn = AntiDenormal::default();
//!
//! let mut block = [1.0f32; 256];
//! biquad(&mut block, &a, &b, &mut state, &mut adn);
//! assert!(block[255].abs() < 0.1);
//! ```

pub mod fir;
pub mod iir;
pub mod lattice;
pub mod response;

pub use fir::{delay, fir, fir_f64, med3, med5};
pub use iir::{biquad, iir, iir1, viir1};
pub use lattice::{lpanalyze, lpdsynth, lplsynth, lplsynth_glide, lpssynth, lpssynth_glide};
pub use response::{freqs, freqz, gdels, gdelz};
