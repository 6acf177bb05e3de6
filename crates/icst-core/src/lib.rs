//! ICST Core - block-oriented vector math, special functions and filters
//!
//! This crate is the numeric foundation of the ICST DSP libraries: stateless
//! operations on borrowed `f32` sample blocks, scalar special functions and
//! filter design, and block filters whose memory lives in caller-owned
//! continuation state.
//!
//! # Core Abstractions
//!
//! ## Vector Operations
//!
//! - [`vector`] - reductions, elementwise math, complex buffers, windows,
//!   signal generators, correlation, matrices, statistics
//! - [`CircBuffer`] - circular FIFO with all-or-nothing reads and writes
//! - [`NoiseGen`] - seedable uniform, Gaussian, exponential and Cauchy noise
//!
//! ## Special Functions
//!
//! - [`special::functions`] - error, gamma, beta and Bessel functions
//! - [`special::poly`] - polynomial arithmetic and Laguerre root finding
//! - [`special::design`] - equalizer biquads, analog prototypes, bilinear
//!   transform ([`FilterType`], [`Resonance`])
//!
//! ## Filters
//!
//! - [`filter::fir`], [`filter::iir`], [`filter::biquad`] with explicit state
//! - [`filter::lplsynth`], [`filter::lpssynth`] - lattice and LSF synthesis
//! - [`filter::freqz`], [`filter::gdelz`] - system response
//!
//! ## Utilities
//!
//! - [`Complex`] - scalar complex results
//! - [`AntiDenormal`] - per-call-site excitation generator for recursive filters
//! - Fast approximations in [`fast_math`]
//!
//! # no_std Support
//!
//! This crate is `no_std` compatible. Disable the default `std` feature in
//! your `Cargo.toml`; an allocator is still required:
//!
//! ```toml
//! [dependencies]
//! icst-core = { version = "0.1", default-features = false }
//! ```
//!
//! # Example
//!
//! ```rust
//! use icst_core::special::{FilterType, Resonance, eqzbiquad};
//! use icst_core::{AntiDenormal, filter, vector};
//!
//! let mut block = vec![0.0f32; 512];
//! vector::sine(&mut block, 200.0, 0.0, false);
//!
//! let (a, b) = eqzbiquad(0.01, Resonance::Q(0.7071), FilterType::Lowpass, 0.0);
//! let mut state = [0.0f64; 2];
//! filter::biquad(&mut block, &a, &b, &mut state, &mut AntiDenormal::default());
//!
//! assert!(vector::rms(&block[256..]) < 0.1);
//! ```
//!
//! # Design Principles
//!
//! - **Borrowed slices**: no operation retains a reference past the call
//! - **Caller-owned state**: filters and generators keep no hidden globals
//! - **Precondition contracts**: slice size mismatches are `debug_assert!`s
//! - **Single scalar path**: results never depend on block size or alignment

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod complex;
pub mod fast_math;
pub mod filter;
pub mod math;
pub mod special;
pub mod vector;

pub use complex::Complex;
pub use fast_math::{fast_atan2, fast_exp, fast_exp2, fast_ln_abs, fdtoi, qdexp};
pub use math::{ANTI_DENORMAL, AntiDenormal, flush_denormal, nexthipow2};
pub use special::{FilterType, Resonance};
pub use vector::{CircBuffer, NoiseGen};
