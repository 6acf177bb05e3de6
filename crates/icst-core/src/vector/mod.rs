//! Block-oriented vector operations on `f32` slices.
//!
//! Every function takes borrowed slices, works for any length including
//! zero, and keeps no reference past the call. Slice length mismatches are
//! caller errors and are only checked by `debug_assert!`.
//!
//! # Submodules
//!
//! - [`real`] - reductions, elementwise math and arithmetic
//! - [`complex`] - the same on interleaved `[re, im, re, im, ...]` data
//! - [`signal`] - ramps, oscillations and seeded noise ([`NoiseGen`])
//! - [`window`] - symmetric analysis windows
//! - [`special`] - interleaving, crossfades, polynomials, peak search
//! - [`correlate`] - direct-form convolution and correlation
//! - [`matrix`] - small dense row-major matrices
//! - [`stats`] - statistics, regression and hypothesis tests
//! - [`circular`] - a circular FIFO ([`CircBuffer`])
//!
//! All public functions are re-exported here, so `vector::dotp` and
//! `vector::real::dotp` name the same item.
//!
//! # Real-time Safety
//!
//! Operations allocate nothing unless documented otherwise. The exceptions
//! are order statistics in [`stats`], the matrix solvers, [`isort`] and
//! the non-square path of [`mxpose`].

pub mod circular;
pub mod complex;
pub mod correlate;
pub mod matrix;
pub mod real;
pub mod signal;
pub mod special;
pub mod stats;
pub mod window;

pub use circular::CircBuffer;
pub use complex::*;
pub use correlate::{bacorr, ccorr, conv, uacorr};
pub use matrix::*;
pub use real::*;
pub use signal::*;
pub use special::*;
pub use stats::*;
pub use window::*;
