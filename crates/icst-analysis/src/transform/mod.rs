//! Spectral transforms of power-of-two size.
//!
//! - [`FftProcessor`] - complex and packed real FFT, DCT-I based symmetric
//!   transforms, DCT-II/DST-II and FFT based convolution and correlation
//! - [`FftBackend`] - the swappable complex kernel, with [`RustFftBackend`]
//!   (default) and the portable [`Radix2Backend`]
//! - [`goertzel`], [`hwt`], [`ihwt`] - single-bin DFT and Haar wavelet
//!
//! Forward transforms are unnormalized, inverses apply `1/N`.

pub mod backend;
pub mod direct;
pub mod processor;

pub use backend::{FftBackend, Radix2Backend, RustFftBackend};
pub use direct::{goertzel, hwt, ihwt};
pub use processor::FftProcessor;
