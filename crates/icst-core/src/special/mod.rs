//! Scalar special functions, polynomials and filter design.
//!
//! - [`functions`] - error, gamma, beta and Bessel functions, probit, root
//!   bracketing, parabolic extremum, Runge-Kutta stepping
//! - [`poly`] - polynomial arithmetic, roots, Chebyshev series, cubic fits
//! - [`design`] - first and second order sections, analog prototype
//!   cascades and their bilinear transform

pub mod design;
pub mod functions;
pub mod poly;

pub use design::*;
pub use functions::*;
pub use poly::*;
