//! Numeric constants, denormal protection and small scalar helpers.
//!
//! Recursive filters in this crate keep their state in floating point. When
//! the input falls silent, that state decays towards the subnormal range where
//! many CPUs slow down by two orders of magnitude. Two mechanisms prevent this:
//!
//! - **Flushing**: state values below [`ANTI_DENORMAL`] are set to zero
//!   ([`flush_denormal`], [`flush_denormal_f64`]).
//! - **Excitation**: a tiny pseudo-random offset in the order of
//!   [`ANTI_DENORMAL`] is folded into feedback paths. [`AntiDenormal`] is the
//!   generator; every filter call site owns one, so there is no shared global.
//!
//! # Constants
//!
//! | Constant | Value | Use |
//! |----------|-------|-----|
//! | [`ANTI_DENORMAL`] | 1e-15 | Excitation amplitude and flush threshold |
//! | [`FLT_INTMAX`] | 2147483520 | Largest `f32` below `i32::MAX` |
//! | [`FLT_INTMIN`] | -2147483648 | Smallest `f32` at or above `i32::MIN` |

use libm::floor;

/// Amplitude of anti-denormal excitation and threshold for flushing.
pub const ANTI_DENORMAL: f32 = 1e-15;

/// Largest `f32` that converts to an `i32` without overflow.
pub const FLT_INTMAX: f32 = 2_147_483_520.0;

/// Smallest `f32` that converts to an `i32` without overflow.
pub const FLT_INTMIN: f32 = -2_147_483_648.0;

/// Multiplier of the linear congruential generator shared by all noise and
/// anti-denormal sources (`x ← 663608941·x mod 2³²`).
pub const LCG_MULTIPLIER: u32 = 663_608_941;

/// Advances a multiplicative LCG state by one step.
#[inline]
pub fn lcg_step(x: u32) -> u32 {
    x.wrapping_mul(LCG_MULTIPLIER)
}

/// Maps the upper 23 bits of an LCG state to an `f32` in `[2, 4)`.
///
/// The state bits become the mantissa of a float with exponent 1, which is
/// exact and branch-free.
#[inline]
pub fn lcg_to_float(x: u32) -> f32 {
    f32::from_bits((x >> 9) | 0x4000_0000)
}

/// Flushes values smaller than [`ANTI_DENORMAL`] in magnitude to zero.
///
/// # Example
///
/// ```rust
/// use icst_core::math::flush_denormal;
///
/// assert_eq!(flush_denormal(1e-20), 0.0);
/// assert_eq!(flush_denormal(0.25), 0.25);
/// ```
#[inline]
pub fn flush_denormal(x: f32) -> f32 {
    if x.abs() < ANTI_DENORMAL { 0.0 } else { x }
}

/// `f64` counterpart of [`flush_denormal`] for double precision filter state.
#[inline]
pub fn flush_denormal_f64(x: f64) -> f64 {
    if x.abs() < f64::from(ANTI_DENORMAL) {
        0.0
    } else {
        x
    }
}

/// Pseudo-random anti-denormal excitation source.
///
/// Each call to [`next`](Self::next) advances an LCG and returns a value in
/// `[2, 4)`. Filters scale it by [`ANTI_DENORMAL`] to build offsets that keep
/// their feedback paths out of the subnormal range without adding audible
/// noise (the result is ~300 dB below full scale).
///
/// # Example
///
/// ```rust
/// use icst_core::math::AntiDenormal;
///
/// let mut adn = AntiDenormal::new(1);
/// let x = adn.next();
/// assert!((2.0..4.0).contains(&x));
/// ```
#[derive(Debug, Clone)]
pub struct AntiDenormal {
    state: u32,
}

impl AntiDenormal {
    /// Creates a generator. A zero seed is replaced by 1 since zero is a
    /// fixed point of the multiplicative generator.
    pub const fn new(seed: u32) -> Self {
        Self {
            state: if seed == 0 { 1 } else { seed },
        }
    }

    /// Returns the next excitation value in `[2, 4)`.
    #[inline]
    pub fn next(&mut self) -> f32 {
        self.state = lcg_step(self.state);
        lcg_to_float(self.state)
    }
}

impl Default for AntiDenormal {
    fn default() -> Self {
        Self::new(1)
    }
}

/// Splits `x` into its floor and the fractional remainder in `[0, 1)`.
///
/// # Example
///
/// ```rust
/// use icst_core::math::fsplit;
///
/// assert_eq!(fsplit(2.75), (2, 0.75));
/// assert_eq!(fsplit(-0.25), (-1, 0.75));
/// ```
#[inline]
pub fn fsplit(x: f64) -> (i32, f64) {
    let f = floor(x);
    (f as i32, x - f)
}

/// Fractional part `x - floor(x)` in `[0, 1)`.
#[inline]
pub fn frac(x: f32) -> f32 {
    x - libm::floorf(x)
}

/// Fractional part of an `f64`.
#[inline]
pub fn frac_f64(x: f64) -> f64 {
    x - floor(x)
}

/// Returns the smallest power of two greater than or equal to `n` (1 for 0).
///
/// # Example
///
/// ```rust
/// use icst_core::math::nexthipow2;
///
/// assert_eq!(nexthipow2(0), 1);
/// assert_eq!(nexthipow2(5), 8);
/// assert_eq!(nexthipow2(64), 64);
/// ```
#[inline]
pub fn nexthipow2(n: usize) -> usize {
    n.max(1).next_power_of_two()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flush_thresholds() {
        assert_eq!(flush_denormal(1e-16), 0.0);
        assert_eq!(flush_denormal(-1e-16), 0.0);
        assert_eq!(flush_denormal(2e-15), 2e-15);
        assert_eq!(flush_denormal_f64(5e-16), 0.0);
        assert_eq!(flush_denormal_f64(-0.5), -0.5);
    }

    #[test]
    fn anti_denormal_range_and_determinism() {
        let mut a = AntiDenormal::new(7);
        let mut b = AntiDenormal::new(7);
        for _ in 0..1000 {
            let x = a.next();
            assert!((2.0..4.0).contains(&x), "out of range: {x}");
            assert_eq!(x, b.next());
        }
    }

    #[test]
    fn zero_seed_is_not_stuck() {
        let mut a = AntiDenormal::new(0);
        let x = a.next();
        let y = a.next();
        assert_ne!(x, y);
    }

    #[test]
    fn fsplit_negative_and_positive() {
        assert_eq!(fsplit(0.0), (0, 0.0));
        assert_eq!(fsplit(3.5), (3, 0.5));
        let (i, f) = fsplit(-2.25);
        assert_eq!(i, -3);
        assert!((f - 0.75).abs() < 1e-12);
    }

    #[test]
    fn power_of_two_rounding() {
        assert_eq!(nexthipow2(1), 1);
        assert_eq!(nexthipow2(3), 4);
        assert_eq!(nexthipow2(1025), 2048);
    }
}
