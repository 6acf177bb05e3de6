//! Fast scalar approximations of transcendental functions.
//!
//! These functions trade full IEEE 754 precision for speed in inner loops
//! where the input range is bounded: oscillator pitch mapping, filter
//! coefficient updates, phase detectors and logarithmic spectra.
//!
//! | Function | Replaces | Typical use | Max error |
//! |----------|----------|-------------|-----------|
//! | [`fast_exp2`] | `libm::exp2f` | pitch to increment, quick & dirty | < 0.015% rel |
//! | [`qdexp`] | `libm::expf` | filter cutoff mapping | < 0.015% rel |
//! | [`fast_exp`] | `libm::expf` | oscillator pitch, envelope times | < 5e-7 rel |
//! | [`fast_ln_abs`] | `libm::logf(fabsf(x))` | cepstra, MFCC | < 3e-5 abs |
//! | [`fast_atan2`] | `libm::atan2f` | Costas loop phase error | < 3e-5 rad |
//! | [`fdtoi`] | `libm::rintf` + cast | phase conversion | exact |

use core::f32::consts::{FRAC_PI_2, LN_2, LOG2_E, PI};
use libm::{floorf, rintf};

use crate::math::{FLT_INTMAX, FLT_INTMIN};

/// Fast base-2 exponential with a 3rd order polynomial for the fractional part.
///
/// The polynomial is pinned to `p(0) = 1` and `p(1) = 2`, so the result is
/// continuous across integer arguments.
///
/// # Accuracy
///
/// Maximum relative error: < 0.015% for x ∈ \[-126, 126\].
///
/// # Examples
///
/// ```
/// use icst_core::fast_math::fast_exp2;
///
/// assert!((fast_exp2(3.0) - 8.0).abs() < 0.02);
/// assert!((fast_exp2(-1.0) - 0.5).abs() < 0.01);
/// ```
#[inline]
pub fn fast_exp2(x: f32) -> f32 {
    let x = x.clamp(-126.0, 126.0);
    let i = floorf(x) as i32;
    let f = x - i as f32;
    let p = 1.0 + f * (0.695_502 + f * (0.226_008 + f * 0.078_490));
    f32::from_bits(((i + 127) as u32) << 23) * p
}

/// Quick and dirty natural exponential, built on [`fast_exp2`].
///
/// Suited for cutoff and rate mappings where 0.015% relative error is inaudible.
#[inline]
pub fn qdexp(x: f32) -> f32 {
    fast_exp2(x * LOG2_E)
}

/// Natural exponential with near single-precision accuracy.
///
/// The argument is reduced in double precision to `2^n · 2^f` with
/// `f ∈ [-0.5, 0.5]`, the fractional power is a 6th order polynomial.
///
/// # Accuracy
///
/// Maximum relative error: < 5e-7 for x ∈ \[-87, 87\].
///
/// # Examples
///
/// ```
/// use icst_core::fast_math::fast_exp;
///
/// assert!((fast_exp(1.0) - core::f32::consts::E).abs() < 3e-6);
/// assert!((fast_exp(-3.0) - libm::expf(-3.0)).abs() < 1e-7);
/// ```
#[inline]
pub fn fast_exp(x: f32) -> f32 {
    let t = (f64::from(x) * core::f64::consts::LOG2_E).clamp(-126.0, 126.0);
    let n = libm::rint(t);
    let f = (t - n) as f32;
    let p = 1.0
        + f * (0.693_147_2
            + f * (0.240_226_5
                + f * (0.055_504_11 + f * (0.009_618_129 + f * (0.001_333_355 + f * 0.000_154_035_3)))));
    f32::from_bits(((n as i32 + 127) as u32) << 23) * p
}

/// Natural logarithm of `|x|` from the float bit pattern.
///
/// The exponent contributes `ln 2 · e`, the mantissa fraction `p ∈ [0, 1)`
/// goes through a 7th order polynomial approximating `ln(1 + p)`.
/// Zero maps to roughly -88.
///
/// # Examples
///
/// ```
/// use icst_core::fast_math::fast_ln_abs;
///
/// assert!((fast_ln_abs(-1.0)).abs() < 1e-4);
/// assert!((fast_ln_abs(10.0) - libm::logf(10.0)).abs() < 1e-4);
/// ```
#[inline]
pub fn fast_ln_abs(x: f32) -> f32 {
    const INV_2POW23: f32 = 1.0 / 8_388_608.0;
    let bits = x.to_bits();
    let p = INV_2POW23 * (bits & 0x007F_FFFF) as f32;
    let m = (0.999_974_85
        + (-0.499_365_62
            + (0.327_615_24
                + (-0.224_147_34 + (0.132_157_18 + (-0.053_340_996 + 0.010_253_873 * p) * p) * p)
                    * p)
                * p)
            * p)
        * p;
    m + LN_2 * ((((bits >> 23) & 0xFF) as i32 - 127) as f32)
}

/// Fast two-argument arctangent.
///
/// Reduces to `atan(z)` with `|z| ≤ 1` and evaluates an odd 11th order
/// minimax polynomial. Returns 0 for `(0, 0)`.
///
/// # Examples
///
/// ```
/// use icst_core::fast_math::fast_atan2;
///
/// assert!((fast_atan2(1.0, 1.0) - core::f32::consts::FRAC_PI_4).abs() < 1e-4);
/// assert!((fast_atan2(-1.0, -1.0) + 3.0 * core::f32::consts::FRAC_PI_4).abs() < 1e-4);
/// ```
#[inline]
pub fn fast_atan2(y: f32, x: f32) -> f32 {
    let ax = x.abs();
    let ay = y.abs();
    if ax == 0.0 && ay == 0.0 {
        return 0.0;
    }
    let swap = ay > ax;
    let z = if swap { ax / ay } else { ay / ax };
    let z2 = z * z;
    let mut a = z
        * (0.999_977_26
            + z2 * (-0.332_623_47
                + z2 * (0.193_543_46 + z2 * (-0.116_432_87 + z2 * (0.052_653_32 - 0.011_721_2 * z2)))));
    if swap {
        a = FRAC_PI_2 - a;
    }
    if x < 0.0 {
        a = PI - a;
    }
    if y < 0.0 { -a } else { a }
}

/// Rounds to the nearest integer (ties to even) and saturates to the `i32`
/// range.
///
/// # Examples
///
/// ```
/// use icst_core::fast_math::fdtoi;
///
/// assert_eq!(fdtoi(2.4), 2);
/// assert_eq!(fdtoi(-2.6), -3);
/// assert_eq!(fdtoi(1e12), i32::MAX);
/// ```
#[inline]
pub fn fdtoi(x: f32) -> i32 {
    if x > FLT_INTMAX {
        i32::MAX
    } else if x < FLT_INTMIN {
        i32::MIN
    } else {
        rintf(x) as i32
    }
}

/// `f64` counterpart of [`fdtoi`].
#[inline]
pub fn fdtoi_f64(x: f64) -> i32 {
    libm::rint(x).clamp(f64::from(i32::MIN), f64::from(i32::MAX)) as i32
}
