//! Transforms that need no FFT: single-bin Goertzel and the Haar wavelet.

use icst_core::Complex;
use std::f64::consts::{FRAC_1_SQRT_2, PI};

/// Bin `k` of the DFT of `d`, for any length, by the Goertzel recurrence.
///
/// Matches `realfft` bin `k` for power-of-two lengths and is cheaper when
/// only a few bins are needed.
pub fn goertzel(d: &[f32], k: usize) -> Complex {
    let n = d.len();
    if n == 0 {
        return Complex::default();
    }
    let w = 2.0 * PI * k as f64 / n as f64;
    let (c, s) = (w.cos(), w.sin());
    let coeff = 2.0 * c;
    let (mut s1, mut s2) = (0.0f64, 0.0f64);
    for &x in d {
        let s0 = f64::from(x) + coeff * s1 - s2;
        s2 = s1;
        s1 = s0;
    }
    Complex::new((c * s1 - s2) as f32, (s * s1) as f32)
}

/// Haar wavelet transform in place.
///
/// Output layout from coarse to fine: `d[0]` the overall approximation,
/// `d[1]` the coarsest detail, then `d[2..4]`, `d[4..8]`, up to
/// `d[N/2..N]`. Orthonormal, so energy is preserved.
///
/// Allocates an `N` sample copy.
///
/// # Panics
///
/// Debug builds panic unless `d.len()` is a power of two.
pub fn hwt(d: &mut [f32]) {
    debug_assert!(d.len().is_power_of_two(), "Haar transform size must be a power of two");
    let scl = FRAC_1_SQRT_2 as f32;
    let mut r = d.to_vec();
    let mut n = d.len();
    while n >= 2 {
        let half = n / 2;
        for i in 0..half {
            let (a, b) = (r[2 * i], r[2 * i + 1]);
            d[half + i] = scl * (a - b);
            r[i] = scl * (a + b);
        }
        n = half;
    }
    d[0] = r[0];
}

/// Inverse of [`hwt`]. Allocates an `N` sample copy.
pub fn ihwt(d: &mut [f32]) {
    debug_assert!(d.len().is_power_of_two(), "Haar transform size must be a power of two");
    let scl = FRAC_1_SQRT_2 as f32;
    let r = d.to_vec();
    let mut h = 1;
    while h < d.len() {
        // approximations live in d[..h], details of this level in r[h..2h]
        for i in (0..h).rev() {
            let (a, det) = (d[i], r[h + i]);
            d[2 * i + 1] = scl * (a - det);
            d[2 * i] = scl * (a + det);
        }
        h <<= 1;
    }
}
