//! Symmetric window functions, `d[0] == d[len-1]`.
//!
//! The trigonometric windows are sums of cosines over `θ = 2π·i/(len-1)`:
//!
//! | Window | Coefficients |
//! |--------|--------------|
//! | [`hann`] | 0.5, 0.5 |
//! | [`hamming`] | 0.53836, 0.46164 |
//! | [`blackman`] | 0.42, 0.5, 0.08 |
//! | [`bhw3`] | 0.42323, 0.49755, 0.07922 |
//! | [`bhw4`] | 0.35875, 0.48829, 0.14128, 0.01168 |
//!
//! A single-sample window holds the peak value.

use core::f64::consts::PI;

use libm::{cos, exp, sqrt};

use crate::special::bessi0;

fn fill_symmetric(d: &mut [f32], f: impl Fn(f64) -> f64) {
    let size = d.len();
    if size == 0 {
        return;
    }
    let step = 2.0 * PI / size.saturating_sub(1).max(1) as f64;
    for i in 0..size.div_ceil(2) {
        let v = f(step * i as f64) as f32;
        d[i] = v;
        d[size - 1 - i] = v;
    }
}

/// Generic 2-term window `c0 - c1·cos θ`.
pub fn trigwin2(d: &mut [f32], c0: f64, c1: f64) {
    if d.len() == 1 {
        d[0] = (c0 + c1) as f32;
        return;
    }
    fill_symmetric(d, |t| c0 - c1 * cos(t));
}

/// Generic 4-term window `c0 - c1·cos θ + c2·cos 2θ - c3·cos 3θ`.
pub fn trigwin4(d: &mut [f32], c0: f64, c1: f64, c2: f64, c3: f64) {
    if d.len() == 1 {
        d[0] = (c0 + c1 + c2 + c3) as f32;
        return;
    }
    fill_symmetric(d, |t| c0 - c1 * cos(t) + c2 * cos(2.0 * t) - c3 * cos(3.0 * t));
}

/// Hann window.
pub fn hann(d: &mut [f32]) {
    trigwin2(d, 0.5, 0.5);
}

/// Hamming window.
pub fn hamming(d: &mut [f32]) {
    trigwin2(d, 0.53836, 0.46164);
}

/// Blackman window.
pub fn blackman(d: &mut [f32]) {
    trigwin4(d, 0.42, 0.5, 0.08, 0.0);
}

/// 3-term Blackman-Harris window.
pub fn bhw3(d: &mut [f32]) {
    trigwin4(d, 0.42323, 0.49755, 0.07922, 0.0);
}

/// 4-term Blackman-Harris window.
pub fn bhw4(d: &mut [f32]) {
    trigwin4(d, 0.35875, 0.48829, 0.14128, 0.01168);
}

/// 5-term flat top window, peak 1.
pub fn flattop(d: &mut [f32]) {
    const C: [f64; 5] = [-0.0555, 0.1651, 0.5005, 0.3344, 0.0555];
    if d.len() == 1 {
        d[0] = 1.0;
        return;
    }
    fill_symmetric(d, |t| {
        let x = -cos(t);
        C[0] + (C[1] + (C[2] + (C[3] + C[4] * x) * x) * x) * x
    });
}

/// Gaussian window. `sigma` is the standard deviation relative to half the
/// window length.
pub fn gauss(d: &mut [f32], sigma: f64) {
    let size = d.len();
    let s = sigma * size as f64;
    let s2 = s * s;
    let center = 0.5 * size.saturating_sub(1) as f64;
    for (i, x) in d.iter_mut().enumerate() {
        let k = i as f64 - center;
        *x = exp(-2.0 * k * k / s2) as f32;
    }
}

/// Kaiser window with shape parameter `alpha`.
pub fn kaiser(d: &mut [f32], alpha: f64) {
    let size = d.len();
    if size == 0 {
        return;
    }
    if size == 1 {
        d[0] = 1.0;
        return;
    }
    let delta = 2.0 / (size - 1) as f64;
    let n = 1.0 / bessi0(alpha);
    for i in 0..size.div_ceil(2) {
        let x = delta * i as f64;
        let v = (n * bessi0(alpha * sqrt((2.0 - x) * x))) as f32;
        d[i] = v;
        d[size - 1 - i] = v;
    }
}
