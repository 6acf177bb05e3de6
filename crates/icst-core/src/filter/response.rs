//! Frequency response and group delay of rational transfer functions.
//!
//! Discrete systems are `H(z) = Σ b[i]·z⁻ⁱ / Σ a[i]·z⁻ⁱ` evaluated at
//! frequencies relative to the sample rate. Continuous systems are
//! `G(s) = Σ b[i]·sⁱ / Σ a[i]·sⁱ` evaluated at frequencies in Hz.
//!
//! All functions allocate scratch buffers.

#[cfg(not(feature = "std"))]
use alloc::vec;
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use core::f32::consts::PI;

use libm::{cosf, sinf};

use crate::special::diffpoly;
use crate::vector::{InversePrecision, cpxarg, cpxinv, cpxmag, cpxmul_vec, cpxpolyval, cpxre, unwrap};

/// Interleaved `e^(-i·2π·f)` for each frequency.
fn unit_phasors(f: &[f32]) -> Vec<f32> {
    let mut v = vec![0.0f32; 2 * f.len()];
    for (z, &fi) in v.chunks_exact_mut(2).zip(f) {
        let w = 2.0 * PI * fi;
        z[0] = cosf(w);
        z[1] = -sinf(w);
    }
    v
}

/// Interleaved `i·2π·f` for each frequency.
fn imaginary_axis(f: &[f32]) -> Vec<f32> {
    let mut v = vec![0.0f32; 2 * f.len()];
    for (z, &fi) in v.chunks_exact_mut(2).zip(f) {
        z[1] = 2.0 * PI * fi;
    }
    v
}

fn to_f64(c: &[f32]) -> Vec<f64> {
    c.iter().map(|&x| f64::from(x)).collect()
}

/// `B(v) / A(v)` at every point of `v`, in place.
fn ratio(v: &mut [f32], a: &[f64], b: &[f64]) {
    let mut num = v.to_vec();
    cpxpolyval(v, a);
    cpxpolyval(&mut num, b);
    cpxinv(v, InversePrecision::FullRange);
    cpxmul_vec(v, &num);
}

/// `Re(P'(v) / P(v))` at every point of `v`, where `dp` holds the
/// coefficients of the derivative term.
fn log_derivative(out: &mut [f32], v: &[f32], p: &[f64], dp: &[f64]) {
    let mut pv = v.to_vec();
    let mut dv = v.to_vec();
    cpxpolyval(&mut pv, p);
    cpxpolyval(&mut dv, dp);
    cpxinv(&mut pv, InversePrecision::FullRange);
    cpxmul_vec(&mut pv, &dv);
    cpxre(out, &pv);
}

fn magnitude_phase(mag: &mut [f32], phase: &mut [f32], h: &[f32]) {
    cpxmag(mag, h);
    cpxarg(phase, h);
    unwrap(phase);
}

/// Magnitude and unwrapped phase (radians) of `H(z)` at frequencies `f`
/// relative to the sample rate.
///
/// # Examples
///
/// ```
/// use icst_core::filter::freqz;
///
/// // one sample delay
/// let f = [0.0, 0.125, 0.25];
/// let (mut mag, mut phase) = ([0.0; 3], [0.0; 3]);
/// freqz(&mut mag, &mut phase, &f, &[1.0], &[0.0, 1.0]);
/// assert!(mag.iter().all(|m| (m - 1.0).abs() < 1e-6));
/// assert!((phase[2] + core::f32::consts::FRAC_PI_2).abs() < 1e-6);
/// ```
pub fn freqz(mag: &mut [f32], phase: &mut [f32], f: &[f32], a: &[f64], b: &[f64]) {
    debug_assert!(mag.len() == f.len() && phase.len() == f.len());
    let mut h = unit_phasors(f);
    ratio(&mut h, a, b);
    magnitude_phase(mag, phase, &h);
}

/// Magnitude and unwrapped phase (radians) of `G(s)` at frequencies `f` in
/// Hz.
pub fn freqs(mag: &mut [f32], phase: &mut [f32], f: &[f32], a: &[f32], b: &[f32]) {
    debug_assert!(mag.len() == f.len() && phase.len() == f.len());
    let mut h = imaginary_axis(f);
    ratio(&mut h, &to_f64(a), &to_f64(b));
    magnitude_phase(mag, phase, &h);
}

/// Group delay of `H(z)` in samples at frequencies `f` relative to the
/// sample rate.
pub fn gdelz(gdelay: &mut [f32], f: &[f32], a: &[f64], b: &[f64]) {
    debug_assert_eq!(gdelay.len(), f.len());
    // z·dP/dz in powers of z⁻¹ scales each coefficient by its index
    let weighted = |c: &[f64]| -> Vec<f64> {
        c.iter().enumerate().map(|(i, &x)| x * i as f64).collect()
    };
    let v = unit_phasors(f);
    let mut da = vec![0.0f32; f.len()];
    log_derivative(&mut da, &v, a, &weighted(a));
    log_derivative(gdelay, &v, b, &weighted(b));
    for (g, d) in gdelay.iter_mut().zip(&da) {
        *g -= d;
    }
}

/// Group delay of `G(s)` in seconds at frequencies `f` in Hz.
pub fn gdels(gdelay: &mut [f32], f: &[f32], a: &[f32], b: &[f32]) {
    debug_assert_eq!(gdelay.len(), f.len());
    let (a, b) = (to_f64(a), to_f64(b));
    let derivative = |c: &[f64]| {
        let mut d = c.to_vec();
        diffpoly(&mut d);
        d
    };
    let v = imaginary_axis(f);
    let mut db = vec![0.0f32; f.len()];
    log_derivative(gdelay, &v, &a, &derivative(&a));
    log_derivative(&mut db, &v, &b, &derivative(&b));
    for (g, d) in gdelay.iter_mut().zip(&db) {
        *g -= d;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::special::{FilterType, Resonance, dsbilin, eqzbiquad};

    #[test]
    fn freqz_of_biquad_lowpass() {
        let (a, b) = eqzbiquad(0.1, Resonance::Q(core::f32::consts::FRAC_1_SQRT_2), FilterType::Lowpass, 0.0);
        let f = [0.0, 0.1, 0.49];
        let (mut mag, mut phase) = ([0.0; 3], [0.0; 3]);
        freqz(&mut mag, &mut phase, &f, &a, &b);
        assert!((mag[0] - 1.0).abs() < 1e-5);
        assert!((mag[1] - core::f32::consts::FRAC_1_SQRT_2).abs() < 1e-4);
        assert!(mag[2] < 1e-2);
        // second order lowpass: -90° at the corner
        assert!((phase[1] + core::f32::consts::FRAC_PI_2).abs() < 1e-3);
    }

    #[test]
    fn phase_is_unwrapped() {
        // three sample delay passes -π several times below Nyquist
        let f: Vec<f32> = (0..50).map(|i| i as f32 * 0.01).collect();
        let (mut mag, mut phase) = (vec![0.0; 50], vec![0.0; 50]);
        freqz(&mut mag, &mut phase, &f, &[1.0], &[0.0, 0.0, 0.0, 1.0]);
        for (p, &fi) in phase.iter().zip(&f) {
            assert!((p + 6.0 * PI * fi).abs() < 1e-4);
        }
    }

    #[test]
    fn group_delay_of_pure_delay() {
        let f = [0.05, 0.2, 0.4];
        let mut g = [0.0; 3];
        gdelz(&mut g, &f, &[1.0], &[0.0, 0.0, 1.0]);
        for x in g {
            assert!((x - 2.0).abs() < 1e-5);
        }
    }

    #[test]
    fn group_delay_of_one_pole() {
        // H(z) = 1 / (1 - p z^-1) has delay p / (1 - p) at DC
        let p = 0.5;
        let mut g = [0.0];
        gdelz(&mut g, &[0.0], &[1.0, -p], &[1.0]);
        assert!((f64::from(g[0]) - p / (1.0 - p)).abs() < 1e-5);
    }

    #[test]
    fn analog_lowpass_response() {
        let fc = 100.0;
        let (a, b) = dsbilin(fc, FilterType::Lowpass, 0.0);
        let f = [0.0, fc];
        let (mut mag, mut phase) = ([0.0; 2], [0.0; 2]);
        freqs(&mut mag, &mut phase, &f, &a, &b);
        assert!((mag[0] - 1.0).abs() < 1e-6);
        assert!((mag[1] - core::f32::consts::FRAC_1_SQRT_2).abs() < 1e-5);
        assert!((phase[1] + core::f32::consts::FRAC_PI_4).abs() < 1e-5);
        // 1 / (s + w) delays by 1/w at DC
        let mut g = [0.0];
        gdels(&mut g, &[0.0], &a, &b);
        let w = 2.0 * PI * fc;
        assert!((g[0] - 1.0 / w).abs() < 1e-6);
    }
}
