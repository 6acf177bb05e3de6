//! Adaptive filtering and carrier tracking.

use icst_core::fast_math::fast_atan2;
use icst_core::math::{ANTI_DENORMAL, AntiDenormal};
use std::f32::consts::PI;

/// Normalized LMS: adapt `h` so that filtering `x` estimates `y`.
///
/// `h` holds `order + 1` taps, `h[order]` weighting the current sample and
/// `h[0]` the one `order` samples back. `c` holds the last `order` input
/// samples of the previous call; zero both for a fresh start. `e` receives
/// the a priori error `y - estimate`. `mu` in `(0, 1]` sets the adaptation
/// rate, 1 being the fastest stable setting.
///
/// # Panics
///
/// Debug builds panic on mismatched lengths.
pub fn nlms(e: &mut [f32], x: &[f32], y: &[f32], h: &mut [f32], c: &mut [f32], mu: f32) {
    let order = c.len();
    let size = x.len();
    debug_assert_eq!(h.len(), order + 1, "h needs order + 1 taps");
    debug_assert!(e.len() == size && y.len() == size);

    // continuation data followed by the new block
    let at = |c: &[f32], n: usize| if n < order { c[n] } else { x[n - order] };
    let mut rms = f64::from(ANTI_DENORMAL * ANTI_DENORMAL)
        + c.iter().map(|&v| f64::from(v) * f64::from(v)).sum::<f64>();

    for i in 0..size {
        let estimate: f32 = h.iter().enumerate().map(|(j, &w)| w * at(c, i + j)).sum();
        let err = y[i] - estimate;
        e[i] = err;
        rms += f64::from(x[i]) * f64::from(x[i]);
        let step = mu * err / rms as f32;
        let oldest = f64::from(at(c, i));
        rms -= oldest * oldest;
        for (j, w) in h.iter_mut().enumerate() {
            *w += step * at(c, i + j);
        }
    }

    if size >= order {
        c.copy_from_slice(&x[size - order..]);
    } else {
        c.copy_within(size.., 0);
        c[order - size..].copy_from_slice(x);
    }
}

/// Tracking demodulator built on a Costas-style loop.
///
/// A quadrature oscillator follows the carrier of the input; the arm filter
/// outputs are the demodulated in-phase and quadrature components.
/// Frequencies and bandwidths are relative to the sample rate.
///
/// # Example
///
/// ```rust
/// use icst_analysis::adaptive::Costas;
///
/// let d: Vec<f32> = (0..4000)
///     .map(|n| (2.0 * std::f32::consts::PI * 0.0502 * n as f32).cos())
///     .collect();
/// let mut r = vec![0.0f32; 2 * d.len()];
/// let mut loop_ = Costas::new(0.05, 0.0);
/// loop_.process(&d, &mut r, 0.002, 0.02);
/// assert!((loop_.frequency() - 0.0502).abs() < 2e-4);
/// ```
#[derive(Debug, Clone)]
pub struct Costas {
    arm: [f32; 2],
    freq: f32,
    phase: f32,
    adn: AntiDenormal,
}

impl Costas {
    /// Loop starting at carrier frequency `freq` and phase `phase` (radians).
    pub fn new(freq: f32, phase: f32) -> Self {
        Self {
            arm: [0.0; 2],
            freq,
            phase,
            adn: AntiDenormal::default(),
        }
    }

    /// Current oscillator frequency.
    pub fn frequency(&self) -> f32 {
        self.freq
    }

    /// Current oscillator phase in `(-π, π]`.
    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// Demodulate `d` into interleaved `r = [I0, Q0, I1, Q1, ..]`.
    ///
    /// `tbw` is the tracking bandwidth, how fast the oscillator follows the
    /// carrier. `dbw` is the demodulation bandwidth of the arm filters and
    /// is raised to at least `2 * tbw`.
    ///
    /// # Panics
    ///
    /// Debug builds panic unless `r` holds `2 * d.len()` values.
    pub fn process(&mut self, d: &[f32], r: &mut [f32], tbw: f32, dbw: f32) {
        debug_assert_eq!(r.len(), 2 * d.len(), "r holds interleaved I/Q pairs");
        let u = self.adn.next();
        let adn = [
            0.25 * ANTI_DENORMAL * (u + 2.0),
            -0.15 * ANTI_DENORMAL * u,
            0.08 * ANTI_DENORMAL * (u - 2.761),
            -0.13 * ANTI_DENORMAL * (u - 1.629),
        ];

        // critically damped second order loop
        let a = (19.5 * tbw).min(1.0);
        let b = 0.25 * a * a;
        let g = (6.28 * (2.0 * tbw).max(dbw)).min(1.0);

        let (mut xi, mut xr) = self.phase.sin_cos();
        let (mut fi, mut fr) = (2.0 * PI * self.freq).sin_cos();
        let [mut ci, mut cq] = self.arm;

        for (n, (&x, out)) in d.iter().zip(r.chunks_exact_mut(2)).enumerate() {
            let v = 2.0 * x + adn[n & 1];
            ci += g * (xr * v - ci);
            cq += g * (-xi * v - cq);
            out[0] = ci + adn[2];
            out[1] = cq + adn[3];
            let err = fast_atan2(cq, ci) + 1e-8;

            // small angle rotations by a·err and b·err
            let ai = a * err;
            let ar = 1.0 - 0.5 * ai * ai;
            let bi = b * err;
            let br = 1.0 - 0.5 * bi * bi;

            let wr = fr * ar - fi * ai;
            let wi = fi * ar + fr * ai;
            (xr, xi) = (wr * xr - wi * xi, wi * xr + wr * xi);
            let k = 0.5 * (3.0 - xr * xr - xi * xi);
            xr *= k;
            xi *= k;
            (fr, fi) = (fr * br - fi * bi, fi * br + fr * bi);
            let k = 0.5 * (3.0 - fr * fr - fi * fi);
            fr *= k;
            fi *= k;
        }

        self.arm = [ci, cq];
        self.phase = xi.atan2(xr);
        self.freq = fi.atan2(fr) / (2.0 * PI);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use icst_core::vector::NoiseGen;

    fn plant(x: &[f32], taps: &[f32]) -> Vec<f32> {
        let order = taps.len() - 1;
        (0..x.len())
            .map(|n| {
                taps.iter()
                    .enumerate()
                    .filter(|&(j, _)| n + j >= order)
                    .map(|(j, &t)| t * x[n + j - order])
                    .sum()
            })
            .collect()
    }

    // ========================================================================
    // NLMS
    // ========================================================================

    #[test]
    fn nlms_identifies_fir() {
        let taps = [0.1f32, -0.4, 0.25, 0.8];
        let mut x = vec![0.0f32; 4000];
        NoiseGen::new(3).unoise(&mut x);
        let y = plant(&x, &taps);

        let mut h = [0.0f32; 4];
        let mut c = [0.0f32; 3];
        let mut e = vec![0.0f32; x.len()];
        for ((eb, xb), yb) in e.chunks_mut(64).zip(x.chunks(64)).zip(y.chunks(64)) {
            nlms(eb, xb, yb, &mut h, &mut c, 0.5);
        }
        for (w, t) in h.iter().zip(&taps) {
            assert!((w - t).abs() < 1e-2, "{h:?}");
        }
        assert!(e[3900..].iter().all(|v| v.abs() < 1e-2));
        assert_eq!(c, [x[3997], x[3998], x[3999]]);
    }

    #[test]
    fn nlms_blocks_match_single_call() {
        let mut x = vec![0.0f32; 300];
        NoiseGen::new(11).unoise(&mut x);
        let y = plant(&x, &[0.5, -0.3, 0.2]);

        let (mut h1, mut c1) = ([0.0f32; 3], [0.0f32; 2]);
        let mut e1 = vec![0.0f32; 300];
        nlms(&mut e1, &x, &y, &mut h1, &mut c1, 0.3);

        // blocks shorter than the order exercise the continuation shift
        let (mut h2, mut c2) = ([0.0f32; 3], [0.0f32; 2]);
        let mut e2 = vec![0.0f32; 300];
        let mut start = 0;
        for len in [1usize, 1, 5, 93, 200] {
            let end = start + len;
            nlms(&mut e2[start..end], &x[start..end], &y[start..end], &mut h2, &mut c2, 0.3);
            start = end;
        }
        assert_eq!(c1, c2);
        for (a, b) in e1.iter().zip(&e2) {
            assert!((a - b).abs() < 1e-4, "{a} vs {b}");
        }
    }

    // ========================================================================
    // Costas loop
    // ========================================================================

    #[test]
    fn costas_locks_to_carrier() {
        let f = 0.0502f32;
        let d: Vec<f32> = (0..8000).map(|n| (2.0 * PI * f * n as f32).cos()).collect();
        let mut r = vec![0.0f32; 2 * d.len()];
        let mut costas = Costas::new(0.049, 0.0);
        costas.process(&d, &mut r, 0.002, 0.02);
        assert!((costas.frequency() - f).abs() < 2e-4, "f = {}", costas.frequency());

        // after lock the carrier sits in the in-phase arm
        let tail = &r[2 * 7000..];
        let i_mean = tail.iter().step_by(2).sum::<f32>() / 1000.0;
        let q_mean = tail.iter().skip(1).step_by(2).sum::<f32>() / 1000.0;
        assert!((i_mean - 1.0).abs() < 0.1, "I = {i_mean}");
        assert!(q_mean.abs() < 0.1, "Q = {q_mean}");
    }

    #[test]
    fn costas_state_carries_between_calls() {
        let d: Vec<f32> = (0..2000).map(|n| (2.0 * PI * 0.1 * n as f32 + 0.4).cos()).collect();
        let mut r = vec![0.0f32; 2 * d.len()];
        let mut costas = Costas::new(0.1, 0.0);
        for (db, rb) in d.chunks(100).zip(r.chunks_mut(200)) {
            costas.process(db, rb, 0.005, 0.02);
        }
        assert!((costas.frequency() - 0.1).abs() < 1e-3);
        assert!(costas.phase().abs() <= PI);
    }
}
