//! Complex FFT kernels behind the [`FftBackend`] trait.
//!
//! A backend transforms interleaved `[re0, im0, re1, im1, …]` data in place.
//! Both directions are unnormalized: the `1/N` of the inverse is applied by
//! [`FftProcessor`](super::FftProcessor), so every backend yields the same
//! layout and scaling.

use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner, Length};
use std::f64::consts::PI;
use std::sync::Arc;

/// Swappable complex FFT kernel.
///
/// `d.len() / 2` is the transform size and must be a power of two. Sign
/// convention: `forward` computes `X[k] = Σ x[n]·e^(-2πikn/N)`, `inverse`
/// the same with `e^(+2πikn/N)`.
pub trait FftBackend {
    /// Unnormalized forward transform in place.
    fn forward(&mut self, d: &mut [f32]);

    /// Unnormalized inverse transform in place.
    fn inverse(&mut self, d: &mut [f32]);
}

// ============================================================================
// rustfft
// ============================================================================

/// Default backend built on `rustfft`.
///
/// Plans are cached by the planner. The first call at a new size plans and
/// allocates; later calls at that size do not allocate.
pub struct RustFftBackend {
    planner: FftPlanner<f32>,
    forward: Option<Arc<dyn Fft<f32>>>,
    inverse: Option<Arc<dyn Fft<f32>>>,
    buffer: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
}

impl RustFftBackend {
    /// Create a backend with no plans yet.
    pub fn new() -> Self {
        Self {
            planner: FftPlanner::new(),
            forward: None,
            inverse: None,
            buffer: Vec::new(),
            scratch: Vec::new(),
        }
    }

    fn plan(&mut self, n: usize, inverse: bool) -> Arc<dyn Fft<f32>> {
        let cached = if inverse { &self.inverse } else { &self.forward };
        if let Some(fft) = cached.as_ref().filter(|f| f.len() == n) {
            return Arc::clone(fft);
        }
        let fft = if inverse {
            self.planner.plan_fft_inverse(n)
        } else {
            self.planner.plan_fft_forward(n)
        };
        let scratch = fft.get_inplace_scratch_len();
        if self.scratch.len() < scratch {
            self.scratch.resize(scratch, Complex::default());
        }
        if inverse {
            self.inverse = Some(Arc::clone(&fft));
        } else {
            self.forward = Some(Arc::clone(&fft));
        }
        fft
    }

    fn run(&mut self, d: &mut [f32], inverse: bool) {
        debug_assert!(d.len() % 2 == 0, "complex buffer has odd length");
        let n = d.len() / 2;
        if n <= 1 {
            return;
        }
        let fft = self.plan(n, inverse);
        self.buffer.clear();
        self.buffer
            .extend(d.chunks_exact(2).map(|z| Complex::new(z[0], z[1])));
        let scratch_len = fft.get_inplace_scratch_len();
        fft.process_with_scratch(&mut self.buffer, &mut self.scratch[..scratch_len]);
        for (z, c) in d.chunks_exact_mut(2).zip(&self.buffer) {
            z[0] = c.re;
            z[1] = c.im;
        }
    }
}

impl Default for RustFftBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl FftBackend for RustFftBackend {
    fn forward(&mut self, d: &mut [f32]) {
        self.run(d, false);
    }

    fn inverse(&mut self, d: &mut [f32]) {
        self.run(d, true);
    }
}

// ============================================================================
// Portable radix-2
// ============================================================================

/// Portable in-place radix-2 decimation-in-time Cooley-Tukey.
///
/// Twiddle factors are computed in double precision and cached for the
/// last size used.
#[derive(Debug, Clone, Default)]
pub struct Radix2Backend {
    // (cos, sin) of 2πk/N for k < N/2
    twiddles: Vec<(f32, f32)>,
    size: usize,
}

impl Radix2Backend {
    /// Create a backend with an empty twiddle cache.
    pub fn new() -> Self {
        Self::default()
    }

    fn prepare(&mut self, n: usize) {
        if self.size == n {
            return;
        }
        self.twiddles.clear();
        self.twiddles.extend((0..n / 2).map(|k| {
            let w = 2.0 * PI * k as f64 / n as f64;
            (w.cos() as f32, w.sin() as f32)
        }));
        self.size = n;
    }

    fn run(&mut self, d: &mut [f32], sign: f32) {
        debug_assert!(d.len() % 2 == 0, "complex buffer has odd length");
        let n = d.len() / 2;
        debug_assert!(n.is_power_of_two(), "FFT size {n} is not a power of two");
        if n <= 1 {
            return;
        }
        self.prepare(n);

        // bit-reversal permutation
        let bits = n.trailing_zeros();
        for i in 0..n {
            let j = i.reverse_bits() >> (usize::BITS - bits);
            if j > i {
                d.swap(2 * i, 2 * j);
                d.swap(2 * i + 1, 2 * j + 1);
            }
        }

        let mut len = 2;
        while len <= n {
            let half = len / 2;
            let stride = n / len;
            for start in (0..n).step_by(len) {
                for k in 0..half {
                    let (c, s) = self.twiddles[k * stride];
                    let (wr, wi) = (c, sign * s);
                    let a = 2 * (start + k);
                    let b = a + 2 * half;
                    let (xr, xi) = (d[b], d[b + 1]);
                    let tr = xr * wr - xi * wi;
                    let ti = xr * wi + xi * wr;
                    d[b] = d[a] - tr;
                    d[b + 1] = d[a + 1] - ti;
                    d[a] += tr;
                    d[a + 1] += ti;
                }
            }
            len <<= 1;
        }
    }
}

impl FftBackend for Radix2Backend {
    fn forward(&mut self, d: &mut [f32]) {
        self.run(d, -1.0);
    }

    fn inverse(&mut self, d: &mut [f32]) {
        self.run(d, 1.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn naive_dft(x: &[f32]) -> Vec<f32> {
        let n = x.len() / 2;
        let mut out = vec![0.0f32; x.len()];
        for k in 0..n {
            let (mut re, mut im) = (0.0f64, 0.0f64);
            for j in 0..n {
                let w = -2.0 * PI * (k * j) as f64 / n as f64;
                let (xr, xi) = (f64::from(x[2 * j]), f64::from(x[2 * j + 1]));
                re += xr * w.cos() - xi * w.sin();
                im += xr * w.sin() + xi * w.cos();
            }
            out[2 * k] = re as f32;
            out[2 * k + 1] = im as f32;
        }
        out
    }

    fn test_signal(n: usize) -> Vec<f32> {
        (0..2 * n)
            .map(|i| ((i * 7 + 3) % 11) as f32 / 11.0 - 0.5)
            .collect()
    }

    #[test]
    fn backends_match_naive_dft() {
        for n in [1usize, 2, 4, 8, 64] {
            let x = test_signal(n);
            let expected = naive_dft(&x);

            let mut a = x.clone();
            RustFftBackend::new().forward(&mut a);
            let mut b = x.clone();
            Radix2Backend::new().forward(&mut b);

            for i in 0..2 * n {
                assert!((a[i] - expected[i]).abs() < 1e-4, "rustfft n={n} [{i}]");
                assert!((b[i] - expected[i]).abs() < 1e-4, "radix2 n={n} [{i}]");
            }
        }
    }

    #[test]
    fn inverse_undoes_forward_up_to_scale() {
        let n = 32;
        let x = test_signal(n);
        let mut backend = Radix2Backend::new();
        let mut d = x.clone();
        backend.forward(&mut d);
        backend.inverse(&mut d);
        for (y, x) in d.iter().zip(&x) {
            assert!((y / n as f32 - x).abs() < 1e-5);
        }
    }

    #[test]
    fn size_change_replans() {
        let mut backend = RustFftBackend::new();
        let mut small = test_signal(4);
        backend.forward(&mut small);
        let mut big = test_signal(16);
        backend.forward(&mut big);
        let expected = naive_dft(&test_signal(16));
        for (a, b) in big.iter().zip(&expected) {
            assert!((a - b).abs() < 1e-4);
        }
    }
}
