//! Power-of-two transforms on top of a complex [`FftBackend`].

use icst_core::math::nexthipow2;
use icst_core::vector;
use std::f64::consts::PI;

use super::backend::{FftBackend, RustFftBackend};

/// Complex, real, cosine and sine transforms of power-of-two size.
///
/// The forward transforms are unnormalized and the inverses carry the full
/// `1/N`, so every `i*` method undoes its forward counterpart.
///
/// # Layouts
///
/// - complex: `[re0, im0, re1, im1, …]`
/// - packed real spectrum of `N` samples: `[re0, re(N/2), re1, im1, …,
///   re(N/2-1), im(N/2-1)]`
///
/// # Real-time Safety
///
/// The processor owns scratch memory that grows to the largest size seen.
/// Call every method once at the working size before using it on the audio
/// thread; the backend plans on first use as well.
///
/// # Example
///
/// ```rust
/// use icst_analysis::transform::FftProcessor;
///
/// let mut fft = FftProcessor::new();
/// let x: Vec<f32> = (0..64).map(|i| (i as f32 * 0.3).sin()).collect();
/// let mut d = x.clone();
/// fft.realfft(&mut d);
/// fft.realifft(&mut d);
/// assert!(d.iter().zip(&x).all(|(a, b)| (a - b).abs() < 1e-5));
/// ```
pub struct FftProcessor<B: FftBackend = RustFftBackend> {
    backend: B,
    scratch: Vec<f32>,
}

impl FftProcessor<RustFftBackend> {
    /// Create a processor on the default `rustfft` backend.
    pub fn new() -> Self {
        Self::with_backend(RustFftBackend::new())
    }
}

impl Default for FftProcessor<RustFftBackend> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: FftBackend> FftProcessor<B> {
    /// Create a processor on a custom backend.
    pub fn with_backend(backend: B) -> Self {
        Self {
            backend,
            scratch: Vec::new(),
        }
    }

    /// Mutable access to the complex kernel.
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    // ========================================================================
    // Complex
    // ========================================================================

    /// Forward complex FFT of `d.len() / 2` points, unnormalized.
    ///
    /// # Panics
    ///
    /// Debug builds panic unless the point count is a power of two.
    pub fn fft(&mut self, d: &mut [f32]) {
        debug_assert!((d.len() / 2).is_power_of_two(), "FFT size must be a power of two");
        self.backend.forward(d);
    }

    /// Inverse complex FFT including the `1/N` normalization.
    pub fn ifft(&mut self, d: &mut [f32]) {
        debug_assert!((d.len() / 2).is_power_of_two(), "FFT size must be a power of two");
        let n = d.len() / 2;
        self.backend.inverse(d);
        vector::mul(d, 1.0 / n as f32);
    }

    // ========================================================================
    // Real
    // ========================================================================

    /// FFT of `N = d.len()` real samples into the packed half spectrum.
    ///
    /// Uses an `N/2` point complex transform of the even/odd interleaved
    /// samples followed by a split step.
    pub fn realfft(&mut self, d: &mut [f32]) {
        let n = d.len();
        debug_assert!(n >= 2 && n.is_power_of_two(), "real FFT size {n} is not a power of two");
        self.backend.forward(d);

        let m = n / 2;
        let (z0r, z0i) = (d[0], d[1]);
        d[0] = z0r + z0i;
        d[1] = z0r - z0i;
        for k in 1..=m / 2 {
            let j = m - k;
            let (zk, zj) = (
                (f64::from(d[2 * k]), f64::from(d[2 * k + 1])),
                (f64::from(d[2 * j]), f64::from(d[2 * j + 1])),
            );
            let xk = split(zk, zj, k, n);
            let xj = split(zj, zk, j, n);
            d[2 * k] = xk.0 as f32;
            d[2 * k + 1] = xk.1 as f32;
            d[2 * j] = xj.0 as f32;
            d[2 * j + 1] = xj.1 as f32;
        }
    }

    /// Inverse of [`realfft`](Self::realfft), including `1/N`.
    pub fn realifft(&mut self, d: &mut [f32]) {
        let n = d.len();
        debug_assert!(n >= 2 && n.is_power_of_two(), "real FFT size {n} is not a power of two");

        let m = n / 2;
        let (x0, xm) = (d[0], d[1]);
        d[0] = 0.5 * (x0 + xm);
        d[1] = 0.5 * (x0 - xm);
        for k in 1..=m / 2 {
            let j = m - k;
            let (xk, xj) = (
                (f64::from(d[2 * k]), f64::from(d[2 * k + 1])),
                (f64::from(d[2 * j]), f64::from(d[2 * j + 1])),
            );
            let zk = merge(xk, xj, k, n);
            let zj = merge(xj, xk, j, n);
            d[2 * k] = zk.0 as f32;
            d[2 * k + 1] = zk.1 as f32;
            d[2 * j] = zj.0 as f32;
            d[2 * j + 1] = zj.1 as f32;
        }

        self.backend.inverse(d);
        vector::mul(d, 1.0 / m as f32);
    }

    /// Spectrum of real symmetric data.
    ///
    /// `d` holds `N + 1` samples, the lower half of a sequence of length
    /// `2N` with `x[j] = x[2N - j]`, and receives the lower half of its
    /// (real) spectrum. This is a DCT-I.
    pub fn realsymfft(&mut self, d: &mut [f32]) {
        self.dct1(d);
    }

    /// Inverse of [`realsymfft`](Self::realsymfft), including `1/(2N)`.
    pub fn realsymifft(&mut self, d: &mut [f32]) {
        let n = d.len() - 1;
        self.dct1(d);
        vector::mul(d, 1.0 / (2 * n) as f32);
    }

    // DCT-I over the mirrored sequence, computed with a 2N point real FFT.
    fn dct1(&mut self, d: &mut [f32]) {
        debug_assert!(
            d.len() >= 3 && (d.len() - 1).is_power_of_two(),
            "symmetric FFT needs 2^n + 1 samples"
        );
        let n = d.len() - 1;
        let mut scratch = std::mem::take(&mut self.scratch);
        if scratch.len() < 2 * n {
            scratch.resize(2 * n, 0.0);
        }
        let x = &mut scratch[..2 * n];
        x[..=n].copy_from_slice(d);
        for j in 1..n {
            x[2 * n - j] = d[j];
        }
        self.realfft(x);
        d[0] = x[0];
        d[n] = x[1];
        for k in 1..n {
            d[k] = x[2 * k];
        }
        self.scratch = scratch;
    }

    // ========================================================================
    // Cosine and sine
    // ========================================================================

    /// DCT-II: `C[k] = Σ x[j]·cos(π(j + ½)k / N)`, unnormalized.
    ///
    /// Computed with an `N` point complex FFT of the reordered input.
    pub fn dct(&mut self, d: &mut [f32]) {
        let n = d.len();
        debug_assert!(n.is_power_of_two(), "DCT size must be a power of two");
        let mut scratch = std::mem::take(&mut self.scratch);
        if scratch.len() < 2 * n {
            scratch.resize(2 * n, 0.0);
        }
        let v = &mut scratch[..2 * n];
        for k in 0..n / 2 {
            v[2 * k] = d[2 * k];
            v[2 * (n - 1 - k)] = d[2 * k + 1];
        }
        if n == 1 {
            v[0] = d[0];
        }
        for k in 0..n {
            v[2 * k + 1] = 0.0;
        }
        self.backend.forward(v);
        for (k, x) in d.iter_mut().enumerate() {
            let w = -PI * k as f64 / (2 * n) as f64;
            *x = (f64::from(v[2 * k]) * w.cos() - f64::from(v[2 * k + 1]) * w.sin()) as f32;
        }
        self.scratch = scratch;
    }

    /// Inverse of [`dct`](Self::dct) (a scaled DCT-III).
    pub fn idct(&mut self, d: &mut [f32]) {
        let n = d.len();
        debug_assert!(n.is_power_of_two(), "DCT size must be a power of two");
        let mut scratch = std::mem::take(&mut self.scratch);
        if scratch.len() < 2 * n {
            scratch.resize(2 * n, 0.0);
        }
        let v = &mut scratch[..2 * n];
        // V[k] = e^(iπk/2N)·(C[k] - i·C[N-k]), C[N] = 0
        for k in 0..n {
            let c = f64::from(d[k]);
            let s = if k == 0 { 0.0 } else { f64::from(d[n - k]) };
            let w = PI * k as f64 / (2 * n) as f64;
            let (wr, wi) = (w.cos(), w.sin());
            v[2 * k] = (c * wr + s * wi) as f32;
            v[2 * k + 1] = (c * wi - s * wr) as f32;
        }
        self.backend.inverse(v);
        let norm = 1.0 / n as f32;
        for k in 0..n / 2 {
            d[2 * k] = v[2 * k] * norm;
            d[2 * k + 1] = v[2 * (n - 1 - k)] * norm;
        }
        if n == 1 {
            d[0] = v[0];
        }
        self.scratch = scratch;
    }

    /// DST-II: `d[k-1] = Σ x[j]·sin(π(j + ½)k / N)` for `k = 1..=N`.
    ///
    /// The Nyquist term `k = N` lands in the last element.
    pub fn dst(&mut self, d: &mut [f32]) {
        // sin(π(j+½)k/N) = (-1)^j·cos(π(j+½)(N-k)/N)
        alternate(d);
        self.dct(d);
        d.reverse();
    }

    /// Inverse of [`dst`](Self::dst).
    pub fn idst(&mut self, d: &mut [f32]) {
        d.reverse();
        self.idct(d);
        alternate(d);
    }

    // ========================================================================
    // Fast correlation
    // ========================================================================

    /// Linear convolution of `d[..dsize]` with `r[..rsize]` into
    /// `d[..dsize + rsize - 1]`.
    ///
    /// Both buffers are zero-padded to `nexthipow2(dsize + rsize)` in place
    /// and `r` is left holding its packed spectrum.
    ///
    /// # Panics
    ///
    /// Debug builds panic if either buffer is shorter than the padded size.
    pub fn fast_convolution(&mut self, d: &mut [f32], r: &mut [f32], dsize: usize, rsize: usize) {
        let size = nexthipow2(dsize + rsize);
        let (d, r) = self.pad_and_transform(d, r, dsize, rsize, size);
        let nyquist = d[1] * r[1];
        d[1] = 0.0;
        vector::cpxmul_vec(d, r);
        d[1] = nyquist;
        self.realifft(d);
    }

    /// Cross-correlation `d[i] = Σ d[i + j]·r[j]` for `i < dsize`.
    ///
    /// Same padding contract as [`fast_convolution`](Self::fast_convolution).
    pub fn fast_cross_correlation(
        &mut self,
        d: &mut [f32],
        r: &mut [f32],
        dsize: usize,
        rsize: usize,
    ) {
        let size = nexthipow2(dsize + rsize);
        let (d, r) = self.pad_and_transform(d, r, dsize, rsize, size);
        let nyquist = d[1] * r[1];
        vector::cpxconj(r);
        d[1] = 0.0;
        r[1] = 0.0;
        vector::cpxmul_vec(d, r);
        d[1] = nyquist;
        self.realifft(d);
    }

    /// Biased autocorrelation of `d[..size]` into `d[..size]`.
    ///
    /// `d` must hold `nexthipow2(2·size)` samples.
    pub fn fast_auto_correlation(&mut self, d: &mut [f32], size: usize) {
        let tsize = nexthipow2(2 * size);
        debug_assert!(d.len() >= tsize, "autocorrelation buffer needs {tsize} samples");
        let d = &mut d[..tsize];
        d[size..].fill(0.0);
        self.realfft(d);
        d[0] *= d[0];
        d[1] *= d[1];
        for z in d[2..].chunks_exact_mut(2) {
            z[0] = z[0] * z[0] + z[1] * z[1];
            z[1] = 0.0;
        }
        self.realifft(d);
    }

    fn pad_and_transform<'a>(
        &mut self,
        d: &'a mut [f32],
        r: &'a mut [f32],
        dsize: usize,
        rsize: usize,
        size: usize,
    ) -> (&'a mut [f32], &'a mut [f32]) {
        debug_assert!(d.len() >= size && r.len() >= size, "buffers need {size} samples");
        let (d, r) = (&mut d[..size], &mut r[..size]);
        d[dsize..].fill(0.0);
        r[rsize..].fill(0.0);
        self.realfft(d);
        self.realfft(r);
        (d, r)
    }
}

// X[k] from Z[k] and Z[M-k] of the half-size transform.
#[inline]
fn split(zk: (f64, f64), zj: (f64, f64), k: usize, n: usize) -> (f64, f64) {
    let (er, ei) = (0.5 * (zk.0 + zj.0), 0.5 * (zk.1 - zj.1));
    let (dr, di) = (0.5 * (zk.0 - zj.0), 0.5 * (zk.1 + zj.1));
    let w = -2.0 * PI * k as f64 / n as f64;
    let (wr, wi) = (w.cos(), w.sin());
    // X = E - i·W·D
    let (pr, pi) = (wr * dr - wi * di, wr * di + wi * dr);
    (er + pi, ei - pr)
}

// Z[k] from X[k] and X[M-k] of the packed spectrum.
#[inline]
fn merge(xk: (f64, f64), xj: (f64, f64), k: usize, n: usize) -> (f64, f64) {
    let (er, ei) = (0.5 * (xk.0 + xj.0), 0.5 * (xk.1 - xj.1));
    let (dr, di) = (0.5 * (xk.0 - xj.0), 0.5 * (xk.1 + xj.1));
    let w = 2.0 * PI * k as f64 / n as f64;
    let (wr, wi) = (w.cos(), w.sin());
    // O = D·W⁻¹, Z = E + i·O
    let (or, oi) = (wr * dr - wi * di, wr * di + wi * dr);
    (er - oi, ei + or)
}

fn alternate(d: &mut [f32]) {
    for x in d.iter_mut().skip(1).step_by(2) {
        *x = -*x;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::Radix2Backend;

    fn signal(n: usize) -> Vec<f32> {
        (0..n)
            .map(|i| ((i * 13 + 5) % 17) as f32 / 17.0 - 0.5)
            .collect()
    }

    fn close(a: &[f32], b: &[f32], tol: f32) {
        assert_eq!(a.len(), b.len());
        for (i, (x, y)) in a.iter().zip(b).enumerate() {
            assert!((x - y).abs() < tol, "[{i}] {x} vs {y}");
        }
    }

    // ========================================================================
    // Complex and real
    // ========================================================================

    #[test]
    fn ifft_normalizes() {
        let x = signal(32);
        let mut fft = FftProcessor::new();
        let mut d = x.clone();
        fft.fft(&mut d);
        fft.ifft(&mut d);
        close(&d, &x, 1e-5);
    }

    #[test]
    fn realfft_packing_matches_complex_fft() {
        let n = 16;
        let x = signal(n);
        let mut fft = FftProcessor::new();

        let mut full = vec![0.0f32; 2 * n];
        vector::realtocpx(&mut full, Some(x.as_slice()), None);
        fft.fft(&mut full);

        let mut packed = x.clone();
        fft.realfft(&mut packed);

        assert!((packed[0] - full[0]).abs() < 1e-5);
        assert!((packed[1] - full[n]).abs() < 1e-5, "Nyquist bin");
        for k in 1..n / 2 {
            assert!((packed[2 * k] - full[2 * k]).abs() < 1e-5, "re[{k}]");
            assert!((packed[2 * k + 1] - full[2 * k + 1]).abs() < 1e-5, "im[{k}]");
        }
    }

    #[test]
    fn realfft_two_points() {
        let mut fft = FftProcessor::new();
        let mut d = [3.0f32, 1.0];
        fft.realfft(&mut d);
        assert_eq!(d, [4.0, 2.0]);
        fft.realifft(&mut d);
        assert_eq!(d, [3.0, 1.0]);
    }

    #[test]
    fn radix2_backend_gives_same_layout() {
        let x = signal(64);
        let mut a = x.clone();
        FftProcessor::new().realfft(&mut a);
        let mut b = x.clone();
        FftProcessor::with_backend(Radix2Backend::new()).realfft(&mut b);
        close(&a, &b, 1e-4);
    }

    // ========================================================================
    // Symmetric, cosine and sine
    // ========================================================================

    #[test]
    fn realsymfft_matches_full_transform() {
        let n = 8;
        let half = signal(n + 1);
        let mut full = vec![0.0f32; 2 * n];
        full[..=n].copy_from_slice(&half);
        for j in 1..n {
            full[2 * n - j] = half[j];
        }
        let mut fft = FftProcessor::new();
        fft.realfft(&mut full);

        let mut d = half.clone();
        fft.realsymfft(&mut d);
        assert!((d[0] - full[0]).abs() < 1e-5);
        assert!((d[n] - full[1]).abs() < 1e-5);
        for k in 1..n {
            assert!((d[k] - full[2 * k]).abs() < 1e-5, "bin {k}");
            assert!(full[2 * k + 1].abs() < 1e-5, "symmetric data has no imaginary part");
        }

        fft.realsymifft(&mut d);
        close(&d, &half, 1e-5);
    }

    #[test]
    fn dct_matches_definition_and_inverts() {
        let n = 16;
        let x = signal(n);
        let mut d = x.clone();
        let mut fft = FftProcessor::new();
        fft.dct(&mut d);
        for k in 0..n {
            let expected: f64 = (0..n)
                .map(|j| f64::from(x[j]) * (PI * (j as f64 + 0.5) * k as f64 / n as f64).cos())
                .sum();
            assert!((f64::from(d[k]) - expected).abs() < 1e-4, "C[{k}]");
        }
        fft.idct(&mut d);
        close(&d, &x, 1e-5);
    }

    #[test]
    fn dst_matches_definition_and_inverts() {
        let n = 8;
        let x = signal(n);
        let mut d = x.clone();
        let mut fft = FftProcessor::new();
        fft.dst(&mut d);
        for k in 1..=n {
            let expected: f64 = (0..n)
                .map(|j| f64::from(x[j]) * (PI * (j as f64 + 0.5) * k as f64 / n as f64).sin())
                .sum();
            assert!((f64::from(d[k - 1]) - expected).abs() < 1e-4, "S[{k}]");
        }
        fft.idst(&mut d);
        close(&d, &x, 1e-5);
    }

    // ========================================================================
    // Fast correlation
    // ========================================================================

    #[test]
    fn fast_convolution_matches_direct() {
        let (dsize, rsize) = (20, 7);
        let x = signal(dsize);
        let h: Vec<f32> = (0..rsize).map(|i| 1.0 / (i + 1) as f32).collect();

        let mut expected = x.clone();
        expected.resize(dsize + rsize - 1, 0.0);
        vector::conv(&mut expected, dsize, &h);

        let size = nexthipow2(dsize + rsize);
        let mut d = x.clone();
        d.resize(size, 0.0);
        let mut r = h.clone();
        r.resize(size, 0.0);
        FftProcessor::new().fast_convolution(&mut d, &mut r, dsize, rsize);
        close(&d[..dsize + rsize - 1], &expected, 1e-4);
    }

    #[test]
    fn fast_cross_correlation_matches_direct() {
        let (dsize, rsize) = (24, 5);
        let x = signal(dsize);
        let h = [0.5f32, -1.0, 0.25, 0.75, 0.1];

        let mut expected = x.clone();
        vector::ccorr(&mut expected, &h, dsize);

        let size = nexthipow2(dsize + rsize);
        let mut d = x.clone();
        d.resize(size, 0.0);
        let mut r = h.to_vec();
        r.resize(size, 0.0);
        FftProcessor::new().fast_cross_correlation(&mut d, &mut r, dsize, rsize);
        close(&d[..dsize], &expected, 1e-4);
    }

    #[test]
    fn fast_auto_correlation_matches_biased() {
        let size = 12;
        let x = signal(size);
        let mut expected = vec![0.0f32; size];
        vector::bacorr(&mut expected, &x);

        let mut d = x.clone();
        d.resize(nexthipow2(2 * size), 0.0);
        FftProcessor::new().fast_auto_correlation(&mut d, size);
        close(&d[..size], &expected, 1e-4);
    }
}
