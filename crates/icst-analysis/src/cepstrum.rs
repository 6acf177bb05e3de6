//! Real cepstrum and mel-frequency cepstral coefficients.

use icst_core::vector;
use std::f32::consts::PI;

use crate::transform::{FftBackend, FftProcessor};

/// Real cepstrum from a magnitude half spectrum, in place.
///
/// `d` holds bins `0..=N` of a `2N` point spectrum and receives the lower
/// half of the cepstrum. Magnitudes are floored 200 dB below the maximum
/// before the logarithm.
///
/// # Panics
///
/// Debug builds panic unless `d.len() - 1` is a power of two.
pub fn real_cepstrum_from_magnitude<B: FftBackend>(fft: &mut FftProcessor<B>, d: &mut [f32]) {
    let m = d[vector::maxi(d)];
    vector::limit(d, m, 1e-10 * m);
    vector::logabs(d);
    fft.realsymifft(d);
}

/// Magnitude half spectrum from a real cepstrum, in place. Inverse of
/// [`real_cepstrum_from_magnitude`] up to the floor.
pub fn magnitude_from_real_cepstrum<B: FftBackend>(fft: &mut FftProcessor<B>, d: &mut [f32]) {
    fft.realsymfft(d);
    vector::fexp(d);
}

/// Mel filter bank and DCT producing MFCCs from a half spectrum.
///
/// Feed a power spectrum for the textbook definition or a magnitude
/// spectrum as in ETSI ES 201 108.
#[derive(Debug, Clone)]
pub struct Mfcc {
    size: usize,
    edges: Vec<usize>,
    bands: Vec<f32>,
}

impl Mfcc {
    /// Filter bank of `bands` triangles between `fmin` and `fmax` Hz over a
    /// half spectrum of `size + 1` bins at sample rate `fs`.
    pub fn new(size: usize, bands: usize, fs: f32, fmin: f32, fmax: f32) -> Self {
        debug_assert!(bands > 0, "need at least one mel band");
        let mello = (1.0 + fmin / 700.0).ln();
        let melhi = (1.0 + fmax / 700.0).ln();
        let delta = (melhi - mello) / (bands + 1) as f32;
        let scale = 1400.0 * size as f32 / fs;
        let edges = (0..=bands + 1)
            .map(|i| {
                let mel = mello + delta * i as f32;
                let bin = (0.5 + scale * (mel.exp() - 1.0)).max(0.0) as usize;
                bin.min(size)
            })
            .collect();
        tracing::debug!(size, bands, fmin, fmax, "prepared mel filter bank");
        Self {
            size,
            edges,
            bands: vec![0.0; bands],
        }
    }

    /// Number of mel bands.
    pub fn bands(&self) -> usize {
        self.bands.len()
    }

    /// Band edge bins, `bands + 2` ascending values.
    pub fn edges(&self) -> &[usize] {
        &self.edges
    }

    /// Compute `c.len()` coefficients from the half spectrum `d[..=size]`.
    ///
    /// `c[0]` is the sum of the log band energies; the rest follow a
    /// DCT-II.
    ///
    /// # Panics
    ///
    /// Debug builds panic if `d` is shorter than `size + 1` or `c` is longer
    /// than the band count.
    pub fn compute(&mut self, d: &[f32], c: &mut [f32]) {
        debug_assert!(d.len() > self.size, "spectrum needs {} bins", self.size + 1);
        debug_assert!(c.len() <= self.bands.len(), "more coefficients than bands");
        let b = &self.edges;

        for (i, band) in self.bands.iter_mut().enumerate() {
            let (lo, mid, hi) = (b[i], b[i + 1], b[i + 2]);
            let rise = 1.0 / ((mid - lo) as f32 + 1.0);
            let (mut x, mut y) = (0.0f32, 0.0f32);
            for &v in &d[lo..=mid] {
                x += rise;
                y += x * v;
            }
            let fall = 1.0 / ((hi - mid) as f32 + 1.0);
            for &v in &d[mid + 1..=hi] {
                x -= fall;
                y += x * v;
            }
            *band = y;
        }

        let n = self.bands[vector::maxi(&self.bands)];
        vector::limit(&mut self.bands, n, 1e-10 * n);
        vector::logabs(&mut self.bands);

        let Some((c0, rest)) = c.split_first_mut() else {
            return;
        };
        *c0 = vector::sum(&self.bands);
        let v = PI / (2 * self.bands.len()) as f32;
        for (i, ci) in rest.iter_mut().enumerate() {
            let k = (i + 1) as f32;
            *ci = self
                .bands
                .iter()
                .enumerate()
                .map(|(j, &m)| m * (v * k * (2 * j + 1) as f32).cos())
                .sum();
        }
    }
}
