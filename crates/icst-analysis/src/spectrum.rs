//! Reassigned high resolution spectrum.
//!
//! Each frame is transformed three times: with the window, with its time
//! derivative and with a time-ramped copy. The ratios against the plain
//! spectrum move every bin to the frequency and time of the energy it
//! holds, and a fitted window response corrects peak amplitudes for their
//! offset from the bin center.
//!
//! # Example
//!
//! ```rust
//! use icst_analysis::spectrum::{Reassignment, SpectralAnalyzer};
//! use icst_core::vector::hann;
//!
//! let size = 256;
//! let mut window = vec![0.0f32; size + 1];
//! hann(&mut window);
//! let mut analyzer = SpectralAnalyzer::new(&window);
//!
//! let mut frame: Vec<f32> = (0..size)
//!     .map(|i| (2.0 * std::f32::consts::PI * 20.25 * i as f32 / size as f32).cos())
//!     .collect();
//! let mut freq = vec![0.0f32; size];
//! let mut amp = vec![0.0f32; size / 2];
//! analyzer.analyse_spectrum(
//!     &mut frame,
//!     Reassignment { freq: Some(&mut freq), amp: Some(&mut amp), time: None },
//! );
//! assert!((freq[20] * size as f32 - 20.25).abs() < 0.05);
//! assert!((amp[20] - 1.0).abs() < 0.05);
//! ```

use icst_core::special::{chebyapprox, chebytops};
use icst_core::vector::{
    self, InversePrecision, cpxinv, cpxmag, cpxmul_vec, cpxprune, cpxrms, deinterleave,
};
use std::f32::consts::PI;

use crate::transform::{FftBackend, FftProcessor, RustFftBackend};

// zero-padded length used to sample the window's main lobe
const LOBE_FFT: usize = 1024;
const LOBE_TAPS: usize = 17;

/// Optional outputs of [`SpectralAnalyzer::analyse_spectrum`].
///
/// `freq` and `time` need the full frame length, their upper halves are
/// used as scratch. `amp` needs half the frame length.
#[derive(Debug, Default)]
pub struct Reassignment<'a> {
    /// Reassigned frequency of each bin relative to the sample rate.
    pub freq: Option<&'a mut [f32]>,
    /// Reassigned peak amplitude, 0 for bins that are not peaks.
    pub amp: Option<&'a mut [f32]>,
    /// Reassigned time of each bin, -0.5..0.5 relative to the frame center.
    pub time: Option<&'a mut [f32]>,
}

/// Windowed analyzer with frequency, time and amplitude reassignment.
///
/// Allocates on construction and in [`prepare_window`](Self::prepare_window).
/// [`analyse_spectrum`](Self::analyse_spectrum) reuses its buffers.
pub struct SpectralAnalyzer<B: FftBackend = RustFftBackend> {
    fft: FftProcessor<B>,
    size: usize,
    window: Vec<f32>,
    dwindow: Vec<f32>,
    rwindow: Vec<f32>,
    aic: [f32; 4],
    temp: Vec<f32>,
}

impl SpectralAnalyzer {
    /// Analyzer for the symmetric `window` of length `size + 1`.
    pub fn new(window: &[f32]) -> Self {
        Self::with_processor(FftProcessor::new(), window)
    }
}

impl<B: FftBackend> SpectralAnalyzer<B> {
    /// Analyzer running on the given transform processor.
    pub fn with_processor(fft: FftProcessor<B>, window: &[f32]) -> Self {
        let mut analyzer = Self {
            fft,
            size: 0,
            window: Vec::new(),
            dwindow: Vec::new(),
            rwindow: Vec::new(),
            aic: [0.0; 4],
            temp: Vec::new(),
        };
        analyzer.prepare_window(window);
        analyzer
    }

    /// Frame length.
    pub fn size(&self) -> usize {
        self.size
    }

    /// The normalized window, `size + 1` samples summing to 1 over the
    /// first `size`.
    pub fn window(&self) -> &[f32] {
        &self.window
    }

    /// Even polynomial coefficients in the squared bin offset that undo the
    /// window's main lobe attenuation.
    pub fn amplitude_correction(&self) -> [f32; 4] {
        self.aic
    }

    /// Replace the window and derive its derivative, ramp and amplitude
    /// correction.
    ///
    /// # Panics
    ///
    /// Debug builds panic unless `window.len() - 1` is a power of two of at
    /// least 16.
    pub fn prepare_window(&mut self, window: &[f32]) {
        let size = window.len().saturating_sub(1);
        debug_assert!(
            size >= 16 && size.is_power_of_two(),
            "window length must be 2^n + 1 with 2^n >= 16, got {}",
            window.len()
        );
        self.size = size;
        self.temp.resize(size, 0.0);

        let mut w = window.to_vec();
        let scale = 1.0 / vector::sum(&w[..size]);
        vector::mul(&mut w, scale);

        let mut dw = w.clone();
        vector::diff(&mut dw);
        vector::mul(&mut dw[..size], -1.0 / (2.0 * PI * size as f32));

        let mut rw = vec![0.0f32; size + 1];
        vector::linear(&mut rw, -0.5, 0.5);
        vector::mul_vec(&mut rw[..size], &w[..size]);

        self.aic = self.lobe_correction(&w);
        self.window = w;
        self.dwindow = dw;
        self.rwindow = rw;

        tracing::debug!(size, aic = ?self.aic, "prepared analysis window");
    }

    // Fit 1/|W(δ)| over δ in [-1, 1] bins as an even polynomial in δ.
    fn lobe_correction(&mut self, w: &[f32]) -> [f32; 4] {
        let half = LOBE_FFT / 2;
        let mut tw = vec![0.0f32; LOBE_FFT];
        let start = half - LOBE_TAPS / 2;
        deinterleave(
            &mut tw[start..start + LOBE_TAPS],
            w,
            self.size / (LOBE_TAPS - 1),
            0,
        );
        self.fft.realfft(&mut tw);
        tw[1] = 0.0;

        let bins = LOBE_FFT / (LOBE_TAPS - 1);
        let mut mags = vec![0.0f32; bins + 1];
        cpxmag(&mut mags, &tw[..2 * (bins + 1)]);

        let mut u = vec![0.0f32; 2 * bins + 1];
        u[bins..].copy_from_slice(&mags);
        for i in 0..bins {
            u[i] = mags[bins - i];
        }
        let peak = u[bins];
        for x in &mut u {
            *x = peak / *x;
        }

        let mut c = [0.0f64; 9];
        chebyapprox(&mut c, &u);
        chebytops(&mut c);
        [
            (c[2] / c[0]) as f32,
            (c[4] / c[0]) as f32,
            (c[6] / c[0]) as f32,
            (c[8] / c[0]) as f32,
        ]
    }

    /// Transform one frame and compute the requested reassignments.
    ///
    /// On return `d` holds the packed half spectrum of the windowed frame
    /// with `d[1]` cleared. `freq[..size/2]` receives frequencies relative
    /// to the sample rate, `time[..size/2]` time offsets, `amp[..size/2]`
    /// peak amplitudes with `amp[0]` the DC term.
    ///
    /// Frequency reassignment sharpens peak selection: without it a peak is
    /// any local power maximum and its offset is estimated from a log
    /// parabola.
    ///
    /// # Panics
    ///
    /// Debug builds panic if `d` is not the frame length or an output is too
    /// short.
    pub fn analyse_spectrum(&mut self, d: &mut [f32], out: Reassignment<'_>) {
        let size = self.size;
        let hsize = size / 2;
        debug_assert_eq!(d.len(), size, "frame length mismatch");
        let Reassignment {
            mut freq,
            mut amp,
            mut time,
        } = out;

        if let Some(f) = freq.as_deref_mut() {
            debug_assert!(f.len() >= size, "freq needs the full frame length");
            f[..size].copy_from_slice(d);
        }
        if let Some(t) = time.as_deref_mut() {
            debug_assert!(t.len() >= size, "time needs the full frame length");
            t[..size].copy_from_slice(d);
        }
        vector::mul_vec(d, &self.window[..size]);
        self.fft.realfft(d);
        d[1] = 0.0;

        if freq.is_some() || time.is_some() {
            let temp = &mut self.temp[..size];
            temp.copy_from_slice(d);
            // 120 dB below the frame keeps near-zero bins from blowing up
            let lim = (1e-6 * cpxrms(temp)).max(2.0 * f32::MIN_POSITIVE.sqrt());
            cpxprune(temp, lim, lim);
            cpxinv(temp, InversePrecision::Fast);
        }

        if let Some(f) = freq.as_deref_mut() {
            let f = &mut f[..size];
            vector::mul_vec(f, &self.dwindow[..size]);
            self.fft.realfft(f);
            f[1] = 0.0;
            cpxmul_vec(f, &self.temp[..size]);
            for i in 0..hsize {
                f[i] = f[2 * i + 1];
            }
            let (delta, centers) = f.split_at_mut(hsize);
            vector::linear(centers, 0.0, 0.5 - 1.0 / size as f32);
            vector::add_vec(delta, centers);
        }

        if let Some(t) = time.as_deref_mut() {
            let t = &mut t[..size];
            vector::mul_vec(t, &self.rwindow[..size]);
            self.fft.realfft(t);
            t[1] = 0.0;
            cpxmul_vec(t, &self.temp[..size]);
            for i in 0..hsize {
                t[i] = t[2 * i];
            }
        }

        if let Some(a) = amp {
            let a = &mut a[..hsize];
            self.reassign_amplitudes(d, a, freq.as_deref());
        }
    }

    fn reassign_amplitudes(&self, d: &[f32], amp: &mut [f32], freq: Option<&[f32]>) {
        let hsize = amp.len();
        let scl = self.size as f32;
        let [a0, a1, a2, a3] = self.aic;
        let correction = |x2: f32| 1.0 + (a0 + (a1 + (a2 + a3 * x2) * x2) * x2) * x2;
        let power = |k: usize| d[2 * k] * d[2 * k] + d[2 * k + 1] * d[2 * k + 1];

        amp.fill(0.0);
        let mut i = 1;
        while i + 1 < hsize {
            let offset = match freq {
                Some(f) => {
                    let x = scl * (f[i] - f[i + hsize]);
                    if x.abs() >= 1.0 {
                        i += 1;
                        continue;
                    }
                    Some(x)
                }
                None => None,
            };
            let (pm1, p, pp1) = (power(i - 1), power(i), power(i + 1));
            if pm1 <= p && p > pp1 {
                let x = offset.unwrap_or_else(|| {
                    let (lm1, l0, lp1) = (
                        (pm1 + f32::MIN_POSITIVE).ln(),
                        (p + f32::MIN_POSITIVE).ln(),
                        (pp1 + f32::MIN_POSITIVE).ln(),
                    );
                    0.25 * (lp1 - lm1) / (l0 - 0.5 * (lp1 + lm1))
                });
                amp[i] = 2.0 * correction(x * x) * p.sqrt();
                // the next bin cannot be a peak
                i += 2;
            } else {
                i += 1;
            }
        }
        amp[0] = d[0];
        amp[hsize - 1] = 0.0;
    }
}
