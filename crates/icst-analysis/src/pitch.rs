//! Fundamental frequency from the normalized autocorrelation, and checks of
//! a fundamental against a reassigned spectrum.

use icst_core::math::nexthipow2;
use icst_core::special::paraext;
use icst_core::vector::maxi;
use serde::{Deserialize, Serialize};

use crate::transform::{FftBackend, FftProcessor, RustFftBackend};

// empirical: more than 50% correlation counts as periodic
const CORRELATION_LIMIT: f32 = 0.5;
const BIAS_SLOPE: f32 = 0.1;
// YIN stops looking beyond 20% past a dip below this
const YIN_THRESHOLD: f32 = 0.1;
// a key maximum this close to the best one is taken as the period
const KEY_MAXIMUM_RATIO: f32 = 0.9;

/// How lags of the autocorrelation are normalized before picking the
/// period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Normalization {
    /// McLeod/Wyvill, `2r / (e1 + e2)`. Suited to musical signals.
    #[default]
    McLeod,
    /// Cauchy-Schwarz bound, `r² / (e1·e2)`.
    CauchySchwarz,
    /// Cauchy-Schwarz with a bias towards short lags once a strongly
    /// correlated lag has been seen.
    BiasedCauchySchwarz,
    /// Cumulative mean normalized difference function (YIN). Suited to
    /// speech.
    Yin,
}

/// Autocorrelation pitch detector with preallocated buffers.
///
/// # Example
///
/// ```rust
/// use icst_analysis::pitch::{Normalization, PitchDetector};
///
/// let size = 1024;
/// let x: Vec<f32> = (0..size)
///     .map(|i| (2.0 * std::f32::consts::PI * i as f32 / 64.0).sin())
///     .collect();
/// let mut detector = PitchDetector::new(size);
/// let (f, tonality) = detector.detect(&x, Normalization::Yin);
/// assert!((f - 1.0 / 64.0).abs() < 1e-3);
/// assert!(tonality > 0.9);
/// ```
pub struct PitchDetector<B: FftBackend = RustFftBackend> {
    fft: FftProcessor<B>,
    size: usize,
    r: Vec<f32>,
    n1: Vec<f32>,
    n2: Vec<f32>,
}

impl PitchDetector {
    /// Detector for frames of `size` samples.
    pub fn new(size: usize) -> Self {
        Self::with_processor(FftProcessor::new(), size)
    }
}

impl<B: FftBackend> PitchDetector<B> {
    /// Detector running on the given transform processor.
    pub fn with_processor(fft: FftProcessor<B>, size: usize) -> Self {
        let mut detector = Self {
            fft,
            size: 0,
            r: Vec::new(),
            n1: Vec::new(),
            n2: Vec::new(),
        };
        detector.prepare(size);
        detector
    }

    /// Resize the scratch buffers for frames of `size` samples and warm up
    /// the transform. Allocates.
    ///
    /// # Panics
    ///
    /// Debug builds panic if `size < 4`.
    pub fn prepare(&mut self, size: usize) {
        debug_assert!(size >= 4, "pitch frames need at least 4 samples");
        let tsize = nexthipow2(2 * size);
        let hsize = size / 2;
        self.size = size;
        self.r.clear();
        self.r.resize(tsize, 0.0);
        // two extra lags for the interpolation around the last candidate
        self.n1.clear();
        self.n1.resize(hsize + 2, 0.0);
        self.n2.clear();
        self.n2.resize(hsize + 2, 0.0);
        self.fft.fast_auto_correlation(&mut self.r, size);
        tracing::debug!(size, tsize, "prepared pitch detector");
    }

    /// Frame length the buffers are sized for.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Fundamental frequency relative to the sample rate and a tonality
    /// measure from 0 (noise) to 1 (perfectly periodic).
    ///
    /// Lags up to half the frame are searched, so the lowest detectable
    /// frequency is `2 / size`. The tonality estimate stays meaningful when
    /// the frequency is an octave off. A silent frame returns `(0, 0)`.
    ///
    /// # Panics
    ///
    /// Debug builds panic if `d.len()` differs from the prepared size.
    pub fn detect(&mut self, d: &[f32], scheme: Normalization) -> (f32, f32) {
        let size = d.len();
        debug_assert_eq!(size, self.size, "frame length differs from prepared size");
        let mut hsize = size / 2;

        let energy: f64 = d.iter().map(|&x| f64::from(x) * f64::from(x)).sum();
        if energy < f64::from(f32::MIN_POSITIVE) {
            return (0.0, 0.0);
        }

        let r = &mut self.r;
        r[..size].copy_from_slice(d);
        self.fft.fast_auto_correlation(r, size);

        // energies of the overlapping parts at each lag
        let (n1, n2) = (&mut self.n1, &mut self.n2);
        let (mut ns1, mut ns2) = (energy, energy);
        for i in 0..n1.len() {
            n1[i] = ns1.max(0.0) as f32;
            n2[i] = ns2.max(0.0) as f32;
            ns1 -= f64::from(d[size - 1 - i]) * f64::from(d[size - 1 - i]);
            ns2 -= f64::from(d[i]) * f64::from(d[i]);
        }

        // skip to the first point of complete decorrelation
        let mut imax = 1;
        if scheme != Normalization::Yin {
            while imax < hsize && r[imax] >= 0.0 {
                imax += 1;
            }
        }
        // compare rmax/nmax candidates by cross-multiplying
        let (mut rmax, mut nmax) = (0.0f32, 1.0f32);
        let mut i = imax;

        match scheme {
            Normalization::McLeod | Normalization::CauchySchwarz => {
                let (r, n1, n2) = (&r[..], &n1[..], &n2[..]);
                let score = |k: usize| {
                    let t = refined(r, k);
                    let (t, n) = if scheme == Normalization::McLeod {
                        (2.0 * t, n1[k] + n2[k])
                    } else {
                        (t * t, n1[k] * n2[k])
                    };
                    if n >= f32::MIN_POSITIVE { t / n } else { 0.0 }
                };
                // every multiple of the period scores close to the
                // fundamental, so take the first key maximum near the best
                let mut best = 0.0f32;
                let mut k = i;
                while k < hsize {
                    if is_peak(r, k) {
                        best = best.max(score(k));
                        k += 2;
                    } else {
                        k += 1;
                    }
                }
                let threshold = KEY_MAXIMUM_RATIO * best;
                while i < hsize {
                    if is_peak(r, i) {
                        if score(i) >= threshold {
                            imax = i;
                            break;
                        }
                        i += 2;
                    } else {
                        i += 1;
                    }
                }
            }
            Normalization::BiasedCauchySchwarz => {
                let sclim = CORRELATION_LIMIT * CORRELATION_LIMIT;
                while i < hsize {
                    if is_peak(r, i) {
                        let t = refined(r, i);
                        let (t, n) = (t * t, n1[i] * n2[i]);
                        i += 2;
                        if rmax * n < t * nmax {
                            (imax, rmax, nmax) = (i - 2, t, n);
                            if t > n * sclim {
                                break;
                            }
                        }
                    } else {
                        i += 1;
                    }
                }
                // longer lags must beat the first strong one by a growing margin
                let mut bias = 1.0f32;
                let bdec = BIAS_SLOPE / imax as f32;
                hsize = hsize.min(i + ((1.0 - CORRELATION_LIMIT) * bias / bdec) as usize);
                while i < hsize {
                    if is_peak(r, i) {
                        bias -= bdec;
                        let t = refined(r, i) * bias;
                        let (t, n) = (t * t, n1[i] * n2[i]);
                        if rmax * n < t * nmax {
                            (imax, rmax, nmax) = (i, t, n);
                        }
                        i += 2;
                    } else {
                        i += 1;
                    }
                }
            }
            Normalization::Yin => {
                // difference function, weighted against long lags, into r;
                // its cumulative mean normalized form into n1
                let (mut yin, mut n, mut bias) = (0.0f32, 1.0f32, 0.0f32);
                let bdec = 1.0 / hsize as f32;
                for j in 1..hsize {
                    bias += bdec;
                    let w = 1.0 + (0.5528 + (0.4624 * bias - 0.0152) * bias) * bias;
                    r[j] = w * (n1[j] + n2[j] - 2.0 * r[j]);
                    yin += r[j];
                    n1[j] = n * r[j] / yin;
                    n += 1.0;
                }
                n1[0] = 1.0;
                hsize -= 1;
                while i < hsize {
                    if n1[i] < n1[i - 1] && n1[i] <= n1[i + 1] {
                        let t = refined(n1, i);
                        if nmax > t {
                            (imax, nmax) = (i, t);
                            if nmax < YIN_THRESHOLD {
                                hsize = hsize.min(1 + imax + imax / 5);
                            }
                        }
                        i += 2;
                    } else {
                        i += 1;
                    }
                }
            }
        }

        let (offset, tonality) = if scheme == Normalization::Yin {
            let (offset, _) = paraext(r[imax - 1], r[imax], r[imax + 1]);
            (offset, 1.0 - nmax)
        } else {
            let diff = |k: usize| n1[k] + n2[k] - 2.0 * r[k];
            let norm = n1[imax] + n2[imax];
            let (offset, value) = paraext(diff(imax - 1), diff(imax), diff(imax + 1));
            let tonality = if norm >= f32::MIN_POSITIVE {
                1.0 - value / norm
            } else {
                0.0
            };
            (offset, tonality)
        };
        (1.0 / (offset + imax as f32), tonality.clamp(0.0, 1.0))
    }
}

// extremum of the parabola through y[i-1..=i+1]
fn refined(y: &[f32], i: usize) -> f32 {
    let b = 0.25 * (y[i + 1] - y[i - 1]);
    y[i] - b * b / (0.5 * (y[i + 1] + y[i - 1]) - y[i])
}

fn is_peak(r: &[f32], i: usize) -> bool {
    r[i] > 0.0 && r[i] > r[i - 1] && r[i] >= r[i + 1]
}

// ============================================================================
// Spectral checks
// ============================================================================

// index of the largest amplitude within ±5% of bin position `fc`, clipped to
// the half spectrum; None once the window lies past the top
fn peak_near(amp: &[f32], fc: f32) -> Option<Option<usize>> {
    let hsize = amp.len();
    let lo = (0.95 * fc + 0.5) as isize;
    let hi = (1.05 * fc + 0.5) as isize;
    if lo <= 0 {
        return Some(None);
    }
    let lo = lo as usize;
    if lo >= hsize {
        return None;
    }
    let hi = (hi as usize).min(hsize - 1);
    Some(Some(lo + maxi(&amp[lo..=hi])))
}

/// Check a fundamental against a reassigned amplitude spectrum and correct
/// octave and fifth errors.
///
/// `amp` is the half spectrum of a `size` point frame, `fo` the candidate
/// relative to the sample rate. Peaks are collected at multiples of
/// `fo / 2` and compared: if the half-multiples carry energy the true
/// fundamental is an octave lower; if the even or every third harmonic
/// dominate it is an octave or a twelfth higher. Returns the index into
/// `amp` of the verified fundamental.
pub fn verify_fundamental(amp: &[f32], size: usize, fo: f32) -> usize {
    let hsize = amp.len().min(size / 2);
    let amp = &amp[..hsize];
    let mut idx = [0usize; 12];
    let mut a = [0.0f32; 12];

    let finc = 0.5 * fo * size as f32;
    let mut fc = finc;
    for i in 0..12 {
        match peak_near(amp, fc) {
            Some(Some(k)) => {
                idx[i] = k;
                a[i] = amp[k];
            }
            Some(None) => {}
            None => {
                idx[i..].fill(hsize - 1);
                break;
            }
        }
        fc += finc;
    }

    let orig = a[1] + a[3] + a[5] + a[7] + a[9] + a[11];
    let octdown = orig + a[0] + a[2] + a[4];
    let octup = a[3] + a[7] + a[11];
    let thirdup = a[5] + a[11];
    let pick = if octdown > 1.1 * orig {
        0
    } else if octup > 0.9 * orig {
        3
    } else if thirdup > 0.9 * orig {
        5
    } else {
        1
    };
    idx[pick]
}

/// Locate `idx.len()` harmonics of `fo` in a reassigned spectrum and
/// estimate the inharmonicity `B` of `f_n = n·fo·(1 + B·(n² - 1))`.
///
/// `amp` and `freq` are the outputs of
/// [`SpectralAnalyzer::analyse_spectrum`](crate::spectrum::SpectralAnalyzer::analyse_spectrum)
/// for a `size` point frame. `idx[n - 1]` receives the bin of harmonic `n`;
/// harmonics above the spectrum get the top bin. From the sixth harmonic on
/// the search window follows the running estimate of `B`.
pub fn harmonics(idx: &mut [usize], amp: &[f32], freq: &[f32], size: usize, fo: f32) -> f32 {
    let hsize = amp.len().min(size / 2);
    let amp = &amp[..hsize];
    let fidx = fo * size as f32;
    let (mut ih, mut s0, mut s1) = (0.0f32, 0.0f32, 0.0f32);

    for i in 0..idx.len() {
        let n = (i + 1) as f32;
        let spread = n * n - 1.0;
        let fc = n * fidx * (1.0 + ih * spread);
        let weight = match peak_near(amp, fc) {
            Some(Some(k)) => {
                idx[i] = k;
                spread * amp[k]
            }
            Some(None) => {
                idx[i] = 0;
                0.0
            }
            None => {
                idx[i..].fill(hsize - 1);
                break;
            }
        };
        s0 += weight * (freq[idx[i]] / n - fo);
        s1 += fo * weight * spread;
        if i >= 5 && s1 >= f32::MIN_POSITIVE {
            ih = s0 / s1;
        }
    }
    if ih == 0.0 && s1 >= f32::MIN_POSITIVE {
        ih = s0 / s1;
    }
    ih
}
