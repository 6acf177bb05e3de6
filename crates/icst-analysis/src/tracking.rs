//! McAulay-Quatieri partial tracking and sinusoidal resynthesis.

use std::f64::consts::PI;

/// Frame-to-frame partial tracker.
///
/// Feed it the reassigned frequencies and peak amplitudes of consecutive
/// frames. Each existing track continues with the unclaimed peak closest in
/// frequency within ±5%, unless the next higher track fits that peak
/// better; unclaimed peaks start new tracks. Tracks stay sorted: track `i`
/// always sits at a lower bin than track `i + 1`.
///
/// # Example
///
/// ```rust
/// use icst_analysis::tracking::PartialTracker;
///
/// let size = 16;
/// let mut freq = vec![0.0f32; size];
/// let mut amp = vec![0.0f32; size / 2];
/// freq[3] = 3.1 / 16.0;
/// amp[3] = 1.0;
///
/// let mut tracker = PartialTracker::new(size);
/// tracker.update(&freq, &amp);
/// assert_eq!(tracker.indices(), &[3]);
/// assert_eq!(tracker.links(), &[None]);
///
/// tracker.update(&freq, &amp);
/// assert_eq!(tracker.links(), &[Some(0)]);
/// ```
#[derive(Debug, Clone)]
pub struct PartialTracker {
    hsize: usize,
    tracks: usize,
    freqs: Vec<f32>,
    peaks: Vec<f32>,
    owner: Vec<Option<usize>>,
    trkidx: Vec<usize>,
    trklink: Vec<Option<usize>>,
}

impl PartialTracker {
    /// Tracker for spectra of `size` point frames, holding at most
    /// `size / 2` tracks.
    pub fn new(size: usize) -> Self {
        let hsize = size / 2;
        Self {
            hsize,
            tracks: 0,
            freqs: vec![0.0; hsize],
            peaks: vec![0.0; hsize],
            owner: vec![None; hsize],
            trkidx: vec![0; hsize],
            trklink: vec![None; hsize],
        }
    }

    /// Drop all tracks.
    pub fn reset(&mut self) {
        self.tracks = 0;
    }

    /// Number of live tracks.
    pub fn tracks(&self) -> usize {
        self.tracks
    }

    /// Bin of each track in the last frame: `freq[indices()[i]]` is the
    /// frequency of track `i`. Strictly increasing.
    pub fn indices(&self) -> &[usize] {
        &self.trkidx[..self.tracks]
    }

    /// Previous index of each track, `None` for tracks born this frame.
    pub fn links(&self) -> &[Option<usize>] {
        &self.trklink[..self.tracks]
    }

    /// Frequency of each track in the last frame.
    pub fn frequencies(&self) -> &[f32] {
        &self.freqs[..self.tracks]
    }

    /// Advance by one frame.
    ///
    /// `freq` and `amp` come from
    /// [`SpectralAnalyzer::analyse_spectrum`](crate::spectrum::SpectralAnalyzer::analyse_spectrum);
    /// bins with positive amplitude are peaks.
    ///
    /// # Panics
    ///
    /// Debug builds panic if `amp` holds fewer than `size / 2` bins.
    pub fn update(&mut self, freq: &[f32], amp: &[f32]) {
        let hsize = self.hsize;
        debug_assert!(amp.len() >= hsize && freq.len() >= hsize, "spectrum shorter than size / 2");
        if hsize == 0 {
            return;
        }
        let peaks = &mut self.peaks;
        peaks.copy_from_slice(&amp[..hsize]);
        self.owner.fill(None);
        let tracks = self.tracks.min(hsize);
        let top = hsize as isize - 1;

        for i in 0..tracks {
            let f = self.freqs[i];
            let next = if i + 1 < tracks { self.freqs[i + 1] } else { -1.0 };
            let fsize = 2.0 * f * hsize as f32;
            let lo = ((0.95 * fsize + 0.5) as isize).clamp(0, top) as usize;
            let hi = ((1.05 * fsize + 0.5) as isize).clamp(0, top) as usize;

            let (mut best, mut second) = (None, None);
            let mut diff = f32::MAX;
            for j in lo..=hi {
                if peaks[j] > 0.0 {
                    let d = (freq[j] - f).abs();
                    if d < diff {
                        diff = d;
                        second = best;
                        best = Some(j);
                    }
                }
            }

            // leave the closest peak to the next track if it fits that one better
            let claim = match best {
                Some(b) if (freq[b] - next).abs() >= diff => Some(b),
                Some(_) => second,
                None => None,
            };
            if let Some(k) = claim {
                peaks[k] = 0.0;
                self.owner[k] = Some(i);
            }
        }

        // continued tracks and new peaks in bin order
        let mut k = 0;
        for j in 0..hsize {
            if self.owner[j].is_some() || peaks[j] > 0.0 {
                self.trkidx[k] = j;
                self.trklink[k] = self.owner[j];
                k += 1;
            }
        }
        for (f, &j) in self.freqs.iter_mut().zip(&self.trkidx[..k]) {
            *f = freq[j];
        }
        self.tracks = k;
    }
}

// ============================================================================
// Resynthesis
// ============================================================================

/// Frequency (relative to the sample rate), amplitude and phase (radians,
/// wrapped or not) at one end of a synthesis segment.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Breakpoint {
    /// Frequency relative to the sample rate.
    pub freq: f32,
    /// Linear amplitude.
    pub amp: f32,
    /// Phase in radians.
    pub phase: f32,
}

/// Add a cosine that matches frequency and phase at both ends, using the
/// cubic phase interpolation of McAulay and Quatieri.
///
/// Amplitude moves linearly. The end point itself is not rendered, so
/// consecutive segments join seamlessly.
pub fn mqsyn_cubic(d: &mut [f32], start: Breakpoint, end: Breakpoint) {
    let len = d.len() as f32;
    if d.is_empty() {
        return;
    }
    let two_pi = 2.0 * std::f32::consts::PI;
    let invlen = 1.0 / len;

    // pick the phase unwrapping that makes the smoothest cubic
    let mut err = start.phase - end.phase + std::f32::consts::PI * (start.freq + end.freq) * len;
    let p = (err / two_pi + 0.5).floor();
    err = (two_pi * p - err) * invlen * invlen;
    let a2 = f64::from(std::f32::consts::PI * (end.freq - start.freq) * invlen + 3.0 * err);
    let a3 = f64::from(-2.0 * err * invlen);

    // third order difference recursion of the cubic phase
    let c0 = f64::from(start.phase);
    let c1 = 2.0 * PI * f64::from(start.freq) + a2 + a3;
    let c3 = 6.0 * a3;
    let c2 = 2.0 * a2 + c3;
    let (mut xr, mut xi) = (c0.cos(), c0.sin());
    let (mut yr, mut yi) = (c1.cos(), c1.sin());
    let (mut zr, mut zi) = (c2.cos(), c2.sin());
    let (ar, ai) = (c3.cos(), c3.sin());
    let mut amp = f64::from(start.amp);
    let ampinc = f64::from(invlen * (end.amp - start.amp));
    for x in d.iter_mut() {
        *x += (amp * xr) as f32;
        amp += ampinc;
        (xr, xi) = (xr * yr - xi * yi, xi * yr + xr * yi);
        (yr, yi) = (yr * zr - yi * zi, yi * zr + yr * zi);
        (zr, zi) = (zr * ar - zi * ai, zi * ar + zr * ai);
    }
}

/// Add a cosine whose frequency glides linearly between the ends, starting
/// at `start.phase`. `end.phase` is ignored.
///
/// Returns the phase at the end point, wrapped to `[-π, π)`, to start the
/// next segment with.
pub fn mqsyn_integrated(d: &mut [f32], start: Breakpoint, end: Breakpoint) -> f32 {
    let two_pi = 2.0 * std::f32::consts::PI;
    let len = d.len() as f32;
    if d.is_empty() {
        return start.phase;
    }
    let invlen = 1.0 / len;

    let c1 = 2.0 * PI * f64::from(start.freq);
    let c2 = 2.0 * PI * f64::from((end.freq - start.freq) * invlen);
    let ps = f64::from(start.phase);
    let (mut xr, mut xi) = (ps.cos(), ps.sin());
    let (mut yr, mut yi) = ((c1 + 0.5 * c2).cos(), (c1 + 0.5 * c2).sin());
    let (ar, ai) = (c2.cos(), c2.sin());
    let mut amp = f64::from(start.amp);
    let ampinc = f64::from(invlen * (end.amp - start.amp));
    for x in d.iter_mut() {
        *x += (amp * xr) as f32;
        amp += ampinc;
        (xr, xi) = (xr * yr - xi * yi, xi * yr + xr * yi);
        (yr, yi) = (yr * ar - yi * ai, yi * ar + yr * ai);
    }

    let mut t = 0.5 + start.phase / two_pi + 0.5 * (start.freq + end.freq) * len;
    t -= 0.5 + t.floor();
    two_pi * t
}
