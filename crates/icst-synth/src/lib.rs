//! ICST Synth - block-based synthesis primitives for the ICST DSP core
//!
//! Every generator and processor here renders whole blocks. Control values
//! are read once per block and glided across it, and all state needed for
//! sample-accurate continuation is kept inside the object, so a stream may
//! be cut into blocks of any size.
//!
//! # Oscillators
//!
//! Phase accumulator oscillators share one calling convention: a pitch
//! control in `0..=1` mapped exponentially onto the frequency range given
//! at construction, an `i32` phase modulation input per sample, and phase
//! resets posted through a lock-free [`PhaseMailbox`].
//!
//! - [`WaveOsc`] - band-limited multi-wavetable oscillator
//! - [`FmOsc`] - integer cosine oscillator with feedback, as carrier or modulator
//! - [`VaOsc`] - alias suppressed sawtooth and pulse
//! - [`RawSawOsc`] - naive sawtooth for modulation
//! - [`SampleOsc`] - sample playback with windowed sinc interpolation
//!
//! ```rust
//! use icst_synth::WaveOsc;
//!
//! // 1024 sample waves covering 44.1 Hz to 4.41 kHz at 44.1 kHz
//! let mut osc = WaveOsc::new(1024, 2, 4410.0, 44.1, 44100.0);
//! let mut spectrum = vec![0.0f32; 1022];
//! spectrum[0] = 1.0;
//! osc.load_table(&spectrum, 0);
//!
//! let mut out = vec![0.0f32; 64];
//! osc.update(&mut out, 0.5, 0.0, 0.0, &[0; 64]);
//! ```
//!
//! # Envelope
//!
//! [`Envelope`] walks a graph of segments with six shapes, driven by
//! [`EnvelopeEvent`]s:
//!
//! ```rust
//! use icst_synth::{Envelope, EnvelopeEvent, EnvelopeParam, EnvelopePreset};
//!
//! let mut env = Envelope::new(10000.0, 1.0, 4);
//! env.preset(EnvelopePreset::Adsr);
//! env.set_param(0, EnvelopeParam::Time(0.3));
//! env.set_param(1, EnvelopeParam::Level(0.5));
//! env.event(EnvelopeEvent::KeyDown);
//!
//! let mut out = [0.0f32; 256];
//! env.update(&mut out, 0.0, 0.0);
//! assert!(out[255] > 0.0);
//! ```
//!
//! # Effects
//!
//! Block processors implement [`Effect`]:
//!
//! - [`Amp`] - gain with linear, square or quartic control curve
//! - [`ChambFilter`] / [`MoogFilter`] - resonant filters
//! - [`Delay`] / [`VarDelay`] - static and modulated delay lines
//! - [`RingMod`] - ring modulator
//! - [`Noise`] - white and pink noise
//!
//! [`Lowpass1`], [`Highpass1`], [`Hilbert`] and [`AudioToPm`] have their own
//! update signatures.
//!
//! # Shared tables
//!
//! Lookup tables used by many instances are built by the first one and
//! released with the last, see [`SharedTable`]. The lock is only taken at
//! construction.

pub mod amp;
mod denormal;
pub mod delay;
pub mod effect;
pub mod envelope;
pub mod filter;
pub mod mailbox;
pub mod modulation;
pub mod noise;
pub mod oscillator;
pub mod shared;

pub use amp::{Amp, AmpCurve};
pub use delay::{Delay, DelayState, VarDelay};
pub use effect::Effect;
pub use envelope::{Envelope, EnvelopeEvent, EnvelopeParam, EnvelopePreset, SegmentShape};
pub use filter::{ChambFilter, ChambVariant, FilterMode, Highpass1, Lowpass1, MoogFilter};
pub use mailbox::PhaseMailbox;
pub use modulation::{AudioToPm, Hilbert, RingMod};
pub use noise::{Noise, NoiseKind};
pub use oscillator::{
    FmOsc, Mix, PlaybackStatus, RawSawMode, RawSawOsc, SAMPLE_GUARD, SampleOsc, VaOsc, VaShape,
    WaveOsc,
};
pub use shared::SharedTable;
