//! Segmented envelope generator.
//!
//! The envelope is a state machine over a user defined graph of segments.
//! Each segment moves from the current output to its end level along one of
//! six shapes and then jumps to its successor. A reserved idle segment ends
//! every path. Key events jump to segment 0, to the release segment or to
//! idle.
//!
//! Shapes are evaluated with a few multiply-adds per sample, and a segment
//! that ends inside a block hands over to its successor at that sample.

use icst_core::fast_math::{fdtoi, qdexp};
use libm::{logf, sqrtf};

/// Sample count of segments that never end by themselves.
const ENDLESS: usize = usize::MAX;

/// Curve followed by a segment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SegmentShape {
    /// Slow start, fast finish (quadratic).
    Concave,
    /// Fast start, slow finish (quadratic).
    Convex,
    /// Quadratic rise with a steeper start, like an analog attack.
    ClassicAttack,
    /// Straight line.
    Linear,
    /// S-curve (cubic).
    Sigmoid,
    /// Exponential approach that never ends on its own. With a zero end
    /// level it decays for twelve time constants and then hands over.
    #[default]
    InfiniteExp,
}

/// Envelope events.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnvelopeEvent {
    /// Start at segment 0.
    KeyDown,
    /// Jump to the release segment.
    KeyUp,
    /// Jump to the idle segment.
    Idle,
}

/// Envelope parameters, each carrying its value.
///
/// Parameters addressing a segment are ignored for indices outside the
/// user segments. `LevelMod` and `ReleaseSegment` apply to the whole
/// envelope.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EnvelopeParam {
    /// Normalized segment time in `0..=1`, exponential between the minimum
    /// and maximum time.
    Time(f32),
    /// Intensity of the time modulation input, `-1..=1`.
    TimeMod(f32),
    /// End level in `-1..=1`.
    Level(f32),
    /// Intensity of the level modulation input, `0..=1`.
    LevelMod(f32),
    /// Segment shape.
    Shape(SegmentShape),
    /// Successor segment. Resets the envelope to idle.
    Next(usize),
    /// Segment entered on key up. Resets the envelope to idle.
    ReleaseSegment(usize),
}

/// Segment graphs provided by [`Envelope::preset`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnvelopePreset {
    /// Attack (0), decay to sustain (1), release (2).
    ///
    /// The sustain level is the level of segment 1.
    Adsr,
    /// Attack (0), linear breakpoint (1), decay to sustain (2), release (3).
    Abdsr,
}

#[derive(Clone, Copy, Debug)]
struct Segment {
    shape: SegmentShape,
    next: usize,
    end_level: f32,
    time: f32,
    time_mod: f32,
}

/// Segmented envelope generator.
///
/// # Example
///
/// ```rust
/// use icst_synth::{Envelope, EnvelopeEvent, EnvelopeParam, EnvelopePreset};
///
/// let mut env = Envelope::new(48000.0, 10.0, 4);
/// env.preset(EnvelopePreset::Adsr);
/// env.set_param(0, EnvelopeParam::Time(0.3));
/// env.set_param(1, EnvelopeParam::Level(0.6));
///
/// env.event(EnvelopeEvent::KeyDown);
/// let mut out = [0.0f32; 4096];
/// env.update(&mut out, 0.0, 1.0);
/// assert!((out[4095] - 0.6).abs() < 1e-3);
///
/// env.event(EnvelopeEvent::KeyUp);
/// env.update(&mut out, 0.0, 1.0);
/// assert!(out[4095] < 0.01);
/// ```
#[derive(Debug, Clone)]
pub struct Envelope {
    segments: Vec<Segment>,
    idle: usize,
    release: usize,
    level_mod: f32,
    tscl1: f32,
    tscl2: f32,
    pending: Option<EnvelopeEvent>,
    // running segment
    current: usize,
    count: usize,
    out: f32,
    x: f32,
    dx: f32,
    a: f32,
    b: f32,
    c: f32,
}

impl Envelope {
    /// Envelope with `segments` user segments (at least 4) whose times span
    /// `tmin..=tmax` update periods, both clamped to `1..=500000`.
    ///
    /// All segments start as [`SegmentShape::InfiniteExp`] to level 0 with
    /// idle as successor.
    pub fn new(tmax: f32, tmin: f32, segments: usize) -> Self {
        let idle = segments.max(4);
        let tmin = tmin.clamp(1.0, 500_000.0);
        let tmax = tmax.clamp(1.0, 500_000.0);
        let segment = Segment {
            shape: SegmentShape::InfiniteExp,
            next: idle,
            end_level: 0.0,
            time: 0.0,
            time_mod: 0.0,
        };
        Self {
            segments: vec![segment; idle + 1],
            idle,
            release: idle,
            level_mod: 0.0,
            tscl1: sqrtf(tmin),
            tscl2: 0.5 * logf(tmax / tmin),
            pending: None,
            current: idle,
            count: ENDLESS,
            out: 0.0,
            x: 0.0,
            dx: 0.0,
            a: 0.0,
            b: 1.0,
            c: 0.0,
        }
    }

    /// Index of the idle segment, one past the last user segment.
    pub fn idle_segment(&self) -> usize {
        self.idle
    }

    /// Segment currently running.
    pub fn current_segment(&self) -> usize {
        self.current
    }

    /// Whether the envelope sits in the idle segment.
    pub fn is_idle(&self) -> bool {
        self.current == self.idle
    }

    /// Last value written by [`update`](Self::update).
    pub fn output(&self) -> f32 {
        self.out
    }

    /// Queue `event`; it takes effect at the start of the next update.
    ///
    /// Events posted between two updates coalesce to the last one.
    pub fn event(&mut self, event: EnvelopeEvent) {
        self.pending = Some(event);
    }

    /// Set a parameter of `segment`, or of the envelope for the global
    /// parameters. Values are clamped to their ranges.
    pub fn set_param(&mut self, segment: usize, param: EnvelopeParam) {
        let user = segment < self.idle;
        match param {
            EnvelopeParam::Time(t) if user => self.segments[segment].time = t.clamp(0.0, 1.0),
            EnvelopeParam::TimeMod(m) if user => {
                self.segments[segment].time_mod = m.clamp(-1.0, 1.0);
            }
            EnvelopeParam::Level(l) if user => {
                self.segments[segment].end_level = l.clamp(-1.0, 1.0);
            }
            EnvelopeParam::Shape(s) if user => self.segments[segment].shape = s,
            EnvelopeParam::Next(n) if user => {
                self.segments[segment].next = n.min(self.idle);
                self.event(EnvelopeEvent::Idle);
            }
            EnvelopeParam::LevelMod(m) => self.level_mod = m.clamp(0.0, 1.0),
            EnvelopeParam::ReleaseSegment(r) => {
                self.release = r.min(self.idle);
                self.event(EnvelopeEvent::Idle);
            }
            _ => {}
        }
    }

    /// Install a preset segment graph. Times and the levels not named by the
    /// preset keep their values.
    pub fn preset(&mut self, preset: EnvelopePreset) {
        use EnvelopeParam::{Level, Next, ReleaseSegment, Shape};
        use SegmentShape::{ClassicAttack, InfiniteExp, Linear};
        match preset {
            EnvelopePreset::Adsr => {
                self.set_param(0, Next(1));
                self.set_param(0, Shape(ClassicAttack));
                self.set_param(0, Level(1.0));
                self.set_param(1, Next(2));
                self.set_param(1, Shape(InfiniteExp));
                self.set_param(0, ReleaseSegment(2));
                self.set_param(2, Next(2));
                self.set_param(2, Shape(InfiniteExp));
                self.set_param(2, Level(0.0));
            }
            EnvelopePreset::Abdsr => {
                self.set_param(0, Next(1));
                self.set_param(0, Shape(ClassicAttack));
                self.set_param(1, Next(2));
                self.set_param(1, Shape(Linear));
                self.set_param(2, Next(3));
                self.set_param(2, Shape(InfiniteExp));
                self.set_param(0, ReleaseSegment(3));
                self.set_param(3, Next(3));
                self.set_param(3, Shape(InfiniteExp));
            }
        }
        tracing::debug!(?preset, "envelope preset installed");
    }

    /// Render `out.len()` envelope values.
    ///
    /// `tmod` scales segment times and `lmod` (`0..=1`) scales end levels,
    /// both weighted by the per-segment and global intensities. They are
    /// sampled whenever a segment starts.
    pub fn update(&mut self, out: &mut [f32], tmod: f32, lmod: f32) {
        if let Some(event) = self.pending.take() {
            let target = match event {
                EnvelopeEvent::KeyDown => 0,
                EnvelopeEvent::KeyUp => self.release,
                EnvelopeEvent::Idle => self.idle,
            };
            self.enter(target, self.out, tmod, lmod);
        }

        let mut rest = out;
        while !rest.is_empty() {
            let pts = self.count.min(rest.len());
            let (head, tail) = rest.split_at_mut(pts);
            self.render(head);
            self.out = head[pts - 1];
            rest = tail;
            if self.count != ENDLESS {
                self.count -= pts;
                if self.count == 0 {
                    let next = self.segments[self.current].next;
                    self.enter(next, self.out, tmod, lmod);
                }
            }
        }
    }

    fn render(&mut self, out: &mut [f32]) {
        let (a, b, c, dx) = (self.a, self.b, self.c, self.dx);
        let mut x = self.x;
        match self.segments[self.current].shape {
            SegmentShape::Concave => {
                for y in out.iter_mut() {
                    x += dx;
                    *y = a + b * x * x;
                }
            }
            SegmentShape::Convex | SegmentShape::ClassicAttack => {
                for y in out.iter_mut() {
                    x += dx;
                    *y = a + (b + c * x) * x;
                }
            }
            SegmentShape::Linear => {
                for y in out.iter_mut() {
                    x += dx;
                    *y = x;
                }
            }
            SegmentShape::Sigmoid => {
                for y in out.iter_mut() {
                    x += dx;
                    *y = a + ((b + c * x) * x) * x;
                }
            }
            SegmentShape::InfiniteExp => {
                for y in out.iter_mut() {
                    x = a + b * x;
                    *y = x;
                }
            }
        }
        self.x = x;
    }

    /// Start `segment` from `start`.
    fn enter(&mut self, segment: usize, start: f32, tmod: f32, lmod: f32) {
        self.current = segment;
        let seg = self.segments[segment];
        let t = (seg.time + tmod * seg.time_mod).clamp(0.0, 1.0);
        let t = self.tscl1 * qdexp(self.tscl2 * t);
        let count = fdtoi(t * t).max(1) as usize;
        self.count = count;
        let end = seg.end_level * (1.0 - self.level_mod * (1.0 - lmod.clamp(0.0, 1.0)));
        let inv = 1.0 / count as f32;

        match seg.shape {
            SegmentShape::Concave => {
                self.a = start;
                self.b = end - start;
                self.x = 0.0;
                self.dx = inv;
            }
            SegmentShape::Convex => {
                self.a = start;
                self.c = start - end;
                self.b = -2.0 * self.c;
                self.x = 0.0;
                self.dx = inv;
            }
            SegmentShape::ClassicAttack => {
                self.a = start;
                self.c = 0.666_666_7 * (start - end);
                self.b = -2.5 * self.c;
                self.x = 0.0;
                self.dx = inv;
            }
            SegmentShape::Linear => {
                self.x = start;
                self.dx = (end - start) * inv;
            }
            SegmentShape::Sigmoid => {
                self.a = start;
                self.c = 2.0 * (start - end);
                self.b = -1.5 * self.c;
                self.x = 0.0;
                self.dx = inv;
            }
            SegmentShape::InfiniteExp => {
                self.b = 1.0 - inv;
                if end.abs() > 1e-5 {
                    self.a = inv * end;
                    self.count = ENDLESS;
                    self.x = start;
                } else if start.abs() > 1e-5 {
                    self.a = 0.0;
                    self.count = count.saturating_mul(12);
                    self.x = start;
                } else {
                    self.a = 0.0;
                    self.count = ENDLESS;
                    self.x = 0.0;
                }
            }
        }
    }
}
