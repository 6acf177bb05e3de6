//! Controlled amplifier with selectable control curve.

use crate::denormal::OffsetPairs;
use crate::effect::Effect;

/// Mapping from control value to gain.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AmpCurve {
    /// gain = a
    #[default]
    Linear,
    /// gain = a²
    Square,
    /// gain = a⁴
    Quartic,
}

impl AmpCurve {
    /// Smallest control value; the gain never reaches exact zero.
    fn floor(self) -> f32 {
        match self {
            Self::Linear => 1e-8,
            Self::Square => 1e-4,
            Self::Quartic => 1e-2,
        }
    }

    /// Control value under `to` that yields the same gain as `a` under `self`.
    fn convert(self, to: Self, a: f32) -> f32 {
        match (self, to) {
            (Self::Linear, Self::Square) | (Self::Square, Self::Quartic) => a.abs().sqrt(),
            (Self::Linear, Self::Quartic) => a.abs().sqrt().sqrt(),
            (Self::Square, Self::Linear) | (Self::Quartic, Self::Square) => a * a,
            (Self::Quartic, Self::Linear) => a * a * a * a,
            _ => a,
        }
    }
}

/// Amplifier whose control value glides linearly across each block.
///
/// Changing the curve keeps the current gain, so there is no jump.
#[derive(Debug, Clone)]
pub struct Amp {
    a: f32,
    amp: f32,
    current: AmpCurve,
    requested: AmpCurve,
    adn: OffsetPairs,
}

impl Default for Amp {
    fn default() -> Self {
        Self::new()
    }
}

impl Amp {
    /// Silent linear amplifier.
    pub fn new() -> Self {
        Self {
            a: 0.0,
            amp: 0.0,
            current: AmpCurve::Linear,
            requested: AmpCurve::Linear,
            adn: OffsetPairs::new(),
        }
    }

    /// Target control value in `0..=1`, reached at the end of the next block.
    pub fn set_amp(&mut self, amp: f32) {
        self.amp = amp;
    }

    /// Control curve used from the next block on.
    pub fn set_curve(&mut self, curve: AmpCurve) {
        self.requested = curve;
    }

    /// Active control curve.
    pub fn curve(&self) -> AmpCurve {
        self.current
    }

    /// Current gain.
    pub fn gain(&self) -> f32 {
        match self.current {
            AmpCurve::Linear => self.a,
            AmpCurve::Square => self.a * self.a,
            AmpCurve::Quartic => self.a * self.a * self.a * self.a,
        }
    }
}

impl Effect for Amp {
    fn process_in_place(&mut self, data: &mut [f32]) {
        if data.is_empty() {
            return;
        }
        if self.current != self.requested {
            self.a = self.current.convert(self.requested, self.a);
            self.current = self.requested;
        }
        let adn = self.adn.next_pair();
        let target = self.amp.clamp(self.current.floor(), 1.0);
        let da = (target - self.a) / data.len() as f32;
        let mut a = self.a;
        match self.current {
            AmpCurve::Linear => {
                for (i, x) in data.iter_mut().enumerate() {
                    a += da;
                    *x = a * *x + adn[i & 1];
                }
            }
            AmpCurve::Square => {
                for (i, x) in data.iter_mut().enumerate() {
                    a += da;
                    *x = a * a * *x + adn[i & 1];
                }
            }
            AmpCurve::Quartic => {
                for (i, x) in data.iter_mut().enumerate() {
                    a += da;
                    let g = a * a;
                    *x = g * g * *x + adn[i & 1];
                }
            }
        }
        self.a = a;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glides_to_target_within_block() {
        let mut amp = Amp::new();
        amp.set_amp(0.8);
        let mut data = [1.0f32; 100];
        amp.process_in_place(&mut data);
        assert!(data.windows(2).all(|w| w[1] > w[0]));
        assert!((data[99] - 0.8).abs() < 1e-5);
        assert!((data[0] - 0.008).abs() < 1e-5);
    }

    #[test]
    fn curve_change_keeps_gain() {
        let mut amp = Amp::new();
        amp.set_amp(0.5);
        let mut data = [1.0f32; 64];
        amp.process_in_place(&mut data);

        // the same gain of 0.5 expressed under each curve
        for (curve, control) in [
            (AmpCurve::Square, 0.707_106_8),
            (AmpCurve::Quartic, 0.840_896_4),
            (AmpCurve::Linear, 0.5),
        ] {
            amp.set_curve(curve);
            amp.set_amp(control);
            let mut data = [1.0f32; 64];
            amp.process_in_place(&mut data);
            assert_eq!(amp.curve(), curve);
            for x in data {
                assert!((x - 0.5).abs() < 1e-4, "{curve:?}: {x}");
            }
        }
    }

    #[test]
    fn quartic_never_fully_silent() {
        let mut amp = Amp::new();
        amp.set_curve(AmpCurve::Quartic);
        amp.set_amp(0.0);
        let mut data = [1.0f32; 16];
        amp.process_in_place(&mut data);
        assert!((amp.gain() - 1e-8).abs() < 1e-9);
    }
}
