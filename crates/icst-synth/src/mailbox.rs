//! Lock-free phase reset requests.
//!
//! A control thread posts a new oscillator phase; the audio thread applies
//! it at the start of its next block. Phase and request sequence share one
//! atomic word, so a reader never pairs a count with another post's phase.

use icst_core::fast_math::fdtoi_f64;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

/// Single-slot mailbox carrying a phase in accumulator units.
///
/// Multiple posts between two blocks coalesce to the most recent phase.
///
/// # Example
///
/// ```rust
/// use icst_synth::PhaseMailbox;
///
/// let mailbox = PhaseMailbox::new();
/// assert_eq!(mailbox.take(), None);
///
/// mailbox.set_phase(0.5);
/// assert_eq!(mailbox.take(), Some(i32::MIN));
/// assert_eq!(mailbox.take(), None);
/// ```
#[derive(Debug, Default)]
pub struct PhaseMailbox {
    // request sequence in the high half, phase in the low half
    slot: AtomicU64,
    consumed: AtomicU32,
}

impl PhaseMailbox {
    /// Empty mailbox.
    pub const fn new() -> Self {
        Self {
            slot: AtomicU64::new(0),
            consumed: AtomicU32::new(0),
        }
    }

    /// Request a phase of `phase` periods, clamped to `0..=1`.
    pub fn set_phase(&self, phase: f32) {
        let phase = f64::from(phase.clamp(0.0, 1.0));
        let phi = fdtoi_f64(1_073_741_824.0 * phase).wrapping_shl(2);
        let _ = self
            .slot
            .fetch_update(Ordering::Release, Ordering::Relaxed, |word| {
                let seq = (word >> 32) as u32;
                Some(pack(seq.wrapping_add(1), phi))
            });
    }

    /// The pending phase, if one was posted since the last call.
    ///
    /// Only the rendering thread calls this.
    pub fn take(&self) -> Option<i32> {
        let word = self.slot.load(Ordering::Acquire);
        let seq = (word >> 32) as u32;
        if seq == self.consumed.load(Ordering::Relaxed) {
            return None;
        }
        self.consumed.store(seq, Ordering::Relaxed);
        Some(word as u32 as i32)
    }
}

#[inline]
fn pack(seq: u32, phi: i32) -> u64 {
    (u64::from(seq) << 32) | u64::from(phi as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn phase_maps_to_accumulator_range() {
        let mailbox = PhaseMailbox::new();
        mailbox.set_phase(0.25);
        assert_eq!(mailbox.take(), Some(1 << 30));
        mailbox.set_phase(-3.0);
        assert_eq!(mailbox.take(), Some(0));
        // a full period wraps back to zero
        mailbox.set_phase(1.0);
        assert_eq!(mailbox.take(), Some(0));
    }

    #[test]
    fn posts_coalesce_to_latest() {
        let mailbox = PhaseMailbox::new();
        mailbox.set_phase(0.1);
        mailbox.set_phase(0.75);
        assert_eq!(mailbox.take(), Some(-(1 << 30)));
        assert_eq!(mailbox.take(), None);
    }

    #[test]
    fn concurrent_posts_are_taken_at_most_once() {
        // phases k/1024 rise with k, so a post applied twice would show up
        // as a repeated or falling value
        let mailbox = Arc::new(PhaseMailbox::new());
        let writer = Arc::clone(&mailbox);
        let handle = std::thread::spawn(move || {
            for k in 1..1024 {
                writer.set_phase(k as f32 / 1024.0);
            }
        });
        let mut taken = Vec::new();
        while !handle.is_finished() {
            taken.extend(mailbox.take());
        }
        handle.join().unwrap();
        taken.extend(mailbox.take());

        assert_eq!(taken.last().copied(), Some((1023u32 << 22) as i32));
        for w in taken.windows(2) {
            assert!((w[0] as u32) < (w[1] as u32), "{} then {}", w[0], w[1]);
        }
        assert_eq!(mailbox.take(), None);
    }

    #[test]
    fn reader_sees_phase_posted_from_another_thread() {
        let mailbox = Arc::new(PhaseMailbox::new());
        let writer = Arc::clone(&mailbox);
        std::thread::spawn(move || writer.set_phase(0.5))
            .join()
            .unwrap();
        assert_eq!(mailbox.take(), Some(i32::MIN));
    }
}
