//! Tiny offsets mixed into recursive paths to keep them out of the
//! subnormal range.

use crate::noise::{Noise, NoiseKind};
use crate::shared::SharedTable;
use icst_core::ANTI_DENORMAL;
use icst_core::vector::{NoiseGen, abs, add, cpxconj, mul};
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

static SEED: AtomicU32 = AtomicU32::new(0x2545_f491);

/// Sixteen small offsets, consumed one pair per block.
///
/// Even entries lie in `[1, 1.5]·ANTI_DENORMAL`, odd entries in
/// `[-0.4, 0.1]·ANTI_DENORMAL`.
#[derive(Debug, Clone)]
pub(crate) struct OffsetPairs {
    table: [f32; 16],
    idx: usize,
}

impl OffsetPairs {
    pub(crate) fn new() -> Self {
        let seed = SEED.fetch_add(0x9e37_79b9, Ordering::Relaxed);
        let mut table = [0.0f32; 16];
        NoiseGen::new(seed).unoise(&mut table);
        abs(&mut table);
        add(&mut table, 0.9);
        cpxconj(&mut table);
        add(&mut table, 1.1);
        mul(&mut table, 0.5 * ANTI_DENORMAL);
        Self { table, idx: 0 }
    }

    /// Offsets for even and odd sample indices of the next block.
    #[inline]
    pub(crate) fn next_pair(&mut self) -> [f32; 2] {
        let pair = [self.table[self.idx], self.table[self.idx + 1]];
        self.idx = (self.idx + 2) & 0xe;
        pair
    }
}

pub(crate) const PINK_LEN: usize = 4096;
const PINK_MASK: usize = PINK_LEN - 1;

static PINK: SharedTable<Vec<f32>> = SharedTable::new();
static PINK_USERS: AtomicUsize = AtomicUsize::new(0);

/// Reader over the shared pink-noise offset table used by the resonant
/// filters. Each reader starts at a different position.
#[derive(Debug, Clone)]
pub(crate) struct PinkOffsets {
    table: Arc<Vec<f32>>,
    idx: usize,
}

impl PinkOffsets {
    pub(crate) fn new() -> Self {
        let table = PINK.acquire(|| {
            tracing::debug!(len = PINK_LEN, "building pink anti-denormal table");
            let mut t = vec![0.0f32; PINK_LEN];
            Noise::with_kind(NoiseKind::Pink).render(&mut t);
            mul(&mut t, 3.0 * ANTI_DENORMAL);
            t
        });
        let n = PINK_USERS.fetch_add(1, Ordering::Relaxed);
        Self {
            table,
            idx: n.wrapping_mul(2531) & PINK_MASK,
        }
    }

    #[inline]
    pub(crate) fn next(&mut self) -> f32 {
        let x = self.table[self.idx];
        self.idx = (self.idx + 1) & PINK_MASK;
        x
    }
}
