//! Greedy decomposition onto a dictionary of unit-norm atoms.

use icst_core::vector::{dotp, farthesti, mac};

/// Matching pursuit: approximate `data` as `Σ weight[i]·atom(idx[i])`.
///
/// `dict` holds the atoms back to back, each `data.len()` samples long and
/// of unit L2 norm. Runs exactly `weight.len()` iterations; each picks the
/// atom with the largest absolute correlation and subtracts its projection,
/// so `data` ends up holding the residual. The residual energy never grows.
///
/// Allocates one correlation per atom.
///
/// # Panics
///
/// Debug builds panic if `idx` and `weight` differ in length or `dict` is
/// not a whole number of atoms.
pub fn matching_pursuit(weight: &mut [f32], idx: &mut [usize], dict: &[f32], data: &mut [f32]) {
    let size = data.len();
    debug_assert_eq!(weight.len(), idx.len());
    debug_assert!(size > 0 && dict.len() % size == 0, "dictionary is not a whole number of atoms");
    let mut m = vec![0.0f32; dict.len() / size];

    for (w, i) in weight.iter_mut().zip(idx.iter_mut()) {
        for (mj, atom) in m.iter_mut().zip(dict.chunks_exact(size)) {
            *mj = dotp(atom, data);
        }
        let best = farthesti(&m, 0.0);
        *i = best;
        *w = m[best];
        mac(data, &dict[best * size..(best + 1) * size], -*w);
    }
}
