//! Shuffling and sampling over ordered sequences
//!
//! Both functions leave their input untouched and are fully determined by the
//! RNG they are handed, so a seeded `Pcg32` reproduces a deal exactly.

use rand::Rng;

use crate::error::{GameError, Result};

/// Return a uniformly random permutation of `items` (Fisher-Yates on a copy)
pub fn shuffle<T: Clone, R: Rng + ?Sized>(items: &[T], rng: &mut R) -> Vec<T> {
    let mut out = items.to_vec();
    for i in (1..out.len()).rev() {
        let j = rng.random_range(0..=i);
        out.swap(i, j);
    }
    out
}

/// Draw `k` elements from distinct positions of `items`, without replacement
pub fn pick_random<T: Clone, R: Rng + ?Sized>(items: &[T], k: usize, rng: &mut R) -> Result<Vec<T>> {
    if k > items.len() {
        return Err(GameError::InvalidArgument {
            requested: k,
            available: items.len(),
        });
    }

    let mut pool = items.to_vec();
    let mut picks = Vec::with_capacity(k);
    for _ in 0..k {
        let idx = rng.random_range(0..pool.len());
        // Order of the leftover pool does not matter
        picks.push(pool.swap_remove(idx));
    }
    Ok(picks)
}
