//! Unbiased in-place shuffling

use rand::Rng;

/// Fisher-Yates shuffle. Walks from the back of the slice, swapping each
/// position with a uniformly chosen index at or before it, so every
/// permutation is equally likely. O(n), no allocation.
pub fn shuffle<T, R: Rng + ?Sized>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = rng.random_range(0..=i);
        items.swap(i, j);
    }
}
