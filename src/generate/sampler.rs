use rand::Rng;

use crate::config::model::Item;

/// Anything carrying a non-negative selection weight.
pub trait Weighted {
    /// Relative selection weight.
    fn weight(&self) -> u32;
}

impl Weighted for Item {
    fn weight(&self) -> u32 {
        self.weight
    }
}

impl Weighted for u32 {
    fn weight(&self) -> u32 {
        *self
    }
}

/// Pick one entry with probability `weight / sum(weights)`.
///
/// Draws `r` uniformly from `[0, total)` and returns the first entry whose running weight
/// sum exceeds `r`. When the total weight is zero the last entry is returned; zero-weight
/// entries are never reached any other way. Returns `None` only for an empty pool.
pub fn pick_weighted<'a, T: Weighted, R: Rng + ?Sized>(
    pool: &'a [T],
    rng: &mut R,
) -> Option<&'a T> {
    pick_weighted_index(pool, rng).and_then(|i| pool.get(i))
}

/// Position-returning form of [`pick_weighted`].
pub fn pick_weighted_index<T: Weighted, R: Rng + ?Sized>(pool: &[T], rng: &mut R) -> Option<usize> {
    let mut prefix = Vec::with_capacity(pool.len());
    let mut total = 0u64;
    for entry in pool {
        total += u64::from(entry.weight());
        prefix.push(total);
    }

    if total > 0 {
        let r = rng.gen_range(0..total);
        if let Some(i) = prefix.iter().position(|&p| r < p) {
            return Some(i);
        }
    }
    pool.len().checked_sub(1)
}

#[cfg(test)]
#[path = "../../tests/unit/generate/sampler.rs"]
mod tests;
