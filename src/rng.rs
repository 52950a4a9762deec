//! Seedable random number generator shared by generation and guessing.
//!
//! Uses the `rand` crate with `SmallRng` (xoshiro256++), which is fast and
//! works on wasm. Entropy is sourced from `getrandom` (browser crypto API
//! on wasm32, the OS elsewhere).

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// A seedable RNG wrapper.
///
/// Can be seeded for deterministic replay, or created from system entropy.
pub struct GameRng {
    inner: SmallRng,
}

impl GameRng {
    /// Create from system entropy.
    pub fn new() -> Self {
        Self {
            inner: SmallRng::from_os_rng(),
        }
    }

    /// Create with a specific seed for deterministic behavior.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            inner: SmallRng::seed_from_u64(seed),
        }
    }

    /// Seeded when `seed` is given, entropy otherwise.
    pub fn from_optional_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(s) => Self::from_seed(s),
            None => Self::new(),
        }
    }

    /// An independent generator seeded from this one.
    pub fn fork(&mut self) -> Self {
        Self {
            inner: SmallRng::from_rng(&mut self.inner),
        }
    }

    /// Generate a random usize in [0, max).
    #[inline(always)]
    pub fn gen_range(&mut self, max: usize) -> usize {
        self.inner.random_range(0..max)
    }

    /// `amount` distinct indices from [0, length), sampled without replacement.
    pub fn sample_indices(&mut self, length: usize, amount: usize) -> Vec<usize> {
        rand::seq::index::sample(&mut self.inner, length, amount).into_vec()
    }

    /// Pick one element uniformly, `None` when empty.
    pub fn choose<T: Copy>(&mut self, items: &[T]) -> Option<T> {
        if items.is_empty() {
            None
        } else {
            Some(items[self.gen_range(items.len())])
        }
    }
}

impl Default for GameRng {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_deterministic() {
        let mut rng1 = GameRng::from_seed(42);
        let mut rng2 = GameRng::from_seed(42);
        for _ in 0..100 {
            assert_eq!(rng1.gen_range(1000), rng2.gen_range(1000));
        }
    }

    #[test]
    fn test_fork_is_deterministic() {
        let mut a = GameRng::from_seed(9).fork();
        let mut b = GameRng::from_seed(9).fork();
        for _ in 0..20 {
            assert_eq!(a.gen_range(1 << 20), b.gen_range(1 << 20));
        }
    }

    #[test]
    fn test_range_bounds() {
        let mut rng = GameRng::from_seed(123);
        for _ in 0..1000 {
            assert!(rng.gen_range(10) < 10);
        }
    }

    #[test]
    fn test_sample_indices_distinct() {
        let mut rng = GameRng::from_seed(7);
        let mut picked = rng.sample_indices(50, 20);
        assert_eq!(picked.len(), 20);
        picked.sort_unstable();
        picked.dedup();
        assert_eq!(picked.len(), 20);
        assert!(picked.iter().all(|&i| i < 50));
    }

    #[test]
    fn test_choose_empty() {
        let mut rng = GameRng::from_seed(1);
        let empty: [u8; 0] = [];
        assert_eq!(rng.choose(&empty), None);
        assert_eq!(rng.choose(&[5u8]), Some(5));
    }
}
