//! Seeded pseudo-random ordering and choice.
//!
//! No external RNG crate: ordering is derived by hashing `(seed, index)`
//! with [`DefaultHasher`] and sorting by the hash, which yields a
//! deterministic full permutation for a given seed. Callers that want
//! fresh, non-reproducible behavior seed from [`process_seed`].

use std::collections::hash_map::{DefaultHasher, RandomState};
use std::hash::{BuildHasher, Hash, Hasher};

/// A shuffled copy of `0..len`, deterministic per seed.
#[must_use]
pub fn shuffled_indices(len: usize, seed: u64) -> Vec<usize> {
    let mut hashed: Vec<(usize, u64)> = (0..len)
        .map(|idx| {
            let mut hasher = DefaultHasher::new();
            seed.hash(&mut hasher);
            idx.hash(&mut hasher);
            (idx, hasher.finish())
        })
        .collect();

    hashed.sort_by_key(|&(idx, hash)| (hash, idx));
    hashed.into_iter().map(|(idx, _)| idx).collect()
}

/// Pick one of `len` alternatives for draw number `n`, deterministic per seed.
#[must_use]
pub fn choose(len: usize, seed: u64, n: usize) -> usize {
    debug_assert!(len > 0);
    let mut hasher = DefaultHasher::new();
    seed.hash(&mut hasher);
    n.hash(&mut hasher);
    (hasher.finish() % len as u64) as usize
}

/// A seed drawn from process entropy (differs across runs).
#[must_use]
pub fn process_seed() -> u64 {
    RandomState::new().build_hasher().finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn shuffle_is_deterministic_per_seed() {
        assert_eq!(shuffled_indices(20, 42), shuffled_indices(20, 42));
        assert_ne!(shuffled_indices(20, 42), shuffled_indices(20, 7));
    }

    #[test]
    fn choose_stays_in_range() {
        for n in 0..100 {
            assert!(choose(5, 99, n) < 5);
        }
    }

    proptest! {
        #[test]
        fn shuffle_is_a_permutation(len in 0usize..200, seed: u64) {
            let mut shuffled = shuffled_indices(len, seed);
            shuffled.sort_unstable();
            prop_assert_eq!(shuffled, (0..len).collect::<Vec<_>>());
        }
    }
}
