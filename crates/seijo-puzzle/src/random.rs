//! Injectable randomness for choice shuffling.
//!
//! The builder never touches a global generator directly: it draws through
//! [`RandomSource`], so callers can pass a seeded generator or a scripted
//! sequence and assert exact permutations.

use rand::rngs::{StdRng, ThreadRng};
use rand::{Rng, SeedableRng};

/// Source of uniform indices.
pub trait RandomSource {
    /// Uniform index in `0..=max`.
    fn index_up_to(&mut self, max: usize) -> usize;
}

// ---------------------------------------------------------------------------
// RngSource
// ---------------------------------------------------------------------------

/// Adapter from any [`rand::Rng`] to [`RandomSource`].
#[derive(Debug, Clone)]
pub struct RngSource<R>(pub R);

impl RngSource<ThreadRng> {
    /// Thread-local generator, seeded from the OS.
    pub fn thread() -> Self {
        Self(rand::rng())
    }
}

impl RngSource<StdRng> {
    /// Deterministic generator for reproducible puzzles.
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> RandomSource for RngSource<R> {
    fn index_up_to(&mut self, max: usize) -> usize {
        self.0.random_range(0..=max)
    }
}

// ---------------------------------------------------------------------------
// ScriptedSource
// ---------------------------------------------------------------------------

/// Replays a fixed list of picks, cycling when exhausted.
///
/// Each pick is capped at the requested `max`. An empty script always picks
/// `max`, which makes [`shuffle`] the identity permutation.
#[derive(Debug, Clone, Default)]
pub struct ScriptedSource {
    picks: Vec<usize>,
    cursor: usize,
}

impl ScriptedSource {
    pub fn new(picks: Vec<usize>) -> Self {
        Self { picks, cursor: 0 }
    }

    /// Source under which every shuffle keeps the original order.
    pub fn identity() -> Self {
        Self::default()
    }
}

impl RandomSource for ScriptedSource {
    fn index_up_to(&mut self, max: usize) -> usize {
        if self.picks.is_empty() {
            return max;
        }
        let pick = self.picks[self.cursor % self.picks.len()];
        self.cursor += 1;
        pick.min(max)
    }
}

// ---------------------------------------------------------------------------
// Shuffle
// ---------------------------------------------------------------------------

/// Uniform shuffle into a new vector: walking from the last position to the
/// second, swap each slot with a uniformly chosen slot at or before it.
pub fn shuffle<T: Clone, R: RandomSource + ?Sized>(items: &[T], rng: &mut R) -> Vec<T> {
    let mut out = items.to_vec();
    for i in (1..out.len()).rev() {
        let j = rng.index_up_to(i);
        out.swap(i, j);
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_source_keeps_order() {
        let items = vec![1, 2, 3, 4];
        assert_eq!(shuffle(&items, &mut ScriptedSource::identity()), items);
    }

    #[test]
    fn scripted_picks_give_exact_permutation() {
        // i=3 -> j=0: [4,2,3,1]; i=2 -> j=0: [3,2,4,1]; i=1 -> j=0: [2,3,4,1]
        let mut rng = ScriptedSource::new(vec![0]);
        assert_eq!(shuffle(&[1, 2, 3, 4], &mut rng), vec![2, 3, 4, 1]);
    }

    #[test]
    fn scripted_picks_are_capped() {
        let mut rng = ScriptedSource::new(vec![100]);
        assert_eq!(rng.index_up_to(3), 3);
        assert_eq!(rng.index_up_to(0), 0);
    }

    #[test]
    fn empty_and_single_inputs() {
        let mut rng = RngSource::seeded(1);
        assert!(shuffle::<u8, _>(&[], &mut rng).is_empty());
        assert_eq!(shuffle(&["x"], &mut rng), vec!["x"]);
    }

    #[test]
    fn seeded_shuffle_is_reproducible() {
        let items: Vec<u32> = (0..20).collect();
        let a = shuffle(&items, &mut RngSource::seeded(42));
        let b = shuffle(&items, &mut RngSource::seeded(42));
        assert_eq!(a, b);
    }

    #[test]
    fn shuffle_is_a_permutation() {
        let items: Vec<u32> = (0..50).collect();
        let mut out = shuffle(&items, &mut RngSource::thread());
        out.sort_unstable();
        assert_eq!(out, items);
    }

    #[test]
    fn rng_source_stays_in_range() {
        let mut rng = RngSource::seeded(7);
        for max in 0..30 {
            assert!(rng.index_up_to(max) <= max);
        }
    }
}
