//! Injectable randomness for role shuffles and tie-breaks

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;

/// Source of uniform choices. Every random decision the room makes goes
/// through this trait so tests can pin outcomes.
pub trait RandomSource: Send {
    /// Returns an index in `0..len`. Callers never pass zero.
    fn index(&mut self, len: usize) -> usize;
}

/// Production source backed by `StdRng`.
pub struct StdRandom(StdRng);

impl StdRandom {
    pub fn from_entropy() -> Self {
        Self(StdRng::from_entropy())
    }

    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl RandomSource for StdRandom {
    fn index(&mut self, len: usize) -> usize {
        self.0.gen_range(0..len)
    }
}

/// Replays a fixed list of indices, wrapping each into range.
/// Falls back to 0 once the script runs out.
#[derive(Debug, Default)]
pub struct ScriptedRandom {
    script: VecDeque<usize>,
}

impl ScriptedRandom {
    pub fn new(script: impl IntoIterator<Item = usize>) -> Self {
        Self {
            script: script.into_iter().collect(),
        }
    }
}

impl RandomSource for ScriptedRandom {
    fn index(&mut self, len: usize) -> usize {
        self.script.pop_front().unwrap_or(0) % len
    }
}

/// Fisher-Yates shuffle driven by a `RandomSource`.
pub fn shuffle<T>(rng: &mut dyn RandomSource, items: &mut [T]) {
    for i in (1..items.len()).rev() {
        let j = rng.index(i + 1);
        items.swap(i, j);
    }
}

/// Picks one element uniformly, or `None` for an empty slice.
pub fn choose<'a, T>(rng: &mut dyn RandomSource, items: &'a [T]) -> Option<&'a T> {
    if items.is_empty() {
        None
    } else {
        items.get(rng.index(items.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_random_replays_and_wraps() {
        let mut rng = ScriptedRandom::new([1, 5, 2]);
        assert_eq!(rng.index(3), 1);
        assert_eq!(rng.index(3), 2);
        assert_eq!(rng.index(4), 2);
        assert_eq!(rng.index(4), 0);
    }

    #[test]
    fn test_choose_empty_is_none() {
        let mut rng = ScriptedRandom::default();
        let empty: [u32; 0] = [];
        assert!(choose(&mut rng, &empty).is_none());
    }

    #[test]
    fn test_choose_uses_source_index() {
        let mut rng = ScriptedRandom::new([2]);
        assert_eq!(choose(&mut rng, &[10, 20, 30]), Some(&30));
    }

    #[test]
    fn test_shuffle_keeps_elements() {
        let mut rng = StdRandom::seeded(7);
        let mut items: Vec<u32> = (0..20).collect();
        shuffle(&mut rng, &mut items);

        let mut sorted = items.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..20).collect::<Vec<u32>>());
    }

    #[test]
    fn test_seeded_sources_agree() {
        let mut a = StdRandom::seeded(42);
        let mut b = StdRandom::seeded(42);
        for _ in 0..10 {
            assert_eq!(a.index(100), b.index(100));
        }
    }
}
