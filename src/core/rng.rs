//! Seedable random choice for search.
//!
//! Every random decision the agent makes (which unexplored macro-action to
//! expand, the rollout policy, the no-decision fallback) goes through
//! `GameRng`, so a fixed seed reproduces a search exactly.
//!
//! ```
//! use rts_macro_mcts::core::GameRng;
//!
//! let mut a = GameRng::new(7);
//! let mut b = GameRng::new(7);
//! assert_eq!(a.choose(&[1, 2, 3]), b.choose(&[1, 2, 3]));
//! ```

use std::ops::Range;

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// ChaCha8 stream plus the seed it started from.
#[derive(Clone, Debug)]
pub struct GameRng {
    stream: ChaCha8Rng,
    seed: u64,
}

impl GameRng {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            stream: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Index drawn uniformly from `range`. The range must not be empty.
    pub fn gen_range_usize(&mut self, range: Range<usize>) -> usize {
        self.stream.gen_range(range)
    }

    /// Uniform pick from `items`, `None` when there is nothing to pick.
    #[must_use]
    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        items.choose(&mut self.stream)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_picks() {
        let mut left = GameRng::new(99);
        let mut right = GameRng::new(99);
        let moves = ["north", "east", "south", "west"];

        let a: Vec<_> = (0..32).map(|_| left.choose(&moves)).collect();
        let b: Vec<_> = (0..32).map(|_| right.choose(&moves)).collect();
        assert_eq!(a, b);
        assert_eq!(left.seed(), 99);
    }

    #[test]
    fn test_index_stays_in_range() {
        let mut rng = GameRng::new(3);
        assert!((0..200).all(|_| (5..9).contains(&rng.gen_range_usize(5..9))));
    }

    #[test]
    fn test_choose_from_nothing() {
        let mut rng = GameRng::new(0);
        assert_eq!(rng.choose::<u8>(&[]), None);
        assert_eq!(rng.choose(&[4]), Some(&4));
    }
}
