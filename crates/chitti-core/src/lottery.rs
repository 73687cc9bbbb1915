//! Random winner selection.

use std::collections::VecDeque;

use chitti_storage::Member;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Description attached to the surcharge payment of a draw winner.
pub const SURCHARGE_DESCRIPTION: &str = "Lottery Winner Extra Charge";

/// Source of uniformly distributed indices.
pub trait RandomSource: Send {
    /// Index in `[0, upper)`. `upper` is always at least 1.
    fn next_index(&mut self, upper: usize) -> usize;
}

/// Thread-local OS-seeded generator.
#[derive(Clone, Copy, Debug, Default)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn next_index(&mut self, upper: usize) -> usize {
        rand::rng().random_range(0..upper)
    }
}

/// Reproducible generator for replaying draws.
#[derive(Clone, Debug)]
pub struct SeededRandom(StdRng);

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl RandomSource for SeededRandom {
    fn next_index(&mut self, upper: usize) -> usize {
        self.0.random_range(0..upper)
    }
}

/// Returns the given indices in order, then 0.
#[derive(Clone, Debug, Default)]
pub struct ScriptedRandom(VecDeque<usize>);

impl ScriptedRandom {
    pub fn new(indices: impl IntoIterator<Item = usize>) -> Self {
        Self(indices.into_iter().collect())
    }
}

impl RandomSource for ScriptedRandom {
    fn next_index(&mut self, _upper: usize) -> usize {
        self.0.pop_front().unwrap_or(0)
    }
}

/// Outcome of [`pick_winner`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pick<'a> {
    Winner(&'a Member),
    NoneEligible,
    /// The source returned an index past the end of the pool.
    OutOfRange { index: usize, eligible: usize },
}

/// Pick one member uniformly.
pub fn pick_winner<'a>(eligible: &[&'a Member], rng: &mut dyn RandomSource) -> Pick<'a> {
    if eligible.is_empty() {
        return Pick::NoneEligible;
    }
    let index = rng.next_index(eligible.len());
    match eligible.get(index).copied() {
        Some(member) => Pick::Winner(member),
        None => Pick::OutOfRange {
            index,
            eligible: eligible.len(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn members(names: &[&str]) -> Vec<Member> {
        names.iter().map(|n| Member::new(*n)).collect()
    }

    #[test]
    fn scripted_source_picks_that_index() {
        let ms = members(&["A", "B", "C"]);
        let eligible: Vec<&Member> = ms.iter().collect();
        let mut rng = ScriptedRandom::new([1, 2]);

        assert_eq!(pick_winner(&eligible, &mut rng), Pick::Winner(&ms[1]));
        assert_eq!(pick_winner(&eligible, &mut rng), Pick::Winner(&ms[2]));
        // script exhausted, falls back to 0
        assert_eq!(pick_winner(&eligible, &mut rng), Pick::Winner(&ms[0]));
    }

    #[test]
    fn empty_pool_has_no_winner() {
        let mut rng = ThreadRandom;
        assert_eq!(pick_winner(&[], &mut rng), Pick::NoneEligible);
    }

    #[test]
    fn out_of_range_index_is_reported() {
        let ms = members(&["A", "B"]);
        let eligible: Vec<&Member> = ms.iter().collect();
        let mut rng = ScriptedRandom::new([5]);
        assert_eq!(
            pick_winner(&eligible, &mut rng),
            Pick::OutOfRange {
                index: 5,
                eligible: 2
            }
        );
    }

    #[test]
    fn seeded_source_is_reproducible() {
        let mut a = SeededRandom::new(42);
        let mut b = SeededRandom::new(42);
        let xs: Vec<_> = (0..20).map(|_| a.next_index(7)).collect();
        let ys: Vec<_> = (0..20).map(|_| b.next_index(7)).collect();
        assert_eq!(xs, ys);
        assert!(xs.iter().all(|&i| i < 7));
    }

    #[test]
    fn thread_source_covers_every_index() {
        let mut rng = ThreadRandom;
        let mut seen = [false; 4];
        for _ in 0..2000 {
            seen[rng.next_index(4)] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }
}
