//! Epsilon-greedy arm selection.

use rand::rngs::StdRng;
use rand::Rng;

use crate::{Averager, BanditAlgorithm, BanditAverage, RewardAverager};

/// Explore uniformly with probability `epsilon`, otherwise play the best average.
///
/// Unobserved arms count as a `0` average. Ties between maximizers are broken
/// uniformly at random with the caller's RNG.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EpsilonGreedy<V = Averager> {
    epsilon: f64,
    stats: BanditAverage<V>,
}

impl<V: RewardAverager> EpsilonGreedy<V> {
    /// Panics unless `epsilon` lies in `[0, 1]`.
    pub fn new(epsilon: f64, stats: BanditAverage<V>) -> Self {
        assert!(
            (0.0..=1.0).contains(&epsilon),
            "exploration rate must lie in [0, 1], got {epsilon}"
        );
        Self { epsilon, stats }
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn set_epsilon(&mut self, epsilon: f64) {
        assert!(
            (0.0..=1.0).contains(&epsilon),
            "exploration rate must lie in [0, 1], got {epsilon}"
        );
        self.epsilon = epsilon;
    }

    pub fn stats(&self) -> &BanditAverage<V> {
        &self.stats
    }
}

/// Indices achieving the maximum of `scores` (exact comparison).
pub(crate) fn argmax_all(scores: impl Iterator<Item = f64>) -> Vec<usize> {
    let mut best = f64::NEG_INFINITY;
    let mut winners = Vec::new();
    for (i, s) in scores.enumerate() {
        if s > best {
            best = s;
            winners.clear();
            winners.push(i);
        } else if s == best {
            winners.push(i);
        }
    }
    winners
}

/// Uniform pick among `candidates`; panics if empty.
pub(crate) fn pick_uniform(candidates: &[usize], rng: &mut StdRng) -> usize {
    assert!(!candidates.is_empty(), "no candidate arms to pick from");
    if candidates.len() == 1 {
        candidates[0]
    } else {
        candidates[rng.random_range(0..candidates.len())]
    }
}

impl<V: RewardAverager> BanditAlgorithm for EpsilonGreedy<V> {
    fn choose_arm(&mut self, rng: &mut StdRng) -> usize {
        let n = self.stats.number_of_arms();
        if self.epsilon > 0.0 && rng.random::<f64>() < self.epsilon {
            return rng.random_range(0..n);
        }
        let best = argmax_all((0..n).map(|arm| self.stats.average_or_zero(arm)));
        pick_uniform(&best, rng)
    }

    fn observe_reward(&mut self, reward: f64, arm: usize) {
        self.stats.observe_reward(reward, arm);
    }

    fn number_of_arms(&self) -> usize {
        self.stats.number_of_arms()
    }

    fn average(&self, arm: usize) -> f64 {
        self.stats.average(arm)
    }

    fn observations(&self, arm: usize) -> u64 {
        self.stats.number_of_observations(arm)
    }
}
