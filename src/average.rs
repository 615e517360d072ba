//! Per-arm reward statistics shared by every bandit algorithm.

use crate::{Averager, RewardAverager};

/// One [`RewardAverager`] and one observation counter per arm.
///
/// Arms are dense indices in `0..number_of_arms()`. Indexing outside that range is a
/// wiring bug and panics.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BanditAverage<V = Averager> {
    averages: Vec<V>,
    observations: Vec<u64>,
}

impl<V: RewardAverager> BanditAverage<V> {
    /// Build `number_of_arms` independent averagers; `make` receives the arm index.
    ///
    /// Panics if `number_of_arms == 0`.
    pub fn new(number_of_arms: usize, make: impl FnMut(usize) -> V) -> Self {
        assert!(number_of_arms > 0, "a bandit needs at least one arm");
        Self {
            averages: (0..number_of_arms).map(make).collect(),
            observations: vec![0; number_of_arms],
        }
    }

    /// Credit `reward` to `arm`.
    pub fn observe_reward(&mut self, reward: f64, arm: usize) {
        self.check_arm(arm);
        self.averages[arm].add_observation(reward);
        self.observations[arm] += 1;
    }

    /// Smoothed reward of `arm` (`NaN` until it has been observed).
    pub fn average(&self, arm: usize) -> f64 {
        self.check_arm(arm);
        self.averages[arm].smoothed_observation()
    }

    /// Like [`average`](Self::average) but with non-finite estimates read as `0`.
    pub fn average_or_zero(&self, arm: usize) -> f64 {
        let a = self.average(arm);
        if a.is_finite() {
            a
        } else {
            0.0
        }
    }

    pub fn number_of_observations(&self, arm: usize) -> u64 {
        self.check_arm(arm);
        self.observations[arm]
    }

    pub fn number_of_arms(&self) -> usize {
        self.averages.len()
    }

    /// First arm (lowest index) that has never been observed.
    pub fn first_unobserved(&self) -> Option<usize> {
        self.observations.iter().position(|&n| n == 0)
    }

    fn check_arm(&self, arm: usize) {
        assert!(
            arm < self.averages.len(),
            "arm {arm} out of range for {} arms",
            self.averages.len()
        );
    }
}

impl<V: RewardAverager + Clone> BanditAverage<V> {
    /// Every arm starts from a clone of `prototype`.
    pub fn uniform(number_of_arms: usize, prototype: V) -> Self {
        Self::new(number_of_arms, |_| prototype.clone())
    }
}
