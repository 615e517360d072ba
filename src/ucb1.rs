//! UCB1 arm selection over rewards rescaled into `[0, 1]`.
//!
//! Policy:
//! - Cold start: play the first arm (by index) that has never been observed.
//! - Otherwise: maximize `mean + sqrt(2 ln(N) / n_arm)`, ties broken uniformly at
//!   random with the caller's RNG.
//!
//! Raw rewards are clamped into `[minimum_reward, maximum_reward]` and mapped
//! affinely onto `[0, 1]` before they reach the averages, since the confidence
//! width assumes bounded unit rewards.

use rand::rngs::StdRng;

use crate::epsilon::{argmax_all, pick_uniform};
use crate::{Averager, BanditAlgorithm, BanditAverage, RewardAverager};

/// Seedless UCB1 (randomness only enters through tie-breaks).
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ucb1<V = Averager> {
    minimum_reward: f64,
    maximum_reward: f64,
    stats: BanditAverage<V>,
    total_observations: u64,
}

impl<V: RewardAverager> Ucb1<V> {
    /// Panics unless both bounds are finite and `minimum_reward < maximum_reward`.
    pub fn new(minimum_reward: f64, maximum_reward: f64, stats: BanditAverage<V>) -> Self {
        assert!(
            minimum_reward.is_finite()
                && maximum_reward.is_finite()
                && minimum_reward < maximum_reward,
            "reward bounds must be finite with min < max, got [{minimum_reward}, {maximum_reward}]"
        );
        Self {
            minimum_reward,
            maximum_reward,
            stats,
            total_observations: 0,
        }
    }

    pub fn minimum_reward(&self) -> f64 {
        self.minimum_reward
    }

    pub fn maximum_reward(&self) -> f64 {
        self.maximum_reward
    }

    /// Observations across all arms since construction.
    pub fn total_observations(&self) -> u64 {
        self.total_observations
    }

    /// Statistics on the normalized `[0, 1]` scale.
    pub fn stats(&self) -> &BanditAverage<V> {
        &self.stats
    }

    /// Clamp `reward` into the bounds and map it onto `[0, 1]`.
    pub fn normalize(&self, reward: f64) -> f64 {
        assert!(!reward.is_nan(), "UCB1 cannot observe a NaN reward");
        let clamped = reward.clamp(self.minimum_reward, self.maximum_reward);
        (clamped - self.minimum_reward) / (self.maximum_reward - self.minimum_reward)
    }

    /// Upper confidence bound of `arm`; `+inf` while the arm is unobserved.
    pub fn upper_bound(&self, arm: usize) -> f64 {
        let n = self.stats.number_of_observations(arm);
        if n == 0 {
            return f64::INFINITY;
        }
        let total = self.total_observations.max(1) as f64;
        self.stats.average(arm) + (2.0 * total.ln() / n as f64).sqrt()
    }
}

impl<V: RewardAverager> BanditAlgorithm for Ucb1<V> {
    fn choose_arm(&mut self, rng: &mut StdRng) -> usize {
        if let Some(arm) = self.stats.first_unobserved() {
            return arm;
        }
        let best = argmax_all((0..self.stats.number_of_arms()).map(|arm| self.upper_bound(arm)));
        pick_uniform(&best, rng)
    }

    fn observe_reward(&mut self, reward: f64, arm: usize) {
        let normalized = self.normalize(reward);
        self.stats.observe_reward(normalized, arm);
        self.total_observations = self.total_observations.saturating_add(1);
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::IterativeAverage;
    use proptest::prelude::*;
    use rand::SeedableRng;

    fn ucb(arms: usize, min: f64, max: f64) -> Ucb1<IterativeAverage> {
        Ucb1::new(min, max, BanditAverage::uniform(arms, IterativeAverage::new()))
    }

    #[test]
    fn cold_start_plays_arms_in_index_order() {
        let mut b = ucb(3, 0.0, 1.0);
        let mut rng = StdRng::seed_from_u64(123);
        for expected in 0..3 {
            let arm = b.choose_arm(&mut rng);
            assert_eq!(arm, expected);
            b.observe_reward(1.0, arm);
        }
        assert_eq!(b.total_observations(), 3);
    }

    #[test]
    fn out_of_range_rewards_are_clamped() {
        let mut hi = ucb(1, 0.0, 10.0);
        let mut top = ucb(1, 0.0, 10.0);
        hi.observe_reward(15.0, 0);
        top.observe_reward(10.0, 0);
        assert_eq!(hi.average(0), top.average(0));
        assert_eq!(hi.average(0), 1.0);

        let mut lo = ucb(1, 0.0, 10.0);
        lo.observe_reward(-5.0, 0);
        assert_eq!(lo.average(0), 0.0);
    }

    #[test]
    fn rescales_affinely() {
        let b = ucb(1, -10.0, 30.0);
        assert_eq!(b.normalize(10.0), 0.5);
    }

    #[test]
    fn under_sampled_arm_gets_a_wider_bound() {
        let mut b = ucb(2, 0.0, 1.0);
        for _ in 0..50 {
            b.observe_reward(0.6, 0);
        }
        b.observe_reward(0.5, 1);
        let mut rng = StdRng::seed_from_u64(1);
        assert!(b.upper_bound(1) > b.upper_bound(0));
        assert_eq!(b.choose_arm(&mut rng), 1);
    }

    #[test]
    fn converges_on_the_better_arm() {
        let mut b = ucb(2, 0.0, 1.0);
        let mut rng = StdRng::seed_from_u64(77);
        for _ in 0..2_000 {
            let arm = b.choose_arm(&mut rng);
            b.observe_reward(if arm == 0 { 0.9 } else { 0.1 }, arm);
        }
        assert!(b.observations(0) > 10 * b.observations(1));
    }

    #[test]
    #[should_panic(expected = "NaN reward")]
    fn nan_reward_is_a_caller_bug() {
        ucb(2, 0.0, 1.0).observe_reward(f64::NAN, 0);
    }

    #[test]
    #[should_panic(expected = "reward bounds")]
    fn inverted_bounds_panic() {
        ucb(2, 1.0, 0.0);
    }

    proptest! {
        #[test]
        fn normalized_rewards_stay_in_unit_interval(
            min in -1.0e3f64..0.0,
            width in 1.0e-3f64..1.0e3,
            reward in -1.0e4f64..1.0e4,
        ) {
            let b = ucb(1, min, min + width);
            let r = b.normalize(reward);
            prop_assert!((0.0..=1.0).contains(&r), "r={}", r);
        }
    }
}
