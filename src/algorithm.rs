//! Common interface for the arm-choosing policies.
//!
//! [`EpsilonGreedy`], [`Softmax`] and [`Ucb1`] share the two-method interface
//! `choose_arm(rng)` / `observe_reward(reward, arm)`. [`Bandit`] is the closed set
//! a scenario picks from; anything implementing [`BanditAlgorithm`] can be used
//! where a bandit is expected.
//!
//! All randomness comes from the caller's RNG stream so a run is reproducible
//! from its top-level seed.

use std::cell::RefCell;
use std::rc::Rc;

use rand::rngs::StdRng;

use crate::{Averager, BanditAverage, EpsilonGreedy, RewardAverager, Softmax, Ucb1};

/// A stateful arm-selection policy over dense arms `0..number_of_arms()`.
pub trait BanditAlgorithm {
    /// Pick the next arm to play.
    fn choose_arm(&mut self, rng: &mut StdRng) -> usize;

    /// Feed back the reward observed after playing `arm`.
    fn observe_reward(&mut self, reward: f64, arm: usize);

    fn number_of_arms(&self) -> usize;

    /// Smoothed reward of `arm` as the policy records it (`NaN` if unobserved).
    fn average(&self, arm: usize) -> f64;

    fn observations(&self, arm: usize) -> u64;
}

/// The three built-in policies behind one type.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Bandit<V = Averager> {
    EpsilonGreedy(EpsilonGreedy<V>),
    Softmax(Softmax<V>),
    Ucb1(Ucb1<V>),
}

impl<V: RewardAverager> Bandit<V> {
    /// Statistics backing the policy.
    pub fn stats(&self) -> &BanditAverage<V> {
        match self {
            Bandit::EpsilonGreedy(b) => b.stats(),
            Bandit::Softmax(b) => b.stats(),
            Bandit::Ucb1(b) => b.stats(),
        }
    }
}

impl<V: RewardAverager> BanditAlgorithm for Bandit<V> {
    fn choose_arm(&mut self, rng: &mut StdRng) -> usize {
        match self {
            Bandit::EpsilonGreedy(b) => b.choose_arm(rng),
            Bandit::Softmax(b) => b.choose_arm(rng),
            Bandit::Ucb1(b) => b.choose_arm(rng),
        }
    }

    fn observe_reward(&mut self, reward: f64, arm: usize) {
        match self {
            Bandit::EpsilonGreedy(b) => b.observe_reward(reward, arm),
            Bandit::Softmax(b) => b.observe_reward(reward, arm),
            Bandit::Ucb1(b) => b.observe_reward(reward, arm),
        }
    }

    fn number_of_arms(&self) -> usize {
        self.stats().number_of_arms()
    }

    fn average(&self, arm: usize) -> f64 {
        self.stats().average(arm)
    }

    fn observations(&self, arm: usize) -> u64 {
        self.stats().number_of_observations(arm)
    }
}

impl<V> From<EpsilonGreedy<V>> for Bandit<V> {
    fn from(b: EpsilonGreedy<V>) -> Self {
        Bandit::EpsilonGreedy(b)
    }
}

impl<V> From<Softmax<V>> for Bandit<V> {
    fn from(b: Softmax<V>) -> Self {
        Bandit::Softmax(b)
    }
}

impl<V> From<Ucb1<V>> for Bandit<V> {
    fn from(b: Ucb1<V>) -> Self {
        Bandit::Ucb1(b)
    }
}

/// A population-level bandit shared by several agents.
///
/// The scheduler is single-threaded, so interior mutability is enough. Every
/// holder sees (and perturbs) the same statistics.
impl<B: BanditAlgorithm> BanditAlgorithm for Rc<RefCell<B>> {
    fn choose_arm(&mut self, rng: &mut StdRng) -> usize {
        self.borrow_mut().choose_arm(rng)
    }

    fn observe_reward(&mut self, reward: f64, arm: usize) {
        self.borrow_mut().observe_reward(reward, arm);
    }

    fn number_of_arms(&self) -> usize {
        self.borrow().number_of_arms()
    }

    fn average(&self, arm: usize) -> f64 {
        self.borrow().average(arm)
    }

    fn observations(&self, arm: usize) -> u64 {
        self.borrow().observations(arm)
    }
}
