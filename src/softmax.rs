//! Boltzmann (softmax) arm selection with an annealed temperature.
//!
//! Arm `i` is drawn with probability proportional to `exp(q_i / temperature)`.
//! A high temperature is close to uniform; as it falls the policy turns greedy.
//! The temperature is multiplied by `decay` after every observation and never
//! drops below `1.0`.
//!
//! The free functions [`boltzmann_probabilities`] and [`boltzmann_draw`] work on
//! any preference function, for one-shot choices not backed by a `BanditAverage`.

use rand::rngs::StdRng;
use rand::Rng;

use crate::{Averager, BanditAlgorithm, BanditAverage, RewardAverager};

/// Temperature floor reached by annealing.
pub const MIN_TEMPERATURE: f64 = 1.0;

fn finite_or0(x: f64) -> f64 {
    if x.is_finite() {
        x
    } else {
        0.0
    }
}

/// Probabilities of the Boltzmann distribution over `n` options.
///
/// - Non-finite preferences count as `0`.
/// - Uses the max-trick for numerical stability.
/// - Panics unless `temperature` is finite and positive.
pub fn boltzmann_probabilities(
    n: usize,
    mut preference: impl FnMut(usize) -> f64,
    temperature: f64,
) -> Vec<f64> {
    assert!(
        temperature.is_finite() && temperature > 0.0,
        "temperature must be finite and positive, got {temperature}"
    );
    if n == 0 {
        return Vec::new();
    }
    let prefs: Vec<f64> = (0..n).map(|i| finite_or0(preference(i))).collect();
    let max_pref = prefs.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let mut out: Vec<f64> = prefs
        .iter()
        .map(|&q| ((q - max_pref) / temperature).exp())
        .collect();
    let denom: f64 = out.iter().sum();
    if denom <= 0.0 || !denom.is_finite() {
        // Degenerate fallback: uniform.
        return vec![1.0 / n as f64; n];
    }
    for p in &mut out {
        *p /= denom;
    }
    out
}

/// Draw one of `n` options from the Boltzmann distribution.
///
/// Panics if `n == 0` or the temperature is invalid.
pub fn boltzmann_draw(
    n: usize,
    preference: impl FnMut(usize) -> f64,
    temperature: f64,
    rng: &mut StdRng,
) -> usize {
    assert!(n > 0, "cannot draw from an empty set of options");
    let probs = boltzmann_probabilities(n, preference, temperature);
    let r: f64 = rng.random();
    let mut cdf = 0.0;
    for (i, p) in probs.iter().enumerate() {
        cdf += p;
        if r < cdf {
            return i;
        }
    }
    // Numerical fallback.
    n - 1
}

/// Softmax bandit over a [`BanditAverage`].
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Softmax<V = Averager> {
    stats: BanditAverage<V>,
    temperature: f64,
    decay: f64,
}

impl<V: RewardAverager> Softmax<V> {
    /// Starting temperatures below [`MIN_TEMPERATURE`] are raised to it.
    ///
    /// Panics unless `temperature` is finite and positive and `decay` lies in `(0, 1]`.
    pub fn new(stats: BanditAverage<V>, temperature: f64, decay: f64) -> Self {
        assert!(
            temperature.is_finite() && temperature > 0.0,
            "temperature must be finite and positive, got {temperature}"
        );
        assert!(
            decay > 0.0 && decay <= 1.0,
            "temperature decay must lie in (0, 1], got {decay}"
        );
        Self {
            stats,
            temperature: temperature.max(MIN_TEMPERATURE),
            decay,
        }
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    pub fn decay(&self) -> f64 {
        self.decay
    }

    pub fn stats(&self) -> &BanditAverage<V> {
        &self.stats
    }

    /// Current selection probabilities (diagnostics).
    pub fn probabilities(&self) -> Vec<f64> {
        boltzmann_probabilities(
            self.stats.number_of_arms(),
            |arm| self.stats.average(arm),
            self.temperature,
        )
    }
}

impl<V: RewardAverager> BanditAlgorithm for Softmax<V> {
    fn choose_arm(&mut self, rng: &mut StdRng) -> usize {
        let stats = &self.stats;
        boltzmann_draw(
            stats.number_of_arms(),
            |arm| stats.average(arm),
            self.temperature,
            rng,
        )
    }

    fn observe_reward(&mut self, reward: f64, arm: usize) {
        self.stats.observe_reward(reward, arm);
        self.temperature = (self.decay * self.temperature).max(MIN_TEMPERATURE);
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
