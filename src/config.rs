//! Scenario-facing builders for averagers and bandits.
//!
//! Scenario files name a policy and its parameters; these enums carry them (and
//! deserialize them with the `serde` feature). Unlike the direct constructors,
//! which panic on bad input, `build` reports a [`ConfigError`].

use crate::{
    Averager, Bandit, BanditAverage, ConfigError, EpsilonGreedy, ExponentialMovingAverage,
    IterativeAverage, MovingAverage, Softmax, Ucb1,
};

/// Which averaging policy each arm uses.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "snake_case"))]
pub enum AveragerConfig {
    /// Arithmetic mean of every observation.
    Mean,
    /// Exponential smoothing with weight `alpha` on the newest observation.
    Exponential { alpha: f64 },
    /// Arithmetic mean of the last `window` observations.
    Moving { window: usize },
}

impl Default for AveragerConfig {
    fn default() -> Self {
        AveragerConfig::Exponential { alpha: 0.2 }
    }
}

impl AveragerConfig {
    /// Moving window of the last 20 observations.
    pub fn moving() -> Self {
        AveragerConfig::Moving { window: 20 }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match *self {
            AveragerConfig::Mean => Ok(()),
            AveragerConfig::Exponential { alpha } => {
                if alpha > 0.0 && alpha < 1.0 {
                    Ok(())
                } else {
                    Err(ConfigError::SmoothingFactor(alpha))
                }
            }
            AveragerConfig::Moving { window } => {
                if window > 0 {
                    Ok(())
                } else {
                    Err(ConfigError::Window)
                }
            }
        }
    }

    /// One fresh averager.
    pub fn build(&self) -> Result<Averager, ConfigError> {
        self.validate()?;
        Ok(match *self {
            AveragerConfig::Mean => IterativeAverage::new().into(),
            AveragerConfig::Exponential { alpha } => ExponentialMovingAverage::new(alpha).into(),
            AveragerConfig::Moving { window } => MovingAverage::new(window).into(),
        })
    }

    /// Per-arm statistics for `number_of_arms` arms.
    pub fn build_average(&self, number_of_arms: usize) -> Result<BanditAverage, ConfigError> {
        if number_of_arms == 0 {
            return Err(ConfigError::NoArms);
        }
        let prototype = self.build()?;
        Ok(BanditAverage::uniform(number_of_arms, prototype))
    }
}

/// Which bandit policy to run, with its parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "snake_case"))]
pub enum BanditConfig {
    EpsilonGreedy {
        exploration_rate: f64,
    },
    /// An `initial_temperature` below 1 starts at the 1.0 floor.
    Softmax {
        initial_temperature: f64,
        temperature_decay: f64,
    },
    Ucb1 {
        minimum_reward: f64,
        maximum_reward: f64,
    },
}

impl Default for BanditConfig {
    fn default() -> Self {
        BanditConfig::EpsilonGreedy {
            exploration_rate: 0.2,
        }
    }
}

impl BanditConfig {
    /// Default softmax parameters.
    pub fn softmax() -> Self {
        BanditConfig::Softmax {
            initial_temperature: 5.0,
            temperature_decay: 0.98,
        }
    }

    /// Default UCB1 reward bounds.
    pub fn ucb1() -> Self {
        BanditConfig::Ucb1 {
            minimum_reward: 0.0,
            maximum_reward: 20.0,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match *self {
            BanditConfig::EpsilonGreedy { exploration_rate } => {
                if (0.0..=1.0).contains(&exploration_rate) {
                    Ok(())
                } else {
                    Err(ConfigError::Probability {
                        name: "exploration_rate",
                        value: exploration_rate,
                    })
                }
            }
            BanditConfig::Softmax {
                initial_temperature,
                temperature_decay,
            } => {
                if !(initial_temperature.is_finite() && initial_temperature > 0.0) {
                    return Err(ConfigError::Temperature(initial_temperature));
                }
                if !(temperature_decay > 0.0 && temperature_decay <= 1.0) {
                    return Err(ConfigError::Decay(temperature_decay));
                }
                Ok(())
            }
            BanditConfig::Ucb1 {
                minimum_reward,
                maximum_reward,
            } => {
                if minimum_reward.is_finite()
                    && maximum_reward.is_finite()
                    && minimum_reward < maximum_reward
                {
                    Ok(())
                } else {
                    Err(ConfigError::RewardBounds {
                        minimum: minimum_reward,
                        maximum: maximum_reward,
                    })
                }
            }
        }
    }

    /// Build a bandit over `number_of_arms` arms averaged with `averager`.
    pub fn build(
        &self,
        number_of_arms: usize,
        averager: &AveragerConfig,
    ) -> Result<Bandit, ConfigError> {
        self.validate()?;
        let stats = averager.build_average(number_of_arms)?;
        Ok(match *self {
            BanditConfig::EpsilonGreedy { exploration_rate } => {
                EpsilonGreedy::new(exploration_rate, stats).into()
            }
            BanditConfig::Softmax {
                initial_temperature,
                temperature_decay,
            } => Softmax::new(stats, initial_temperature, temperature_decay).into(),
            BanditConfig::Ucb1 {
                minimum_reward,
                maximum_reward,
            } => Ucb1::new(minimum_reward, maximum_reward, stats).into(),
        })
    }
}
