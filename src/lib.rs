//! `banditry`: seedable multi-armed bandits and cadence-driven adaptation for
//! agent-based simulations.
//!
//! Simulated agents periodically revisit a discrete choice (which port to land at,
//! which map region to fish, which gear setting to run) based on the rewards they
//! observed. This crate is that decision core:
//!
//! - **Statistics**: [`RewardAverager`] estimators ([`IterativeAverage`],
//!   [`ExponentialMovingAverage`], [`MovingAverage`]) and [`BanditAverage`], one
//!   estimator plus an observation count per arm.
//! - **Option mapping**: [`OptionSwitch`] maps a sparse, filtered group id space
//!   (valid map regions, open ports) onto dense arm indices and back.
//! - **Policies**: [`EpsilonGreedy`], [`Softmax`] (Boltzmann with an annealed
//!   temperature) and [`Ucb1`], behind the [`BanditAlgorithm`] trait and the
//!   closed [`Bandit`] enum. [`BanditConfig`] builds them from scenario parameters.
//! - **Adaptation**: [`SensedAdaptation`] binds a [`Sensor`], an [`Actuator`], a
//!   validator and a [`Strategy`]; [`BanditStrategy`] is the bandit-backed one.
//! - **Cadence**: [`DailyScheduler`] (every N simulated days, shuffled order) and
//!   [`PerTripScheduler`] (after every finished trip).
//!
//! **Determinism:** nothing here draws from an unseeded source. Arm choices, tie
//! breaks and inertia rolls use the agent's own [`StdRng`](rand::rngs::StdRng)
//! stream; the daily scheduler's shuffle uses a seed derived from the simulation
//! [`Clock`]. Same top-level seed, same run.
//!
//! **Concurrency:** everything runs synchronously inside one discrete-event
//! callback. Bandits are owned per agent; a population-level bandit can be shared
//! as `Rc<RefCell<B>>`.
//!
//! **Failure model:** wiring bugs (arm out of range, zero arms, mismatched arm
//! counts, invalid probabilities) panic. Scenario parameters go through
//! [`BanditConfig::build`] / [`AveragerConfig::build`], which return
//! [`ConfigError`] instead.
//!
//! ```rust
//! use banditry::{BanditAlgorithm, BanditAverage, IterativeAverage, Ucb1};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let mut ucb = Ucb1::new(0.0, 10.0, BanditAverage::uniform(3, IterativeAverage::new()));
//! let mut rng = StdRng::seed_from_u64(7);
//! for expected in 0..3 {
//!     let arm = ucb.choose_arm(&mut rng);
//!     assert_eq!(arm, expected);
//!     ucb.observe_reward(5.0, arm);
//! }
//! ```

#![forbid(unsafe_code)]

mod averager;
pub use averager::*;

mod average;
pub use average::*;

mod switch;
pub use switch::*;

mod algorithm;
pub use algorithm::*;

mod epsilon;
pub use epsilon::EpsilonGreedy;

mod softmax;
pub use softmax::*;

mod ucb1;
pub use ucb1::*;

mod error;
pub use error::*;

mod config;
pub use config::*;

mod clock;
pub use clock::*;

mod adaptation;
pub use adaptation::*;

mod bandit_strategy;
pub use bandit_strategy::*;

mod scheduler;
pub use scheduler::*;
