//! A [`Strategy`] backed by a bandit over an [`OptionSwitch`].
//!
//! Each cycle:
//! 1. Do nothing before `not_before_day`.
//! 2. Credit the reward earned by the currently sensed option to its arm (options
//!    outside the switch are not credited; neither are non-finite rewards).
//! 3. With probability `inertia`, stop here and keep the current option.
//! 4. Let the bandit choose an arm and propose the option behind it, unless it is
//!    the current one.

use rand::rngs::StdRng;
use rand::Rng;
use tracing::trace;

use crate::{Bandit, BanditAlgorithm, Clock, ConfigError, OptionSwitch, Strategy};

type ToGroup<T> = Box<dyn Fn(&T) -> Option<usize>>;
type FromGroup<T> = Box<dyn Fn(usize) -> T>;
type Reward<A, M> = Box<dyn Fn(&A, &M) -> f64>;

pub struct BanditStrategy<A, M, T, B = Bandit> {
    bandit: B,
    switch: OptionSwitch,
    to_group: ToGroup<T>,
    from_group: FromGroup<T>,
    reward: Reward<A, M>,
    inertia: f64,
    not_before_day: u64,
}

impl<A, M, T, B: BanditAlgorithm> BanditStrategy<A, M, T, B> {
    /// Panics if the switch and the bandit disagree on the number of arms.
    pub fn new(
        bandit: B,
        switch: OptionSwitch,
        to_group: impl Fn(&T) -> Option<usize> + 'static,
        from_group: impl Fn(usize) -> T + 'static,
        reward: impl Fn(&A, &M) -> f64 + 'static,
    ) -> Self {
        match Self::try_new(bandit, switch, to_group, from_group, reward) {
            Ok(s) => s,
            Err(e) => panic!("{e}"),
        }
    }

    pub fn try_new(
        bandit: B,
        switch: OptionSwitch,
        to_group: impl Fn(&T) -> Option<usize> + 'static,
        from_group: impl Fn(usize) -> T + 'static,
        reward: impl Fn(&A, &M) -> f64 + 'static,
    ) -> Result<Self, ConfigError> {
        if switch.number_of_arms() != bandit.number_of_arms() {
            return Err(ConfigError::ArmCountMismatch {
                switch: switch.number_of_arms(),
                bandit: bandit.number_of_arms(),
            });
        }
        Ok(Self {
            bandit,
            switch,
            to_group: Box::new(to_group),
            from_group: Box::new(from_group),
            reward: Box::new(reward),
            inertia: 0.0,
            not_before_day: 0,
        })
    }

    /// Probability of skipping a cycle that would otherwise adapt.
    ///
    /// Panics unless `inertia` lies in `[0, 1]`.
    pub fn with_inertia(mut self, inertia: f64) -> Self {
        assert!(
            (0.0..=1.0).contains(&inertia),
            "inertia must be a probability in [0, 1], got {inertia}"
        );
        self.inertia = inertia;
        self
    }

    /// Stay idle until the simulation reaches `day`.
    pub fn not_before_day(mut self, day: u64) -> Self {
        self.not_before_day = day;
        self
    }

    pub fn bandit(&self) -> &B {
        &self.bandit
    }

    pub fn switch(&self) -> &OptionSwitch {
        &self.switch
    }

    pub fn inertia(&self) -> f64 {
        self.inertia
    }

    /// Arm behind `value`, if it maps to a valid group.
    pub fn arm_of(&self, value: &T) -> Option<usize> {
        (self.to_group)(value).and_then(|g| self.switch.arm(g))
    }

    /// Credit `reward` to whichever arm `value` maps to, e.g. a peer's last trip.
    ///
    /// Returns whether the reward was recorded.
    pub fn observe_option(&mut self, value: &T, reward: f64) -> bool {
        if !reward.is_finite() {
            return false;
        }
        match self.arm_of(value) {
            Some(arm) => {
                self.bandit.observe_reward(reward, arm);
                true
            }
            None => false,
        }
    }
}

impl<A, M, T, B> Strategy<A, M, T> for BanditStrategy<A, M, T, B>
where
    M: Clock,
    T: PartialEq,
    B: BanditAlgorithm,
{
    fn propose(&mut self, agent: &A, model: &M, current: &T, rng: &mut StdRng) -> Option<T> {
        if model.day() < self.not_before_day {
            return None;
        }
        let reward = (self.reward)(agent, model);
        self.observe_option(current, reward);

        if self.inertia > 0.0 && rng.random_bool(self.inertia) {
            return None;
        }

        let arm = self.bandit.choose_arm(rng);
        let group = self.switch.group(arm);
        trace!(arm, group, "bandit chose");
        let next = (self.from_group)(group);
        if next == *current {
            None
        } else {
            Some(next)
        }
    }
}
