//! Sense / decide / actuate loop for one adapted quantity of one agent.
//!
//! An adaptation reads the agent's current choice through a [`Sensor`], asks a
//! [`Strategy`] for a replacement and, if the replacement differs, writes it back
//! through an [`Actuator`]. A validator gates the whole cycle; a rejected cycle, a
//! missing proposal or an unchanged value are ordinary outcomes and do nothing.

use std::fmt::Debug;

use rand::rngs::StdRng;
use tracing::debug;

/// Reads the current value of the adapted quantity.
pub trait Sensor<A, T> {
    fn scan(&self, agent: &A) -> T;
}

impl<A, T, F> Sensor<A, T> for F
where
    F: Fn(&A) -> T,
{
    fn scan(&self, agent: &A) -> T {
        self(agent)
    }
}

/// Applies a new value to the agent, with whatever side effects that implies.
pub trait Actuator<A, M, T> {
    fn apply(&mut self, agent: &mut A, value: T, model: &mut M);
}

impl<A, M, T, F> Actuator<A, M, T> for F
where
    F: FnMut(&mut A, T, &mut M),
{
    fn apply(&mut self, agent: &mut A, value: T, model: &mut M) {
        self(agent, value, model)
    }
}

/// Proposes the next value given the current one.
pub trait Strategy<A, M, T> {
    /// Called once when the owning adaptation starts.
    fn on_start(&mut self, _model: &mut M, _agent: &A, _current: &T) {}

    /// `None` means "leave the agent as it is this cycle".
    fn propose(&mut self, agent: &A, model: &M, current: &T, rng: &mut StdRng) -> Option<T>;
}

/// Adapter turning a closure into a [`Strategy`].
pub struct FnStrategy<F>(pub F);

impl<A, M, T, F> Strategy<A, M, T> for FnStrategy<F>
where
    F: FnMut(&A, &M, &T, &mut StdRng) -> Option<T>,
{
    fn propose(&mut self, agent: &A, model: &M, current: &T, rng: &mut StdRng) -> Option<T> {
        (self.0)(agent, model, current, rng)
    }
}

/// What a scheduler drives: start once, adapt on cadence, turn off at the end.
pub trait Adaptation<A, M> {
    fn start(&mut self, model: &mut M, agent: &mut A);

    fn adapt(&mut self, agent: &mut A, model: &mut M, rng: &mut StdRng);

    fn turn_off(&mut self, _agent: &mut A) {}
}

/// The generic sensor/strategy/actuator binder.
pub struct SensedAdaptation<A, M, T, S> {
    sensor: Box<dyn Sensor<A, T>>,
    actuator: Box<dyn Actuator<A, M, T>>,
    validator: Box<dyn Fn(&A) -> bool>,
    strategy: S,
    started: bool,
}

impl<A, M, T, S> SensedAdaptation<A, M, T, S>
where
    T: PartialEq + Debug,
    S: Strategy<A, M, T>,
{
    pub fn new(
        sensor: impl Sensor<A, T> + 'static,
        actuator: impl Actuator<A, M, T> + 'static,
        validator: impl Fn(&A) -> bool + 'static,
        strategy: S,
    ) -> Self {
        Self {
            sensor: Box::new(sensor),
            actuator: Box::new(actuator),
            validator: Box::new(validator),
            strategy,
            started: false,
        }
    }

    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    pub fn strategy_mut(&mut self) -> &mut S {
        &mut self.strategy
    }

    pub fn is_started(&self) -> bool {
        self.started
    }
}

impl<A, M, T, S> Adaptation<A, M> for SensedAdaptation<A, M, T, S>
where
    T: PartialEq + Debug,
    S: Strategy<A, M, T>,
{
    /// Binds the adaptation to its agent. Panics if called twice.
    fn start(&mut self, model: &mut M, agent: &mut A) {
        assert!(!self.started, "adaptation already started");
        self.started = true;
        let current = self.sensor.scan(agent);
        self.strategy.on_start(model, agent, &current);
    }

    fn adapt(&mut self, agent: &mut A, model: &mut M, rng: &mut StdRng) {
        assert!(self.started, "adapt called before start");
        if !(self.validator)(agent) {
            return;
        }
        let current = self.sensor.scan(agent);
        let Some(next) = self.strategy.propose(agent, model, &current, rng) else {
            return;
        };
        if next == current {
            return;
        }
        debug!(from = ?current, to = ?next, "adaptation actuated");
        self.actuator.apply(agent, next, model);
    }
}
