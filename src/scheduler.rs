//! When adaptations run: every `period` days, or after every finished trip.
//!
//! Both schedulers own the adaptations registered for one agent. The engine keeps
//! the agent, its private RNG stream and the schedulers side by side and steps the
//! schedulers when their cadence comes up:
//!
//! - [`DailyScheduler`] holds at most one repeating clock registration, created
//!   lazily and canceled on [`turn_off`](DailyScheduler::turn_off). Evaluation
//!   order is reshuffled every step from a seed derived from the simulation.
//! - [`PerTripScheduler`] listens to the agent's trip-finished notifications and
//!   evaluates adaptations in registration order.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::{debug, trace};

use crate::{Adaptation, Clock, ListenerId, RepeatHandle, TripEvents};

/// Identifies a registered adaptation within its scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AdaptationId(pub u64);

type Boxed<A, M> = Box<dyn Adaptation<A, M>>;

struct Entry<A, M> {
    id: AdaptationId,
    adaptation: Boxed<A, M>,
    started: bool,
}

/// Registration-ordered list of adaptations shared by both schedulers.
///
/// Each entry remembers whether it was started, so starting the scheduler again
/// only starts what was registered since.
struct Registry<A, M> {
    next_id: u64,
    entries: Vec<Entry<A, M>>,
}

impl<A, M> Registry<A, M> {
    fn new() -> Self {
        Self {
            next_id: 0,
            entries: Vec::new(),
        }
    }

    fn push(&mut self, adaptation: Boxed<A, M>) -> AdaptationId {
        let id = AdaptationId(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry {
            id,
            adaptation,
            started: false,
        });
        id
    }

    fn remove(&mut self, id: AdaptationId) -> Option<Boxed<A, M>> {
        let idx = self.entries.iter().position(|e| e.id == id)?;
        Some(self.entries.remove(idx).adaptation)
    }

    fn start_pending(&mut self, model: &mut M, agent: &mut A) {
        for e in self.entries.iter_mut().filter(|e| !e.started) {
            e.started = true;
            e.adaptation.start(model, agent);
        }
    }

    fn turn_off_all(&mut self, agent: &mut A) {
        for mut e in self.entries.drain(..) {
            e.adaptation.turn_off(agent);
        }
    }
}

/// Runs its adaptations every `period` simulated days.
pub struct DailyScheduler<A, M> {
    period: u64,
    registry: Registry<A, M>,
    handle: Option<RepeatHandle>,
    started: bool,
}

impl<A, M: Clock> DailyScheduler<A, M> {
    /// Panics if `period_days == 0`.
    pub fn new(period_days: u64) -> Self {
        assert!(period_days > 0, "adaptation period must be at least one day");
        Self {
            period: period_days,
            registry: Registry::new(),
            handle: None,
            started: false,
        }
    }

    pub fn period(&self) -> u64 {
        self.period
    }

    /// Outstanding clock registration, if any.
    pub fn handle(&self) -> Option<RepeatHandle> {
        self.handle
    }

    pub fn len(&self) -> usize {
        self.registry.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.entries.is_empty()
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Start every registered adaptation and, if there are any, the recurring step.
    pub fn start(&mut self, model: &mut M, agent: &mut A) {
        self.started = true;
        if self.registry.entries.is_empty() {
            return;
        }
        self.registry.start_pending(model, agent);
        self.ensure_scheduled(model);
    }

    /// Add an adaptation; once the scheduler has started it starts immediately.
    pub fn register(
        &mut self,
        adaptation: Box<dyn Adaptation<A, M>>,
        model: &mut M,
        agent: &mut A,
    ) -> AdaptationId {
        let id = self.registry.push(adaptation);
        if self.started {
            self.registry.start_pending(model, agent);
            self.ensure_scheduled(model);
        }
        id
    }

    /// Unregister without turning the adaptation off; the caller gets it back.
    pub fn remove(&mut self, id: AdaptationId) -> Option<Box<dyn Adaptation<A, M>>> {
        self.registry.remove(id)
    }

    /// Step if `handle` is this scheduler's registration. Returns whether it stepped.
    pub fn fire(
        &mut self,
        handle: RepeatHandle,
        agent: &mut A,
        model: &mut M,
        rng: &mut StdRng,
    ) -> bool {
        if self.handle != Some(handle) {
            return false;
        }
        self.step(agent, model, rng);
        true
    }

    /// Adapt once, in an order shuffled from a simulation-derived seed.
    ///
    /// `rng` is the agent's own stream; it is the only randomness adaptations see.
    pub fn step(&mut self, agent: &mut A, model: &mut M, rng: &mut StdRng) {
        let n = self.registry.entries.len();
        trace!(day = model.day(), adaptations = n, "daily adaptation step");
        let mut order: Vec<usize> = (0..n).collect();
        if n > 1 {
            let mut shuffler = StdRng::seed_from_u64(model.derive_seed());
            order.shuffle(&mut shuffler);
        }
        for i in order {
            self.registry.entries[i].adaptation.adapt(agent, model, rng);
        }
    }

    /// Cancel the recurring step and drop every adaptation (turning each off).
    pub fn turn_off(&mut self, agent: &mut A, model: &mut M) {
        if let Some(handle) = self.handle.take() {
            debug!(?handle, "canceling adaptation schedule");
            model.cancel(handle);
        }
        self.registry.turn_off_all(agent);
    }

    fn ensure_scheduled(&mut self, model: &mut M) {
        if self.handle.is_none() {
            let handle = model.schedule_repeating(self.period, self.period);
            debug!(?handle, period = self.period, "scheduled adaptation");
            self.handle = Some(handle);
        }
    }
}

/// Runs its adaptations whenever the agent finishes a trip.
pub struct PerTripScheduler<A, M> {
    registry: Registry<A, M>,
    listener: Option<ListenerId>,
    started: bool,
}

impl<A: TripEvents, M> PerTripScheduler<A, M> {
    pub fn new() -> Self {
        Self {
            registry: Registry::new(),
            listener: None,
            started: false,
        }
    }

    /// Current trip listener registration, if any.
    pub fn listener(&self) -> Option<ListenerId> {
        self.listener
    }

    pub fn len(&self) -> usize {
        self.registry.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.entries.is_empty()
    }

    /// Listen to the agent's trips and start every registered adaptation.
    pub fn start(&mut self, model: &mut M, agent: &mut A) {
        self.started = true;
        self.ensure_listening(agent);
        self.registry.start_pending(model, agent);
    }

    pub fn register(
        &mut self,
        adaptation: Box<dyn Adaptation<A, M>>,
        model: &mut M,
        agent: &mut A,
    ) -> AdaptationId {
        let id = self.registry.push(adaptation);
        if self.started {
            self.registry.start_pending(model, agent);
            self.ensure_listening(agent);
        }
        id
    }

    pub fn remove(&mut self, id: AdaptationId) -> Option<Box<dyn Adaptation<A, M>>> {
        self.registry.remove(id)
    }

    /// Trip-finished notification. Ignored unless the scheduler is listening.
    pub fn trip_finished(&mut self, agent: &mut A, model: &mut M, rng: &mut StdRng) {
        if self.listener.is_none() {
            return;
        }
        trace!(adaptations = self.registry.entries.len(), "per-trip adaptation step");
        for e in &mut self.registry.entries {
            e.adaptation.adapt(agent, model, rng);
        }
    }

    /// Stop listening and drop every adaptation (turning each off).
    pub fn turn_off(&mut self, agent: &mut A) {
        if let Some(id) = self.listener.take() {
            agent.remove_trip_listener(id);
        }
        self.registry.turn_off_all(agent);
    }

    fn ensure_listening(&mut self, agent: &mut A) {
        if self.listener.is_none() {
            self.listener = Some(agent.add_trip_listener());
        }
    }
}

impl<A: TripEvents, M> Default for PerTripScheduler<A, M> {
    fn default() -> Self {
        Self::new()
    }
}
