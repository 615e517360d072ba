//! Collaborator contracts with the surrounding simulation, plus small reference
//! implementations.
//!
//! The engine owns the clock and delivers callbacks one at a time in time order.
//! Schedulers never hold on to the clock: they register a repeating slot, keep the
//! returned [`RepeatHandle`], and are stepped by whoever drains the clock.

use std::collections::{BTreeMap, BTreeSet};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Cancelable registration of a repeating callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RepeatHandle(pub u64);

/// Registration on an agent's trip-finished notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ListenerId(pub u64);

/// Discrete simulation clock, counted in days.
pub trait Clock {
    /// Current simulated day.
    fn day(&self) -> u64;

    /// Fire every `interval_days`, first `start_offset_days` from now.
    fn schedule_repeating(&mut self, start_offset_days: u64, interval_days: u64) -> RepeatHandle;

    /// Stop a repeating registration. Unknown handles are ignored.
    fn cancel(&mut self, handle: RepeatHandle);

    /// A fresh seed drawn from the simulation's own seeded stream.
    fn derive_seed(&mut self) -> u64;
}

/// Source of "a trip just finished" notifications.
pub trait TripEvents {
    fn add_trip_listener(&mut self) -> ListenerId;

    fn remove_trip_listener(&mut self, id: ListenerId);
}

#[derive(Debug, Clone, Copy)]
struct Repeating {
    next_day: u64,
    interval: u64,
}

/// Deterministic day clock with cancelable repeating registrations.
///
/// [`advance`](DayClock::advance) moves to the next day and returns the handles
/// due on it, in registration order. A registration that is already overdue fires
/// once and keeps its original phase.
#[derive(Debug, Clone)]
pub struct DayClock {
    day: u64,
    next_handle: u64,
    repeating: BTreeMap<RepeatHandle, Repeating>,
    rng: StdRng,
}

impl DayClock {
    pub fn new(seed: u64) -> Self {
        Self {
            day: 0,
            next_handle: 0,
            repeating: BTreeMap::new(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Move to tomorrow and return the handles due then.
    pub fn advance(&mut self) -> Vec<RepeatHandle> {
        self.day += 1;
        let today = self.day;
        let mut due = Vec::new();
        for (&handle, r) in self.repeating.iter_mut() {
            if r.next_day <= today {
                due.push(handle);
                while r.next_day <= today {
                    r.next_day += r.interval;
                }
            }
        }
        due
    }

    pub fn is_scheduled(&self, handle: RepeatHandle) -> bool {
        self.repeating.contains_key(&handle)
    }

    /// Number of live repeating registrations.
    pub fn outstanding(&self) -> usize {
        self.repeating.len()
    }
}

impl Clock for DayClock {
    fn day(&self) -> u64 {
        self.day
    }

    fn schedule_repeating(&mut self, start_offset_days: u64, interval_days: u64) -> RepeatHandle {
        assert!(interval_days > 0, "repeating interval must be at least one day");
        let handle = RepeatHandle(self.next_handle);
        self.next_handle += 1;
        self.repeating.insert(
            handle,
            Repeating {
                next_day: self.day + start_offset_days,
                interval: interval_days,
            },
        );
        handle
    }

    fn cancel(&mut self, handle: RepeatHandle) {
        self.repeating.remove(&handle);
    }

    fn derive_seed(&mut self) -> u64 {
        self.rng.random()
    }
}

/// Listener registry an agent can embed to implement [`TripEvents`].
#[derive(Debug, Clone, Default)]
pub struct TripListeners {
    next: u64,
    active: BTreeSet<ListenerId>,
}

impl TripListeners {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: ListenerId) -> bool {
        self.active.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}

impl TripEvents for TripListeners {
    fn add_trip_listener(&mut self) -> ListenerId {
        let id = ListenerId(self.next);
        self.next += 1;
        self.active.insert(id);
        id
    }

    fn remove_trip_listener(&mut self, id: ListenerId) {
        self.active.remove(&id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeating_registrations_fire_on_their_cadence() {
        let mut clock = DayClock::new(0);
        let every_two = clock.schedule_repeating(0, 2);
        let every_three = clock.schedule_repeating(1, 3);
        let mut fired: Vec<(u64, RepeatHandle)> = Vec::new();
        for _ in 0..7 {
            let due = clock.advance();
            let day = clock.day();
            fired.extend(due.into_iter().map(|h| (day, h)));
        }
        assert_eq!(
            fired,
            vec![
                (1, every_two),
                (1, every_three),
                (2, every_two),
                (4, every_two),
                (4, every_three),
                (6, every_two),
                (7, every_three),
            ]
        );
    }

    #[test]
    fn overdue_registrations_keep_their_phase() {
        let mut clock = DayClock::new(0);
        for _ in 0..3 {
            clock.advance();
        }
        // Anchored on day 0 with a period of 4: due on days 4, 8, 12, ...
        let h = clock.schedule_repeating(0, 4);
        if let Some(r) = clock.repeating.get_mut(&h) {
            r.next_day = 0;
        }
        let mut fired = Vec::new();
        for _ in 0..10 {
            if clock.advance().contains(&h) {
                fired.push(clock.day());
            }
        }
        assert_eq!(fired, vec![4, 8, 12]);
    }

    #[test]
    fn canceled_handles_stop_firing() {
        let mut clock = DayClock::new(0);
        let h = clock.schedule_repeating(0, 1);
        assert_eq!(clock.advance(), vec![h]);
        clock.cancel(h);
        assert!(!clock.is_scheduled(h));
        assert!(clock.advance().is_empty());
        assert_eq!(clock.outstanding(), 0);
    }

    #[test]
    fn derived_seeds_are_reproducible() {
        let mut a = DayClock::new(42);
        let mut b = DayClock::new(42);
        assert_eq!(a.derive_seed(), b.derive_seed());
    }

    #[test]
    fn listener_ids_are_unique() {
        let mut l = TripListeners::new();
        let a = l.add_trip_listener();
        let b = l.add_trip_listener();
        assert_ne!(a, b);
        l.remove_trip_listener(a);
        assert!(!l.contains(a) && l.contains(b));
        assert_eq!(l.len(), 1);
    }
}
