//! End-to-end scenarios: fishers choosing ports through bandit-backed adaptations,
//! driven by the reference day clock.

use banditry::{
    Adaptation, AveragerConfig, Bandit, BanditAlgorithm, BanditConfig, BanditStrategy, Clock,
    DailyScheduler, DayClock, FnStrategy, ListenerId, OptionSwitch, PerTripScheduler,
    RepeatHandle, SensedAdaptation, TripEvents, TripListeners,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

// ---------------------------------------------------------------------------
// A tiny fishery
// ---------------------------------------------------------------------------

/// Group 3 is a closed port: it pays best but must never be chosen.
const PORT_VALUE: [f64; 5] = [1.0, 2.0, 9.0, 100.0, 1.5];
const CLOSED_PORT: usize = 3;

struct World {
    clock: DayClock,
}

impl Clock for World {
    fn day(&self) -> u64 {
        self.clock.day()
    }

    fn schedule_repeating(&mut self, start_offset_days: u64, interval_days: u64) -> RepeatHandle {
        self.clock.schedule_repeating(start_offset_days, interval_days)
    }

    fn cancel(&mut self, handle: RepeatHandle) {
        self.clock.cancel(handle);
    }

    fn derive_seed(&mut self) -> u64 {
        self.clock.derive_seed()
    }
}

#[derive(Debug, Default)]
struct Fisher {
    port: usize,
    gear: u32,
    last_profit: f64,
    relocations: u32,
    retired: bool,
    trips: TripListeners,
}

impl TripEvents for Fisher {
    fn add_trip_listener(&mut self) -> ListenerId {
        self.trips.add_trip_listener()
    }

    fn remove_trip_listener(&mut self, id: ListenerId) {
        self.trips.remove_trip_listener(id);
    }
}

struct Vessel {
    fisher: Fisher,
    /// The fisher's private stream: the only randomness adaptations see.
    rng: StdRng,
    /// Catch noise, kept apart from the decision stream.
    sea: StdRng,
    daily: DailyScheduler<Fisher, World>,
    per_trip: PerTripScheduler<Fisher, World>,
    ports: Vec<usize>,
}

impl Vessel {
    fn new(seed: u64, period: u64) -> Self {
        Self {
            fisher: Fisher::default(),
            rng: StdRng::seed_from_u64(seed),
            sea: StdRng::seed_from_u64(seed ^ 0xC0FFEE),
            daily: DailyScheduler::new(period),
            per_trip: PerTripScheduler::new(),
            ports: Vec::new(),
        }
    }

    fn go_fishing(&mut self, noise: &Normal<f64>) {
        self.fisher.last_profit = PORT_VALUE[self.fisher.port] + noise.sample(&mut self.sea);
        self.ports.push(self.fisher.port);
    }
}

fn port_switch() -> OptionSwitch {
    OptionSwitch::new(PORT_VALUE.len(), |g| g != CLOSED_PORT)
}

fn port_adaptation(bandit: Bandit) -> Box<dyn Adaptation<Fisher, World>> {
    let strategy = BanditStrategy::new(
        bandit,
        port_switch(),
        |port: &usize| Some(*port),
        |group| group,
        |f: &Fisher, _: &World| f.last_profit,
    );
    Box::new(SensedAdaptation::new(
        |f: &Fisher| f.port,
        |f: &mut Fisher, port: usize, _: &mut World| {
            assert_ne!(port, CLOSED_PORT);
            f.port = port;
            f.relocations += 1;
        },
        |f: &Fisher| !f.retired,
        strategy,
    ))
}

fn bandit(cfg: BanditConfig, averager: AveragerConfig) -> Bandit {
    cfg.build(port_switch().number_of_arms(), &averager).unwrap()
}

/// One day: every active vessel fishes, then due schedulers step.
fn run_day(world: &mut World, fleet: &mut [Vessel], noise: &Normal<f64>) {
    let due = world.clock.advance();
    for v in fleet.iter_mut() {
        if !v.fisher.retired {
            v.go_fishing(noise);
        }
    }
    for h in due {
        for v in fleet.iter_mut() {
            let Vessel {
                fisher, rng, daily, ..
            } = v;
            daily.fire(h, fisher, world, rng);
        }
    }
}

fn share_at(ports: &[usize], port: usize) -> f64 {
    ports.iter().filter(|&&p| p == port).count() as f64 / ports.len() as f64
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[test]
fn per_trip_epsilon_greedy_settles_on_the_best_open_port() {
    let mut world = World {
        clock: DayClock::new(1),
    };
    let noise = Normal::new(0.0, 0.5).unwrap();
    let mut v = Vessel::new(17, 1);
    let b = bandit(
        BanditConfig::EpsilonGreedy {
            exploration_rate: 0.1,
        },
        AveragerConfig::Exponential { alpha: 0.3 },
    );
    {
        let Vessel {
            fisher, per_trip, ..
        } = &mut v;
        per_trip.register(port_adaptation(b), &mut world, fisher);
        per_trip.start(&mut world, fisher);
    }

    for _ in 0..600 {
        v.go_fishing(&noise);
        let Vessel {
            fisher,
            rng,
            per_trip,
            ..
        } = &mut v;
        per_trip.trip_finished(fisher, &mut world, rng);
    }

    assert!(!v.ports.contains(&CLOSED_PORT));
    let late = &v.ports[400..];
    assert!(share_at(late, 2) > 0.75, "share={}", share_at(late, 2));
}

#[test]
fn per_trip_ucb1_concentrates_after_cold_start() {
    let mut world = World {
        clock: DayClock::new(2),
    };
    let noise = Normal::new(0.0, 0.5).unwrap();
    let mut v = Vessel::new(99, 1);
    let b = bandit(
        BanditConfig::Ucb1 {
            minimum_reward: 0.0,
            maximum_reward: 10.0,
        },
        AveragerConfig::Mean,
    );
    {
        let Vessel {
            fisher, per_trip, ..
        } = &mut v;
        per_trip.start(&mut world, fisher);
        per_trip.register(port_adaptation(b), &mut world, fisher);
    }

    for _ in 0..1_000 {
        v.go_fishing(&noise);
        let Vessel {
            fisher,
            rng,
            per_trip,
            ..
        } = &mut v;
        per_trip.trip_finished(fisher, &mut world, rng);
    }

    // Cold start visits ports 0, 1, 2, 4 in arm order (port 0 is the start).
    assert_eq!(&v.ports[..4], &[0, 1, 2, 4]);
    let late = &v.ports[800..];
    assert!(share_at(late, 2) > 0.8, "share={}", share_at(late, 2));
}

fn run_daily_fleet(fleet_size: usize, days: usize) -> Vec<Vec<usize>> {
    let mut world = World {
        clock: DayClock::new(7),
    };
    let noise = Normal::new(0.0, 1.0).unwrap();
    let mut fleet: Vec<Vessel> = (0..fleet_size)
        .map(|i| Vessel::new(1_000 + i as u64, 5))
        .collect();
    for v in fleet.iter_mut() {
        let Vessel { fisher, daily, .. } = v;
        let b = bandit(BanditConfig::softmax(), AveragerConfig::default());
        daily.register(port_adaptation(b), &mut world, fisher);
        daily.start(&mut world, fisher);
    }
    for _ in 0..days {
        run_day(&mut world, &mut fleet, &noise);
    }
    fleet.into_iter().map(|v| v.ports).collect()
}

#[test]
fn an_agents_history_does_not_depend_on_fleet_size() {
    let alone = run_daily_fleet(1, 200);
    let crowded = run_daily_fleet(4, 200);
    assert_eq!(alone[0], crowded[0]);
    assert_eq!(alone, run_daily_fleet(1, 200));
}

#[test]
fn daily_adaptation_only_moves_on_its_cadence() {
    let mut world = World {
        clock: DayClock::new(3),
    };
    let noise = Normal::new(0.0, 1.0).unwrap();
    let mut fleet = vec![Vessel::new(5, 10)];
    {
        let Vessel { fisher, daily, .. } = &mut fleet[0];
        let b = bandit(
            BanditConfig::EpsilonGreedy {
                exploration_rate: 1.0,
            },
            AveragerConfig::Mean,
        );
        daily.register(port_adaptation(b), &mut world, fisher);
        daily.start(&mut world, fisher);
    }
    for _ in 0..100 {
        run_day(&mut world, &mut fleet, &noise);
    }
    let ports = &fleet[0].ports;
    for (day, pair) in ports.windows(2).enumerate() {
        if pair[0] != pair[1] {
            // `ports[i]` is the port fished on day i + 1; adaptation runs after fishing.
            assert_eq!((day + 1) % 10, 0, "moved after day {}", day + 1);
        }
    }
    assert!(fleet[0].fisher.relocations > 0);
}

#[test]
fn retiring_a_fisher_cancels_its_schedule() {
    let mut world = World {
        clock: DayClock::new(4),
    };
    let noise = Normal::new(0.0, 1.0).unwrap();
    let mut fleet: Vec<Vessel> = (0..2).map(|i| Vessel::new(i, 3)).collect();
    for v in fleet.iter_mut() {
        let Vessel { fisher, daily, .. } = v;
        let b = bandit(
            BanditConfig::EpsilonGreedy {
                exploration_rate: 1.0,
            },
            AveragerConfig::Mean,
        );
        daily.register(port_adaptation(b), &mut world, fisher);
        daily.start(&mut world, fisher);
    }
    assert_eq!(world.clock.outstanding(), 2);
    for _ in 0..30 {
        run_day(&mut world, &mut fleet, &noise);
    }

    {
        let Vessel { fisher, daily, .. } = &mut fleet[0];
        fisher.retired = true;
        daily.turn_off(fisher, &mut world);
        assert!(daily.is_empty());
        assert_eq!(daily.handle(), None);
    }
    assert_eq!(world.clock.outstanding(), 1);

    let frozen = fleet[0].fisher.relocations;
    for _ in 0..30 {
        run_day(&mut world, &mut fleet, &noise);
    }
    assert_eq!(fleet[0].fisher.relocations, frozen);

    // Coming back re-creates the schedule.
    let Vessel { fisher, daily, .. } = &mut fleet[0];
    fisher.retired = false;
    let b = bandit(BanditConfig::default(), AveragerConfig::Mean);
    daily.register(port_adaptation(b), &mut world, fisher);
    assert_eq!(world.clock.outstanding(), 2);
}

#[test]
fn invalid_fishers_are_never_actuated_by_the_scheduler() {
    let mut world = World {
        clock: DayClock::new(5),
    };
    let noise = Normal::new(0.0, 1.0).unwrap();
    let mut fleet = vec![Vessel::new(8, 1)];
    {
        let Vessel { fisher, daily, .. } = &mut fleet[0];
        fisher.retired = true;
        let b = bandit(
            BanditConfig::EpsilonGreedy {
                exploration_rate: 1.0,
            },
            AveragerConfig::Mean,
        );
        daily.register(port_adaptation(b), &mut world, fisher);
        daily.start(&mut world, fisher);
    }
    for _ in 0..50 {
        run_day(&mut world, &mut fleet, &noise);
    }
    assert_eq!(fleet[0].fisher.relocations, 0);
}

#[test]
fn several_adaptations_replay_identically_under_one_seed() {
    fn run() -> Vec<(usize, u32)> {
        let mut world = World {
            clock: DayClock::new(11),
        };
        let noise = Normal::new(0.0, 1.0).unwrap();
        let mut fleet = vec![Vessel::new(21, 2)];
        {
            let Vessel { fisher, daily, .. } = &mut fleet[0];
            let b = bandit(BanditConfig::softmax(), AveragerConfig::Mean);
            daily.register(port_adaptation(b), &mut world, fisher);
            let gear = SensedAdaptation::new(
                |f: &Fisher| f.gear,
                |f: &mut Fisher, gear: u32, _: &mut World| f.gear = gear,
                |_: &Fisher| true,
                FnStrategy(|_: &Fisher, _: &World, _: &u32, rng: &mut StdRng| {
                    Some(rng.random_range(0..4u32))
                }),
            );
            daily.register(Box::new(gear), &mut world, fisher);
            daily.start(&mut world, fisher);
        }
        let mut history = Vec::new();
        for _ in 0..120 {
            run_day(&mut world, &mut fleet, &noise);
            history.push((fleet[0].fisher.port, fleet[0].fisher.gear));
        }
        history
    }
    assert_eq!(run(), run());
}

#[test]
fn peer_observations_steer_a_shared_population_bandit() {
    use std::cell::RefCell;
    use std::rc::Rc;

    let shared = Rc::new(RefCell::new(bandit(
        BanditConfig::EpsilonGreedy {
            exploration_rate: 0.0,
        },
        AveragerConfig::Mean,
    )));
    let mut scout: BanditStrategy<Fisher, World, usize, _> = BanditStrategy::new(
        Rc::clone(&shared),
        port_switch(),
        |port: &usize| Some(*port),
        |group| group,
        |f: &Fisher, _: &World| f.last_profit,
    );
    // A friend reports a great trip out of port 4; the closed port is ignored.
    assert!(scout.observe_option(&4, 50.0));
    assert!(!scout.observe_option(&CLOSED_PORT, 500.0));

    let mut rng = StdRng::seed_from_u64(0);
    let arm = shared.borrow_mut().choose_arm(&mut rng);
    assert_eq!(port_switch().group(arm), 4);
    assert_eq!(shared.borrow().observations(arm), 1);
}
