//! A small fleet choosing landing ports with softmax bandits, re-evaluated every
//! 30 simulated days.
//!
//! Run with `RUST_LOG=banditry=debug` to see every relocation.

use banditry::{
    Adaptation, AveragerConfig, Bandit, BanditConfig, BanditStrategy, Clock,
    DailyScheduler, DayClock, OptionSwitch, RepeatHandle, SensedAdaptation,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing_subscriber::EnvFilter;

/// Daily landing value per port; port 2 is closed for the season.
const PORT_VALUE: [f64; 6] = [3.0, 5.0, 40.0, 8.0, 4.0, 6.5];

struct Harbor {
    clock: DayClock,
}

impl Clock for Harbor {
    fn day(&self) -> u64 {
        self.clock.day()
    }

    fn schedule_repeating(&mut self, start_offset_days: u64, interval_days: u64) -> RepeatHandle {
        self.clock.schedule_repeating(start_offset_days, interval_days)
    }

    fn cancel(&mut self, handle: RepeatHandle) {
        self.clock.cancel(handle)
    }

    fn derive_seed(&mut self) -> u64 {
        self.clock.derive_seed()
    }
}

#[derive(Debug, Default)]
struct Skipper {
    port: usize,
    /// Landings accumulated since the last re-evaluation.
    earnings: f64,
    days: u32,
}

struct Boat {
    skipper: Skipper,
    rng: StdRng,
    weather: StdRng,
    schedule: DailyScheduler<Skipper, Harbor>,
}

fn open_ports() -> OptionSwitch {
    OptionSwitch::new(PORT_VALUE.len(), |port| port != 2)
}

fn port_adaptation(bandit: Bandit) -> Box<dyn Adaptation<Skipper, Harbor>> {
    let strategy = BanditStrategy::new(
        bandit,
        open_ports(),
        |port: &usize| Some(*port),
        |port| port,
        |s: &Skipper, _: &Harbor| {
            if s.days == 0 {
                f64::NAN
            } else {
                s.earnings / f64::from(s.days)
            }
        },
    )
    .with_inertia(0.1)
    .not_before_day(30);
    Box::new(SensedAdaptation::new(
        |s: &Skipper| s.port,
        |s: &mut Skipper, port: usize, _: &mut Harbor| {
            s.port = port;
        },
        |s: &Skipper| s.days > 0,
        strategy,
    ))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut harbor = Harbor {
        clock: DayClock::new(2024),
    };
    let config = BanditConfig::Softmax {
        initial_temperature: 20.0,
        temperature_decay: 0.9,
    };

    let mut fleet: Vec<Boat> = (0..8u64)
        .map(|i| Boat {
            skipper: Skipper::default(),
            rng: StdRng::seed_from_u64(100 + i),
            weather: StdRng::seed_from_u64(900 + i),
            schedule: DailyScheduler::new(30),
        })
        .collect();

    for boat in fleet.iter_mut() {
        let bandit = config.build(open_ports().number_of_arms(), &AveragerConfig::Mean)?;
        let Boat {
            skipper, schedule, ..
        } = boat;
        schedule.register(port_adaptation(bandit), &mut harbor, skipper);
        schedule.start(&mut harbor, skipper);
    }

    for _ in 0..720 {
        let due = harbor.clock.advance();
        for boat in fleet.iter_mut() {
            let value = PORT_VALUE[boat.skipper.port];
            boat.skipper.earnings += value * boat.weather.random_range(0.5..1.5);
            boat.skipper.days += 1;
        }
        for handle in due {
            for boat in fleet.iter_mut() {
                let Boat {
                    skipper,
                    rng,
                    schedule,
                    ..
                } = boat;
                if schedule.fire(handle, skipper, &mut harbor, rng) {
                    skipper.earnings = 0.0;
                    skipper.days = 0;
                }
            }
        }
        if harbor.day() % 180 == 0 {
            let ports: Vec<usize> = fleet.iter().map(|b| b.skipper.port).collect();
            println!("day {:4}: ports {:?}", harbor.day(), ports);
        }
    }

    let best = fleet.iter().filter(|b| b.skipper.port == 3).count();
    println!("{best}/{} boats land at the best open port", fleet.len());
    Ok(())
}
