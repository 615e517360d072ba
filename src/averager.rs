//! Online reward estimators for a single arm.
//!
//! Every bandit keeps one estimator per arm. The estimate is undefined before the
//! first observation: all estimators here report `NaN` until then, and callers that
//! rank arms must treat a non-finite estimate as neutral.

use std::collections::VecDeque;

/// A smoothed scalar estimate fed by a stream of reward observations.
pub trait RewardAverager {
    /// Fold one observation into the estimate.
    fn add_observation(&mut self, value: f64);

    /// Current estimate (`NaN` before any observation).
    fn smoothed_observation(&self) -> f64;
}

/// Plain arithmetic mean: every observation weighs the same.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IterativeAverage {
    mean: f64,
    count: u64,
}

impl IterativeAverage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of observations folded in so far.
    pub fn count(&self) -> u64 {
        self.count
    }
}

impl RewardAverager for IterativeAverage {
    fn add_observation(&mut self, value: f64) {
        self.count = self.count.saturating_add(1);
        self.mean += (value - self.mean) / self.count as f64;
    }

    fn smoothed_observation(&self) -> f64 {
        if self.count == 0 {
            f64::NAN
        } else {
            self.mean
        }
    }
}

/// Exponential smoothing: `estimate += alpha * (reward - estimate)`.
///
/// The first observation initializes the estimate exactly.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExponentialMovingAverage {
    alpha: f64,
    estimate: Option<f64>,
}

impl ExponentialMovingAverage {
    /// Panics unless `alpha` lies in `(0, 1)`.
    pub fn new(alpha: f64) -> Self {
        assert!(
            alpha > 0.0 && alpha < 1.0,
            "smoothing factor must lie in (0, 1), got {alpha}"
        );
        Self {
            alpha,
            estimate: None,
        }
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }
}

impl RewardAverager for ExponentialMovingAverage {
    fn add_observation(&mut self, value: f64) {
        self.estimate = Some(match self.estimate {
            None => value,
            Some(e) => e + self.alpha * (value - e),
        });
    }

    fn smoothed_observation(&self) -> f64 {
        self.estimate.unwrap_or(f64::NAN)
    }
}

/// Arithmetic mean over the most recent `window` observations.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MovingAverage {
    window: usize,
    buf: VecDeque<f64>,
    sum: f64,
}

impl MovingAverage {
    /// Panics if `window == 0`.
    pub fn new(window: usize) -> Self {
        assert!(window > 0, "moving average window must be positive");
        Self {
            window,
            buf: VecDeque::with_capacity(window),
            sum: 0.0,
        }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Number of observations currently retained.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}

impl RewardAverager for MovingAverage {
    fn add_observation(&mut self, value: f64) {
        if self.buf.len() == self.window {
            if let Some(old) = self.buf.pop_front() {
                self.sum -= old;
            }
        }
        self.buf.push_back(value);
        self.sum += value;
    }

    fn smoothed_observation(&self) -> f64 {
        if self.buf.is_empty() {
            return f64::NAN;
        }
        self.sum / self.buf.len() as f64
    }
}

/// The closed set of averaging policies a scenario can pick from.
///
/// Callers needing something else can instantiate `BanditAverage` with their own
/// [`RewardAverager`] type instead.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Averager {
    Iterative(IterativeAverage),
    Exponential(ExponentialMovingAverage),
    Moving(MovingAverage),
}

impl RewardAverager for Averager {
    fn add_observation(&mut self, value: f64) {
        match self {
            Averager::Iterative(a) => a.add_observation(value),
            Averager::Exponential(a) => a.add_observation(value),
            Averager::Moving(a) => a.add_observation(value),
        }
    }

    fn smoothed_observation(&self) -> f64 {
        match self {
            Averager::Iterative(a) => a.smoothed_observation(),
            Averager::Exponential(a) => a.smoothed_observation(),
            Averager::Moving(a) => a.smoothed_observation(),
        }
    }
}

impl From<IterativeAverage> for Averager {
    fn from(a: IterativeAverage) -> Self {
        Averager::Iterative(a)
    }
}

impl From<ExponentialMovingAverage> for Averager {
    fn from(a: ExponentialMovingAverage) -> Self {
        Averager::Exponential(a)
    }
}

impl From<MovingAverage> for Averager {
    fn from(a: MovingAverage) -> Self {
        Averager::Moving(a)
    }
}
