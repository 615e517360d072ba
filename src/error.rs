//! Errors raised while building bandits from scenario parameters.

/// A scenario parameter that cannot produce a working bandit.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("a bandit needs at least one arm")]
    NoArms,
    #[error("{name} must be a probability in [0, 1], got {value}")]
    Probability { name: &'static str, value: f64 },
    #[error("smoothing factor must lie in (0, 1), got {0}")]
    SmoothingFactor(f64),
    #[error("temperature must be finite and positive, got {0}")]
    Temperature(f64),
    #[error("temperature decay must lie in (0, 1], got {0}")]
    Decay(f64),
    #[error("reward bounds must be finite with minimum < maximum, got [{minimum}, {maximum}]")]
    RewardBounds { minimum: f64, maximum: f64 },
    #[error("moving average window must be positive")]
    Window,
    #[error("switch exposes {switch} arms but the bandit has {bandit}")]
    ArmCountMismatch { switch: usize, bandit: usize },
}
