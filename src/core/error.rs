use thiserror::Error;

use crate::core::types::Day;

/// Configuration problems detected at construction time.
///
/// These are always fatal: a bad distribution is rejected, never normalized.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("mobility distribution for {archetype} sums to {sum} (must be 1.0 +/- 1e-6)")]
    MobilityDistribution { archetype: &'static str, sum: f64 },

    #[error("probability {name} = {value} is outside [0, 1]")]
    ProbabilityRange { name: &'static str, value: f64 },

    #[error("duration range {name} is empty or negative: {min}..={max}")]
    DurationRange { name: &'static str, min: u32, max: u32 },

    #[error("grid dimensions must be positive, got {width}x{height}")]
    GridDimensions { width: u32, height: u32 },

    #[error("invalid parameter {name}: {reason}")]
    Parameter { name: &'static str, reason: String },
}

#[derive(Error, Debug)]
pub enum SimError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Simulation state desynchronized from itself. Always a programming
    /// error; the run aborts rather than continuing with corrupt state.
    #[error("invariant violation on day {day}: {detail}")]
    InvariantViolation { day: Day, detail: String },

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SimError>;
