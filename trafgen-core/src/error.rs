use std::time::Duration;

use crate::classify::TrafficClass;
use crate::runner::SessionState;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    Configuration(#[from] ConfigError),

    #[error("catalog exhausted: no {what} configured for {class} traffic")]
    CatalogExhausted {
        class: TrafficClass,
        what: &'static str,
    },

    #[error("session is {0}, expected idle")]
    InvalidState(SessionState),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("task join error: {0}")]
    Join(#[from] tokio::task::JoinError),
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("`duration` must be a positive duration")]
    InvalidDuration,

    #[error("`target_rpm` must be a positive integer")]
    InvalidRpm,

    #[error("`max_workers` must be a positive integer")]
    InvalidWorkers,

    #[error("`timeout` must be a positive duration")]
    InvalidTimeout,

    #[error("`stats_interval` must be a positive duration")]
    InvalidStatsInterval,

    #[error("`delay_min` ({min:?}) must not exceed `delay_max` ({max:?})")]
    DelayRange { min: Duration, max: Duration },

    #[error("`{name}` must be within [0, 1] (got {value})")]
    ProbabilityOutOfRange { name: &'static str, value: f64 },

    #[error(
        "`compromise_probability` + `malicious_probability` must not exceed 1 (got {0})"
    )]
    ProbabilitySum(f64),

    #[error("`user_agents` must not be empty")]
    NoUserAgents,
}
