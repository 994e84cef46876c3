use std::path::PathBuf;
use std::time::Duration;

use trafgen_http::RetryPolicy;

use crate::catalog::builtin_user_agents;
use crate::classify::ClassPolicy;
use crate::error::ConfigError;

/// Everything a session needs besides the site and payload data.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub duration: Duration,
    pub target_rpm: u32,
    pub max_workers: usize,
    /// Lower bound of the per-worker pause between two requests.
    pub delay_min: Duration,
    pub delay_max: Duration,
    /// Per attempt, covering connect, headers and body.
    pub timeout: Duration,
    pub compromise_probability: f64,
    pub malicious_probability: f64,
    pub enable_compromise: bool,
    pub enable_malicious: bool,
    /// Ordered; the last three entries are treated as legacy clients.
    pub user_agents: Vec<String>,
    pub log_directory: PathBuf,
    pub stats_interval: Duration,
    pub retry: RetryPolicy,
    pub referer_probability: f64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            duration: Duration::from_secs(60 * 60),
            target_rpm: 15,
            max_workers: 8,
            delay_min: Duration::from_millis(500),
            delay_max: Duration::from_secs(8),
            timeout: Duration::from_secs(15),
            compromise_probability: 0.10,
            malicious_probability: 0.05,
            enable_compromise: true,
            enable_malicious: true,
            user_agents: builtin_user_agents(),
            log_directory: PathBuf::from("security_logs"),
            stats_interval: Duration::from_secs(60),
            retry: RetryPolicy::default(),
            referer_probability: 0.7,
        }
    }
}

impl RunConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.duration.is_zero() {
            return Err(ConfigError::InvalidDuration);
        }
        if self.target_rpm == 0 {
            return Err(ConfigError::InvalidRpm);
        }
        if self.max_workers == 0 {
            return Err(ConfigError::InvalidWorkers);
        }
        if self.timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout);
        }
        if self.stats_interval.is_zero() {
            return Err(ConfigError::InvalidStatsInterval);
        }
        if self.delay_min > self.delay_max {
            return Err(ConfigError::DelayRange {
                min: self.delay_min,
                max: self.delay_max,
            });
        }

        check_probability("compromise_probability", self.compromise_probability)?;
        check_probability("malicious_probability", self.malicious_probability)?;
        check_probability("referer_probability", self.referer_probability)?;

        let sum = self.compromise_probability + self.malicious_probability;
        if sum > 1.0 + f64::EPSILON {
            return Err(ConfigError::ProbabilitySum(sum));
        }

        if self.user_agents.iter().all(|ua| ua.trim().is_empty()) {
            return Err(ConfigError::NoUserAgents);
        }

        Ok(())
    }

    pub fn class_policy(&self) -> ClassPolicy {
        ClassPolicy {
            compromise_probability: self.compromise_probability,
            malicious_probability: self.malicious_probability,
            enable_compromise: self.enable_compromise,
            enable_malicious: self.enable_malicious,
        }
    }
}

fn check_probability(name: &'static str, value: f64) -> Result<(), ConfigError> {
    // NaN fails the range check too.
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::ProbabilityOutOfRange { name, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = RunConfig::default();
        assert_eq!(cfg.validate(), Ok(()));
        assert_eq!(cfg.target_rpm, 15);
        assert_eq!(cfg.max_workers, 8);
        assert_eq!(cfg.log_directory, PathBuf::from("security_logs"));
    }

    #[test]
    fn rejects_non_positive_values() {
        let cfg = RunConfig {
            target_rpm: 0,
            ..RunConfig::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::InvalidRpm));

        let cfg = RunConfig {
            max_workers: 0,
            ..RunConfig::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::InvalidWorkers));

        let cfg = RunConfig {
            duration: Duration::ZERO,
            ..RunConfig::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::InvalidDuration));
    }

    #[test]
    fn rejects_inverted_delay_range() {
        let cfg = RunConfig {
            delay_min: Duration::from_secs(3),
            delay_max: Duration::from_secs(1),
            ..RunConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(ConfigError::DelayRange { .. })));
    }

    #[test]
    fn rejects_bad_probabilities() {
        let cfg = RunConfig {
            malicious_probability: 1.5,
            ..RunConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::ProbabilityOutOfRange {
                name: "malicious_probability",
                ..
            })
        ));

        let cfg = RunConfig {
            compromise_probability: f64::NAN,
            ..RunConfig::default()
        };
        assert!(cfg.validate().is_err());

        let cfg = RunConfig {
            compromise_probability: 0.7,
            malicious_probability: 0.4,
            ..RunConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(ConfigError::ProbabilitySum(_))));
    }

    #[test]
    fn probabilities_may_sum_to_exactly_one() {
        let cfg = RunConfig {
            compromise_probability: 0.7,
            malicious_probability: 0.3,
            ..RunConfig::default()
        };
        assert_eq!(cfg.validate(), Ok(()));
    }

    #[test]
    fn rejects_empty_user_agents() {
        let cfg = RunConfig {
            user_agents: vec![" ".to_string()],
            ..RunConfig::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::NoUserAgents));
    }
}
