// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Timeout and retry policy for model execution

use std::time::Duration;

use rand::Rng;

use crate::config::OrchestratorConfig;
use crate::error::RuntimeError;

/// Execution policy with smart defaults
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionPolicy {
    /// Timeout for a model's first run in this process
    pub cold_timeout: Duration,
    /// Timeout once the model is known to be loaded
    pub warm_timeout: Duration,
    /// Upper bound for a model pull (never retried)
    pub pull_timeout: Duration,
    /// Total attempts, including the first
    pub max_attempts: u32,
    /// Base delay between attempts in milliseconds
    pub retry_delay_ms: u64,
    /// Jitter percentage (0.0 to 1.0)
    pub jitter: f64,
}

impl Default for ExecutionPolicy {
    fn default() -> Self {
        Self::from(&OrchestratorConfig::default())
    }
}

impl From<&OrchestratorConfig> for ExecutionPolicy {
    fn from(config: &OrchestratorConfig) -> Self {
        Self {
            cold_timeout: Duration::from_secs(config.cold_timeout_secs),
            warm_timeout: Duration::from_secs(config.warm_timeout_secs),
            pull_timeout: Duration::from_secs(config.pull_timeout_secs),
            max_attempts: config.max_attempts.max(1),
            retry_delay_ms: config.retry_delay_ms,
            jitter: config.retry_jitter,
        }
    }
}

impl ExecutionPolicy {
    /// Same policy without any pause between attempts
    pub fn without_delay(mut self) -> Self {
        self.retry_delay_ms = 0;
        self
    }

    /// Base timeout before any retry scaling
    pub fn base_timeout(&self, loaded: bool) -> Duration {
        if loaded {
            self.warm_timeout
        } else {
            self.cold_timeout
        }
    }

    /// Timeout for a 1-based attempt number: `base * attempt`
    pub fn attempt_timeout(&self, base: Duration, attempt: u32) -> Duration {
        base.saturating_mul(attempt.max(1))
    }

    /// Whether a failed attempt should be followed by another
    pub fn should_retry(&self, error: &RuntimeError, attempt: u32, retry_on_timeout: bool) -> bool {
        if attempt >= self.max_attempts {
            return false;
        }
        match error {
            RuntimeError::Timeout { .. } => retry_on_timeout,
            RuntimeError::Failed { .. } | RuntimeError::Io(_) => true,
            // A missing binary will not appear between attempts
            RuntimeError::NotInstalled(_) => false,
        }
    }

    /// Jittered pause before the attempt following `attempt`
    pub fn retry_delay(&self, attempt: u32) -> Duration {
        let base_ms = self.retry_delay_ms.saturating_mul(attempt.max(1) as u64);
        if base_ms == 0 {
            return Duration::ZERO;
        }

        let jitter_range = (base_ms as f64 * self.jitter) as i64;
        let jitter_ms = if jitter_range > 0 {
            rand::rng().random_range(-jitter_range..=jitter_range)
        } else {
            0
        };

        let final_ms = (base_ms as i64 + jitter_ms).max(0) as u64;
        Duration::from_millis(final_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_default() {
        let policy = ExecutionPolicy::default();
        assert_eq!(policy.cold_timeout, Duration::from_secs(180));
        assert_eq!(policy.warm_timeout, Duration::from_secs(60));
        assert_eq!(policy.pull_timeout, Duration::from_secs(600));
        assert_eq!(policy.max_attempts, 2);
        assert!((policy.jitter - 0.25).abs() < 0.001);
    }

    #[test]
    fn test_base_timeout_cold_vs_warm() {
        let policy = ExecutionPolicy::default();
        assert!(policy.base_timeout(false) > policy.base_timeout(true));
    }

    #[test]
    fn test_attempt_timeout_grows_linearly() {
        let policy = ExecutionPolicy::default();
        let base = Duration::from_secs(60);
        assert_eq!(policy.attempt_timeout(base, 1), Duration::from_secs(60));
        assert_eq!(policy.attempt_timeout(base, 2), Duration::from_secs(120));
        assert_eq!(policy.attempt_timeout(base, 0), Duration::from_secs(60));
    }

    #[test]
    fn test_should_retry() {
        let policy = ExecutionPolicy::default();
        let timeout = RuntimeError::Timeout { seconds: 60 };
        let failed = RuntimeError::Failed {
            status: 1,
            stderr: String::new(),
        };

        assert!(policy.should_retry(&timeout, 1, true));
        assert!(!policy.should_retry(&timeout, 1, false));
        assert!(policy.should_retry(&failed, 1, false));
        assert!(!policy.should_retry(&failed, 2, true));
        assert!(!policy.should_retry(&RuntimeError::NotInstalled("ollama".into()), 1, true));
    }

    #[test]
    fn test_zero_attempts_clamped() {
        let config = OrchestratorConfig {
            max_attempts: 0,
            ..Default::default()
        };
        assert_eq!(ExecutionPolicy::from(&config).max_attempts, 1);
    }

    #[test]
    fn test_retry_delay_without_jitter() {
        let policy = ExecutionPolicy {
            retry_delay_ms: 500,
            jitter: 0.0,
            ..Default::default()
        };
        assert_eq!(policy.retry_delay(1), Duration::from_millis(500));
        assert_eq!(policy.retry_delay(2), Duration::from_millis(1000));
        assert_eq!(policy.without_delay().retry_delay(3), Duration::ZERO);
    }

    #[test]
    fn test_retry_delay_jitter_bounds() {
        let policy = ExecutionPolicy {
            retry_delay_ms: 1000,
            jitter: 0.25,
            ..Default::default()
        };
        for _ in 0..50 {
            let ms = policy.retry_delay(1).as_millis();
            assert!((750..=1250).contains(&ms));
        }
    }
}
