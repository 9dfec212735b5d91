// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use crate::error::{LuminousError, Result};

use super::Settings;

impl Settings {
    /// Reject settings that would make the orchestrator misbehave.
    pub fn validate(&self) -> Result<()> {
        if self.runtime.binary.trim().is_empty() {
            return Err(LuminousError::Config(
                "runtime.binary must not be empty".to_string(),
            ));
        }
        if self.orchestrator.max_attempts == 0 {
            return Err(LuminousError::Config(
                "orchestrator.max_attempts must be at least 1".to_string(),
            ));
        }
        if self.orchestrator.cold_timeout_secs == 0 || self.orchestrator.warm_timeout_secs == 0 {
            return Err(LuminousError::Config(
                "orchestrator timeouts must be positive".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.orchestrator.retry_jitter) {
            return Err(LuminousError::Config(format!(
                "orchestrator.retry_jitter must be within 0.0..=1.0, got {}",
                self.orchestrator.retry_jitter
            )));
        }
        if self.orchestrator.fallback_model.trim().is_empty() {
            return Err(LuminousError::Config(
                "orchestrator.fallback_model must not be empty".to_string(),
            ));
        }
        if self.history.capacity == 0 {
            return Err(LuminousError::Config(
                "history.capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
