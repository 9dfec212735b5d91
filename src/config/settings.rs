// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Settings management for Luminous
//!
//! Handles loading and saving settings from ~/.luminous-nix/settings.json

use serde::{Deserialize, Serialize};

mod io;
mod validation;

/// Main settings structure, stored in ~/.luminous-nix/settings.json
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Settings {
    /// External model runtime invocation
    #[serde(default)]
    pub runtime: RuntimeConfig,

    /// Model selection and execution policy
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,

    /// Model discovery and evaluation loop
    #[serde(default)]
    pub curator: CuratorConfig,

    /// Execution history tracking
    #[serde(default)]
    pub history: HistoryConfig,
}

/// External runtime CLI configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RuntimeConfig {
    /// Runtime binary name or path
    #[serde(default = "default_runtime_binary")]
    pub binary: String,

    /// Timeout for listing installed models
    #[serde(default = "default_list_timeout_secs")]
    pub list_timeout_secs: u64,

    /// Timeout for `show` metadata probes
    #[serde(default = "default_show_timeout_secs")]
    pub show_timeout_secs: u64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            binary: default_runtime_binary(),
            list_timeout_secs: default_list_timeout_secs(),
            show_timeout_secs: default_show_timeout_secs(),
        }
    }
}

fn default_runtime_binary() -> String {
    "ollama".to_string()
}

fn default_list_timeout_secs() -> u64 {
    10
}

fn default_show_timeout_secs() -> u64 {
    10
}

/// Orchestrator execution policy
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrchestratorConfig {
    /// Timeout for the first run of a model in this process (covers model load)
    #[serde(default = "default_cold_timeout_secs")]
    pub cold_timeout_secs: u64,

    /// Timeout once a model is known to be loaded
    #[serde(default = "default_warm_timeout_secs")]
    pub warm_timeout_secs: u64,

    /// Upper bound for pulling a missing model
    #[serde(default = "default_pull_timeout_secs")]
    pub pull_timeout_secs: u64,

    /// Total execution attempts, including the first
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Base delay between attempts in milliseconds
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Jitter percentage (0.0 to 1.0) applied to the retry delay
    #[serde(default = "default_retry_jitter")]
    pub retry_jitter: f64,

    /// Model used when nothing in the registry fits the task and tier
    #[serde(default = "default_fallback_model")]
    pub fallback_model: String,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            cold_timeout_secs: default_cold_timeout_secs(),
            warm_timeout_secs: default_warm_timeout_secs(),
            pull_timeout_secs: default_pull_timeout_secs(),
            max_attempts: default_max_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
            retry_jitter: default_retry_jitter(),
            fallback_model: default_fallback_model(),
        }
    }
}

fn default_cold_timeout_secs() -> u64 {
    180
}

fn default_warm_timeout_secs() -> u64 {
    60
}

fn default_pull_timeout_secs() -> u64 {
    600
}

fn default_max_attempts() -> u32 {
    2
}

fn default_retry_delay_ms() -> u64 {
    500
}

fn default_retry_jitter() -> f64 {
    0.25
}

fn default_fallback_model() -> String {
    "gemma:2b".to_string()
}

/// Model curator configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CuratorConfig {
    /// Integrate approved models into the live registry automatically
    #[serde(default)]
    pub auto_integrate: bool,

    /// Pending discoveries evaluated per evolution cycle
    #[serde(default = "default_evaluations_per_cycle")]
    pub evaluations_per_cycle: usize,

    /// Canned prompts run per benchmarked task type
    #[serde(default = "default_prompts_per_task")]
    pub prompts_per_task: usize,

    /// Timeout for a single benchmark prompt
    #[serde(default = "default_prompt_timeout_secs")]
    pub prompt_timeout_secs: u64,
}

impl Default for CuratorConfig {
    fn default() -> Self {
        Self {
            auto_integrate: false,
            evaluations_per_cycle: default_evaluations_per_cycle(),
            prompts_per_task: default_prompts_per_task(),
            prompt_timeout_secs: default_prompt_timeout_secs(),
        }
    }
}

fn default_evaluations_per_cycle() -> usize {
    3
}

fn default_prompts_per_task() -> usize {
    3
}

fn default_prompt_timeout_secs() -> u64 {
    30
}

/// Execution history configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryConfig {
    /// Ring buffer capacity (oldest entries dropped beyond this)
    #[serde(default = "default_history_capacity")]
    pub capacity: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity: default_history_capacity(),
        }
    }
}

fn default_history_capacity() -> usize {
    100
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.runtime.binary, "ollama");
        assert_eq!(settings.orchestrator.cold_timeout_secs, 180);
        assert_eq!(settings.orchestrator.warm_timeout_secs, 60);
        assert_eq!(settings.orchestrator.pull_timeout_secs, 600);
        assert_eq!(settings.orchestrator.max_attempts, 2);
        assert_eq!(settings.orchestrator.fallback_model, "gemma:2b");
        assert!(!settings.curator.auto_integrate);
        assert_eq!(settings.curator.evaluations_per_cycle, 3);
        assert_eq!(settings.curator.prompt_timeout_secs, 30);
        assert_eq!(settings.history.capacity, 100);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{"curator": {"auto_integrate": true}, "runtime": {"binary": "/opt/ollama"}}"#;
        let settings: Settings = serde_json::from_str(json).unwrap();
        assert!(settings.curator.auto_integrate);
        assert_eq!(settings.curator.prompts_per_task, 3);
        assert_eq!(settings.runtime.binary, "/opt/ollama");
        assert_eq!(settings.runtime.list_timeout_secs, 10);
        assert_eq!(settings.orchestrator, OrchestratorConfig::default());
    }

    #[test]
    fn test_settings_roundtrip() {
        let mut settings = Settings::default();
        settings.orchestrator.max_attempts = 3;
        settings.history.capacity = 10;

        let json = serde_json::to_string(&settings).unwrap();
        let parsed: Settings = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, settings);
    }
}
