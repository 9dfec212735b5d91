// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Task-based model selection and execution
//!
//! [`ModelOrchestrator`] owns the hardware profile and the live registry.
//! It answers "which model handles task T" and runs prompts against the
//! external runtime under the timeout/retry rules of [`ExecutionPolicy`].
//!
//! The orchestrator is the single writer of its registry, selection cache
//! and loaded-model set. All mutating methods take `&mut self`; callers that
//! need concurrency should run one orchestrator per worker or serialize
//! access themselves.

pub mod council;
pub mod executor;
pub mod history;
pub mod policy;

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::config::OrchestratorConfig;
use crate::error::{Result, RuntimeError};
use crate::hardware::{HardwareProfile, HardwareTier};
use crate::models::{ModelRegistry, ModelSpec, TaskType};
use crate::runtime::{RunOptions, RuntimeClient};

pub use council::{CouncilRole, SacredCouncil};
pub use executor::{estimate_confidence, ExecutionResult, PromptExecutor, PromptMetadata};
pub use history::{ExecutionHistory, ExecutionHistoryEntry, ModelPerformance, PerformanceInsight};
pub use policy::ExecutionPolicy;

use council::same_tag;

/// Per-call options for [`ModelOrchestrator::execute`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExecuteOptions {
    pub temperature: f32,
    /// Overrides the cold/warm base timeout
    pub timeout: Option<Duration>,
    /// Whether a timed-out attempt may be retried
    pub retry_on_timeout: bool,
}

impl Default for ExecuteOptions {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            timeout: None,
            retry_on_timeout: true,
        }
    }
}

/// Snapshot of what the orchestrator would pick for every task
#[derive(Debug, Clone, Serialize)]
pub struct OrchestraStatus {
    pub hardware_tier: HardwareTier,
    pub assignments: BTreeMap<TaskType, String>,
    pub council: BTreeMap<CouncilRole, Option<String>>,
}

/// Selects and runs models for tasks
pub struct ModelOrchestrator {
    profile: HardwareProfile,
    registry: ModelRegistry,
    runtime: Arc<dyn RuntimeClient>,
    policy: ExecutionPolicy,
    fallback_model: String,
    council: SacredCouncil,
    selection_cache: HashMap<(TaskType, HardwareTier), String>,
    loaded: HashSet<String>,
    available: HashSet<String>,
}

impl ModelOrchestrator {
    /// Build an orchestrator and convene the council from the runtime's
    /// installed models. A failed listing leaves every role vacant.
    pub async fn new(
        profile: HardwareProfile,
        registry: ModelRegistry,
        runtime: Arc<dyn RuntimeClient>,
        config: &OrchestratorConfig,
    ) -> Self {
        let council = match runtime.list_models().await {
            Ok(installed) => SacredCouncil::assign(&installed, &registry),
            Err(e) => {
                tracing::warn!("Could not list installed models, council left vacant: {}", e);
                SacredCouncil::vacant()
            }
        };
        Self::with_council(profile, registry, runtime, config, council)
    }

    /// Build an orchestrator with an explicit council
    pub fn with_council(
        profile: HardwareProfile,
        registry: ModelRegistry,
        runtime: Arc<dyn RuntimeClient>,
        config: &OrchestratorConfig,
        council: SacredCouncil,
    ) -> Self {
        tracing::info!(
            "Model orchestrator ready for {} tier ({} models, {} council roles)",
            profile.tier(),
            registry.len(),
            council.assigned_count()
        );
        Self {
            profile,
            registry,
            runtime,
            policy: ExecutionPolicy::from(config),
            fallback_model: config.fallback_model.clone(),
            council,
            selection_cache: HashMap::new(),
            loaded: HashSet::new(),
            available: HashSet::new(),
        }
    }

    /// Replace the execution policy
    pub fn with_policy(mut self, policy: ExecutionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn profile(&self) -> &HardwareProfile {
        &self.profile
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    pub fn council(&self) -> &SacredCouncil {
        &self.council
    }

    pub fn policy(&self) -> &ExecutionPolicy {
        &self.policy
    }

    pub fn fallback_model(&self) -> &str {
        &self.fallback_model
    }

    /// Shared handle to the runtime client
    pub fn runtime(&self) -> Arc<dyn RuntimeClient> {
        Arc::clone(&self.runtime)
    }

    /// Whether `tag` has completed a run in this process
    pub fn is_loaded(&self, tag: &str) -> bool {
        self.loaded.contains(tag)
    }

    /// Runtime identifier for the model bound to `role`
    pub fn council_model(&self, role: CouncilRole) -> Option<&str> {
        self.council
            .get(role)
            .and_then(|key| self.registry.get(key))
            .map(ModelSpec::ollama_tag)
    }

    /// Pick the runtime identifier for `task`. Never fails; falls back to
    /// the configured fallback model when nothing is eligible.
    pub fn select_model_for_task(&mut self, task: TaskType) -> String {
        if task == TaskType::EthicalReasoning {
            let role_model = self
                .council_model(CouncilRole::Conscience)
                .or_else(|| self.council_model(CouncilRole::Mind));
            if let Some(tag) = role_model {
                tracing::debug!("Council handles ethical reasoning with {}", tag);
                return tag.to_string();
            }
        }

        let tier = self.profile.tier();
        if let Some(tag) = self.selection_cache.get(&(task, tier)) {
            tracing::debug!("Using cached model for {}: {}", task, tag);
            return tag.clone();
        }

        // max_by_key keeps the last maximum; fold keeps the first so that
        // ties resolve to registry insertion order
        let best = self
            .registry
            .eligible(task, tier)
            .into_iter()
            .fold(None::<(&str, &ModelSpec)>, |best, candidate| match best {
                Some(b) if b.1.min_tier() >= candidate.1.min_tier() => Some(b),
                _ => Some(candidate),
            });

        match best {
            Some((key, spec)) => {
                let tag = spec.ollama_tag().to_string();
                tracing::info!(
                    "Selected {} ({}) for {} [{}]",
                    spec.name(),
                    key,
                    task,
                    spec.strengths().join(", ")
                );
                self.selection_cache.insert((task, tier), tag.clone());
                tag
            }
            None => {
                tracing::warn!(
                    "No compatible model for {} on {} tier, using fallback {}",
                    task,
                    tier,
                    self.fallback_model
                );
                self.fallback_model.clone()
            }
        }
    }

    /// Select a model from prompt metadata. Speed-critical prompts go to the
    /// intent-classification model regardless of task.
    pub fn model_for_prompt(&mut self, metadata: &PromptMetadata) -> String {
        if metadata.requires_speed {
            tracing::debug!("Speed requested, using reflex model");
            return self.select_model_for_task(TaskType::IntentClassification);
        }
        self.select_model_for_task(metadata.task())
    }

    /// Make sure the runtime has `tag`, pulling it if needed.
    ///
    /// A pull is a single bounded attempt. Returns false on any failure.
    pub async fn ensure_model_available(&mut self, tag: &str) -> bool {
        if self.available.contains(tag) {
            return true;
        }

        match self.runtime.list_models().await {
            Ok(installed) if installed.iter().any(|t| same_tag(t, tag)) => {
                tracing::debug!("Model {} is available", tag);
                self.available.insert(tag.to_string());
                return true;
            }
            Ok(_) => {}
            Err(RuntimeError::NotInstalled(binary)) => {
                tracing::warn!("Runtime binary {} not found", binary);
                return false;
            }
            Err(e) => tracing::warn!("Could not list installed models: {}", e),
        }

        tracing::info!("Pulling model {}...", tag);
        match self.runtime.pull(tag, self.policy.pull_timeout).await {
            Ok(()) => {
                tracing::info!("Pulled {}", tag);
                self.available.insert(tag.to_string());
                true
            }
            Err(e) => {
                tracing::warn!("Failed to pull {}: {}", tag, e);
                false
            }
        }
    }

    /// Run `prompt` on `tag`. Returns `None` for any runtime failure.
    ///
    /// The first run of a model uses the cold timeout; later runs use the
    /// warm one. Attempt `n` gets `base * n`.
    pub async fn execute(&mut self, tag: &str, prompt: &str, options: ExecuteOptions) -> Option<String> {
        if !self.ensure_model_available(tag).await {
            tracing::warn!("Model {} unavailable, not executing", tag);
            return None;
        }

        let base = options
            .timeout
            .unwrap_or_else(|| self.policy.base_timeout(self.is_loaded(tag)));
        let mut attempt = 1;

        loop {
            let timeout = self.policy.attempt_timeout(base, attempt);
            let run_options = RunOptions {
                temperature: options.temperature,
                timeout,
            };
            tracing::info!(
                "Executing with {} (attempt {}/{}, timeout {}s)",
                tag,
                attempt,
                self.policy.max_attempts,
                timeout.as_secs()
            );

            // Guard against clients that do not enforce the timeout themselves
            let outcome = tokio::time::timeout(timeout, self.runtime.run(tag, prompt, run_options))
                .await
                .unwrap_or(Err(RuntimeError::Timeout {
                    seconds: timeout.as_secs(),
                }));

            match outcome {
                Ok(text) => {
                    self.loaded.insert(tag.to_string());
                    return Some(text);
                }
                Err(e) if self.policy.should_retry(&e, attempt, options.retry_on_timeout) => {
                    let delay = self.policy.retry_delay(attempt);
                    tracing::warn!(
                        "{} failed (attempt {}/{}): {}. Retrying in {:.1}s...",
                        tag,
                        attempt,
                        self.policy.max_attempts,
                        e,
                        delay.as_secs_f64()
                    );
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                    attempt += 1;
                }
                Err(e) => {
                    tracing::warn!("{} failed after {} attempt(s): {}", tag, attempt, e);
                    return None;
                }
            }
        }
    }

    /// Insert a model into the live registry.
    ///
    /// The selection cache is left as is: a newly integrated model is only
    /// picked for (task, tier) pairs that have not been selected yet.
    pub fn integrate_spec(&mut self, key: &str, spec: ModelSpec) -> Result<()> {
        if let Some(previous) = self.registry.insert(key, spec)? {
            tracing::info!("Replaced registry entry {} ({})", key, previous.name());
        }
        Ok(())
    }

    /// The identifier selected for every task, plus tier and council
    pub fn orchestra_status(&mut self) -> OrchestraStatus {
        let assignments = TaskType::ALL
            .into_iter()
            .map(|task| (task, self.select_model_for_task(task)))
            .collect();
        let council = self
            .council
            .assignments()
            .into_iter()
            .map(|(role, key)| (role, key.map(str::to_string)))
            .collect();
        OrchestraStatus {
            hardware_tier: self.profile.tier(),
            assignments,
            council,
        }
    }
}
