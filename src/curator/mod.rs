// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Model discovery, evaluation and integration
//!
//! An evolution cycle scans the runtime for models the registry does not
//! know, benchmarks a bounded number of them, and optionally integrates the
//! approved ones into the orchestrator's live registry.

pub mod benchmark;
pub mod discovery;
pub mod store;

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::CuratorConfig;
use crate::error::RuntimeError;
use crate::models::TaskType;
use crate::orchestrator::council::same_tag;
use crate::orchestrator::ModelOrchestrator;
use crate::runtime::{RunOptions, RuntimeClient};

pub use benchmark::{aggregate_score, assess_quality, BenchmarkResult, BenchmarkSuite, Trial};
pub use discovery::{EvaluationStatus, ModelDiscovery, ModelSource, APPROVAL_THRESHOLD};
pub use store::CuratorStore;

/// Tags worth probing even when they are not installed
pub const CANDIDATE_TAGS: &[&str] = &[
    "gemma3:270m",
    "gemma3:4b",
    "gemma3:12b",
    "gemma3:27b",
    "qwen3:0.6b",
    "qwen3:1.7b",
    "qwen3:4b",
    "qwen3:8b",
    "qwen3:14b",
    "qwen3:32b",
    "qwq:32b",
    "deepseek-r1:latest",
    "gpt-oss:latest",
    "llama3.2:latest",
    "mistral:latest",
    "phi3:latest",
];

/// One evaluated discovery in an [`EvolutionReport`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationSummary {
    pub model: String,
    pub score: Option<f64>,
    pub status: EvaluationStatus,
}

/// What an evolution cycle touched
#[derive(Debug, Clone, Serialize)]
pub struct EvolutionReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub duration_secs: f64,
    pub discoveries: Vec<String>,
    pub evaluations: Vec<EvaluationSummary>,
    pub integrations: Vec<String>,
    pub new_capabilities: Vec<String>,
}

/// A queued discovery in [`EvolutionStatus`]
#[derive(Debug, Clone, Serialize)]
pub struct RecentDiscovery {
    pub model: String,
    pub source: ModelSource,
    pub status: EvaluationStatus,
}

/// Snapshot from [`ModelCurator::get_evolution_status`]
#[derive(Debug, Clone, Serialize)]
pub struct EvolutionStatus {
    pub known_models: usize,
    pub discovery_queue: usize,
    pub pending_evaluation: usize,
    pub approved_models: usize,
    pub integrated_models: usize,
    pub available_tasks: Vec<TaskType>,
    pub recent_discoveries: Vec<RecentDiscovery>,
}

/// Watches the runtime for new models and vets them
pub struct ModelCurator {
    runtime: Arc<dyn RuntimeClient>,
    store: CuratorStore,
    config: CuratorConfig,
    suite: BenchmarkSuite,
    known_models: HashSet<String>,
    /// Runtime tags already served by a registry entry
    registered_tags: Vec<String>,
    queue: Vec<ModelDiscovery>,
}

impl ModelCurator {
    /// Create a curator sharing the orchestrator's runtime.
    ///
    /// Known models are the registry keys plus every stored discovery.
    /// Stored discoveries that are still pending or approved go back on the
    /// queue. An unreadable store is logged and treated as empty.
    pub fn new(orchestrator: &ModelOrchestrator, store: CuratorStore, config: CuratorConfig) -> Self {
        let mut known_models: HashSet<String> =
            orchestrator.registry().keys().map(str::to_string).collect();
        let registered_tags = orchestrator
            .registry()
            .iter()
            .map(|(_, spec)| spec.ollama_tag().to_string())
            .collect();

        let stored = store.load_discoveries().unwrap_or_else(|e| {
            tracing::warn!("Could not read stored discoveries: {}", e);
            Vec::new()
        });
        let mut queue = Vec::new();
        for discovery in stored {
            known_models.insert(discovery.model_id.clone());
            if matches!(
                discovery.status(),
                EvaluationStatus::Pending | EvaluationStatus::Approved
            ) {
                queue.push(discovery);
            }
        }

        tracing::info!(
            "Model curator ready ({} known models, {} queued)",
            known_models.len(),
            queue.len()
        );

        Self {
            runtime: orchestrator.runtime(),
            store,
            config,
            suite: BenchmarkSuite::default(),
            known_models,
            registered_tags,
            queue,
        }
    }

    /// Replace the benchmark suite
    pub fn with_suite(mut self, suite: BenchmarkSuite) -> Self {
        self.suite = suite;
        self
    }

    pub fn with_auto_integrate(mut self, enabled: bool) -> Self {
        self.config.auto_integrate = enabled;
        self
    }

    pub fn store(&self) -> &CuratorStore {
        &self.store
    }

    pub fn queue(&self) -> &[ModelDiscovery] {
        &self.queue
    }

    pub fn is_known(&self, model_id: &str) -> bool {
        self.known_models.contains(model_id)
    }

    /// Whether a registry entry already runs `tag`, whatever its key
    fn is_registered_tag(&self, tag: &str) -> bool {
        self.registered_tags.iter().any(|t| same_tag(t, tag))
    }

    /// Find models the curator has not seen before.
    ///
    /// New discoveries are marked known and persisted, so a second scan
    /// does not report them again. Never fails.
    pub async fn scan_registry(&mut self) -> Vec<ModelDiscovery> {
        let mut discoveries: Vec<ModelDiscovery> = Vec::new();

        let installed = match self.runtime.list_models().await {
            Ok(tags) => tags,
            Err(RuntimeError::NotInstalled(binary)) => {
                tracing::warn!("Cannot scan for models, {} is not installed", binary);
                return discoveries;
            }
            Err(e) => {
                tracing::warn!("Could not list installed models: {}", e);
                Vec::new()
            }
        };

        for tag in &installed {
            let model_id = discovery::model_id_for_tag(tag);
            if self.is_known(&model_id)
                || self.is_registered_tag(tag)
                || discoveries.iter().any(|d| d.model_id == model_id)
            {
                continue;
            }
            let mut found = ModelDiscovery::new(tag, ModelSource::Local);
            match self.runtime.show(tag).await {
                Ok(details) => {
                    found = found
                        .with_size(details.size_gb)
                        .with_capabilities(details.capabilities);
                }
                Err(e) => tracing::debug!("No details for {}: {}", tag, e),
            }
            tracing::info!("Discovered new model: {}", tag);
            discoveries.push(found);
        }

        for tag in CANDIDATE_TAGS {
            let model_id = discovery::model_id_for_tag(tag);
            if self.is_known(&model_id)
                || self.is_registered_tag(tag)
                || discoveries.iter().any(|d| d.model_id == model_id)
            {
                continue;
            }
            match self.runtime.show(tag).await {
                Ok(details) => {
                    tracing::info!("Found available model: {}", tag);
                    discoveries.push(
                        ModelDiscovery::new(tag, ModelSource::Remote)
                            .with_size(details.size_gb)
                            .with_capabilities(details.capabilities),
                    );
                }
                Err(e) => tracing::debug!("Candidate {} not available: {}", tag, e),
            }
        }

        for found in &discoveries {
            self.known_models.insert(found.model_id.clone());
            self.log(found, "DISCOVERED");
        }
        self.persist(&discoveries);
        discoveries
    }

    /// Benchmark a pending discovery and decide its fate.
    ///
    /// Returns one result per benchmarked task type. An empty result means
    /// nothing could be benchmarked and the discovery is rejected.
    pub async fn evaluate_model(&self, discovery: &mut ModelDiscovery) -> Vec<BenchmarkResult> {
        if !discovery.transition(EvaluationStatus::Evaluating) {
            return Vec::new();
        }
        tracing::info!("Evaluating model: {}", discovery.model_tag);

        let claimed = discovery.claimed_tasks();
        let memory_gb = discovery.size_gb.unwrap_or(1.0);
        let timeout = Duration::from_secs(self.config.prompt_timeout_secs);
        let mut results = Vec::new();

        for (task, prompts) in self.suite.relevant(&claimed) {
            let mut trials = Vec::new();
            for prompt in prompts.iter().take(self.config.prompts_per_task) {
                trials.push(self.run_trial(&discovery.model_tag, prompt, task, timeout).await);
            }
            if let Some(result) = BenchmarkResult::from_trials(&discovery.model_id, task, memory_gb, &trials) {
                tracing::debug!(
                    "{} on {}: {:.2} ({}/{} passed)",
                    discovery.model_id,
                    task,
                    result.overall_score(),
                    (result.success_rate * trials.len() as f64).round(),
                    trials.len()
                );
                results.push(result);
            }
        }

        let (status, notes) = match aggregate_score(&results) {
            Some(score) => {
                discovery.evaluation_score = Some(score);
                let status = EvaluationStatus::verdict(score);
                let notes = if status == EvaluationStatus::Approved {
                    format!("Approved with score {:.2}", score)
                } else {
                    format!("Below threshold with score {:.2}", score)
                };
                (status, notes)
            }
            None => (EvaluationStatus::Rejected, "No benchmarks could run".to_string()),
        };
        discovery.transition(status);
        tracing::info!("{}: {}", discovery.model_tag, notes);
        discovery.notes = Some(notes);

        if let Err(e) = self.store.save_benchmarks(discovery, &results) {
            tracing::warn!("Failed to save benchmarks for {}: {}", discovery.model_id, e);
        }
        self.log(discovery, &status.as_str().to_uppercase());
        results
    }

    async fn run_trial(&self, tag: &str, prompt: &str, task: TaskType, timeout: Duration) -> Trial {
        let options = RunOptions {
            temperature: task.default_temperature(),
            timeout,
        };
        let started = Instant::now();
        let outcome = tokio::time::timeout(timeout, self.runtime.run(tag, prompt, options))
            .await
            .unwrap_or(Err(RuntimeError::Timeout {
                seconds: timeout.as_secs(),
            }));

        match outcome {
            Ok(response) => {
                let elapsed = started.elapsed().as_secs_f64().max(0.001);
                let words = response.split_whitespace().count() as f64;
                Trial::Passed {
                    quality: assess_quality(&response, task),
                    // Words to tokens, roughly
                    tokens_per_sec: words / elapsed * 5.0,
                }
            }
            Err(e) => {
                tracing::debug!("Benchmark prompt failed for {}: {}", tag, e);
                Trial::Failed
            }
        }
    }

    /// Add an approved discovery to the orchestrator's registry.
    ///
    /// Returns false without touching the registry unless the discovery is
    /// approved.
    pub fn integrate_model(&self, orchestrator: &mut ModelOrchestrator, discovery: &mut ModelDiscovery) -> bool {
        if discovery.status() != EvaluationStatus::Approved {
            tracing::warn!(
                "Cannot integrate {} with status {}",
                discovery.model_id,
                discovery.status()
            );
            return false;
        }

        let spec = discovery.to_spec();
        let spec_tasks = spec.task_types().to_vec();
        let min_tier = spec.min_tier();

        if let Err(e) = orchestrator.integrate_spec(&discovery.model_id, spec) {
            tracing::warn!("Failed to integrate {}: {}", discovery.model_id, e);
            return false;
        }
        discovery.transition(EvaluationStatus::Integrated);
        self.log(discovery, "INTEGRATED");

        let task_names: Vec<_> = spec_tasks.iter().map(TaskType::as_str).collect();
        tracing::info!(
            "Model integrated: {} (tasks: {}, min tier: {})",
            discovery.model_tag,
            task_names.join(", "),
            min_tier
        );
        true
    }

    /// Run one discover, evaluate, integrate cycle. Never fails.
    pub async fn evolve(&mut self, orchestrator: &mut ModelOrchestrator) -> EvolutionReport {
        let started_at = Utc::now();
        let clock = Instant::now();
        tracing::info!("Beginning evolution cycle");

        let discovered = self.scan_registry().await;
        let discoveries: Vec<String> = discovered.iter().map(|d| d.model_id.clone()).collect();
        if !discovered.is_empty() {
            tracing::info!("Found {} new models", discovered.len());
        }
        self.queue.extend(discovered);

        // Work on a detached queue so the curator can be borrowed
        let mut queue = std::mem::take(&mut self.queue);

        let mut evaluations = Vec::new();
        let pending: Vec<usize> = queue
            .iter()
            .enumerate()
            .filter(|(_, d)| d.status() == EvaluationStatus::Pending)
            .map(|(i, _)| i)
            .take(self.config.evaluations_per_cycle)
            .collect();
        for index in pending {
            let discovery = &mut queue[index];
            self.evaluate_model(discovery).await;
            evaluations.push(EvaluationSummary {
                model: discovery.model_id.clone(),
                score: discovery.evaluation_score,
                status: discovery.status(),
            });
        }

        let mut integrations = Vec::new();
        let mut new_capabilities: Vec<String> = Vec::new();
        if self.config.auto_integrate {
            for discovery in queue
                .iter_mut()
                .filter(|d| d.status() == EvaluationStatus::Approved)
            {
                if self.integrate_model(orchestrator, discovery) {
                    integrations.push(discovery.model_id.clone());
                    for capability in &discovery.capabilities {
                        if !new_capabilities.contains(capability) {
                            new_capabilities.push(capability.clone());
                        }
                    }
                }
            }
        }

        self.persist(&queue);
        queue.retain(|d| d.status() != EvaluationStatus::Integrated);
        self.queue = queue;

        let report = EvolutionReport {
            started_at,
            finished_at: Utc::now(),
            duration_secs: clock.elapsed().as_secs_f64(),
            discoveries,
            evaluations,
            integrations,
            new_capabilities,
        };
        tracing::info!(
            "Evolution cycle complete: {} discovered, {} evaluated, {} integrated",
            report.discoveries.len(),
            report.evaluations.len(),
            report.integrations.len()
        );
        report
    }

    /// Counts and the five most recent queued discoveries
    pub fn get_evolution_status(&self, orchestrator: &ModelOrchestrator) -> EvolutionStatus {
        let count = |status: EvaluationStatus| self.queue.iter().filter(|d| d.status() == status).count();
        let available_tasks: BTreeSet<TaskType> = orchestrator
            .registry()
            .iter()
            .flat_map(|(_, spec)| spec.task_types().iter().copied())
            .collect();
        let recent_discoveries = self
            .queue
            .iter()
            .skip(self.queue.len().saturating_sub(5))
            .map(|d| RecentDiscovery {
                model: d.model_id.clone(),
                source: d.source,
                status: d.status(),
            })
            .collect();

        EvolutionStatus {
            known_models: self.known_models.len(),
            discovery_queue: self.queue.len(),
            pending_evaluation: count(EvaluationStatus::Pending),
            approved_models: count(EvaluationStatus::Approved),
            integrated_models: orchestrator.registry().len(),
            available_tasks: available_tasks.into_iter().collect(),
            recent_discoveries,
        }
    }

    fn persist(&self, discoveries: &[ModelDiscovery]) {
        if let Err(e) = self.store.upsert_discoveries(discoveries) {
            tracing::warn!("Failed to save discoveries: {}", e);
        }
    }

    fn log(&self, discovery: &ModelDiscovery, event: &str) {
        if let Err(e) = self.store.log_event(discovery, event) {
            tracing::warn!("Failed to log evolution event: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OrchestratorConfig;
    use crate::hardware::HardwareProfile;
    use crate::models::ModelRegistry;
    use crate::orchestrator::SacredCouncil;
    use crate::runtime::{MockOutcome, MockRuntime, ModelDetails};
    use tempfile::TempDir;

    fn setup(mock: &MockRuntime, dir: &TempDir) -> (ModelOrchestrator, ModelCurator) {
        let orchestrator = ModelOrchestrator::with_council(
            HardwareProfile::new(12.0, 32.0, 8),
            ModelRegistry::with_defaults(),
            Arc::new(mock.clone()),
            &OrchestratorConfig::default(),
            SacredCouncil::vacant(),
        );
        let curator = ModelCurator::new(
            &orchestrator,
            CuratorStore::new(dir.path()),
            CuratorConfig::default(),
        );
        (orchestrator, curator)
    }

    fn code_details() -> ModelDetails {
        ModelDetails {
            size_gb: Some(4.1),
            capabilities: vec!["code".to_string()],
        }
    }

    #[tokio::test]
    async fn test_scan_skips_known_and_deduplicates() {
        let dir = TempDir::new().unwrap();
        // gemma3:4b is a registry key already; the coder model is new
        let mock = MockRuntime::new()
            .with_installed(&["gemma3:4b", "deepseek-coder:6.7b", "deepseek-coder:6.7b"])
            .with_details("deepseek-coder:6.7b", code_details());
        let (_, mut curator) = setup(&mock, &dir);

        let found = curator.scan_registry().await;
        let ids: Vec<_> = found.iter().map(|d| d.model_id.as_str()).collect();
        assert_eq!(ids, vec!["deepseek-coder-6.7b"]);
        assert_eq!(found[0].source, ModelSource::Local);
        assert_eq!(found[0].size_gb, Some(4.1));

        assert!(curator.scan_registry().await.is_empty());
        assert_eq!(curator.store().load_discoveries().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_scan_skips_tags_registered_under_other_keys() {
        let dir = TempDir::new().unwrap();
        // Registry keys are gpt-oss-large and tinyllama
        let mock = MockRuntime::new().with_installed(&["gpt-oss:latest", "tinyllama", "fresh:1b"]);
        let (_, mut curator) = setup(&mock, &dir);

        let found = curator.scan_registry().await;
        let ids: Vec<_> = found.iter().map(|d| d.model_id.as_str()).collect();
        assert_eq!(ids, vec!["fresh-1b"]);
    }

    #[tokio::test]
    async fn test_scan_recovers_from_corrupt_discoveries_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("discoveries.json"), "[{").unwrap();
        let mock = MockRuntime::new().with_installed(&["x:1"]);

        let (_, mut first) = setup(&mock, &dir);
        assert_eq!(first.scan_registry().await.len(), 1);

        let (_, mut second) = setup(&mock, &dir);
        assert!(second.is_known("x-1"));
        assert!(second.scan_registry().await.is_empty());
    }

    #[tokio::test]
    async fn test_scan_probes_candidates_as_remote() {
        let dir = TempDir::new().unwrap();
        let mock = MockRuntime::new().with_details("phi3:latest", ModelDetails::default());
        let (_, mut curator) = setup(&mock, &dir);

        let found = curator.scan_registry().await;
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].model_id, "phi3-latest");
        assert_eq!(found[0].source, ModelSource::Remote);
    }

    #[tokio::test]
    async fn test_scan_without_runtime_finds_nothing() {
        let dir = TempDir::new().unwrap();
        let mock = MockRuntime::new().with_list_failure();
        let (_, mut curator) = setup(&mock, &dir);
        assert!(curator.scan_registry().await.is_empty());
    }

    #[tokio::test]
    async fn test_evaluate_runs_only_claimed_tasks() {
        let dir = TempDir::new().unwrap();
        let mock = MockRuntime::new().with_fallback(MockOutcome::Respond(
            "```rust\nfn main() {}\n```\nThis function compiles and runs as expected in any project."
                .to_string(),
        ));
        let (_, curator) = setup(&mock, &dir);
        let mut discovery = ModelDiscovery::new("coder:1b", ModelSource::Local)
            .with_capabilities(vec!["code".to_string()]);

        let results = curator.evaluate_model(&mut discovery).await;
        let tasks: Vec<_> = results.iter().map(|r| r.task_type).collect();
        assert_eq!(tasks, vec![TaskType::CodeGeneration, TaskType::Configuration]);
        assert_eq!(mock.run_count(), 6);
        assert!(discovery.evaluation_score.is_some());
        assert!(matches!(
            discovery.status(),
            EvaluationStatus::Approved | EvaluationStatus::Rejected
        ));
        assert!(curator.store().load_benchmarks().unwrap().contains_key("coder-1b"));
    }

    #[tokio::test]
    async fn test_evaluate_all_failures_rejects() {
        let dir = TempDir::new().unwrap();
        let mock = MockRuntime::new().with_fallback(MockOutcome::Fail);
        let (_, curator) = setup(&mock, &dir);
        let mut discovery = ModelDiscovery::new("broken:1b", ModelSource::Local);

        let results = curator.evaluate_model(&mut discovery).await;
        assert_eq!(results.len(), 5);
        assert_eq!(mock.run_count(), 15);
        assert_eq!(discovery.status(), EvaluationStatus::Rejected);
        assert_eq!(discovery.evaluation_score, Some(0.0));
    }

    #[tokio::test]
    async fn test_evaluate_unbenchmarkable_rejects() {
        let dir = TempDir::new().unwrap();
        let mock = MockRuntime::new();
        let (_, curator) = setup(&mock, &dir);
        let mut discovery = ModelDiscovery::new("llava:99b", ModelSource::Local)
            .with_capabilities(vec!["vision".to_string()]);

        assert!(curator.evaluate_model(&mut discovery).await.is_empty());
        assert_eq!(discovery.status(), EvaluationStatus::Rejected);
        assert_eq!(discovery.evaluation_score, None);
        assert_eq!(mock.run_count(), 0);
    }

    #[tokio::test]
    async fn test_evaluate_requires_pending() {
        let dir = TempDir::new().unwrap();
        let mock = MockRuntime::new();
        let (_, curator) = setup(&mock, &dir);
        let mut discovery = ModelDiscovery::new("m:1", ModelSource::Local);
        discovery.transition(EvaluationStatus::Evaluating);
        discovery.transition(EvaluationStatus::Rejected);

        assert!(curator.evaluate_model(&mut discovery).await.is_empty());
        assert_eq!(discovery.status(), EvaluationStatus::Rejected);
        assert_eq!(mock.run_count(), 0);
    }

    #[test]
    fn test_integrate_requires_approval() {
        let dir = TempDir::new().unwrap();
        let mock = MockRuntime::new();
        let (mut orchestrator, curator) = setup(&mock, &dir);
        let before = orchestrator.registry().len();

        let mut pending = ModelDiscovery::new("new:7b", ModelSource::Local);
        assert!(!curator.integrate_model(&mut orchestrator, &mut pending));
        assert_eq!(orchestrator.registry().len(), before);
        assert_eq!(pending.status(), EvaluationStatus::Pending);
    }

    #[test]
    fn test_integrate_approved_model() {
        let dir = TempDir::new().unwrap();
        let mock = MockRuntime::new();
        let (mut orchestrator, curator) = setup(&mock, &dir);
        let before = orchestrator.registry().len();

        let mut discovery = ModelDiscovery::new("coder:7b", ModelSource::Local)
            .with_size(Some(6.5))
            .with_capabilities(vec!["code".to_string()]);
        discovery.transition(EvaluationStatus::Evaluating);
        discovery.transition(EvaluationStatus::Approved);

        assert!(curator.integrate_model(&mut orchestrator, &mut discovery));
        assert_eq!(discovery.status(), EvaluationStatus::Integrated);
        assert_eq!(orchestrator.registry().len(), before + 1);

        let spec = orchestrator.registry().get("coder-7b").unwrap();
        assert_eq!(spec.ollama_tag(), "coder:7b");
        assert_eq!(spec.min_tier(), crate::hardware::HardwareTier::Journeyman);
        assert_eq!(spec.task_types(), &[TaskType::CodeGeneration, TaskType::Configuration]);

        let log = std::fs::read_to_string(curator.store().evolution_log_path()).unwrap();
        assert!(log.contains("INTEGRATED: coder-7b"));
    }

    #[tokio::test]
    async fn test_evolve_bounds_evaluations_and_never_integrates_by_default() {
        let dir = TempDir::new().unwrap();
        let mock = MockRuntime::new()
            .with_installed(&["a:1", "b:1", "c:1", "d:1"])
            .with_fallback(MockOutcome::Fail);
        let (mut orchestrator, mut curator) = setup(&mock, &dir);
        let before = orchestrator.registry().len();

        let report = curator.evolve(&mut orchestrator).await;
        assert_eq!(report.discoveries.len(), 4);
        assert_eq!(report.evaluations.len(), 3);
        assert!(report.integrations.is_empty());
        assert_eq!(orchestrator.registry().len(), before);

        let status = curator.get_evolution_status(&orchestrator);
        assert_eq!(status.discovery_queue, 4);
        assert_eq!(status.pending_evaluation, 1);
        assert_eq!(status.recent_discoveries.len(), 4);
    }

    #[tokio::test]
    async fn test_evolve_auto_integrates_approved() {
        let dir = TempDir::new().unwrap();
        let long_answer = format!(
            "```\ndef solve():\n    pass\n```\nThis happens because of a missing fix!\n{}",
            "detail ".repeat(400)
        );
        let mock = MockRuntime::new()
            .with_installed(&["great:1b"])
            .with_details(
                "great:1b",
                ModelDetails {
                    size_gb: Some(1.0),
                    capabilities: vec!["code".to_string()],
                },
            )
            .with_fallback(MockOutcome::Respond(long_answer));
        let (mut orchestrator, curator) = setup(&mock, &dir);
        let mut curator = curator.with_auto_integrate(true);

        let report = curator.evolve(&mut orchestrator).await;
        assert_eq!(report.evaluations[0].status, EvaluationStatus::Approved);
        assert_eq!(report.integrations, vec!["great-1b".to_string()]);
        assert_eq!(report.new_capabilities, vec!["code".to_string()]);
        assert!(orchestrator.registry().contains_key("great-1b"));
        assert!(curator.queue().is_empty());
    }

    #[tokio::test]
    async fn test_queue_restored_from_store() {
        let dir = TempDir::new().unwrap();
        let mock = MockRuntime::new().with_installed(&["x:1"]);
        {
            let (mut orchestrator, mut curator) = setup(&mock, &dir);
            let report = curator.evolve(&mut orchestrator).await;
            assert_eq!(report.evaluations[0].status, EvaluationStatus::Approved);
        }

        let (_, curator) = setup(&mock, &dir);
        assert!(curator.is_known("x-1"));
        assert_eq!(curator.queue().len(), 1);
        assert_eq!(curator.queue()[0].status(), EvaluationStatus::Approved);
    }
}
