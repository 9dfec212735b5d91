// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Prompt execution with model routing and history tracking

use std::time::Instant;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::models::TaskType;

use super::history::{ExecutionHistory, ExecutionHistoryEntry, PerformanceInsight};
use super::{ExecuteOptions, ModelOrchestrator};

const HEDGING_PHRASES: &[&str] = &["not sure", "might be", "possibly", "unclear", "unknown"];
const ASSERTIVE_PHRASES: &[&str] = &["definitely", "certainly", "clearly", "obviously"];

/// Routing hints attached to a prompt by its template
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PromptMetadata {
    /// Free-text task type; unknown values route as conversation
    #[serde(default)]
    pub task_type: Option<String>,
    /// Route to the fastest model regardless of task
    #[serde(default)]
    pub requires_speed: bool,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub persona: Option<String>,
}

impl PromptMetadata {
    /// Metadata for a known task
    pub fn for_task(task: TaskType) -> Self {
        Self {
            task_type: Some(task.as_str().to_string()),
            ..Default::default()
        }
    }

    pub fn task(&self) -> TaskType {
        self.task_type
            .as_deref()
            .map(TaskType::parse_or_default)
            .unwrap_or(TaskType::Conversation)
    }

    /// Explicit temperature, else the task default
    pub fn temperature(&self) -> f32 {
        self.temperature
            .unwrap_or_else(|| self.task().default_temperature())
    }
}

/// Outcome of [`PromptExecutor::execute`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionResult {
    pub success: bool,
    pub response: String,
    pub model_used: String,
    pub tokens_per_sec: f64,
    pub confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExecutionResult {
    fn failure(model: &str, response: &str, error: &str) -> Self {
        Self {
            success: false,
            response: response.to_string(),
            model_used: model.to_string(),
            tokens_per_sec: 0.0,
            confidence: 0.0,
            error: Some(error.to_string()),
        }
    }
}

/// Heuristic confidence for a response, in `0.0..=1.0`
pub fn estimate_confidence(response: &str) -> f64 {
    if response.is_empty() {
        return 0.0;
    }

    let mut confidence: f64 = 0.5;
    if response.chars().count() > 100 {
        confidence += 0.2;
    }

    let lower = response.to_lowercase();
    for phrase in HEDGING_PHRASES {
        if lower.contains(phrase) {
            confidence -= 0.1;
        }
    }
    for phrase in ASSERTIVE_PHRASES {
        if lower.contains(phrase) {
            confidence += 0.1;
        }
    }

    confidence.clamp(0.0, 1.0)
}

/// Runs prompts through the orchestrator and keeps a bounded history
pub struct PromptExecutor {
    orchestrator: ModelOrchestrator,
    history: ExecutionHistory,
}

impl PromptExecutor {
    pub fn new(orchestrator: ModelOrchestrator, history_capacity: usize) -> Self {
        Self {
            orchestrator,
            history: ExecutionHistory::new(history_capacity),
        }
    }

    pub fn orchestrator(&self) -> &ModelOrchestrator {
        &self.orchestrator
    }

    pub fn orchestrator_mut(&mut self) -> &mut ModelOrchestrator {
        &mut self.orchestrator
    }

    pub fn into_orchestrator(self) -> ModelOrchestrator {
        self.orchestrator
    }

    pub fn history(&self) -> &ExecutionHistory {
        &self.history
    }

    pub fn performance_insight(&self) -> PerformanceInsight {
        self.history.performance_insight()
    }

    /// Route, run and record one prompt. Never fails; problems are reported
    /// through `success` and `error`.
    pub async fn execute(&mut self, prompt: &str, metadata: &PromptMetadata) -> ExecutionResult {
        let mut model = self.orchestrator.model_for_prompt(metadata);

        if !self.orchestrator.ensure_model_available(&model).await {
            let fallback = self.orchestrator.fallback_model().to_string();
            tracing::warn!("{} unavailable, trying fallback {}", model, fallback);
            if fallback == model || !self.orchestrator.ensure_model_available(&fallback).await {
                let result = ExecutionResult::failure(&fallback, "Failed to load model", "model_unavailable");
                self.track(metadata, &result);
                return result;
            }
            model = fallback;
        }

        let options = ExecuteOptions {
            temperature: metadata.temperature(),
            ..Default::default()
        };
        tracing::info!("Executing with {} (temp={})", model, options.temperature);

        let started = Instant::now();
        let result = match self.orchestrator.execute(&model, prompt, options).await {
            Some(response) => {
                let elapsed = started.elapsed().as_secs_f64().max(0.001);
                let words = response.split_whitespace().count();
                ExecutionResult {
                    success: true,
                    tokens_per_sec: words as f64 / elapsed,
                    confidence: estimate_confidence(&response),
                    response,
                    model_used: model,
                    error: None,
                }
            }
            None => ExecutionResult::failure(&model, "Model execution failed", "execution_failed"),
        };

        self.track(metadata, &result);
        result
    }

    fn track(&mut self, metadata: &PromptMetadata, result: &ExecutionResult) {
        self.history.record(ExecutionHistoryEntry {
            timestamp: Utc::now(),
            model: result.model_used.clone(),
            task: metadata.task(),
            persona: metadata.persona.clone(),
            success: result.success,
            tokens_per_sec: result.tokens_per_sec,
            confidence: result.confidence,
        });
    }
}
