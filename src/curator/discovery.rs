// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Discovered models and their evaluation lifecycle

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::hardware::HardwareTier;
use crate::models::{ModelSpec, TaskType};

/// Aggregate benchmark score a model must exceed to be approved
pub const APPROVAL_THRESHOLD: f64 = 0.6;

/// Scores within this distance of the threshold count as equal to it, so
/// weighted sums that land on 0.6 up to rounding are still rejected
const SCORE_TOLERANCE: f64 = 1e-9;

/// Where a discovery came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelSource {
    /// Installed in the local runtime
    Local,
    /// Known to the runtime but not pulled
    Remote,
}

impl ModelSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelSource::Local => "local",
            ModelSource::Remote => "remote",
        }
    }
}

/// Evaluation state of a discovery
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvaluationStatus {
    Pending,
    Evaluating,
    Approved,
    Rejected,
    Integrated,
}

impl EvaluationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EvaluationStatus::Pending => "pending",
            EvaluationStatus::Evaluating => "evaluating",
            EvaluationStatus::Approved => "approved",
            EvaluationStatus::Rejected => "rejected",
            EvaluationStatus::Integrated => "integrated",
        }
    }

    /// Whether moving from `self` to `next` is allowed
    pub fn can_transition_to(&self, next: EvaluationStatus) -> bool {
        use EvaluationStatus::*;
        matches!(
            (self, next),
            (Pending, Evaluating) | (Evaluating, Approved) | (Evaluating, Rejected) | (Approved, Integrated)
        )
    }

    /// Status earned by an aggregate score. Strictly greater than the
    /// threshold approves.
    pub fn verdict(score: f64) -> Self {
        if score - APPROVAL_THRESHOLD > SCORE_TOLERANCE {
            EvaluationStatus::Approved
        } else {
            EvaluationStatus::Rejected
        }
    }
}

impl fmt::Display for EvaluationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Task types implied by a capability keyword
pub fn tasks_for_capability(capability: &str) -> &'static [TaskType] {
    match capability {
        "conversation" => &[TaskType::Conversation, TaskType::ErrorExplanation],
        "code" => &[TaskType::CodeGeneration, TaskType::Configuration],
        "vision" => &[TaskType::Vision],
        _ => &[],
    }
}

/// Minimum tier for a model of the given on-disk size
pub fn tier_for_size(size_gb: Option<f64>) -> HardwareTier {
    match size_gb {
        Some(s) if s > 20.0 => HardwareTier::Sage,
        Some(s) if s > 10.0 => HardwareTier::Master,
        Some(s) if s > 5.0 => HardwareTier::Journeyman,
        Some(s) if s > 2.0 => HardwareTier::Apprentice,
        _ => HardwareTier::Novice,
    }
}

/// Runtime tag to stable model id (`gemma3:4b` becomes `gemma3-4b`)
pub fn model_id_for_tag(tag: &str) -> String {
    tag.replace(':', "-")
}

/// A candidate model not yet vetted into the registry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDiscovery {
    pub model_id: String,
    pub source: ModelSource,
    pub discovered_at: DateTime<Utc>,
    pub model_tag: String,
    #[serde(default)]
    pub size_gb: Option<f64>,
    #[serde(default)]
    pub capabilities: Vec<String>,
    status: EvaluationStatus,
    #[serde(default)]
    pub evaluation_score: Option<f64>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub integrated_at: Option<DateTime<Utc>>,
}

impl ModelDiscovery {
    pub fn new(model_tag: &str, source: ModelSource) -> Self {
        Self {
            model_id: model_id_for_tag(model_tag),
            source,
            discovered_at: Utc::now(),
            model_tag: model_tag.to_string(),
            size_gb: None,
            capabilities: Vec::new(),
            status: EvaluationStatus::Pending,
            evaluation_score: None,
            notes: None,
            integrated_at: None,
        }
    }

    /// Set size, ignoring non-positive values
    pub fn with_size(mut self, size_gb: Option<f64>) -> Self {
        self.size_gb = size_gb.filter(|s| *s > 0.0);
        self
    }

    pub fn with_capabilities(mut self, capabilities: Vec<String>) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn status(&self) -> EvaluationStatus {
        self.status
    }

    /// Move to `next` if the lifecycle allows it
    pub fn transition(&mut self, next: EvaluationStatus) -> bool {
        if !self.status.can_transition_to(next) {
            tracing::warn!(
                "Refusing {} -> {} for {}",
                self.status,
                next,
                self.model_id
            );
            return false;
        }
        self.status = next;
        if next == EvaluationStatus::Integrated {
            self.integrated_at = Some(Utc::now());
        }
        true
    }

    /// Task types the declared capabilities cover, without duplicates
    pub fn claimed_tasks(&self) -> Vec<TaskType> {
        let mut tasks = Vec::new();
        for capability in &self.capabilities {
            for task in tasks_for_capability(capability) {
                if !tasks.contains(task) {
                    tasks.push(*task);
                }
            }
        }
        tasks
    }

    pub fn min_tier(&self) -> HardwareTier {
        tier_for_size(self.size_gb)
    }

    /// Registry entry for this model. Without claimed tasks it is
    /// registered for conversation.
    pub fn to_spec(&self) -> ModelSpec {
        let mut tasks = self.claimed_tasks();
        if tasks.is_empty() {
            tasks.push(TaskType::Conversation);
        }
        let mut spec = ModelSpec::new(self.display_name(), &self.model_tag, self.min_tier(), tasks[0])
            .with_strengths(&["discovered", "evaluated", "integrated"]);
        for task in &tasks[1..] {
            spec = spec.also(*task);
        }
        spec
    }

    /// Human-readable name derived from the id (`qwen3-8b` becomes `Qwen3 8b`)
    pub fn display_name(&self) -> String {
        self.model_id
            .split('-')
            .filter(|part| !part.is_empty())
            .map(|part| {
                let mut chars = part.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}
