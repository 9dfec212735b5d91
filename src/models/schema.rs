// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Model registry schema
//!
//! Defines task categories and the capability-tagged model entries that the
//! orchestrator selects from.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{LuminousError, Result};
use crate::hardware::HardwareTier;

/// Cognitive task category, the primary selection key
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    Conversation,
    CodeGeneration,
    IntentClassification,
    ErrorExplanation,
    Configuration,
    Search,
    Learning,
    Vision,
    EthicalReasoning,
}

impl TaskType {
    pub const ALL: [TaskType; 9] = [
        TaskType::Conversation,
        TaskType::CodeGeneration,
        TaskType::IntentClassification,
        TaskType::ErrorExplanation,
        TaskType::Configuration,
        TaskType::Search,
        TaskType::Learning,
        TaskType::Vision,
        TaskType::EthicalReasoning,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::Conversation => "conversation",
            TaskType::CodeGeneration => "code_generation",
            TaskType::IntentClassification => "intent_classification",
            TaskType::ErrorExplanation => "error_explanation",
            TaskType::Configuration => "configuration",
            TaskType::Search => "search",
            TaskType::Learning => "learning",
            TaskType::Vision => "vision",
            TaskType::EthicalReasoning => "ethical_reasoning",
        }
    }

    /// Parse free-text task metadata, falling back to `Conversation`.
    pub fn parse_or_default(value: &str) -> Self {
        value.parse().unwrap_or_else(|_| {
            tracing::warn!("Unknown task type '{}', defaulting to conversation", value);
            TaskType::Conversation
        })
    }

    /// Sampling temperature used when the caller does not supply one
    pub fn default_temperature(&self) -> f32 {
        match self {
            TaskType::Conversation => 0.7,
            TaskType::CodeGeneration => 0.3,
            TaskType::ErrorExplanation => 0.5,
            TaskType::Configuration => 0.2,
            TaskType::Search => 0.1,
            _ => 0.5,
        }
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskType {
    type Err = LuminousError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        TaskType::ALL
            .into_iter()
            .find(|t| t.as_str() == normalized)
            .ok_or_else(|| LuminousError::InvalidInput(format!("Unknown task type: {}", s)))
    }
}

/// A selectable model: capabilities, hardware floor, and runtime tag.
///
/// Fields are private so that the non-empty invariants checked by
/// [`ModelSpec::validate`] cannot be broken after insertion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelSpec {
    name: String,
    task_types: Vec<TaskType>,
    min_tier: HardwareTier,
    context_window: u32,
    strengths: Vec<String>,
    ollama_tag: String,
}

impl ModelSpec {
    /// Create a spec supporting a single task, with an 8K context window
    pub fn new(
        name: impl Into<String>,
        ollama_tag: impl Into<String>,
        min_tier: HardwareTier,
        task: TaskType,
    ) -> Self {
        Self {
            name: name.into(),
            task_types: vec![task],
            min_tier,
            context_window: 8192,
            strengths: Vec::new(),
            ollama_tag: ollama_tag.into(),
        }
    }

    /// Builder: add another supported task
    pub fn also(mut self, task: TaskType) -> Self {
        if !self.task_types.contains(&task) {
            self.task_types.push(task);
        }
        self
    }

    /// Builder: set context window size
    pub fn with_context(mut self, tokens: u32) -> Self {
        self.context_window = tokens;
        self
    }

    /// Builder: set strength tags
    pub fn with_strengths(mut self, strengths: &[&str]) -> Self {
        self.strengths = strengths.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn task_types(&self) -> &[TaskType] {
        &self.task_types
    }

    pub fn min_tier(&self) -> HardwareTier {
        self.min_tier
    }

    pub fn context_window(&self) -> u32 {
        self.context_window
    }

    pub fn strengths(&self) -> &[String] {
        &self.strengths
    }

    pub fn ollama_tag(&self) -> &str {
        &self.ollama_tag
    }

    pub fn supports(&self, task: TaskType) -> bool {
        self.task_types.contains(&task)
    }

    /// Whether a host of `tier` can run this model
    pub fn runs_on(&self, tier: HardwareTier) -> bool {
        self.min_tier <= tier
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(LuminousError::InvalidInput(
                "model name must not be empty".to_string(),
            ));
        }
        if self.ollama_tag.trim().is_empty() {
            return Err(LuminousError::InvalidInput(format!(
                "model '{}' has an empty runtime tag",
                self.name
            )));
        }
        if self.task_types.is_empty() {
            return Err(LuminousError::InvalidInput(format!(
                "model '{}' supports no task types",
                self.name
            )));
        }
        if self.context_window == 0 {
            return Err(LuminousError::InvalidInput(format!(
                "model '{}' has a zero context window",
                self.name
            )));
        }
        Ok(())
    }
}

/// One `[[models]]` table in models.toml
#[derive(Debug, Clone, Deserialize)]
pub struct ModelOverride {
    pub key: String,
    pub name: String,
    pub ollama_tag: String,
    pub min_tier: HardwareTier,
    pub task_types: Vec<TaskType>,
    #[serde(default = "default_context_window")]
    pub context_window: u32,
    #[serde(default)]
    pub strengths: Vec<String>,
}

fn default_context_window() -> u32 {
    8192
}

impl ModelOverride {
    /// Convert into a registry key and validated spec
    pub fn into_entry(self) -> Result<(String, ModelSpec)> {
        if self.key.trim().is_empty() {
            return Err(LuminousError::InvalidInput(
                "model key must not be empty".to_string(),
            ));
        }
        let mut task_types = Vec::new();
        for task in self.task_types {
            if !task_types.contains(&task) {
                task_types.push(task);
            }
        }
        let spec = ModelSpec {
            name: self.name,
            task_types,
            min_tier: self.min_tier,
            context_window: self.context_window,
            strengths: self.strengths,
            ollama_tag: self.ollama_tag,
        };
        spec.validate()?;
        Ok((self.key, spec))
    }
}

/// Root of models.toml
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModelsConfig {
    #[serde(default)]
    pub models: Vec<ModelOverride>,
}
