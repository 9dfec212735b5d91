// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Model registry
//!
//! Loads model definitions from:
//! 1. Built-in defaults (always available)
//! 2. `$LUMINOUS_HOME/models.toml` for overrides/additions
//!
//! Entries keep insertion order. Selection relies on it to break ties
//! between models with the same minimum tier.

use std::path::Path;

use crate::error::Result;
use crate::hardware::HardwareTier;

use super::schema::{ModelSpec, ModelsConfig, TaskType};

/// Ordered mapping from stable key to [`ModelSpec`]
#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    entries: Vec<(String, ModelSpec)>,
}

impl ModelRegistry {
    /// Registry with no entries
    pub fn empty() -> Self {
        Self::default()
    }

    /// Registry with the built-in model table
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        for (key, spec) in default_models() {
            registry.entries.push((key.to_string(), spec));
        }
        registry
    }

    /// Insert or replace an entry. A replaced entry keeps its position.
    ///
    /// Returns the previous spec stored under `key`, if any.
    pub fn insert(&mut self, key: impl Into<String>, spec: ModelSpec) -> Result<Option<ModelSpec>> {
        spec.validate()?;
        let key = key.into();
        if let Some((_, existing)) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            return Ok(Some(std::mem::replace(existing, spec)));
        }
        self.entries.push((key, spec));
        Ok(None)
    }

    pub fn get(&self, key: &str) -> Option<&ModelSpec> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, s)| s)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Iterate entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ModelSpec)> {
        self.entries.iter().map(|(k, s)| (k.as_str(), s))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Find the entry whose runtime tag matches `tag`
    pub fn find_by_tag(&self, tag: &str) -> Option<(&str, &ModelSpec)> {
        self.iter().find(|(_, spec)| spec.ollama_tag() == tag)
    }

    /// Entries that support `task` and can run on `tier`, in insertion order
    pub fn eligible(&self, task: TaskType, tier: HardwareTier) -> Vec<(&str, &ModelSpec)> {
        self.iter()
            .filter(|(_, spec)| spec.supports(task) && spec.runs_on(tier))
            .collect()
    }

    /// Apply `[[models]]` overrides from a TOML file.
    ///
    /// A missing file is not an error. Returns the number of entries applied.
    pub fn load_overrides(&mut self, path: &Path) -> Result<usize> {
        if !path.exists() {
            return Ok(0);
        }
        let content = std::fs::read_to_string(path)?;
        let config: ModelsConfig = toml::from_str(&content)?;

        // Validate everything before touching the registry
        let entries = config
            .models
            .into_iter()
            .map(|m| m.into_entry())
            .collect::<Result<Vec<_>>>()?;

        let count = entries.len();
        for (key, spec) in entries {
            self.insert(key, spec)?;
        }
        tracing::debug!("Applied {} model overrides from {:?}", count, path);
        Ok(count)
    }
}

fn default_models() -> Vec<(&'static str, ModelSpec)> {
    use HardwareTier::*;
    use TaskType::*;

    vec![
        // Conversation / empathetic explanation
        (
            "gemma3-4b",
            ModelSpec::new("Gemma 3 4B", "gemma3:4b", Apprentice, Conversation)
                .also(ErrorExplanation)
                .with_strengths(&["modern", "efficient", "balanced"]),
        ),
        (
            "gemma3-12b",
            ModelSpec::new("Gemma 3 12B", "gemma3:12b", Journeyman, Conversation)
                .also(ErrorExplanation)
                .with_strengths(&["powerful", "nuanced", "comprehensive"]),
        ),
        (
            "gpt-oss-large",
            ModelSpec::new("GPT-OSS Large", "gpt-oss:latest", Master, Conversation)
                .also(ErrorExplanation)
                .with_strengths(&["empathy", "nuance", "safety"]),
        ),
        (
            "gemma2-27b",
            ModelSpec::new("Gemma 2 27B", "gemma2:27b", Master, Conversation)
                .also(ErrorExplanation)
                .with_strengths(&["efficiency", "instruction-following", "safety"]),
        ),
        (
            "gemma2-9b",
            ModelSpec::new("Gemma 2 9B", "gemma2:9b", Journeyman, Conversation)
                .also(ErrorExplanation)
                .with_strengths(&["balanced", "efficient", "safe"]),
        ),
        (
            "gemma-7b",
            ModelSpec::new("Gemma 7B", "gemma:7b", Apprentice, Conversation)
                .also(ErrorExplanation)
                .with_strengths(&["compact", "fast", "reliable"]),
        ),
        // Code and logic
        (
            "qwen2-72b",
            ModelSpec::new("Qwen 2 72B", "qwen2:72b", Sage, CodeGeneration)
                .also(Configuration)
                .also(Learning)
                .with_context(32768)
                .with_strengths(&["code-mastery", "logic", "architecture"]),
        ),
        (
            "qwen2-32b",
            ModelSpec::new("Qwen 2 32B", "qwen2:32b", Master, CodeGeneration)
                .also(Configuration)
                .also(Learning)
                .with_context(32768)
                .with_strengths(&["code-excellence", "reasoning", "planning"]),
        ),
        (
            "qwen2-7b",
            ModelSpec::new("Qwen 2 7B", "qwen2:7b", Journeyman, CodeGeneration)
                .also(Configuration)
                .with_context(32768)
                .with_strengths(&["code-competent", "efficient", "precise"]),
        ),
        (
            "qwen2-1.5b",
            ModelSpec::new("Qwen 2 1.5B", "qwen2:1.5b", Apprentice, CodeGeneration)
                .also(Configuration)
                .with_context(32768)
                .with_strengths(&["code-basic", "fast", "lightweight"]),
        ),
        // Fast reflex
        (
            "gemma3-1b",
            ModelSpec::new("Gemma 3 1B", "gemma3:1b", Novice, IntentClassification)
                .also(Search)
                .with_strengths(&["modern", "ultra-fast", "efficient"]),
        ),
        (
            "gemma3-270m",
            ModelSpec::new("Gemma 3 270M", "gemma3:270m", Novice, IntentClassification)
                .also(Search)
                .with_strengths(&["tiny", "instant", "minimal"]),
        ),
        (
            "gemma-2b",
            ModelSpec::new("Gemma 2B", "gemma:2b", Novice, IntentClassification)
                .also(Search)
                .with_strengths(&["ultra-fast", "efficient", "instant"]),
        ),
        (
            "tinyllama",
            ModelSpec::new("TinyLlama", "tinyllama:latest", Novice, IntentClassification)
                .also(Search)
                .with_context(2048)
                .with_strengths(&["tiny", "instant", "minimal"]),
        ),
        // Vision
        (
            "llava-34b",
            ModelSpec::new("LLaVA 34B", "llava:34b", Sage, Vision)
                .with_context(4096)
                .with_strengths(&["vision", "multimodal", "description"]),
        ),
        (
            "llava-13b",
            ModelSpec::new("LLaVA 13B", "llava:13b", Master, Vision)
                .with_context(4096)
                .with_strengths(&["vision", "balanced", "accurate"]),
        ),
        (
            "llava-7b",
            ModelSpec::new("LLaVA 7B", "llava:7b", Journeyman, Vision)
                .with_context(4096)
                .with_strengths(&["vision", "efficient", "capable"]),
        ),
        (
            "bakllava",
            ModelSpec::new("BakLLaVA", "bakllava:latest", Apprentice, Vision)
                .with_context(2048)
                .with_strengths(&["vision", "compact", "basic"]),
        ),
        // Ethical review
        (
            "qwen3-8b",
            ModelSpec::new("Qwen 3 8B", "qwen3:8b", Journeyman, EthicalReasoning)
                .also(Learning)
                .with_context(32768)
                .with_strengths(&["reasoning", "deliberation", "thinking"]),
        ),
        (
            "mistral-7b",
            ModelSpec::new("Mistral 7B", "mistral:7b", Apprentice, EthicalReasoning)
                .also(Conversation)
                .with_context(32768)
                .with_strengths(&["principled", "balanced", "concise"]),
        ),
        (
            "llama3.2-3b",
            ModelSpec::new("Llama 3.2 3B", "llama3.2:3b", Novice, EthicalReasoning)
                .with_context(131072)
                .with_strengths(&["lightweight", "careful", "aligned"]),
        ),
    ]
}
