// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Sacred Council role assignment
//!
//! Binds four fixed cognitive roles to installed registry models. Each role
//! walks its own preference list and takes the first installed entry.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::ModelRegistry;

/// Cognitive role in the council
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CouncilRole {
    /// Fast intent parsing
    Reflex,
    /// Empathetic explanation
    Heart,
    /// Technical reasoning
    Mind,
    /// Ethical review
    Conscience,
}

impl CouncilRole {
    pub const ALL: [CouncilRole; 4] = [
        CouncilRole::Reflex,
        CouncilRole::Heart,
        CouncilRole::Mind,
        CouncilRole::Conscience,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CouncilRole::Reflex => "reflex",
            CouncilRole::Heart => "heart",
            CouncilRole::Mind => "mind",
            CouncilRole::Conscience => "conscience",
        }
    }

    /// Registry keys in priority order
    pub fn preferences(&self) -> &'static [&'static str] {
        match self {
            CouncilRole::Reflex => &["gemma3-270m", "gemma3-1b", "tinyllama", "gemma-2b"],
            CouncilRole::Heart => &["gemma3-4b", "gemma2-9b", "gemma3-12b", "gemma-7b", "mistral-7b"],
            CouncilRole::Mind => &["qwen3-8b", "qwen2-7b", "qwen2-32b", "qwen2-1.5b"],
            CouncilRole::Conscience => &["mistral-7b", "llama3.2-3b", "qwen3-8b", "gemma2-9b"],
        }
    }
}

impl fmt::Display for CouncilRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Role to registry key mapping, fixed for an orchestrator's lifetime
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SacredCouncil {
    reflex: Option<String>,
    heart: Option<String>,
    mind: Option<String>,
    conscience: Option<String>,
}

impl SacredCouncil {
    /// Council with every role vacant
    pub fn vacant() -> Self {
        Self::default()
    }

    /// Assign roles from the installed tag list. Pure and deterministic.
    pub fn assign(installed: &[String], registry: &ModelRegistry) -> Self {
        let mut council = Self::vacant();
        for role in CouncilRole::ALL {
            let chosen = role
                .preferences()
                .iter()
                .find(|key| {
                    registry.get(key).is_some_and(|spec| {
                        installed.iter().any(|tag| same_tag(tag, spec.ollama_tag()))
                    })
                })
                .map(|key| key.to_string());
            *council.slot_mut(role) = chosen;
        }
        council
    }

    /// Registry key bound to `role`
    pub fn get(&self, role: CouncilRole) -> Option<&str> {
        match role {
            CouncilRole::Reflex => self.reflex.as_deref(),
            CouncilRole::Heart => self.heart.as_deref(),
            CouncilRole::Mind => self.mind.as_deref(),
            CouncilRole::Conscience => self.conscience.as_deref(),
        }
    }

    /// All roles with their bindings, in fixed role order
    pub fn assignments(&self) -> Vec<(CouncilRole, Option<&str>)> {
        CouncilRole::ALL.iter().map(|r| (*r, self.get(*r))).collect()
    }

    pub fn assigned_count(&self) -> usize {
        CouncilRole::ALL.iter().filter(|r| self.get(**r).is_some()).count()
    }

    fn slot_mut(&mut self, role: CouncilRole) -> &mut Option<String> {
        match role {
            CouncilRole::Reflex => &mut self.reflex,
            CouncilRole::Heart => &mut self.heart,
            CouncilRole::Mind => &mut self.mind,
            CouncilRole::Conscience => &mut self.conscience,
        }
    }
}

/// Tags match exactly or differ only by an implicit `:latest`
pub(crate) fn same_tag(a: &str, b: &str) -> bool {
    fn strip(tag: &str) -> &str {
        tag.strip_suffix(":latest").unwrap_or(tag)
    }
    strip(a) == strip(b)
}
