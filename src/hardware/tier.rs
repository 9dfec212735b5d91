// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Hardware tier classification
//!
//! Tiers are derived from VRAM alone so that a cached profile can always be
//! re-classified from its `vram_gb` field.

use serde::{Deserialize, Serialize};

/// Capability class of the host, ordered from least to most capable
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HardwareTier {
    /// Under 4GB VRAM (CPU-only or integrated graphics)
    Novice,
    /// 4GB+ VRAM
    Apprentice,
    /// 8GB+ VRAM
    Journeyman,
    /// 16GB+ VRAM
    Master,
    /// 24GB+ VRAM
    Sage,
}

/// Recommendation categories used by [`HardwareTier::recommended_models`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelCategory {
    Conversation,
    Coding,
    Reflex,
    Vision,
}

impl HardwareTier {
    /// All tiers in ascending order
    pub const ALL: [HardwareTier; 5] = [
        HardwareTier::Novice,
        HardwareTier::Apprentice,
        HardwareTier::Journeyman,
        HardwareTier::Master,
        HardwareTier::Sage,
    ];

    /// Classify a VRAM amount (GB) into a tier
    pub fn for_vram(vram_gb: f64) -> Self {
        if vram_gb >= 24.0 {
            HardwareTier::Sage
        } else if vram_gb >= 16.0 {
            HardwareTier::Master
        } else if vram_gb >= 8.0 {
            HardwareTier::Journeyman
        } else if vram_gb >= 4.0 {
            HardwareTier::Apprentice
        } else {
            HardwareTier::Novice
        }
    }

    /// Lowercase identifier used in cache keys and JSON
    pub fn as_str(&self) -> &'static str {
        match self {
            HardwareTier::Novice => "novice",
            HardwareTier::Apprentice => "apprentice",
            HardwareTier::Journeyman => "journeyman",
            HardwareTier::Master => "master",
            HardwareTier::Sage => "sage",
        }
    }

    /// Get a human-readable description of this tier
    pub fn description(&self) -> &'static str {
        match self {
            HardwareTier::Novice => "CPU-only or integrated graphics",
            HardwareTier::Apprentice => "Entry-level GPU (4GB+ VRAM)",
            HardwareTier::Journeyman => "Mainstream GPU (8GB+ VRAM)",
            HardwareTier::Master => "High-end GPU (16GB+ VRAM)",
            HardwareTier::Sage => "Workstation GPU (24GB+ VRAM)",
        }
    }

    /// Baseline generation speed a typical model for this tier reaches
    pub fn baseline_tokens_per_sec(&self) -> u32 {
        match self {
            HardwareTier::Novice => 5,
            HardwareTier::Apprentice => 15,
            HardwareTier::Journeyman => 30,
            HardwareTier::Master => 50,
            HardwareTier::Sage => 80,
        }
    }

    /// Get recommended runtime models for this tier, per category.
    ///
    /// Novice hosts get no vision recommendation.
    pub fn recommended_models(&self) -> Vec<(ModelCategory, &'static str)> {
        match self {
            HardwareTier::Novice => vec![
                (ModelCategory::Conversation, "gemma:2b"),
                (ModelCategory::Coding, "qwen2:1.5b"),
                (ModelCategory::Reflex, "tinyllama:latest"),
            ],
            HardwareTier::Apprentice => vec![
                (ModelCategory::Conversation, "gemma3:4b"),
                (ModelCategory::Coding, "qwen2:1.5b"),
                (ModelCategory::Reflex, "gemma3:1b"),
                (ModelCategory::Vision, "bakllava:latest"),
            ],
            HardwareTier::Journeyman => vec![
                (ModelCategory::Conversation, "gemma3:12b"),
                (ModelCategory::Coding, "qwen2:7b"),
                (ModelCategory::Reflex, "gemma3:1b"),
                (ModelCategory::Vision, "llava:7b"),
            ],
            HardwareTier::Master => vec![
                (ModelCategory::Conversation, "gemma2:27b"),
                (ModelCategory::Coding, "qwen2:32b"),
                (ModelCategory::Reflex, "gemma3:1b"),
                (ModelCategory::Vision, "llava:13b"),
            ],
            HardwareTier::Sage => vec![
                (ModelCategory::Conversation, "gpt-oss:latest"),
                (ModelCategory::Coding, "qwen2:72b"),
                (ModelCategory::Reflex, "gemma3:1b"),
                (ModelCategory::Vision, "llava:34b"),
            ],
        }
    }
}

impl std::fmt::Display for HardwareTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HardwareTier::Novice => write!(f, "Novice"),
            HardwareTier::Apprentice => write!(f, "Apprentice"),
            HardwareTier::Journeyman => write!(f, "Journeyman"),
            HardwareTier::Master => write!(f, "Master"),
            HardwareTier::Sage => write!(f, "Sage"),
        }
    }
}

impl std::fmt::Display for ModelCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ModelCategory::Conversation => "conversation",
            ModelCategory::Coding => "coding",
            ModelCategory::Reflex => "reflex",
            ModelCategory::Vision => "vision",
        };
        write!(f, "{}", label)
    }
}
