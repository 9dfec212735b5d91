// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Bounded execution history and performance insight

use std::collections::{BTreeMap, VecDeque};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::TaskType;

/// One recorded execution
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionHistoryEntry {
    pub timestamp: DateTime<Utc>,
    pub model: String,
    pub task: TaskType,
    pub persona: Option<String>,
    pub success: bool,
    pub tokens_per_sec: f64,
    pub confidence: f64,
}

/// Aggregate numbers for one model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelPerformance {
    pub count: usize,
    pub success_rate: f64,
    pub mean_tokens_per_sec: f64,
}

/// Result of [`ExecutionHistory::performance_insight`]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PerformanceInsight {
    /// Nothing recorded yet
    NoData,
    Report {
        total_executions: usize,
        success_rate: f64,
        models: BTreeMap<String, ModelPerformance>,
    },
}

/// Ring buffer of the most recent executions
#[derive(Debug, Clone)]
pub struct ExecutionHistory {
    entries: VecDeque<ExecutionHistoryEntry>,
    capacity: usize,
}

impl ExecutionHistory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append an entry, silently dropping the oldest past capacity
    pub fn record(&mut self, entry: ExecutionHistoryEntry) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Entries from oldest to newest
    pub fn entries(&self) -> impl Iterator<Item = &ExecutionHistoryEntry> {
        self.entries.iter()
    }

    pub fn performance_insight(&self) -> PerformanceInsight {
        if self.entries.is_empty() {
            return PerformanceInsight::NoData;
        }

        let total = self.entries.len();
        let successes = self.entries.iter().filter(|e| e.success).count();

        // (count, successes, speed sum)
        let mut per_model: BTreeMap<&str, (usize, usize, f64)> = BTreeMap::new();
        for entry in &self.entries {
            let stats = per_model.entry(entry.model.as_str()).or_default();
            stats.0 += 1;
            if entry.success {
                stats.1 += 1;
            }
            stats.2 += entry.tokens_per_sec;
        }

        let models = per_model
            .into_iter()
            .map(|(model, (count, ok, speed))| {
                (
                    model.to_string(),
                    ModelPerformance {
                        count,
                        success_rate: ok as f64 / count as f64,
                        mean_tokens_per_sec: speed / count as f64,
                    },
                )
            })
            .collect();

        PerformanceInsight::Report {
            total_executions: total,
            success_rate: successes as f64 / total as f64,
            models,
        }
    }
}
