// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Benchmark suite and scoring

use serde::{Deserialize, Serialize};

use crate::models::TaskType;

/// Outcome of one benchmark prompt
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Trial {
    Passed { quality: f64, tokens_per_sec: f64 },
    Failed,
}

/// Aggregated benchmark for one task type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkResult {
    pub model_id: String,
    pub task_type: TaskType,
    /// Fraction of prompts that produced a response
    pub accuracy: f64,
    /// Mean tokens/sec over successful prompts
    pub speed: f64,
    /// Estimated memory footprint in GB
    pub memory_gb: f64,
    /// Mean heuristic quality over successful prompts
    pub quality_score: f64,
    pub test_prompts: usize,
    pub success_rate: f64,
}

impl BenchmarkResult {
    /// Aggregate trials. Returns `None` when there were no trials at all.
    pub fn from_trials(model_id: &str, task_type: TaskType, memory_gb: f64, trials: &[Trial]) -> Option<Self> {
        if trials.is_empty() {
            return None;
        }

        let (mut passed, mut quality, mut speed) = (0usize, 0.0, 0.0);
        for trial in trials {
            if let Trial::Passed { quality: q, tokens_per_sec } = trial {
                passed += 1;
                quality += q;
                speed += tokens_per_sec;
            }
        }

        let rate = passed as f64 / trials.len() as f64;
        let mean = |sum: f64| if passed == 0 { 0.0 } else { sum / passed as f64 };

        Some(Self {
            model_id: model_id.to_string(),
            task_type,
            accuracy: rate,
            speed: mean(speed),
            memory_gb,
            quality_score: mean(quality),
            test_prompts: trials.len(),
            success_rate: rate,
        })
    }

    /// Weighted score: quality 0.4, accuracy 0.3, speed 0.2 (normalized
    /// against 100 tokens/sec), success rate 0.1
    pub fn overall_score(&self) -> f64 {
        self.quality_score * 0.4
            + self.accuracy * 0.3
            + (self.speed / 100.0).min(1.0) * 0.2
            + self.success_rate * 0.1
    }
}

/// Mean overall score, or `None` for an empty set
pub fn aggregate_score(results: &[BenchmarkResult]) -> Option<f64> {
    if results.is_empty() {
        return None;
    }
    let total: f64 = results.iter().map(BenchmarkResult::overall_score).sum();
    Some(total / results.len() as f64)
}

/// Heuristic quality of a response for `task`, in `0.5..=1.0`
pub fn assess_quality(response: &str, task: TaskType) -> f64 {
    let mut quality: f64 = 0.5;
    let len = response.chars().count();
    if len > 50 {
        quality += 0.1;
    }
    if len > 200 {
        quality += 0.1;
    }

    match task {
        TaskType::CodeGeneration => {
            if response.contains("def ") || response.contains("function") || response.contains("class") {
                quality += 0.2;
            }
            if response.contains("```") {
                quality += 0.1;
            }
        }
        TaskType::ErrorExplanation => {
            let lower = response.to_lowercase();
            if lower.contains("because") || lower.contains("this happens") {
                quality += 0.1;
            }
            if lower.contains("solution") || lower.contains("fix") {
                quality += 0.2;
            }
        }
        TaskType::Conversation => {
            if response.contains('?') || response.contains('!') {
                quality += 0.1;
            }
            if response.lines().count() > 1 {
                quality += 0.1;
            }
        }
        _ => {}
    }

    quality.min(1.0)
}

/// Canned prompts per task type
#[derive(Debug, Clone)]
pub struct BenchmarkSuite {
    tasks: Vec<(TaskType, Vec<&'static str>)>,
}

impl Default for BenchmarkSuite {
    fn default() -> Self {
        Self {
            tasks: vec![
                (
                    TaskType::Conversation,
                    vec![
                        "What is consciousness?",
                        "Explain quantum computing simply",
                        "How do I find meaning in life?",
                        "Tell me about the history of computing",
                        "What's the best way to learn programming?",
                    ],
                ),
                (
                    TaskType::CodeGeneration,
                    vec![
                        "Write a Python function to calculate fibonacci",
                        "Create a web server in Node.js",
                        "Implement quicksort in Rust",
                        "Build a React component for a todo list",
                        "Write a bash script to backup files",
                    ],
                ),
                (
                    TaskType::ErrorExplanation,
                    vec![
                        "ModuleNotFoundError: No module named 'tensorflow'",
                        "Segmentation fault (core dumped)",
                        "CORS policy: No 'Access-Control-Allow-Origin' header",
                        "undefined is not a function",
                        "Permission denied: /etc/passwd",
                    ],
                ),
                (
                    TaskType::Search,
                    vec![
                        "Find a markdown editor",
                        "Search for video player",
                        "Find Python development tools",
                        "Look for backup software",
                        "Search terminal emulator",
                    ],
                ),
                (
                    TaskType::Configuration,
                    vec![
                        "Configure nginx reverse proxy",
                        "Setup Python virtual environment",
                        "Configure Git for first time",
                        "Setup SSH keys",
                        "Configure systemd service",
                    ],
                ),
            ],
        }
    }
}

impl BenchmarkSuite {
    /// Suite with custom prompts
    pub fn new(tasks: Vec<(TaskType, Vec<&'static str>)>) -> Self {
        Self { tasks }
    }

    pub fn task_types(&self) -> impl Iterator<Item = TaskType> + '_ {
        self.tasks.iter().map(|(task, _)| *task)
    }

    /// Tasks to benchmark for the given claims. No claims means everything.
    pub fn relevant<'a>(&'a self, claimed: &'a [TaskType]) -> impl Iterator<Item = (TaskType, &'a [&'static str])> + 'a {
        self.tasks
            .iter()
            .filter(move |(task, _)| claimed.is_empty() || claimed.contains(task))
            .map(|(task, prompts)| (*task, prompts.as_slice()))
    }
}
