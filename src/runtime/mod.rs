// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! External model runtime abstraction
//!
//! The runtime is a black box that lists, describes, pulls and runs models.
//! Everything that scrapes its textual output lives behind [`RuntimeClient`]
//! so the orchestration logic can be exercised against [`MockRuntime`].

pub mod mock;
pub mod ollama;

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::RuntimeError;

pub use mock::{MockOutcome, MockRuntime, RecordedRun};
pub use ollama::OllamaCli;

/// Result type for runtime calls
pub type RuntimeResult<T> = std::result::Result<T, RuntimeError>;

/// Best-effort metadata scraped from `show`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelDetails {
    /// Model size in GB, when the output mentions one
    pub size_gb: Option<f64>,
    /// Capability keywords (`conversation`, `code`, `vision`)
    pub capabilities: Vec<String>,
}

/// Options for a single `run` invocation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunOptions {
    pub temperature: f32,
    pub timeout: Duration,
}

/// Narrow interface to the external model runtime
#[async_trait]
pub trait RuntimeClient: Send + Sync {
    /// Tags of locally installed models
    async fn list_models(&self) -> RuntimeResult<Vec<String>>;

    /// Describe a model; fails if the runtime does not know the tag
    async fn show(&self, tag: &str) -> RuntimeResult<ModelDetails>;

    /// Fetch a model, waiting at most `timeout`
    async fn pull(&self, tag: &str, timeout: Duration) -> RuntimeResult<()>;

    /// Run a prompt and return the full response text
    async fn run(&self, tag: &str, prompt: &str, options: RunOptions) -> RuntimeResult<String>;
}
