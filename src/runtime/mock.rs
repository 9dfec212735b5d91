// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Mock runtime for testing
//!
//! Provides a scriptable implementation of [`RuntimeClient`] that can be used
//! in tests without an installed model runtime.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;

use crate::error::RuntimeError;

use super::{ModelDetails, RunOptions, RuntimeClient, RuntimeResult};

/// Scripted result of one `run` call
#[derive(Debug, Clone, PartialEq)]
pub enum MockOutcome {
    /// Succeed with this text
    Respond(String),
    /// Exit nonzero
    Fail,
    /// Report a timeout at the requested limit
    Timeout,
}

/// A `run` call as seen by the mock
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRun {
    pub tag: String,
    pub prompt: String,
    pub temperature: f32,
    pub timeout: Duration,
}

/// A mock runtime for testing
#[derive(Clone)]
pub struct MockRuntime {
    /// Installed model tags, as `list_models` reports them
    installed: Arc<Mutex<Vec<String>>>,
    /// Tags `show` knows about
    details: Arc<Mutex<HashMap<String, ModelDetails>>>,
    /// Queued `run` outcomes, consumed in order
    outcomes: Arc<Mutex<VecDeque<MockOutcome>>>,
    /// Outcome once the queue is drained
    fallback: Arc<Mutex<MockOutcome>>,
    /// Recorded `run` calls
    runs: Arc<Mutex<Vec<RecordedRun>>>,
    /// Recorded `pull` calls
    pulls: Arc<Mutex<Vec<String>>>,
    list_calls: Arc<AtomicUsize>,
    list_fails: Arc<AtomicBool>,
    pull_succeeds: Arc<AtomicBool>,
}

impl Default for MockRuntime {
    fn default() -> Self {
        Self::new()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            tracing::warn!("Mock runtime lock was poisoned, recovering");
            poisoned.into_inner()
        }
    }
}

impl MockRuntime {
    /// Create a mock with nothing installed that answers every prompt
    pub fn new() -> Self {
        Self {
            installed: Arc::new(Mutex::new(Vec::new())),
            details: Arc::new(Mutex::new(HashMap::new())),
            outcomes: Arc::new(Mutex::new(VecDeque::new())),
            fallback: Arc::new(Mutex::new(MockOutcome::Respond(
                "This is a mock response.".to_string(),
            ))),
            runs: Arc::new(Mutex::new(Vec::new())),
            pulls: Arc::new(Mutex::new(Vec::new())),
            list_calls: Arc::new(AtomicUsize::new(0)),
            list_fails: Arc::new(AtomicBool::new(false)),
            pull_succeeds: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Set the installed model list
    pub fn with_installed(self, tags: &[&str]) -> Self {
        *lock(&self.installed) = tags.iter().map(|t| t.to_string()).collect();
        self
    }

    /// Make `show` succeed for `tag` with the given details
    pub fn with_details(self, tag: &str, details: ModelDetails) -> Self {
        lock(&self.details).insert(tag.to_string(), details);
        self
    }

    /// Queue outcomes for successive `run` calls
    pub fn with_outcomes(self, outcomes: Vec<MockOutcome>) -> Self {
        lock(&self.outcomes).extend(outcomes);
        self
    }

    /// Outcome for every `run` call after the queue is drained
    pub fn with_fallback(self, outcome: MockOutcome) -> Self {
        *lock(&self.fallback) = outcome;
        self
    }

    /// Make `list_models` fail
    pub fn with_list_failure(self) -> Self {
        self.list_fails.store(true, Ordering::SeqCst);
        self
    }

    /// Make `pull` fail
    pub fn with_pull_failure(self) -> Self {
        self.pull_succeeds.store(false, Ordering::SeqCst);
        self
    }

    /// All recorded `run` calls
    pub fn runs(&self) -> Vec<RecordedRun> {
        lock(&self.runs).clone()
    }

    /// Number of `run` calls
    pub fn run_count(&self) -> usize {
        lock(&self.runs).len()
    }

    /// All recorded `pull` calls
    pub fn pulls(&self) -> Vec<String> {
        lock(&self.pulls).clone()
    }

    /// Number of `list_models` calls
    pub fn list_count(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    fn next_outcome(&self) -> MockOutcome {
        match lock(&self.outcomes).pop_front() {
            Some(outcome) => outcome,
            None => lock(&self.fallback).clone(),
        }
    }
}

#[async_trait]
impl RuntimeClient for MockRuntime {
    async fn list_models(&self) -> RuntimeResult<Vec<String>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.list_fails.load(Ordering::SeqCst) {
            return Err(RuntimeError::NotInstalled("mock".to_string()));
        }
        Ok(lock(&self.installed).clone())
    }

    async fn show(&self, tag: &str) -> RuntimeResult<ModelDetails> {
        lock(&self.details)
            .get(tag)
            .cloned()
            .ok_or_else(|| RuntimeError::Failed {
                status: 1,
                stderr: format!("model '{}' not found", tag),
            })
    }

    async fn pull(&self, tag: &str, _timeout: Duration) -> RuntimeResult<()> {
        lock(&self.pulls).push(tag.to_string());
        if !self.pull_succeeds.load(Ordering::SeqCst) {
            return Err(RuntimeError::Failed {
                status: 1,
                stderr: "pull failed".to_string(),
            });
        }
        let mut installed = lock(&self.installed);
        if !installed.iter().any(|t| t == tag) {
            installed.push(tag.to_string());
        }
        Ok(())
    }

    async fn run(&self, tag: &str, prompt: &str, options: RunOptions) -> RuntimeResult<String> {
        lock(&self.runs).push(RecordedRun {
            tag: tag.to_string(),
            prompt: prompt.to_string(),
            temperature: options.temperature,
            timeout: options.timeout,
        });
        match self.next_outcome() {
            MockOutcome::Respond(text) => Ok(text),
            MockOutcome::Fail => Err(RuntimeError::Failed {
                status: 1,
                stderr: "mock failure".to_string(),
            }),
            MockOutcome::Timeout => Err(RuntimeError::Timeout {
                seconds: options.timeout.as_secs(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts() -> RunOptions {
        RunOptions {
            temperature: 0.5,
            timeout: Duration::from_secs(7),
        }
    }

    #[tokio::test]
    async fn test_outcomes_consumed_in_order_then_fallback() {
        let mock = MockRuntime::new()
            .with_outcomes(vec![MockOutcome::Fail, MockOutcome::Timeout])
            .with_fallback(MockOutcome::Respond("done".to_string()));

        assert!(matches!(
            mock.run("m", "p", opts()).await,
            Err(RuntimeError::Failed { .. })
        ));
        assert!(matches!(
            mock.run("m", "p", opts()).await,
            Err(RuntimeError::Timeout { seconds: 7 })
        ));
        assert_eq!(mock.run("m", "p", opts()).await.unwrap(), "done");
        assert_eq!(mock.run_count(), 3);
    }

    #[tokio::test]
    async fn test_pull_installs_model() {
        let mock = MockRuntime::new().with_installed(&["a:1"]);
        mock.pull("b:1", Duration::from_secs(1)).await.unwrap();
        assert_eq!(mock.list_models().await.unwrap(), vec!["a:1", "b:1"]);
        assert_eq!(mock.pulls(), vec!["b:1"]);
    }

    #[tokio::test]
    async fn test_failures_are_scriptable() {
        let mock = MockRuntime::new().with_list_failure().with_pull_failure();
        assert!(mock.list_models().await.is_err());
        assert!(mock.pull("x:1", Duration::from_secs(1)).await.is_err());
        assert!(mock.show("x:1").await.is_err());
        assert_eq!(mock.list_count(), 1);
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let mock = MockRuntime::new();
        let clone = mock.clone();
        clone.run("m", "hello", opts()).await.unwrap();
        assert_eq!(mock.runs()[0].prompt, "hello");
        assert_eq!(mock.runs()[0].timeout, Duration::from_secs(7));
    }
}
