// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Ollama CLI runtime client
//!
//! Drives the `ollama` binary as a subprocess. Children are spawned with
//! `kill_on_drop`, so a timed-out or cancelled call does not leave the
//! process running.

use std::process::Stdio;
use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::config::RuntimeConfig;
use crate::error::RuntimeError;

use super::{ModelDetails, RunOptions, RuntimeClient, RuntimeResult};

/// [`RuntimeClient`] backed by the `ollama` command line
#[derive(Debug, Clone)]
pub struct OllamaCli {
    binary: String,
    list_timeout: Duration,
    show_timeout: Duration,
}

impl Default for OllamaCli {
    fn default() -> Self {
        Self::from_config(&RuntimeConfig::default())
    }
}

impl OllamaCli {
    pub fn from_config(config: &RuntimeConfig) -> Self {
        Self {
            binary: config.binary.clone(),
            list_timeout: Duration::from_secs(config.list_timeout_secs),
            show_timeout: Duration::from_secs(config.show_timeout_secs),
        }
    }

    pub fn binary(&self) -> &str {
        &self.binary
    }

    async fn invoke(
        &self,
        args: &[&str],
        stdin: Option<&str>,
        timeout: Duration,
    ) -> RuntimeResult<String> {
        let mut child = Command::new(&self.binary)
            .args(args)
            .stdin(if stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => RuntimeError::NotInstalled(self.binary.clone()),
                _ => RuntimeError::Io(e.to_string()),
            })?;

        let input = stdin.map(str::to_owned);
        let pipe = child.stdin.take();
        let interaction = async move {
            if let (Some(mut pipe), Some(input)) = (pipe, input) {
                pipe.write_all(input.as_bytes()).await?;
                pipe.shutdown().await?;
            }
            child.wait_with_output().await
        };

        let output = match tokio::time::timeout(timeout, interaction).await {
            Ok(result) => result.map_err(|e| RuntimeError::Io(e.to_string()))?,
            Err(_) => {
                return Err(RuntimeError::Timeout {
                    seconds: timeout.as_secs(),
                })
            }
        };

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        } else {
            Err(RuntimeError::Failed {
                status: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }
}

#[async_trait]
impl RuntimeClient for OllamaCli {
    async fn list_models(&self) -> RuntimeResult<Vec<String>> {
        let stdout = self.invoke(&["list"], None, self.list_timeout).await?;
        Ok(parse_list(&stdout))
    }

    async fn show(&self, tag: &str) -> RuntimeResult<ModelDetails> {
        let stdout = self.invoke(&["show", tag], None, self.show_timeout).await?;
        Ok(parse_show(tag, &stdout))
    }

    async fn pull(&self, tag: &str, timeout: Duration) -> RuntimeResult<()> {
        self.invoke(&["pull", tag], None, timeout).await.map(|_| ())
    }

    async fn run(&self, tag: &str, prompt: &str, options: RunOptions) -> RuntimeResult<String> {
        // The CLI exposes no sampling flags; the model's own default applies.
        tracing::debug!(
            "ollama run {} (requested temperature {:.2})",
            tag,
            options.temperature
        );
        let stdout = self
            .invoke(&["run", tag], Some(prompt), options.timeout)
            .await?;
        Ok(stdout.trim().to_string())
    }
}

/// Parse `ollama list` output: a header line, then one model per line with
/// the tag in the first column.
pub fn parse_list(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .skip(1)
        .filter_map(|line| line.split_whitespace().next())
        .map(str::to_string)
        .collect()
}

fn size_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*GB").unwrap())
}

/// Parse `ollama show <tag>` output, best-effort.
///
/// Size comes from the first line mentioning "size" with a GB figure.
/// Capabilities are inferred from the tag name plus any `vision` capability
/// the output lists.
pub fn parse_show(tag: &str, stdout: &str) -> ModelDetails {
    let size_gb = stdout
        .lines()
        .filter(|line| line.to_lowercase().contains("size"))
        .find_map(|line| {
            size_pattern()
                .captures(line)
                .and_then(|caps| caps.get(1))
                .and_then(|m| m.as_str().parse::<f64>().ok())
        })
        .filter(|gb| *gb > 0.0);

    let tag_lower = tag.to_lowercase();
    let mut capabilities = Vec::new();
    if tag_lower.contains("chat") || tag_lower.contains("conversation") {
        capabilities.push("conversation".to_string());
    }
    if tag_lower.contains("code") {
        capabilities.push("code".to_string());
    }
    let lists_vision = stdout.lines().any(|line| line.trim() == "vision");
    if tag_lower.contains("vision") || tag_lower.contains("llava") || lists_vision {
        capabilities.push("vision".to_string());
    }

    ModelDetails {
        size_gb,
        capabilities,
    }
}
